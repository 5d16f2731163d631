use crate::constants::*;
use crate::rect::Rect;
use glam::Vec2;

/// 2D view onto the world. `target` is the world point shown at the centre
/// of the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    pub target: Vec2,
    pub zoom: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// World area the view may not leave (the current level)
    bounds: Option<Rect>,
}

impl Camera2D {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            target: Vec2::ZERO,
            zoom: CAMERA_DEFAULT_ZOOM,
            viewport_width,
            viewport_height,
            bounds: None,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.target = self.clamp_to_bounds(self.target);
    }

    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
        self.target = self.clamp_to_bounds(self.target);
    }

    /// Jump straight to a point (level entry)
    pub fn snap_to(&mut self, point: Vec2) {
        self.target = self.clamp_to_bounds(point);
    }

    /// Ease toward `point`. Frame-rate independent: the same total time gives
    /// the same result however it is split into ticks.
    pub fn follow(&mut self, point: Vec2, dt: f32) {
        let goal = self.clamp_to_bounds(point);
        let t = 1.0 - CAMERA_TRACKING_SMOOTHING.powf(dt * 60.0);
        self.target += (goal - self.target) * t;
        if self.target.distance(goal) < CAMERA_SNAP_DISTANCE {
            self.target = goal;
        }
    }

    fn half_extent(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height) / (2.0 * self.zoom)
    }

    /// Keep the view inside the bounds; centre it on any axis where the
    /// level is smaller than the view.
    fn clamp_to_bounds(&self, point: Vec2) -> Vec2 {
        let Some(bounds) = self.bounds else {
            return point;
        };
        let half = self.half_extent();
        let clamp_axis = |v: f32, lo: f32, hi: f32, half: f32| {
            if hi - lo <= half * 2.0 {
                (lo + hi) * 0.5
            } else {
                v.clamp(lo + half, hi - half)
            }
        };
        let min = bounds.min();
        let max = bounds.max();
        Vec2::new(
            clamp_axis(point.x, min.x, max.x, half.x),
            clamp_axis(point.y, min.y, max.y, half.y),
        )
    }

    /// World-space rectangle currently in view
    pub fn visible_rect(&self) -> Rect {
        let half = self.half_extent();
        Rect::from_pos_size(self.target - half, half * 2.0)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.target) * self.zoom
            + Vec2::new(self.viewport_width, self.viewport_height) * 0.5
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - Vec2::new(self.viewport_width, self.viewport_height) * 0.5) / self.zoom + self.target
    }
}
