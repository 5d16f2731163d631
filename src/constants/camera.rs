//! Camera-related constants.

/// Default zoom level
pub const CAMERA_DEFAULT_ZOOM: f32 = 2.0;
/// Smoothing factor for camera tracking (lower = snappier)
pub const CAMERA_TRACKING_SMOOTHING: f32 = 0.85;
/// Distance below which the camera snaps onto its target
pub const CAMERA_SNAP_DISTANCE: f32 = 0.05;
/// Default viewport width in pixels
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
/// Default viewport height in pixels
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
