//! Unattended player control for headless runs: walk to the stair, swing at
//! anything in reach.

use crate::constants::*;
use crate::input::PlayerInput;
use crate::map::MapNode;
use crate::pathfinding::find_path;
use crate::player::Player;
use glam::Vec2;
use log::debug;
use std::collections::VecDeque;

/// Frames without progress before the route is recomputed
const STUCK_FRAMES: u32 = 30;

#[derive(Debug, Default)]
pub struct Autopilot {
    route: VecDeque<(i32, i32)>,
    goal: Option<(i32, i32)>,
    last_position: Vec2,
    stuck_for: u32,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current route, e.g. after a level change
    pub fn reset(&mut self) {
        self.route.clear();
        self.goal = None;
        self.stuck_for = 0;
    }

    pub fn has_route(&self) -> bool {
        !self.route.is_empty()
    }

    pub fn next_input(&mut self, player: &Player, map: &MapNode, dt: f32) -> PlayerInput {
        if !player.entity.is_alive() {
            return PlayerInput::idle();
        }
        if self.enemy_in_reach(player, map) && player.entity.stamina() >= ATTACK_STAMINA_COST {
            return PlayerInput::attacking();
        }

        let ts = map.tile_size();
        let here = player.entity.center();
        let cell = ((here.x / ts).floor() as i32, (here.y / ts).floor() as i32);
        let goal = map.stair_cell();

        if player.entity.position == self.last_position {
            self.stuck_for += 1;
        } else {
            self.stuck_for = 0;
        }
        self.last_position = player.entity.position;

        if self.goal != Some(goal) || self.route.is_empty() || self.stuck_for > STUCK_FRAMES {
            self.route = find_path(map, cell, goal).map(VecDeque::from).unwrap_or_default();
            self.goal = Some(goal);
            self.stuck_for = 0;
            debug!("autopilot route to {goal:?}: {} steps", self.route.len());
        }

        // Drop waypoints already reached
        while let Some(&(x, y)) = self.route.front() {
            if map.cell_position(x, y).distance(player.entity.position) > 0.01 {
                break;
            }
            self.route.pop_front();
        }
        let Some(&(x, y)) = self.route.front() else {
            return PlayerInput::idle();
        };

        // Scale so the final step lands on the waypoint instead of past it
        let to_target = map.cell_position(x, y) - player.entity.position;
        let full_step = (player.entity.speed * dt).max(f32::EPSILON);
        let direction = (to_target / full_step).clamp_length_max(1.0);
        PlayerInput {
            direction,
            attack: false,
        }
    }

    fn enemy_in_reach(&self, player: &Player, map: &MapNode) -> bool {
        let area = player.attack_area();
        map.enemies()
            .iter()
            .any(|e| e.entity.is_alive() && e.entity.hitbox().intersects(&area))
    }
}
