//! Keyboard state and the per-frame player intent derived from it.
//!
//! The core never talks to a windowing library. A frontend (or the headless
//! autopilot) feeds key transitions into `InputState` and the session reads
//! a `PlayerInput` back out once per logical step.

use glam::Vec2;
use std::collections::HashSet;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Attack,
    Enter,
    Escape,
    Backspace,
    /// Typed character, used by text fields in the menu
    Char(char),
}

impl Key {
    /// Parse a whitespace separated key script. Named keys are matched
    /// without case; any other word is typed one character at a time.
    pub fn parse_script(script: &str) -> Vec<Key> {
        script
            .split_whitespace()
            .flat_map(|word| match word.to_ascii_lowercase().as_str() {
                "up" => vec![Key::Up],
                "down" => vec![Key::Down],
                "left" => vec![Key::Left],
                "right" => vec![Key::Right],
                "attack" => vec![Key::Attack],
                "enter" => vec![Key::Enter],
                "esc" | "escape" => vec![Key::Escape],
                "backspace" => vec![Key::Backspace],
                _ => word.chars().map(Key::Char).collect(),
            })
            .collect()
    }
}

/// Input state tracking
#[derive(Debug, Default, Clone)]
pub struct InputState {
    /// Keys currently held
    keys_down: HashSet<Key>,
    /// Keys pressed since the last time they were consumed
    keys_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Consume a press. Returns true once per physical press.
    pub fn take_pressed(&mut self, key: Key) -> bool {
        self.keys_pressed.remove(&key)
    }

    /// Consume every pending press, in no particular order
    pub fn drain_pressed(&mut self) -> Vec<Key> {
        self.keys_pressed.drain().collect()
    }

    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.keys_pressed.clear();
    }

    /// Player intent for this step: held direction keys move, a fresh
    /// attack press attacks.
    pub fn player_input(&mut self) -> PlayerInput {
        let axis = |neg: bool, pos: bool| match (neg, pos) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let direction = Vec2::new(
            axis(self.is_down(Key::Left), self.is_down(Key::Right)),
            axis(self.is_down(Key::Up), self.is_down(Key::Down)),
        );
        PlayerInput {
            direction,
            attack: self.take_pressed(Key::Attack),
        }
    }
}

/// What the player asked for this step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    /// Screen space, +y down. Keys give components of -1, 0 or 1; longer
    /// vectors are clamped to unit length, shorter ones walk slower.
    pub direction: Vec2,
    pub attack: bool,
}

impl PlayerInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(dx: f32, dy: f32) -> Self {
        Self {
            direction: Vec2::new(dx, dy),
            attack: false,
        }
    }

    pub fn attacking() -> Self {
        Self {
            direction: Vec2::ZERO,
            attack: true,
        }
    }

    pub fn with_attack(mut self) -> Self {
        self.attack = true;
        self
    }

    pub fn wants_move(&self) -> bool {
        self.direction != Vec2::ZERO
    }
}
