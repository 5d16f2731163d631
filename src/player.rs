//! The local player: input-driven state machine, melee, draw and camera.

use crate::assets::{names, AssetCatalog, SoundHandle};
use crate::camera::Camera2D;
use crate::constants::*;
use crate::entity::{DamageOutcome, Entity, Stats};
use crate::events::{Actor, EventQueue};
use crate::input::PlayerInput;
use crate::map::MapNode;
use crate::rect::Rect;
use crate::render::{DrawCommand, Layer};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Moving,
    Attacking,
}

impl PlayerState {
    fn row_block(&self) -> u32 {
        match self {
            PlayerState::Idle => 0,
            PlayerState::Moving => 1,
            PlayerState::Attacking => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Down,
    Up,
    Left,
    Right,
}

impl Facing {
    fn index(&self) -> u32 {
        match self {
            Facing::Down => 0,
            Facing::Up => 1,
            Facing::Left => 2,
            Facing::Right => 3,
        }
    }

    /// Unit vector in screen space (+y down)
    pub fn vector(&self) -> Vec2 {
        match self {
            Facing::Down => Vec2::Y,
            Facing::Up => Vec2::NEG_Y,
            Facing::Left => Vec2::NEG_X,
            Facing::Right => Vec2::X,
        }
    }

    /// Horizontal input wins on diagonals
    fn from_direction(direction: Vec2) -> Option<Facing> {
        if direction.x < 0.0 {
            Some(Facing::Left)
        } else if direction.x > 0.0 {
            Some(Facing::Right)
        } else if direction.y < 0.0 {
            Some(Facing::Up)
        } else if direction.y > 0.0 {
            Some(Facing::Down)
        } else {
            None
        }
    }
}

/// What happened during one `Player::update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerOutcome {
    Idle,
    Moved,
    /// Tried to move but every requested axis was blocked
    Blocked,
    /// Mid-attack; movement input is being queued
    Attacking,
    /// An attack started and hit `hits` enemies
    Attacked { hits: usize },
    /// An attack started and broke the wall at (x, y)
    BrokeTile { x: usize, y: usize },
    /// Attack refused, not enough stamina
    Exhausted,
    /// Stepped onto a stair
    Stair,
    /// Stepped onto the stair back up
    StairUp,
    /// Stepped into a hole
    Fell,
    Dead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub entity: Entity,
    walk_sounds: Vec<SoundHandle>,
    attack_sound: SoundHandle,
    break_sound: SoundHandle,
    pub last_animation: u32,
    pub current_animation: u32,
    pub facing: Facing,
    pub state: PlayerState,
    /// Movement requested while an attack was playing
    queued_move: Option<Vec2>,
    attack_timer: f32,
    walk_frame: u32,
    last_walk_step: u32,
    last_regen_frame: u32,
}

impl Player {
    pub fn new(spawn: Vec2, tile_size: f32, speed: f32, assets: &AssetCatalog) -> Self {
        let stats = Stats {
            health: PLAYER_STARTING_HEALTH,
            stamina: PLAYER_STARTING_STAMINA,
            mana: PLAYER_STARTING_MANA,
            damage: PLAYER_DAMAGE,
            speed,
        };
        let mut entity = Entity::new(assets.texture_or_placeholder(names::PLAYER), spawn, tile_size, stats)
            .with_sounds(
                assets.sound_or_silent(names::PLAYER_HURT),
                assets.sound_or_silent(names::PLAYER_DEATH),
            );
        entity.is_player = true;

        Self {
            entity,
            walk_sounds: names::WALK_SOUNDS
                .iter()
                .map(|name| assets.sound_or_silent(name))
                .collect(),
            attack_sound: assets.sound_or_silent(names::PLAYER_ATTACK),
            break_sound: assets.sound_or_silent(names::WALL_BREAK),
            last_animation: 0,
            current_animation: 0,
            facing: Facing::Down,
            state: PlayerState::Idle,
            queued_move: None,
            attack_timer: 0.0,
            walk_frame: 0,
            last_walk_step: 0,
            last_regen_frame: 0,
        }
    }

    pub fn queued_move(&self) -> Option<Vec2> {
        self.queued_move
    }

    /// Advance the player by one logical step.
    ///
    /// The map is only borrowed for this call. Breaking a wall and damaging
    /// enemies go through the map's own methods.
    pub fn update(
        &mut self,
        dt: f32,
        current_frame: u32,
        map: &mut MapNode,
        input: &PlayerInput,
        events: &mut EventQueue,
    ) -> PlayerOutcome {
        puffin::profile_function!();

        if !self.entity.is_alive() {
            self.entity.is_moving = false;
            self.entity.is_attacking = false;
            return PlayerOutcome::Dead;
        }
        self.entity.begin_frame();
        self.regenerate(current_frame);

        let mut direction = input.direction;

        if self.state == PlayerState::Attacking {
            if input.wants_move() {
                self.queued_move = Some(input.direction);
            }
            self.attack_timer -= dt;
            if self.attack_timer > 0.0 {
                self.animate(current_frame);
                return PlayerOutcome::Attacking;
            }
            self.state = PlayerState::Idle;
            self.entity.is_attacking = false;
            if let Some(queued) = self.queued_move.take() {
                direction = queued;
            }
        } else if input.attack {
            let outcome = self.start_attack(map, events);
            if outcome != PlayerOutcome::Exhausted {
                if input.wants_move() {
                    self.queued_move = Some(input.direction);
                }
                self.animate(current_frame);
                return outcome;
            }
            // Refused attack: still walk, but report the refusal unless the
            // step itself leaves the level.
            let moved = self.step(dt, direction, map, current_frame, events);
            self.animate(current_frame);
            return match moved {
                PlayerOutcome::Stair | PlayerOutcome::StairUp | PlayerOutcome::Fell => moved,
                _ => PlayerOutcome::Exhausted,
            };
        }

        let outcome = self.step(dt, direction, map, current_frame, events);
        self.animate(current_frame);
        outcome
    }

    /// Stamina ticks back on a fixed cadence, but only while standing still.
    fn regenerate(&mut self, current_frame: u32) {
        if current_frame.wrapping_sub(self.last_regen_frame) < STAMINA_REGEN_INTERVAL_FRAMES {
            return;
        }
        self.last_regen_frame = current_frame;
        if self.state == PlayerState::Idle {
            self.entity.restore_stamina(STAMINA_REGEN_AMOUNT);
        }
    }

    /// World rectangle the current attack covers
    pub fn attack_area(&self) -> Rect {
        let size = self.entity.size;
        let offset = self.facing.vector() * size * PLAYER_ATTACK_REACH;
        self.entity.hitbox().translated(offset)
    }

    /// Cell directly in front of the player
    fn facing_cell(&self, map: &MapNode) -> Option<(usize, usize)> {
        let ahead = self.entity.center() + self.facing.vector() * self.entity.size;
        map.view().cell_of(ahead)
    }

    fn start_attack(&mut self, map: &mut MapNode, events: &mut EventQueue) -> PlayerOutcome {
        if !self.entity.spend_stamina(ATTACK_STAMINA_COST) {
            return PlayerOutcome::Exhausted;
        }
        self.state = PlayerState::Attacking;
        self.attack_timer = PLAYER_ATTACK_DURATION;
        self.entity.is_attacking = true;
        self.entity.is_moving = false;
        events.play(self.attack_sound);

        if let Some((x, y)) = self.facing_cell(map) {
            if map.break_tile(x, y, events) {
                events.play(self.break_sound);
                return PlayerOutcome::BrokeTile { x, y };
            }
        }
        let hits = map.strike(&self.attack_area(), self.entity.damage, events);
        PlayerOutcome::Attacked { hits }
    }

    fn step(
        &mut self,
        dt: f32,
        direction: Vec2,
        map: &MapNode,
        current_frame: u32,
        events: &mut EventQueue,
    ) -> PlayerOutcome {
        let Some(facing) = Facing::from_direction(direction) else {
            self.state = PlayerState::Idle;
            self.entity.is_moving = false;
            return PlayerOutcome::Idle;
        };
        self.facing = facing;
        self.state = PlayerState::Moving;
        self.entity.is_moving = true;

        let delta = direction.clamp_length_max(1.0) * self.entity.speed * dt;
        let view = map.view();
        view.move_entity(&mut self.entity, delta);

        if self.entity.position == self.entity.last_position {
            return PlayerOutcome::Blocked;
        }
        self.play_walk_sound(current_frame, events);

        match view.tile_at(self.entity.center()) {
            Some(tile) if tile.is_stair => PlayerOutcome::Stair,
            Some(tile) if tile.is_stair_up => PlayerOutcome::StairUp,
            Some(tile) if tile.is_hole => PlayerOutcome::Fell,
            _ => PlayerOutcome::Moved,
        }
    }

    /// One footstep per walk-cycle step, and one when a walk starts or
    /// changes direction.
    fn play_walk_sound(&mut self, current_frame: u32, events: &mut EventQueue) {
        let next_animation = self.animation_index();
        let new_walk = next_animation != self.current_animation;
        let cycle_step = current_frame.wrapping_sub(self.last_walk_step) >= PLAYER_FRAME_CADENCE;
        if !(new_walk || cycle_step) || self.walk_sounds.is_empty() {
            return;
        }
        let sound = self.walk_sounds[self.walk_frame as usize % self.walk_sounds.len()];
        events.play(sound);
    }

    fn animation_index(&self) -> u32 {
        self.state.row_block() * PLAYER_ANIMATIONS_PER_STATE + self.facing.index()
    }

    /// Pick the animation row and walk-cycle column from the state computed
    /// this step. Drawing only reads the result.
    fn animate(&mut self, current_frame: u32) {
        self.last_animation = self.current_animation;
        self.current_animation = self.animation_index();

        if self.current_animation != self.last_animation {
            self.walk_frame = 0;
            self.last_walk_step = current_frame;
        } else if self.state == PlayerState::Moving
            && current_frame.wrapping_sub(self.last_walk_step) >= PLAYER_FRAME_CADENCE
        {
            self.walk_frame = (self.walk_frame + 1) % PLAYER_WALK_FRAMES;
            self.last_walk_step = current_frame;
        }
        if self.state == PlayerState::Idle {
            self.walk_frame = 0;
        }

        let size = self.entity.size;
        self.entity.frame_rec = Rect::new(
            self.walk_frame as f32 * size,
            self.current_animation as f32 * size,
            size,
            size,
        );
    }

    pub fn draw(&self) -> DrawCommand {
        DrawCommand {
            layer: Layer::Player,
            texture: self.entity.texture,
            source: self.entity.frame_rec,
            dest: self.entity.hitbox(),
        }
    }

    pub fn update_camera(&self, camera: &mut Camera2D, dt: f32) {
        camera.follow(self.entity.center(), dt);
    }

    /// Place the player on a freshly entered level
    pub fn enter_level(&mut self, spawn: Vec2) {
        self.entity.respawn_at(spawn);
        self.state = PlayerState::Idle;
        self.queued_move = None;
        self.attack_timer = 0.0;
        self.walk_frame = 0;
    }

    pub fn take_fall_damage(&mut self, amount: f32, events: &mut EventQueue) -> DamageOutcome {
        self.entity.take_damage(amount, Actor::Player, events)
    }
}
