//! Enemy species and the per-enemy AI tick.
//!
//! Species are data: adding one means adding an `EnemyDef`, not new code.

use crate::assets::{names, AssetCatalog};
use crate::config::Difficulty;
use crate::constants::*;
use crate::entity::{snap_vital, DamageOutcome, Entity, Stats};
use crate::events::{Actor, EventQueue};
use crate::map::TileView;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Skeleton,
    Rat,
    Slime,
}

/// Definition of an enemy type - all the data needed to spawn one
#[derive(Debug, Clone, Copy)]
pub struct EnemyDef {
    pub name: &'static str,
    pub kind: EnemyKind,
    pub texture: &'static str,
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
}

/// Predefined enemy types
pub mod enemies {
    use super::*;

    pub const SKELETON: EnemyDef = EnemyDef {
        name: "Skeleton",
        kind: EnemyKind::Skeleton,
        texture: names::SKELETON,
        health: SKELETON_HEALTH,
        damage: SKELETON_DAMAGE,
        speed: SKELETON_SPEED,
    };

    pub const RAT: EnemyDef = EnemyDef {
        name: "Rat",
        kind: EnemyKind::Rat,
        texture: names::RAT,
        health: RAT_HEALTH,
        damage: RAT_DAMAGE,
        speed: RAT_SPEED,
    };

    pub const SLIME: EnemyDef = EnemyDef {
        name: "Slime",
        kind: EnemyKind::Slime,
        texture: names::SLIME,
        health: SLIME_HEALTH,
        damage: SLIME_DAMAGE,
        speed: SLIME_SPEED,
    };

    /// Spawn table, indexed by the generator
    pub const ALL: [EnemyDef; 3] = [SKELETON, RAT, SLIME];
}

/// AI distances in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiParams {
    pub aggro_radius: f32,
    pub melee_range: f32,
    pub attack_cooldown: f32,
}

impl AiParams {
    pub fn from_tiles(aggro_tiles: f32, melee_tiles: f32, cooldown: f32, tile_size: f32) -> Self {
        Self {
            aggro_radius: aggro_tiles * tile_size,
            melee_range: melee_tiles * tile_size,
            attack_cooldown: cooldown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Idle,
    Chasing,
    Attacking,
}

impl AiState {
    /// Sprite-sheet column for this state
    fn column(&self) -> u32 {
        match self {
            AiState::Idle => 0,
            AiState::Chasing => 1,
            AiState::Attacking => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub entity: Entity,
    /// Sprite-sheet row currently displayed
    pub y_frame: u32,
    pub kind: EnemyKind,
    pub state: AiState,
    /// Seconds until this enemy may strike again
    attack_cooldown: f32,
    last_anim_frame: u32,
}

impl Enemy {
    pub fn spawn(
        def: &EnemyDef,
        position: Vec2,
        tile_size: f32,
        assets: &AssetCatalog,
        difficulty: Difficulty,
    ) -> Self {
        let stats = Stats {
            health: def.health,
            stamina: 0.0,
            mana: 0.0,
            damage: snap_vital(def.damage * difficulty.enemy_damage_scale()).max(VITAL_STEP),
            speed: def.speed,
        };
        let entity = Entity::new(assets.texture_or_placeholder(def.texture), position, tile_size, stats)
            .with_sounds(
                assets.sound_or_silent(names::ENEMY_HURT),
                assets.sound_or_silent(names::ENEMY_DEATH),
            );
        Self {
            entity,
            y_frame: 0,
            kind: def.kind,
            state: AiState::Idle,
            attack_cooldown: 0.0,
            last_anim_frame: 0,
        }
    }

    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Step the sprite row every `ENEMY_FRAME_CADENCE` logical frames.
    /// Driven by the frame number, never by raw elapsed time.
    pub fn advance_animation(&mut self, current_frame: u32) {
        if current_frame.wrapping_sub(self.last_anim_frame) >= ENEMY_FRAME_CADENCE {
            self.y_frame = (self.y_frame + 1) % ENEMY_ANIMATION_ROWS;
            self.last_anim_frame = current_frame;
        }
        let size = self.entity.size;
        self.entity.frame_rec.x = self.state.column() as f32 * size;
        self.entity.frame_rec.y = self.y_frame as f32 * size;
    }

    /// One AI tick: chase the player inside the aggro radius, strike inside
    /// melee range once the cooldown has elapsed.
    ///
    /// Returns the outcome of a strike if one landed this tick.
    pub fn think(
        &mut self,
        dt: f32,
        player: &mut Entity,
        tiles: &TileView<'_>,
        params: &AiParams,
        events: &mut EventQueue,
    ) -> Option<DamageOutcome> {
        self.entity.begin_frame();
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        if !player.is_alive() {
            self.idle();
            return None;
        }

        let to_player = player.center() - self.entity.center();
        let distance = to_player.length();

        if distance <= params.melee_range {
            self.state = AiState::Attacking;
            self.entity.is_moving = false;
            self.entity.is_attacking = true;
            if self.attack_cooldown <= 0.0 {
                self.attack_cooldown = params.attack_cooldown;
                return Some(player.take_damage(self.entity.damage, Actor::Player, events));
            }
            None
        } else if distance <= params.aggro_radius {
            self.state = AiState::Chasing;
            self.entity.is_attacking = false;
            self.entity.is_moving = true;
            let step = to_player.normalize_or_zero() * self.entity.speed * dt;
            // Never overshoot into the player
            let step = step.clamp_length_max((distance - params.melee_range).max(0.0));
            tiles.move_entity(&mut self.entity, step);
            None
        } else {
            self.idle();
            None
        }
    }

    fn idle(&mut self) {
        self.state = AiState::Idle;
        self.entity.is_moving = false;
        self.entity.is_attacking = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_uses_def_stats() {
        let assets = AssetCatalog::with_defaults();
        let enemy = Enemy::spawn(&enemies::SKELETON, Vec2::new(64.0, 64.0), 32.0, &assets, Difficulty::Normal);
        assert_eq!(enemy.entity.health(), SKELETON_HEALTH);
        assert_eq!(enemy.entity.damage, SKELETON_DAMAGE);
        assert_eq!(enemy.entity.position, Vec2::new(64.0, 64.0));
        assert!(enemy.entity.is_alive());
    }

    #[test]
    fn test_easy_damage_never_below_half_point() {
        let assets = AssetCatalog::with_defaults();
        let rat = Enemy::spawn(&enemies::RAT, Vec2::ZERO, 32.0, &assets, Difficulty::Easy);
        assert_eq!(rat.entity.damage, VITAL_STEP);
    }

    #[test]
    fn test_animation_follows_frame_cadence() {
        let assets = AssetCatalog::with_defaults();
        let mut enemy = Enemy::spawn(&enemies::RAT, Vec2::ZERO, 32.0, &assets, Difficulty::Normal);
        enemy.advance_animation(ENEMY_FRAME_CADENCE - 1);
        assert_eq!(enemy.y_frame, 0);
        enemy.advance_animation(ENEMY_FRAME_CADENCE);
        assert_eq!(enemy.y_frame, 1);
        // Same frame again does not advance
        enemy.advance_animation(ENEMY_FRAME_CADENCE);
        assert_eq!(enemy.y_frame, 1);
        assert_eq!(enemy.entity.frame_rec.y, 32.0);
    }
}
