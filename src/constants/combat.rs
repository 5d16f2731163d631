//! Combat and damage constants.

/// Health, stamina and mana move in half-point steps
pub const VITAL_STEP: f32 = 0.5;
/// Damage taken when falling through a hole
pub const FALL_DAMAGE: f32 = 1.0;
/// Stamina spent per player attack
pub const ATTACK_STAMINA_COST: f32 = 1.0;
/// Seconds an attack animation locks out movement
pub const PLAYER_ATTACK_DURATION: f32 = 0.3;
/// Reach of the player's attack hitbox in tiles
pub const PLAYER_ATTACK_REACH: f32 = 0.75;
/// Distance (in tiles, centre to centre) at which enemies start chasing
pub const ENEMY_AGGRO_RADIUS_TILES: f32 = 5.0;
/// Distance (in tiles, centre to centre) at which enemies can strike
pub const ENEMY_MELEE_RANGE_TILES: f32 = 1.1;
/// Seconds between two hits from the same enemy
pub const ENEMY_ATTACK_COOLDOWN: f32 = 1.0;
