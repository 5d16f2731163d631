//! Core gameplay constants (player stats, world scale).

/// Edge length of one tile in world units
pub const TILE_SIZE: f32 = 32.0;
/// Player's starting (and maximum) health
pub const PLAYER_STARTING_HEALTH: f32 = 5.0;
/// Player's starting (and maximum) stamina
pub const PLAYER_STARTING_STAMINA: f32 = 5.0;
/// Player's starting (and maximum) mana
pub const PLAYER_STARTING_MANA: f32 = 3.0;
/// Player's attack damage
pub const PLAYER_DAMAGE: f32 = 1.0;
/// Player's movement speed (world units per second)
pub const PLAYER_SPEED: f32 = 96.0;
/// Stamina regenerated per regen step
pub const STAMINA_REGEN_AMOUNT: f32 = 0.5;
/// Logical frames between stamina regen steps
pub const STAMINA_REGEN_INTERVAL_FRAMES: u32 = 30;
/// Enemies placed on a level at normal difficulty
pub const ENEMIES_PER_LEVEL: usize = 6;
/// Largest misalignment (in tiles) that a blocked move will slide out of
/// to line up with an open lane
pub const CORNER_ASSIST_TILES: f32 = 0.6;
