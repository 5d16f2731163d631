//! Dungeon generation and tile-code constants.

/// Minimum size of a BSP leaf node
pub const DUNGEON_MIN_LEAF_SIZE: i32 = 8;
/// Minimum room size within a leaf
pub const DUNGEON_MIN_ROOM_SIZE: i32 = 3;
/// Margin around rooms within their leaf
pub const DUNGEON_ROOM_MARGIN: i32 = 1;
/// Smallest square map the generator accepts
pub const MIN_MAP_SIZE: usize = 7;
/// Largest square map the menu allows
pub const MAX_MAP_SIZE: usize = 200;
/// Default map size (cells per side)
pub const DEFAULT_MAP_SIZE: usize = 40;
/// Largest seed the menu allows
pub const MAX_MAP_SEED: u64 = 999_999;
/// Chance that an interior wall is generated cracked (breakable)
pub const BREAKABLE_WALL_CHANCE: f64 = 0.08;
/// Chance that a middle room receives a hole
pub const HOLE_ROOM_CHANCE: f64 = 0.5;
/// Minimum Manhattan distance between the player spawn and any enemy spawn
pub const ENEMY_SPAWN_SAFE_DISTANCE: i32 = 3;
/// Visited levels kept as they were left; further ones are regenerated
pub const LEVEL_CACHE_CAPACITY: usize = 8;
/// Scale applied to cell coordinates before sampling floor-variant noise
pub const FLOOR_NOISE_SCALE: f64 = 0.17;

// Layout matrix codes
/// Outside the dungeon
pub const CODE_VOID: i32 = 0;
/// First floor variant
pub const CODE_FLOOR_MIN: i32 = 1;
/// Last floor variant
pub const CODE_FLOOR_MAX: i32 = 8;
/// Wall seen from the front (floor directly below)
pub const CODE_WALL_FRONT: i32 = 9;
/// Wall seen from the top
pub const CODE_WALL_TOP: i32 = 10;
/// Cracked wall that can be broken by an attack
pub const CODE_WALL_CRACKED: i32 = 11;
/// Stair leading to the next level
pub const CODE_STAIR: i32 = 12;
/// Hole dropping the player to the next level
pub const CODE_HOLE: i32 = 13;
/// Stair leading back up to the previous level
pub const CODE_STAIR_UP: i32 = 14;
/// Number of distinct codes (size of the per-code texture table)
pub const TILE_CODE_COUNT: usize = 15;
