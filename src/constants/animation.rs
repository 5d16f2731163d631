//! Animation-related constants.

/// Logical frames between player walk-cycle steps
pub const PLAYER_FRAME_CADENCE: u32 = 8;
/// Columns in the player's walk cycle
pub const PLAYER_WALK_FRAMES: u32 = 4;
/// Logical frames between enemy sprite-row advances
pub const ENEMY_FRAME_CADENCE: u32 = 10;
/// Rows in an enemy sprite strip
pub const ENEMY_ANIMATION_ROWS: u32 = 4;
/// Animation rows per player state (idle, walk, attack), four facings each
pub const PLAYER_ANIMATIONS_PER_STATE: u32 = 4;
