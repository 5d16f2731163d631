//! Enemy stats.

// SKELETON
/// Skeleton health
pub const SKELETON_HEALTH: f32 = 3.0;
/// Skeleton attack damage
pub const SKELETON_DAMAGE: f32 = 1.0;
/// Skeleton speed (world units per second)
pub const SKELETON_SPEED: f32 = 48.0;

// RAT
/// Rat health (weak)
pub const RAT_HEALTH: f32 = 1.0;
/// Rat attack damage
pub const RAT_DAMAGE: f32 = 0.5;
/// Rat speed (fast and nimble)
pub const RAT_SPEED: f32 = 80.0;

// SLIME
/// Slime health
pub const SLIME_HEALTH: f32 = 2.0;
/// Slime attack damage
pub const SLIME_DAMAGE: f32 = 0.5;
/// Slime speed (sluggish)
pub const SLIME_SPEED: f32 = 32.0;
