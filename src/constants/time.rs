//! Simulation clock constants.

/// Duration of one logical frame (seconds)
pub const LOGICAL_FRAME_DURATION: f32 = 1.0 / 60.0;
/// Largest real elapsed time fed into the accumulator in one tick.
/// Longer stalls are dropped instead of replayed.
pub const MAX_FRAME_DELTA: f32 = 0.25;
/// Logical frames between reap passes over dead enemies
pub const REAP_INTERVAL_FRAMES: u32 = 120;
