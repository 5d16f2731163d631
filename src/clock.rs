//! Fixed-timestep simulation clock.
//!
//! Real elapsed time is poured into an accumulator; the logical frame number
//! only advances when a whole frame's worth has built up. The simulation runs
//! once per logical frame, so its result does not depend on the render rate.

use crate::constants::*;

// =============================================================================
// GAME VARIABLES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct GameVariables {
    /// Logical frames simulated so far
    pub current_frame: u32,
    /// Calls to `update` since start (render frames)
    pub frame_counter: u64,
    /// Real seconds passed to the most recent `update`
    pub delta_time: f32,
    accumulator: f32,
    frame_duration: f32,
    max_delta: f32,
}

impl GameVariables {
    pub fn new(frame_duration: f32, max_delta: f32) -> Self {
        Self {
            current_frame: 0,
            frame_counter: 0,
            delta_time: 0.0,
            accumulator: 0.0,
            frame_duration,
            max_delta,
        }
    }

    pub fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    /// Leftover time not yet consumed by a logical frame
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// How far between two logical frames we are, in `[0, 1)`
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.frame_duration
    }

    /// Advance the clock by `real_dt` seconds.
    ///
    /// Returns how many logical frames elapsed. Negative or NaN input counts
    /// as zero and a stall longer than `max_delta` is truncated.
    pub fn update(&mut self, real_dt: f32) -> u32 {
        self.frame_counter += 1;
        self.delta_time = if real_dt > 0.0 { real_dt } else { 0.0 };
        self.accumulator += self.delta_time.min(self.max_delta);

        let mut steps = 0;
        while self.accumulator >= self.frame_duration {
            self.accumulator -= self.frame_duration;
            self.current_frame = self.current_frame.wrapping_add(1);
            steps += 1;
        }
        steps
    }
}

impl Default for GameVariables {
    fn default() -> Self {
        Self::new(LOGICAL_FRAME_DURATION, MAX_FRAME_DELTA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_threshold_advances_one_frame() {
        let mut clock = GameVariables::new(0.5, 1.0);
        assert_eq!(clock.update(0.5), 1);
        assert_eq!(clock.current_frame, 1);
        assert_eq!(clock.accumulator(), 0.0);
    }

    #[test]
    fn test_accumulates_across_calls() {
        let mut clock = GameVariables::new(0.5, 1.0);
        assert_eq!(clock.update(0.25), 0);
        assert_eq!(clock.current_frame, 0);
        assert_eq!(clock.update(0.25), 1);
        assert_eq!(clock.current_frame, 1);
        assert_eq!(clock.frame_counter, 2);
        assert_eq!(clock.delta_time, 0.25);
    }

    #[test]
    fn test_frame_counter_always_increments() {
        let mut clock = GameVariables::default();
        for _ in 0..5 {
            clock.update(0.0);
        }
        assert_eq!(clock.frame_counter, 5);
        assert_eq!(clock.current_frame, 0);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut clock = GameVariables::new(0.25, 1.0);
        assert_eq!(clock.update(10.0), 4);
        assert_eq!(clock.delta_time, 10.0);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut clock = GameVariables::new(0.5, 1.0);
        assert_eq!(clock.update(-3.0), 0);
        assert_eq!(clock.accumulator(), 0.0);
        assert_eq!(clock.update(f32::NAN), 0);
        assert_eq!(clock.accumulator(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_accumulator_stays_below_frame(dts in prop::collection::vec(0.0f32..0.1, 1..200)) {
            let mut clock = GameVariables::default();
            let mut total = 0u32;
            for dt in dts {
                total += clock.update(dt);
                prop_assert!(clock.accumulator() < clock.frame_duration());
                prop_assert!(clock.accumulator() >= 0.0);
            }
            prop_assert_eq!(total, clock.current_frame);
        }
    }
}
