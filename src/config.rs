//! Runtime configuration.
//!
//! Every field has a default from `constants`, so a config file only needs to
//! name what it changes.

use crate::constants::*;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Difficulty selected in the menu. Scales enemy count and damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Difficulty::Easy,
            1 => Difficulty::Normal,
            _ => Difficulty::Hard,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Normal => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    /// Multiplier on the number of enemies placed per level
    pub fn enemy_count_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    /// Multiplier on enemy damage. Results are snapped back to half points.
    pub fn enemy_damage_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tile_size: f32,
    /// Seconds per logical frame
    pub frame_duration: f32,
    /// Longest real elapsed time accepted per tick
    pub max_frame_delta: f32,
    pub map_seed: u64,
    pub map_size: usize,
    pub difficulty: Difficulty,
    pub enemies_per_level: usize,
    pub aggro_radius_tiles: f32,
    pub melee_range_tiles: f32,
    pub enemy_attack_cooldown: f32,
    pub fall_damage: f32,
    pub player_speed: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            frame_duration: LOGICAL_FRAME_DURATION,
            max_frame_delta: MAX_FRAME_DELTA,
            map_seed: 42,
            map_size: DEFAULT_MAP_SIZE,
            difficulty: Difficulty::Normal,
            enemies_per_level: ENEMIES_PER_LEVEL,
            aggro_radius_tiles: ENEMY_AGGRO_RADIUS_TILES,
            melee_range_tiles: ENEMY_MELEE_RANGE_TILES,
            enemy_attack_cooldown: ENEMY_ATTACK_COOLDOWN,
            fall_damage: FALL_DAMAGE,
            player_speed: PLAYER_SPEED,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl GameConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json_str)
    }

    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::Invalid("tile_size must be positive".into()));
        }
        if !(self.frame_duration > 0.0) {
            return Err(ConfigError::Invalid("frame_duration must be positive".into()));
        }
        if self.max_frame_delta < self.frame_duration {
            return Err(ConfigError::Invalid(
                "max_frame_delta must be at least one frame".into(),
            ));
        }
        if self.map_size < MIN_MAP_SIZE || self.map_size > MAX_MAP_SIZE {
            return Err(ConfigError::Invalid(format!(
                "map_size must be within {MIN_MAP_SIZE}..={MAX_MAP_SIZE}"
            )));
        }
        if self.melee_range_tiles <= 0.0 || self.aggro_radius_tiles < self.melee_range_tiles {
            return Err(ConfigError::Invalid(
                "aggro_radius_tiles must cover melee_range_tiles".into(),
            ));
        }
        if self.enemy_attack_cooldown < 0.0 || self.fall_damage < 0.0 {
            return Err(ConfigError::Invalid(
                "cooldowns and damage cannot be negative".into(),
            ));
        }
        Ok(())
    }

    /// Enemy count for one level after the difficulty scale
    pub fn scaled_enemy_count(&self) -> usize {
        (self.enemies_per_level as f32 * self.difficulty.enemy_count_scale()).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "map_seed": 7, "difficulty": "hard" }"#).unwrap();
        assert_eq!(config.map_seed, 7);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.tile_size, TILE_SIZE);
    }

    #[test]
    fn test_rejects_tiny_map() {
        let err = GameConfig::from_json(r#"{ "map_size": 2 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = GameConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_difficulty_scales_enemy_count() {
        let mut config = GameConfig::default();
        config.enemies_per_level = 6;
        config.difficulty = Difficulty::Easy;
        assert_eq!(config.scaled_enemy_count(), 3);
        config.difficulty = Difficulty::Hard;
        assert_eq!(config.scaled_enemy_count(), 9);
    }

    #[test]
    fn test_difficulty_index_roundtrip() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_index(d.index()), d);
        }
    }
}
