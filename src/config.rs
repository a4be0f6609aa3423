//! Runtime configuration
//!
//! Every field has a default matching the stock scene, so an empty JSON
//! object (or no file at all) gives the standard pond.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fixed ceilings for each particle pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolCapacities {
    pub raindrops: usize,
    pub ripples: usize,
    pub splashes: usize,
    pub lightning: usize,
}

impl Default for PoolCapacities {
    fn default() -> Self {
        Self {
            raindrops: 1000,
            ripples: 500,
            splashes: 300,
            lightning: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PondConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub target_fps: u32,
    pub pools: PoolCapacities,
    /// Weather dwell window in milliseconds
    pub weather_duration_min_ms: u64,
    pub weather_duration_max_ms: u64,
    pub initial_intensity: i32,
    /// Share of raindrops that appear directly on the water
    pub rain_surface_ratio: f32,
    /// Every Nth airborne raindrop update tests for a lotus pad hit
    pub collision_check_rate: u32,
    pub camera_step: f32,
    pub intensity_step: i32,
    pub wind_change_rate: f32,
}

impl Default for PondConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            vsync: true,
            target_fps: 60,
            pools: PoolCapacities::default(),
            weather_duration_min_ms: 10_000,
            weather_duration_max_ms: 30_000,
            initial_intensity: 50,
            rain_surface_ratio: 0.3,
            collision_check_rate: 5,
            camera_step: 100.0,
            intensity_step: 10,
            wind_change_rate: 0.02,
        }
    }
}

impl PondConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Y coordinate of the pond surface
    pub fn water_line(&self) -> f32 {
        (self.height * 2 / 3) as f32
    }

    pub fn frame_budget_ms(&self) -> f64 {
        1000.0 / self.target_fps.max(1) as f64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.weather_duration_min_ms > self.weather_duration_max_ms {
            return Err(ConfigError::Invalid(format!(
                "weather_duration_min_ms ({}) exceeds weather_duration_max_ms ({})",
                self.weather_duration_min_ms, self.weather_duration_max_ms
            )));
        }
        if self.collision_check_rate == 0 {
            return Err(ConfigError::Invalid(
                "collision_check_rate must be at least 1".into(),
            ));
        }
        let p = &self.pools;
        if p.raindrops == 0 || p.ripples == 0 || p.splashes == 0 || p.lightning == 0 {
            return Err(ConfigError::Invalid(format!(
                "pool capacities must be non-zero: {:?}",
                p
            )));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.rain_surface_ratio) {
            return Err(ConfigError::Invalid(format!(
                "rain_surface_ratio must be within [0, 1], got {}",
                self.rain_surface_ratio
            )));
        }
        if !(0..=100).contains(&self.initial_intensity) {
            return Err(ConfigError::Invalid(format!(
                "initial_intensity must be within [0, 100], got {}",
                self.initial_intensity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = PondConfig::from_json("{}").unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.pools, PoolCapacities::default());
        assert_eq!(config.collision_check_rate, 5);
        assert_eq!(config.water_line(), 400.0);
    }

    #[test]
    fn partial_pool_override_keeps_other_capacities() {
        let config = PondConfig::from_json(r#"{"pools": {"lightning": 8}}"#).unwrap();
        assert_eq!(config.pools.lightning, 8);
        assert_eq!(config.pools.raindrops, 1000);
    }

    #[test]
    fn rejects_inverted_dwell_window() {
        let err = PondConfig::from_json(
            r#"{"weather_duration_min_ms": 5000, "weather_duration_max_ms": 1000}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_collision_rate_and_bad_ratio() {
        assert!(PondConfig::from_json(r#"{"collision_check_rate": 0}"#).is_err());
        assert!(PondConfig::from_json(r#"{"rain_surface_ratio": 1.5}"#).is_err());
        assert!(PondConfig::from_json(r#"{"initial_intensity": 101}"#).is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PondConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
