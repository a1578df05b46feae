//! Configuration types for recording and playback.

use serde::{Deserialize, Serialize};

use super::Distribution;
use crate::trace::Algorithm;

fn default_size() -> usize {
    50
}

fn default_frame_interval_ms() -> u64 {
    16
}

/// Top-level visualizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Number of array elements.
    #[serde(default = "default_size")]
    pub size: usize,
    /// Initial array distribution.
    #[serde(default)]
    pub distribution: Distribution,
    /// Sort driver used by the CLI.
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Random seed for the generator (None = entropy).
    #[serde(default)]
    pub seed: Option<u64>,
    /// Playback pacing parameters.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Rendering surface dimensions.
    #[serde(default)]
    pub surface: SurfaceConfig,
    /// Fixed frame interval used when no display refresh is available.
    /// Zero replays without pacing.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            distribution: Distribution::default(),
            algorithm: Algorithm::default(),
            seed: None,
            playback: PlaybackConfig::default(),
            surface: SurfaceConfig::default(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// Pacing of the playback engine, in synthetic cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Step cost consumed per tick before yielding to the next frame.
    pub cycles_per_frame: u64,
    /// Ticks a highlighted cell stays highlighted before reverting.
    pub restore_threshold: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            cycles_per_frame: 10,
            restore_threshold: 20,
        }
    }
}

/// Size of the drawing region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

impl VisualizerConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(ConfigError::InvalidSurface);
        }
        self.playback.validate()
    }
}

impl PlaybackConfig {
    /// Validate pacing parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycles_per_frame == 0 {
            return Err(ConfigError::InvalidCycleBudget);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Surface dimensions (width, height) must be non-zero")]
    InvalidSurface,
    #[error("Cycles per frame must be non-zero")]
    InvalidCycleBudget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VisualizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size, 50);
        assert_eq!(config.playback.cycles_per_frame, 10);
        assert_eq!(config.playback.restore_threshold, 20);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: VisualizerConfig =
            serde_json::from_str(r#"{ "size": 8, "distribution": "descending" }"#).unwrap();
        assert_eq!(config.size, 8);
        assert_eq!(config.distribution, Distribution::Descending);
        assert_eq!(config.frame_interval_ms, 16);
        assert_eq!(config.surface, SurfaceConfig::default());
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = VisualizerConfig::default();
        config.surface.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSurface)));

        let mut config = VisualizerConfig::default();
        config.playback.cycles_per_frame = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCycleBudget)
        ));
    }
}
