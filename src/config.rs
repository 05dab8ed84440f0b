//! Configuration file support for aura_vision
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./aura.toml` - current directory
//! 3. Default values
//!
//! Only the knobs that shape the runtime are configurable. The classification
//! thresholds themselves (skin windows, kernel taps, zone table) are fixed in
//! [`crate::constants`].
//!
//! # Example Configuration
//!
//! ```toml
//! frame_width = 48
//! frame_height = 103
//! debounce_ms = 400
//! hue_lerp_speed = 0.07
//! frames_per_second = 30
//! ```

use crate::constants::{frame, garment, output, presence};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "aura.toml";

/// Configuration for the AuraPipeline, allowing for tunable behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Width of every analysed frame, in pixels.
    pub frame_width: u32,
    /// Height of every analysed frame, in pixels.
    pub frame_height: u32,
    /// Delay between a zone change and its `ZoneChanged` event.
    pub debounce_ms: u64,
    /// Fraction of the remaining arc the display hue covers per frame.
    pub hue_lerp_speed: f32,
    /// Display hue before anyone is classified, and after they leave.
    pub initial_hue: f32,
    pub presence_on_threshold: f32,
    pub presence_off_threshold: f32,
    /// Weight the presence filter keeps from its previous value.
    pub presence_retention: f32,
    /// Pacing for frame sources that have no clock of their own.
    pub frames_per_second: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_width: frame::DEFAULT_WIDTH,
            frame_height: frame::DEFAULT_HEIGHT,
            debounce_ms: output::ZONE_CHANGE_DEBOUNCE.as_millis() as u64,
            hue_lerp_speed: output::HUE_LERP_SPEED,
            initial_hue: output::INITIAL_HUE,
            presence_on_threshold: presence::ON_THRESHOLD,
            presence_off_threshold: presence::OFF_THRESHOLD,
            presence_retention: presence::RETENTION,
            frames_per_second: 30,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration using the documented search order.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }
        Ok(Self::default())
    }

    /// Rejects values that cannot drive a pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));

        if self.frame_width <= 2 * garment::EDGE_MARGIN || self.frame_height == 0 {
            return invalid(format!(
                "frame must be wider than {} px and non-empty, got {}x{}",
                2 * garment::EDGE_MARGIN,
                self.frame_width,
                self.frame_height
            ));
        }
        if !(self.hue_lerp_speed > 0.0 && self.hue_lerp_speed <= 1.0) {
            return invalid(format!("hue_lerp_speed must be in (0, 1], got {}", self.hue_lerp_speed));
        }
        if !(0.0..1.0).contains(&self.presence_retention) {
            return invalid(format!(
                "presence_retention must be in [0, 1), got {}",
                self.presence_retention
            ));
        }
        if self.presence_off_threshold >= self.presence_on_threshold {
            return invalid(format!(
                "presence_off_threshold ({}) must sit below presence_on_threshold ({})",
                self.presence_off_threshold, self.presence_on_threshold
            ));
        }
        if self.frames_per_second == 0 {
            return invalid("frames_per_second must be positive".to_string());
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frames_per_second.max(1)
    }

    /// Byte length every frame buffer must have.
    pub fn frame_len(&self) -> usize {
        self.frame_width as usize * self.frame_height as usize * frame::CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = PipelineConfig::default();
        assert_eq!((config.frame_width, config.frame_height), (48, 103));
        assert_eq!(config.debounce(), Duration::from_millis(400));
        assert_eq!(config.presence_on_threshold, 0.09);
        assert_eq!(config.presence_off_threshold, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = PipelineConfig::from_toml("debounce_ms = 250\nframes_per_second = 60\n").unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.frames_per_second, 60);
        assert_eq!(config.hue_lerp_speed, 0.07);
    }

    #[test]
    fn collapsed_thresholds_are_rejected() {
        let result = PipelineConfig::from_toml("presence_on_threshold = 0.05\npresence_off_threshold = 0.05\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn frames_narrower_than_the_margins_are_rejected() {
        let result = PipelineConfig::from_toml("frame_width = 8\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = PipelineConfig::from_toml("debounce_ms = \"soon\"\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn load_reads_an_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hue_lerp_speed = 0.2").unwrap();
        let config = PipelineConfig::discover(Some(file.path())).unwrap();
        assert_eq!(config.hue_lerp_speed, 0.2);
    }

    #[test]
    fn missing_explicit_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            PipelineConfig::load(&missing),
            Err(ConfigError::NotFound(path)) if path == missing
        ));
    }
}
