//! Application configuration.
//!
//! Everything here is fixed once the loop starts. Values can be set through
//! [`App`](crate::App) setters or loaded from a JSON file; missing fields
//! take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Fixed sub-step length in seconds.
pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 60.0;
/// Upper bound on sub-steps per iteration.
pub const DEFAULT_MAX_SUB_STEPS: u32 = 4;
/// Pacing target in frames per second.
pub const DEFAULT_TARGET_FRAME_RATE: f64 = 60.0;

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Loop timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Largest `dt` handed to a single `update`.
    pub fixed_step: f64,
    /// Sub-steps per iteration; time beyond `fixed_step * max_sub_steps` is dropped.
    pub max_sub_steps: u32,
    /// Iterations per second the loop sleeps towards. Never exceeded.
    pub target_frame_rate: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            max_sub_steps: DEFAULT_MAX_SUB_STEPS,
            target_frame_rate: DEFAULT_TARGET_FRAME_RATE,
        }
    }
}

impl TimingConfig {
    /// Wall-clock budget of one iteration, in seconds.
    #[must_use]
    pub fn target_frame_period(&self) -> f64 {
        1.0 / self.target_frame_rate
    }

    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a non-positive or non-finite step or
    /// frame rate, or zero sub-steps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_step.is_finite() && self.fixed_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_step must be positive and finite, got {}",
                self.fixed_step
            )));
        }
        if self.max_sub_steps == 0 {
            return Err(ConfigError::Invalid("max_sub_steps must be at least 1".into()));
        }
        if !(self.target_frame_rate.is_finite() && self.target_frame_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "target_frame_rate must be positive and finite, got {}",
                self.target_frame_rate
            )));
        }
        Ok(())
    }
}

/// Window and loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Screen pixels per canvas pixel, in both axes.
    pub pixel_scale: u32,
    /// Window title. May be any string, empty included.
    pub title: String,
    /// Log the frame rate once per second.
    pub show_fps: bool,
    pub timing: TimingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 600,
            pixel_scale: 1,
            title: String::new(),
            show_fps: false,
            timing: TimingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON, [`ConfigError::Invalid`]
    /// if the values fail [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the pixel scale is zero, the viewport is
    /// smaller than one canvas pixel, or the timing is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixel_scale == 0 {
            return Err(ConfigError::Invalid("pixel_scale must be at least 1".into()));
        }
        if self.viewport_width < self.pixel_scale || self.viewport_height < self.pixel_scale {
            return Err(ConfigError::Invalid(format!(
                "viewport {}x{} is smaller than pixel_scale {}",
                self.viewport_width, self.viewport_height, self.pixel_scale
            )));
        }
        self.timing.validate()
    }

    /// Canvas size: the viewport divided by the pixel scale.
    #[must_use]
    pub fn render_size(&self) -> (u32, u32) {
        let scale = self.pixel_scale.max(1);
        (self.viewport_width / scale, self.viewport_height / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!((config.viewport_width, config.viewport_height), (800, 600));
        assert_eq!(config.pixel_scale, 1);
        assert!(!config.show_fps);
        assert_eq!(config.timing.max_sub_steps, 4);
        assert_eq!(config.timing.fixed_step, 1.0 / 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            AppConfig::from_json_str(r#"{ "pixel_scale": 4, "timing": { "max_sub_steps": 2 } }"#)
                .unwrap();
        assert_eq!(config.pixel_scale, 4);
        assert_eq!(config.viewport_width, 800);
        assert_eq!(config.timing.max_sub_steps, 2);
        assert_eq!(config.timing.target_frame_rate, 60.0);
        assert_eq!(config.render_size(), (200, 150));
    }

    #[test]
    fn test_render_size_truncates() {
        let config = AppConfig {
            viewport_width: 801,
            viewport_height: 599,
            pixel_scale: 2,
            ..AppConfig::default()
        };
        assert_eq!(config.render_size(), (400, 299));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            AppConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values() {
        for json in [
            r#"{ "pixel_scale": 0 }"#,
            r#"{ "viewport_width": 3, "pixel_scale": 4 }"#,
            r#"{ "timing": { "fixed_step": 0.0 } }"#,
            r#"{ "timing": { "fixed_step": -1.0 } }"#,
            r#"{ "timing": { "max_sub_steps": 0 } }"#,
            r#"{ "timing": { "target_frame_rate": 0.0 } }"#,
        ] {
            assert!(
                matches!(AppConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_json_file("/nonexistent/app.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_serialize_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("engine_app_config_{}.json", std::process::id()));
        let config = AppConfig {
            title: "demo".into(),
            show_fps: true,
            ..AppConfig::default()
        };
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        let loaded = AppConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
