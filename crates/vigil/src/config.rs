//! # Plugin Configuration
//!
//! One TOML file, loaded once at enable time. Everything is optional; an
//! empty file yields the production defaults. Example:
//!
//! ```toml
//! rng_seed = 12648430
//!
//! [detection.kill_aura]
//! threshold = 12
//! clamp_decay_at_zero = false
//!
//! [detection.fly]
//! threshold_android = 24
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use vigil_core::{ConfigError, DetectionConfig};

/// Errors raised while loading the plugin configuration.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML (or has unknown shape).
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The parsed values fail cross-field validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Top-level plugin configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Seed for the decoy-visibility RNG; omit for a per-process random one.
    pub rng_seed: Option<u64>,
    /// Capacity of the host-event intake queue.
    pub event_queue_capacity: usize,
    /// Detection tuning tables.
    pub detection: DetectionConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            event_queue_capacity: 1024,
            detection: DetectionConfig::default(),
        }
    }
}

impl PluginConfig {
    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// [`PluginError`] on unreadable file, bad TOML or invalid values.
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parses and validates config text.
    ///
    /// # Errors
    ///
    /// [`PluginError`] on bad TOML or invalid values.
    pub fn from_toml(text: &str) -> Result<Self, PluginError> {
        let config: Self = toml::from_str(text)?;
        config.detection.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_defaults() {
        let config = PluginConfig::from_toml("").unwrap();
        assert_eq!(config.detection.kill_aura.threshold, 12);
        assert_eq!(config.event_queue_capacity, 1024);
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = PluginConfig::from_toml(
            r#"
            rng_seed = 42

            [detection.fly]
            threshold_android = 30

            [detection.kill_aura]
            clamp_decay_at_zero = true
            "#,
        )
        .unwrap();
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.detection.fly.threshold_android, 30);
        assert!(config.detection.kill_aura.clamp_decay_at_zero);
        // Untouched sections keep their defaults.
        assert_eq!(config.detection.reach.threshold, 14);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = PluginConfig::from_toml(
            r#"
            [detection.decoy]
            high_reveal_percent = 150
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(PluginConfig::from_toml("[detection").is_err());
    }
}
