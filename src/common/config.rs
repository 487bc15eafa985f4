//! Configuration system for the capture tree processor

use serde::{Deserialize, Serialize};

use crate::common::errors::ConfigError;
use crate::common::types::Encoding;

/// Main processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Traversal limits
    pub limits: LimitsConfig,

    /// Output configuration
    pub output: OutputConfig,
}

impl ProcessorConfig {
    /// Load configuration from file
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        ConfigLoader::load_from_file(path)
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Traversal limit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum capture nesting depth
    pub max_depth: usize,

    /// Maximum nested captures collected by a string capture
    pub max_string_captures: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_string_captures: 10,
        }
    }
}

/// Output generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Encoding used when the caller does not name one
    pub default_encoding: Encoding,

    /// Initial capacity of the reusable output buffer
    pub initial_buffer_capacity: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_encoding: Encoding::Json,
            initial_buffer_capacity: 1024,
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file
    pub fn load_from_file(path: &std::path::Path) -> Result<ProcessorConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            })?;
        let config: ProcessorConfig = toml::from_str(&content)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from standard locations, falling back to defaults
    pub fn load() -> Result<ProcessorConfig, ConfigError> {
        let config_paths = ["./rcap.toml", "./config/rcap.toml"];

        for path in &config_paths {
            let path = std::path::Path::new(path);
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        Ok(ProcessorConfig::default())
    }

    fn validate(config: &ProcessorConfig) -> Result<(), ConfigError> {
        if config.limits.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "limits.max_depth".to_string(),
                value: "0".to_string(),
            });
        }
        if config.limits.max_string_captures == 0 {
            return Err(ConfigError::InvalidValue {
                key: "limits.max_string_captures".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let config = ProcessorConfig::default();
        assert_eq!(config.limits.max_depth, 256);
        assert_eq!(config.limits.max_string_captures, 10);
        assert_eq!(config.output.default_encoding, Encoding::Json);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ProcessorConfig = toml::from_str(
            r#"
            [limits]
            max_depth = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_depth, 64);
        assert_eq!(config.limits.max_string_captures, 10);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let config: ProcessorConfig = toml::from_str(
            r#"
            [limits]
            max_depth = 0
            "#,
        )
        .unwrap();
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn encoding_names_parse() {
        let config: ProcessorConfig = toml::from_str(
            r#"
            [output]
            default_encoding = "byte"
            "#,
        )
        .unwrap();
        assert_eq!(config.output.default_encoding, Encoding::Byte);
    }
}
