//! Strata Configuration - pipeline constants as operator-tunable TOML values
//!
//! Each struct implements `Default` with the built-in constants, so a missing
//! file or section behaves exactly like the defaults.

use crate::aggregate::{default_weight_map, IndexWeights};
use crate::interpolation::{IdwParams, InterpolationError, InterpolationParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "STRATA_CONFIG";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "strata_config.toml";

/// Root configuration.
///
/// Load with `StrataConfig::load()` which searches:
/// 1. `$STRATA_CONFIG` env var
/// 2. `./strata_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Dataset layout
    #[serde(default)]
    pub data: DataConfig,

    /// Grid construction
    #[serde(default)]
    pub interpolation: InterpolationConfig,

    /// Leave-one-out evaluation
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Composite index
    #[serde(default)]
    pub index: IndexConfig,
}

impl StrataConfig {
    /// Load configuration using the standard search order:
    /// 1. `$STRATA_CONFIG` environment variable
    /// 2. `./strata_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, not rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate the configuration.
    ///
    /// All errors are collected so the operator sees them in one pass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Interpolator tuning derived from the `[interpolation]` section.
    pub fn interpolation_params(&self) -> InterpolationParams {
        InterpolationParams {
            padding_fraction: self.interpolation.padding_fraction,
            idw: IdwParams {
                power: self.interpolation.idw_power,
                min_distance: self.interpolation.idw_min_distance,
            },
        }
    }

    /// Reject a grid size outside the configured range.
    pub fn check_grid_size(&self, grid_size: usize) -> Result<(), InterpolationError> {
        let i = &self.interpolation;
        if (i.min_grid_size..=i.max_grid_size).contains(&grid_size) {
            Ok(())
        } else {
            Err(InterpolationError::InvalidGridSize {
                requested: grid_size,
                min: i.min_grid_size,
                max: i.max_grid_size,
            })
        }
    }

    /// Normalize caller weights, falling back to the configured defaults.
    pub fn index_weights(&self, raw: &BTreeMap<String, f64>) -> IndexWeights {
        IndexWeights::normalized(raw, &self.index.default_weights)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Coordinates table inside the data directory
    #[serde(default = "default_coordinates_file")]
    pub coordinates_file: String,

    /// Extension of borehole files (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_coordinates_file() -> String {
    "zuobiao.csv".to_string()
}
fn default_extension() -> String {
    "csv".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            coordinates_file: default_coordinates_file(),
            extension: default_extension(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationConfig {
    #[serde(default = "default_method")]
    pub default_method: String,

    #[serde(default = "default_grid_size")]
    pub default_grid_size: usize,

    #[serde(default = "default_min_grid_size")]
    pub min_grid_size: usize,

    #[serde(default = "default_max_grid_size")]
    pub max_grid_size: usize,

    /// Fraction of each axis span added on both sides
    #[serde(default = "default_padding_fraction")]
    pub padding_fraction: f64,

    #[serde(default = "default_idw_power")]
    pub idw_power: f64,

    /// Floor applied to distances before weighting
    #[serde(default = "default_idw_min_distance")]
    pub idw_min_distance: f64,
}

fn default_method() -> String { "idw".to_string() }
fn default_grid_size() -> usize { 50 }
fn default_min_grid_size() -> usize { 10 }
fn default_max_grid_size() -> usize { 150 }
fn default_padding_fraction() -> f64 { 0.05 }
fn default_idw_power() -> f64 { 2.0 }
fn default_idw_min_distance() -> f64 { 1e-12 }

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            default_method: default_method(),
            default_grid_size: default_grid_size(),
            min_grid_size: default_min_grid_size(),
            max_grid_size: default_max_grid_size(),
            padding_fraction: default_padding_fraction(),
            idw_power: default_idw_power(),
            idw_min_distance: default_idw_min_distance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Coarse grid used for every leave-one-out fold
    #[serde(default = "default_evaluation_grid_size")]
    pub grid_size: usize,

    /// Methods compared, in tie-break order
    #[serde(default = "default_evaluation_methods")]
    pub methods: Vec<String>,
}

fn default_evaluation_grid_size() -> usize { 10 }
fn default_evaluation_methods() -> Vec<String> {
    vec!["idw".to_string(), "linear".to_string(), "nearest".to_string()]
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            grid_size: default_evaluation_grid_size(),
            methods: default_evaluation_methods(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Property label to weight, used when a request supplies none
    #[serde(default = "default_weight_map")]
    pub default_weights: BTreeMap<String, f64>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_weights: default_weight_map(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = StrataConfig::from_toml_str("[interpolation]\ndefault_grid_size = 80\n").unwrap();
        assert_eq!(config.interpolation.default_grid_size, 80);
        assert_eq!(config.interpolation.max_grid_size, 150);
        assert_eq!(config.data.coordinates_file, "zuobiao.csv");
        assert_eq!(config.evaluation.grid_size, 10);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = StrataConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(StrataConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_validation_errors_are_collected() {
        let err = StrataConfig::from_toml_str("[interpolation]\nidw_power = -1.0\npadding_fraction = -0.1\n")
            .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2, "{errors:?}"),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_grid_size_policy() {
        let config = StrataConfig::default();
        assert!(config.check_grid_size(10).is_ok());
        assert!(config.check_grid_size(150).is_ok());
        assert_eq!(
            config.check_grid_size(151),
            Err(InterpolationError::InvalidGridSize { requested: 151, min: 10, max: 150 })
        );
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let err = StrataConfig::load_from_file(Path::new("/nonexistent/strata.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }
}
