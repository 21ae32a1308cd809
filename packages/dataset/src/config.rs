//! TOML configuration.
//!
//! Every key is optional. A config file only needs the values that differ
//! from the defaults:
//!
//! ```toml
//! [paths]
//! dataset = "data_set/nyc_inspections_reduced.csv"
//! model = "model/model.json"
//! metrics = "reports/metrics.json"
//!
//! [rank]
//! threshold = 0.35
//! limit = 200
//! top_cuisines = 30
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::paths;

/// Default minimum risk for the worklist.
pub const DEFAULT_THRESHOLD: f64 = 0.35;

/// Default maximum worklist length.
pub const DEFAULT_LIMIT: usize = 200;

/// Default number of cuisines offered as filter choices.
pub const DEFAULT_TOP_CUISINES: usize = 30;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Input file locations.
    pub paths: PathsConfig,
    /// Worklist defaults.
    pub rank: RankConfig,
}

/// Input file locations, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Inspection export CSV.
    pub dataset: PathBuf,
    /// Fitted model artifact.
    pub model: PathBuf,
    /// Optional metrics report.
    pub metrics: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dataset: paths::dataset_path(),
            model: paths::model_path(),
            metrics: paths::metrics_path(),
        }
    }
}

/// Worklist defaults, overridable per invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    /// Minimum risk for a restaurant to appear on the worklist.
    pub threshold: f64,
    /// Maximum worklist length.
    pub limit: usize,
    /// How many cuisines to offer as filter choices.
    pub top_cuisines: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
            top_cuisines: DEFAULT_TOP_CUISINES,
        }
    }
}

/// Parses a TOML config string.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed or contains
/// unknown keys.
pub fn parse_config_toml(toml_str: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(toml_str)?)
}

/// Loads configuration.
///
/// Resolution order: `explicit` (the `--config` flag), then the file named
/// by `INSPECT_NYC_CONFIG`, then `inspect_nyc.toml` in the working
/// directory. The first two must exist; the implicit file is optional and
/// built-in defaults apply without it.
///
/// # Errors
///
/// Returns [`ConfigError`] if a requested file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(paths::CONFIG_ENV_VAR).ok().map(PathBuf::from));

    if let Some(path) = requested {
        log::debug!("Loading config from {}", path.display());
        return read_config(&path);
    }

    let implicit = Path::new(paths::DEFAULT_CONFIG_PATH);
    if implicit.exists() {
        log::debug!("Loading config from {}", implicit.display());
        return read_config(implicit);
    }

    Ok(AppConfig::default())
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_toml(&contents)
}
