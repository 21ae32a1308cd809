#![allow(clippy::module_name_repetitions)]
//! Canonical file locations.
//!
//! All defaults are relative to the working directory the tool is started
//! from, matching the layout of a checked-out analysis project:
//! `data_set/`, `model/` and `reports/`.

use std::path::{Path, PathBuf};

/// Default location of the inspection export.
pub const DEFAULT_DATASET_PATH: &str = "data_set/nyc_inspections_reduced.csv";

/// Default location of the fitted model artifact.
pub const DEFAULT_MODEL_PATH: &str = "model/model.json";

/// Default location of the evaluation metrics report.
pub const DEFAULT_METRICS_PATH: &str = "reports/metrics.json";

/// Config file picked up implicitly from the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "inspect_nyc.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "INSPECT_NYC_CONFIG";

/// Returns the default dataset path.
#[must_use]
pub fn dataset_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATASET_PATH)
}

/// Returns the default model path.
#[must_use]
pub fn model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

/// Returns the default metrics path.
#[must_use]
pub fn metrics_path() -> PathBuf {
    PathBuf::from(DEFAULT_METRICS_PATH)
}

/// Returns the paths in `required` that do not exist, in the given order.
#[must_use]
pub fn missing_paths(required: &[&Path]) -> Vec<PathBuf> {
    required
        .iter()
        .filter(|path| !path.exists())
        .map(|path| path.to_path_buf())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_under_project_directories() {
        assert!(dataset_path().starts_with("data_set"));
        assert!(model_path().starts_with("model"));
        assert!(metrics_path().starts_with("reports"));
    }

    #[test]
    fn reports_only_missing_paths() {
        let here = Path::new(env!("CARGO_MANIFEST_DIR"));
        let absent = here.join("definitely-not-here.csv");
        let missing = missing_paths(&[here, absent.as_path()]);
        assert_eq!(missing, vec![absent]);
    }
}
