//! Evaluation report written by the training job.
//!
//! The report is optional and purely informational. A missing or unreadable
//! file means "no metrics", never a failure.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Key-value metrics from `reports/metrics.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ModelMetrics {
    values: BTreeMap<String, serde_json::Value>,
}

impl ModelMetrics {
    /// Parses a metrics report. Returns `None` if it is not a JSON object.
    #[must_use]
    pub fn from_json_str(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                log::warn!("Ignoring malformed metrics report: {e}");
                None
            }
        }
    }

    /// Looks up a numeric metric.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Area under the ROC curve, if reported.
    #[must_use]
    pub fn roc_auc(&self) -> Option<f64> {
        self.get_f64("roc_auc")
    }

    /// All reported metrics.
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.values
    }
}

/// Loads the metrics report, if present and well-formed.
#[must_use]
pub fn load_metrics(path: &Path) -> Option<ModelMetrics> {
    match std::fs::read_to_string(path) {
        Ok(json) => ModelMetrics::from_json_str(&json),
        Err(e) => {
            log::debug!("No metrics report at {}: {e}", path.display());
            None
        }
    }
}
