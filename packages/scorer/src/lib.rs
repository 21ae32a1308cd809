#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk scoring interface.
//!
//! The ranking pipeline only depends on the [`RiskScorer`] trait: give it a
//! [`FeatureVector`], get back the probability that the restaurant's next
//! inspection is critical. [`linear::LinearModel`] is the fitted model
//! artifact shipped with the project; [`metrics`] reads the evaluation
//! report produced alongside it.

pub mod linear;
pub mod metrics;

use std::path::PathBuf;

use inspect_nyc_inspection_models::FeatureVector;

/// Errors that can occur while loading or applying a scorer.
#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    /// The model artifact could not be read.
    #[error("Failed to read model {}: {source}", .path.display())]
    Read {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The model artifact is not valid JSON for the expected layout.
    #[error("Model JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The artifact was fitted on a different feature set or order.
    #[error("Model expects features {found:?}, pipeline produces {expected:?}")]
    FeatureMismatch {
        /// Feature names produced by the pipeline.
        expected: Vec<String>,
        /// Feature names declared by the artifact.
        found: Vec<String>,
    },

    /// The artifact is structurally valid but unusable.
    #[error("Invalid model: {message}")]
    InvalidModel {
        /// Description of what went wrong.
        message: String,
    },

    /// A feature vector carried a non-finite numeric value.
    #[error("Feature {feature} is not a finite number")]
    NonFiniteFeature {
        /// Name of the offending feature.
        feature: &'static str,
    },
}

/// A fitted, read-only model producing next-inspection critical
/// probabilities.
pub trait RiskScorer: Send + Sync {
    /// Scores a single feature vector. The result must lie in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError`] if the vector cannot be scored.
    fn predict(&self, features: &FeatureVector) -> Result<f64, ScorerError>;

    /// Scores a batch, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScorerError`] encountered.
    fn predict_batch(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, ScorerError> {
        batch.iter().map(|features| self.predict(features)).collect()
    }
}
