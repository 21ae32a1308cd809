//! Fitted logistic-regression artifact.
//!
//! The training job exports its model as JSON:
//!
//! ```json
//! {
//!   "features": ["prev_score", "hist_crit_rate_w3", "hist_visits_w3", "month", "year",
//!                "cuisine", "borough", "grade", "zip_code"],
//!   "intercept": -1.1,
//!   "numeric": { "prev_score": { "weight": 0.4, "mean": 18.0, "scale": 11.5 } },
//!   "categorical": { "borough": { "levels": { "Bronx": 0.12 }, "missing": 0.0 } }
//! }
//! ```
//!
//! Numeric features are standardized with the stored mean and scale.
//! Categorical features are one-hot: a known level adds its weight, an
//! unseen level adds nothing, and a missing value adds `missing`.

use std::collections::BTreeMap;
use std::path::Path;

use inspect_nyc_inspection_models::FeatureVector;
use serde::{Deserialize, Serialize};

use crate::{RiskScorer, ScorerError};

/// Coefficient and standardization for one numeric feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericTerm {
    /// Coefficient on the standardized value.
    pub weight: f64,
    /// Training mean subtracted before scaling.
    pub mean: f64,
    /// Training standard deviation. Must be finite and non-zero.
    pub scale: f64,
}

/// One-hot coefficients for one categorical feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoricalTerm {
    /// Coefficient per known level. Unknown levels contribute 0.
    pub levels: BTreeMap<String, f64>,
    /// Coefficient applied when the value is missing.
    pub missing: f64,
}

/// A fitted logistic-regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    /// Feature names in the order the model was fitted on.
    pub features: Vec<String>,
    /// Log-odds at the mean of every numeric feature.
    pub intercept: f64,
    /// Terms keyed by numeric feature name.
    pub numeric: BTreeMap<String, NumericTerm>,
    /// Terms keyed by categorical feature name.
    #[serde(default)]
    pub categorical: BTreeMap<String, CategoricalTerm>,
}

impl LinearModel {
    /// Parses and validates a model artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError`] if the JSON is malformed, the declared
    /// feature order differs from [`FeatureVector::FEATURE_NAMES`], or a
    /// coefficient is unusable.
    pub fn from_json_str(json: &str) -> Result<Self, ScorerError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Loads and validates a model artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError`] if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ScorerError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScorerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&json)?;
        log::info!(
            "Loaded model from {} ({} numeric, {} categorical terms)",
            path.display(),
            model.numeric.len(),
            model.categorical.len()
        );
        Ok(model)
    }

    fn validate(&self) -> Result<(), ScorerError> {
        if self
            .features
            .iter()
            .map(String::as_str)
            .ne(FeatureVector::FEATURE_NAMES)
        {
            return Err(ScorerError::FeatureMismatch {
                expected: FeatureVector::FEATURE_NAMES
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                found: self.features.clone(),
            });
        }

        if !self.intercept.is_finite() {
            return Err(invalid("intercept is not finite"));
        }

        for name in FeatureVector::NUMERIC_FEATURES {
            let term = self
                .numeric
                .get(name)
                .ok_or_else(|| invalid(format!("no coefficient for numeric feature {name}")))?;
            if !term.weight.is_finite() || !term.mean.is_finite() {
                return Err(invalid(format!("non-finite coefficient for {name}")));
            }
            if !term.scale.is_finite() || term.scale == 0.0 {
                return Err(invalid(format!("scale for {name} must be finite and non-zero")));
            }
        }
        if let Some(extra) = self
            .numeric
            .keys()
            .find(|k| !FeatureVector::NUMERIC_FEATURES.contains(&k.as_str()))
        {
            return Err(invalid(format!("{extra} is not a numeric feature")));
        }

        for (name, term) in &self.categorical {
            if !FeatureVector::CATEGORICAL_FEATURES.contains(&name.as_str()) {
                return Err(invalid(format!("{name} is not a categorical feature")));
            }
            if !term.missing.is_finite() || term.levels.values().any(|w| !w.is_finite()) {
                return Err(invalid(format!("non-finite coefficient for {name}")));
            }
        }

        Ok(())
    }

    /// Linear predictor (log-odds) for a feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError::NonFiniteFeature`] for a non-finite input.
    pub fn log_odds(&self, features: &FeatureVector) -> Result<f64, ScorerError> {
        let mut z = self.intercept;

        for (name, value) in features.numeric() {
            if !value.is_finite() {
                return Err(ScorerError::NonFiniteFeature { feature: name });
            }
            if let Some(term) = self.numeric.get(name) {
                z += term.weight * (value - term.mean) / term.scale;
            }
        }

        for (name, value) in features.categorical() {
            let Some(term) = self.categorical.get(name) else {
                continue;
            };
            z += match value {
                Some(level) => term.levels.get(level).copied().unwrap_or(0.0),
                None => term.missing,
            };
        }

        Ok(z)
    }
}

impl RiskScorer for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ScorerError> {
        self.log_odds(features).map(logistic)
    }
}

fn invalid(message: impl Into<String>) -> ScorerError {
    ScorerError::InvalidModel {
        message: message.into(),
    }
}

/// Logistic function, split by sign to avoid overflow in `exp`.
fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
