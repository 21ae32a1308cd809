#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Inspection record types shared across the inspect-nyc workspace.
//!
//! Raw rows from the DOHMH inspection export are parsed into
//! [`InspectionRecord`]s, annotated with causal history features as
//! [`FeatureRow`]s, and reduced to one [`Snapshot`] per restaurant for
//! scoring. Each stage produces a new owned table; nothing here is mutated
//! in place once built.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Outcome flag recorded on an inspection row.
///
/// Only [`CriticalFlag::Critical`] counts toward the historical critical
/// rate. Every other value, including a missing flag, is [`Other`] or
/// [`NotCritical`] and counts as zero.
///
/// [`Other`]: CriticalFlag::Other
/// [`NotCritical`]: CriticalFlag::NotCritical
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
pub enum CriticalFlag {
    /// A critical violation was cited.
    #[serde(rename = "Critical")]
    #[strum(serialize = "Critical")]
    Critical,
    /// Violations were cited, none critical.
    #[serde(rename = "Not Critical")]
    #[strum(serialize = "Not Critical")]
    NotCritical,
    /// Anything else (`Not Applicable`, blank, unrecognized text).
    #[serde(rename = "Other")]
    #[strum(serialize = "Other")]
    Other,
}

impl CriticalFlag {
    /// Classifies the raw `CRITICAL FLAG` text. Matching is exact after
    /// trimming; unrecognized or missing values become [`Self::Other`].
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        raw.and_then(|text| text.trim().parse().ok()).unwrap_or(Self::Other)
    }

    /// Whether this inspection counts as "was critical" for history
    /// features.
    #[must_use]
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }
}

/// One row of the inspection export exactly as it appears on disk.
///
/// Every column is optional free-form text; cleaning happens in the
/// normalizer. Columns not listed here are ignored when reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInspectionRecord {
    /// Restaurant identifier.
    #[serde(rename = "CAMIS", default)]
    pub camis: Option<String>,
    /// "Doing business as" display name.
    #[serde(rename = "DBA", default)]
    pub dba: Option<String>,
    /// Borough name.
    #[serde(rename = "BORO", default)]
    pub boro: Option<String>,
    /// Cuisine description.
    #[serde(rename = "CUISINE DESCRIPTION", default)]
    pub cuisine_description: Option<String>,
    /// Inspection date, usually `MM/DD/YYYY`.
    #[serde(rename = "INSPECTION DATE", default)]
    pub inspection_date: Option<String>,
    /// Inspection score (lower is better).
    #[serde(rename = "SCORE", default)]
    pub score: Option<String>,
    /// `Critical`, `Not Critical`, or `Not Applicable`.
    #[serde(rename = "CRITICAL FLAG", default)]
    pub critical_flag: Option<String>,
    /// Letter grade, if one was issued.
    #[serde(rename = "GRADE", default)]
    pub grade: Option<String>,
    /// ZIP code.
    #[serde(rename = "ZIPCODE", default)]
    pub zipcode: Option<String>,
}

/// A cleaned inspection observation.
///
/// Guaranteed to carry a non-empty `entity_id` and a parsed
/// `inspection_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    /// Stable restaurant identifier (`CAMIS`).
    pub entity_id: String,
    /// Display name (`DBA`).
    pub entity_name: Option<String>,
    /// Calendar date of the inspection.
    pub inspection_date: NaiveDate,
    /// Numeric score. `None` when missing or not a finite number.
    pub score: Option<f64>,
    /// Critical-violation outcome.
    pub critical_flag: CriticalFlag,
    /// Borough name.
    pub borough: Option<String>,
    /// Cuisine description.
    pub cuisine: Option<String>,
    /// Letter grade.
    pub grade: Option<String>,
    /// ZIP code, kept as text.
    pub zip_code: Option<String>,
}

/// An [`InspectionRecord`] annotated with history features computed from
/// strictly earlier records of the same restaurant.
///
/// Gated features are plain values: a row only exists once all of them are
/// defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRow {
    /// The underlying inspection.
    pub record: InspectionRecord,
    /// This inspection's own score.
    pub prev_score: f64,
    /// Mean critical indicator over up to three prior inspections.
    pub hist_crit_rate_w3: f64,
    /// Zero-based count of prior inspections. Unbounded despite the name.
    pub hist_visits_w3: u32,
    /// Calendar month (1-12) of the inspection.
    pub month: u32,
    /// Calendar year of the inspection.
    pub year: i32,
}

impl FeatureRow {
    /// The restaurant this row belongs to.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.record.entity_id
    }

    /// Date of the inspection this row describes.
    #[must_use]
    pub const fn inspection_date(&self) -> NaiveDate {
        self.record.inspection_date
    }

    /// Builds the scorer input for this row.
    #[must_use]
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector {
            prev_score: self.prev_score,
            hist_crit_rate_w3: self.hist_crit_rate_w3,
            hist_visits_w3: f64::from(self.hist_visits_w3),
            month: f64::from(self.month),
            year: f64::from(self.year),
            cuisine: self.record.cuisine.clone(),
            borough: self.record.borough.clone(),
            grade: self.record.grade.clone(),
            zip_code: self.record.zip_code.clone(),
        }
    }
}

/// The most recent [`FeatureRow`] of a restaurant, used as the basis for
/// predicting its next inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// The selected row.
    pub row: FeatureRow,
}

impl Snapshot {
    /// Wraps the selected row.
    #[must_use]
    pub const fn new(row: FeatureRow) -> Self {
        Self { row }
    }

    /// The restaurant this snapshot describes.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        self.row.entity_id()
    }

    /// The restaurant's display name.
    #[must_use]
    pub fn entity_name(&self) -> Option<&str> {
        self.row.record.entity_name.as_deref()
    }

    /// Date of the most recent inspection.
    #[must_use]
    pub const fn last_inspection(&self) -> NaiveDate {
        self.row.inspection_date()
    }

    /// Borough name.
    #[must_use]
    pub fn borough(&self) -> Option<&str> {
        self.row.record.borough.as_deref()
    }

    /// Cuisine description.
    #[must_use]
    pub fn cuisine(&self) -> Option<&str> {
        self.row.record.cuisine.as_deref()
    }

    /// ZIP code.
    #[must_use]
    pub fn zip_code(&self) -> Option<&str> {
        self.row.record.zip_code.as_deref()
    }

    /// Scorer input for this snapshot.
    #[must_use]
    pub fn feature_vector(&self) -> FeatureVector {
        self.row.feature_vector()
    }
}

/// A [`Snapshot`] with the probability that its next inspection is
/// critical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSnapshot {
    /// The scored snapshot.
    pub snapshot: Snapshot,
    /// Probability in `[0, 1]`.
    pub risk: f64,
}

/// The exact feature set handed to the scorer, in the agreed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Score of the snapshot inspection itself.
    pub prev_score: f64,
    /// Share of the last three prior inspections that were critical.
    pub hist_crit_rate_w3: f64,
    /// Number of prior inspections, unbounded.
    pub hist_visits_w3: f64,
    /// Calendar month of the inspection, 1 to 12.
    pub month: f64,
    /// Calendar year of the inspection.
    pub year: f64,
    /// `CUISINE DESCRIPTION` text.
    pub cuisine: Option<String>,
    /// Borough name.
    pub borough: Option<String>,
    /// Letter grade, if one was issued.
    pub grade: Option<String>,
    /// ZIP code.
    pub zip_code: Option<String>,
}

impl FeatureVector {
    /// Feature names in encoding order. Numeric features first, then
    /// categorical.
    pub const FEATURE_NAMES: [&'static str; 9] = [
        "prev_score",
        "hist_crit_rate_w3",
        "hist_visits_w3",
        "month",
        "year",
        "cuisine",
        "borough",
        "grade",
        "zip_code",
    ];

    /// Names of the numeric features.
    pub const NUMERIC_FEATURES: [&'static str; 5] = [
        "prev_score",
        "hist_crit_rate_w3",
        "hist_visits_w3",
        "month",
        "year",
    ];

    /// Names of the categorical features.
    pub const CATEGORICAL_FEATURES: [&'static str; 4] = ["cuisine", "borough", "grade", "zip_code"];

    /// Numeric values paired with their names, in encoding order.
    #[must_use]
    pub const fn numeric(&self) -> [(&'static str, f64); 5] {
        [
            ("prev_score", self.prev_score),
            ("hist_crit_rate_w3", self.hist_crit_rate_w3),
            ("hist_visits_w3", self.hist_visits_w3),
            ("month", self.month),
            ("year", self.year),
        ]
    }

    /// Categorical values paired with their names, in encoding order.
    #[must_use]
    pub fn categorical(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("cuisine", self.cuisine.as_deref()),
            ("borough", self.borough.as_deref()),
            ("grade", self.grade.as_deref()),
            ("zip_code", self.zip_code.as_deref()),
        ]
    }

    /// Returns the name of the first numeric feature that is not finite,
    /// if any.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.numeric()
            .into_iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FeatureRow {
        FeatureRow {
            record: InspectionRecord {
                entity_id: "41000001".to_string(),
                entity_name: Some("CORNER DELI".to_string()),
                inspection_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                score: Some(12.0),
                critical_flag: CriticalFlag::NotCritical,
                borough: Some("Queens".to_string()),
                cuisine: Some("Pizza".to_string()),
                grade: None,
                zip_code: Some("11101".to_string()),
            },
            prev_score: 12.0,
            hist_crit_rate_w3: 0.5,
            hist_visits_w3: 2,
            month: 3,
            year: 2024,
        }
    }

    #[test]
    fn classifies_critical_flags() {
        assert_eq!(CriticalFlag::from_raw(Some("Critical")), CriticalFlag::Critical);
        assert_eq!(
            CriticalFlag::from_raw(Some(" Not Critical ")),
            CriticalFlag::NotCritical
        );
        assert_eq!(
            CriticalFlag::from_raw(Some("Not Applicable")),
            CriticalFlag::Other
        );
        assert_eq!(CriticalFlag::from_raw(Some("critical")), CriticalFlag::Other);
        assert_eq!(CriticalFlag::from_raw(None), CriticalFlag::Other);
        assert_eq!(CriticalFlag::from_raw(Some("   ")), CriticalFlag::Other);
    }

    #[test]
    fn flag_text_round_trips_through_display() {
        for flag in [
            CriticalFlag::Critical,
            CriticalFlag::NotCritical,
            CriticalFlag::Other,
        ] {
            assert_eq!(CriticalFlag::from_raw(Some(&flag.to_string())), flag);
        }
        assert_eq!(CriticalFlag::NotCritical.to_string(), "Not Critical");
    }

    #[test]
    fn only_critical_counts_as_critical() {
        assert!(CriticalFlag::Critical.is_critical());
        assert!(!CriticalFlag::NotCritical.is_critical());
        assert!(!CriticalFlag::Other.is_critical());
    }

    #[test]
    fn feature_name_groups_match_full_order() {
        let joined: Vec<&str> = FeatureVector::NUMERIC_FEATURES
            .iter()
            .chain(FeatureVector::CATEGORICAL_FEATURES.iter())
            .copied()
            .collect();
        assert_eq!(joined, FeatureVector::FEATURE_NAMES);
    }

    #[test]
    fn feature_vector_carries_row_values() {
        let vector = row().feature_vector();
        assert!((vector.hist_visits_w3 - 2.0).abs() < f64::EPSILON);
        assert!((vector.year - 2024.0).abs() < f64::EPSILON);
        assert_eq!(vector.borough.as_deref(), Some("Queens"));
        assert_eq!(vector.grade, None);
        let names: Vec<&str> = vector.numeric().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, FeatureVector::NUMERIC_FEATURES);
        assert_eq!(vector.first_non_finite(), None);
    }

    #[test]
    fn detects_non_finite_features() {
        let mut vector = row().feature_vector();
        vector.hist_crit_rate_w3 = f64::NAN;
        assert_eq!(vector.first_non_finite(), Some("hist_crit_rate_w3"));
    }

    #[test]
    fn raw_record_uses_export_column_names() {
        let raw: RawInspectionRecord = serde_json::from_value(serde_json::json!({
            "CAMIS": "41000001",
            "INSPECTION DATE": "03/09/2024",
            "CRITICAL FLAG": "Critical",
        }))
        .unwrap();
        assert_eq!(raw.camis.as_deref(), Some("41000001"));
        assert_eq!(raw.inspection_date.as_deref(), Some("03/09/2024"));
        assert_eq!(raw.critical_flag.as_deref(), Some("Critical"));
        assert_eq!(raw.score, None);
    }

    #[test]
    fn snapshot_exposes_display_fields() {
        let snapshot = Snapshot::new(row());
        assert_eq!(snapshot.entity_id(), "41000001");
        assert_eq!(snapshot.entity_name(), Some("CORNER DELI"));
        assert_eq!(snapshot.borough(), Some("Queens"));
        assert_eq!(snapshot.zip_code(), Some("11101"));
        assert_eq!(
            snapshot.last_inspection(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
        );
    }
}
