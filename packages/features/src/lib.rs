#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature construction for next-inspection risk scoring.
//!
//! Turns the raw inspection log into one leak-free feature row per
//! historical inspection ([`history`]) and then into one snapshot per
//! restaurant ([`snapshot`]). Every stage is a pure transform over its input
//! table.

pub mod history;
pub mod normalize;
pub mod parsing;
pub mod progress;
pub mod snapshot;

use inspect_nyc_inspection_models::{FeatureRow, RawInspectionRecord, Snapshot};

use crate::progress::ProgressCallback;

/// Tables produced by one run of the feature pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTables {
    /// One row per inspection that has a score and prior history.
    pub features: Vec<FeatureRow>,
    /// One row per restaurant with at least one feature row.
    pub snapshots: Vec<Snapshot>,
    /// Raw rows dropped by normalization.
    pub dropped: usize,
}

/// Runs normalization, feature building and snapshot selection.
#[must_use]
pub fn build_tables(raws: &[RawInspectionRecord], progress: &dyn ProgressCallback) -> FeatureTables {
    let normalized = normalize::normalize_records(raws);
    let features = history::build_feature_table(&normalized, progress);
    let snapshots = snapshot::select_snapshots(&features);

    FeatureTables {
        features,
        snapshots,
        dropped: normalized.dropped(),
    }
}
