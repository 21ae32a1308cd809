//! Attribute filtering of snapshots.

use inspect_nyc_inspection_models::Snapshot;
use inspect_nyc_ranker_models::RiskFilter;

/// Whether `snapshot` satisfies every active constraint of `filter`.
///
/// A snapshot missing an attribute never satisfies an active constraint on
/// that attribute.
#[must_use]
pub fn matches(filter: &RiskFilter, snapshot: &Snapshot) -> bool {
    if let Some(borough) = &filter.borough
        && snapshot.borough() != Some(borough.as_str())
    {
        return false;
    }
    if !filter.cuisines.is_empty()
        && !snapshot
            .cuisine()
            .is_some_and(|c| filter.cuisines.contains(c))
    {
        return false;
    }
    if !filter.zip_codes.is_empty()
        && !snapshot
            .zip_code()
            .is_some_and(|z| filter.zip_codes.contains(z))
    {
        return false;
    }
    true
}

/// Returns the snapshots matching `filter`, preserving order.
#[must_use]
pub fn apply_filter<'a>(filter: &RiskFilter, snapshots: &'a [Snapshot]) -> Vec<&'a Snapshot> {
    snapshots.iter().filter(|s| matches(filter, s)).collect()
}
