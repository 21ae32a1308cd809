//! Latest-inspection snapshot per restaurant.

use std::collections::BTreeMap;

use inspect_nyc_inspection_models::{FeatureRow, Snapshot};

/// Picks, per restaurant, the feature row with the latest inspection date.
///
/// When several rows share the latest date, the first one in `rows` order
/// wins. For a table produced by [`crate::history::build_feature_table`]
/// that is the earliest input record among those same-day inspections.
/// Output is ordered by ascending `entity_id`; restaurants without feature
/// rows are absent.
#[must_use]
pub fn select_snapshots(rows: &[FeatureRow]) -> Vec<Snapshot> {
    let mut latest: BTreeMap<&str, &FeatureRow> = BTreeMap::new();

    for row in rows {
        latest
            .entry(row.entity_id())
            .and_modify(|current| {
                if row.inspection_date() > current.inspection_date() {
                    *current = row;
                }
            })
            .or_insert(row);
    }

    let snapshots: Vec<Snapshot> = latest
        .into_values()
        .map(|row| Snapshot::new(row.clone()))
        .collect();

    log::info!("Selected {} restaurant snapshots", snapshots.len());

    snapshots
}
