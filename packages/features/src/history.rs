//! Causal history features.
//!
//! Each restaurant's chronological history is scanned once. The features
//! attached to inspection `k` are computed from inspections `1..k` only:
//! the critical indicator of `k` enters the rolling window *after* its own
//! row has been emitted.

use std::collections::VecDeque;

use chrono::Datelike as _;
use inspect_nyc_inspection_models::{FeatureRow, InspectionRecord};

use crate::normalize::NormalizedRecords;
use crate::progress::ProgressCallback;

/// Number of prior inspections in the critical-rate window.
pub const HISTORY_WINDOW: usize = 3;

/// Critical indicators of the most recent prior inspections, oldest first.
#[derive(Debug, Default)]
struct CriticalWindow {
    flags: VecDeque<bool>,
}

impl CriticalWindow {
    /// Mean indicator over the window, `None` while it is empty.
    fn mean(&self) -> Option<f64> {
        if self.flags.is_empty() {
            return None;
        }
        let critical = self.flags.iter().filter(|&&c| c).count();
        let critical = u32::try_from(critical).ok()?;
        let len = u32::try_from(self.flags.len()).ok()?;
        Some(f64::from(critical) / f64::from(len))
    }

    fn push(&mut self, critical: bool) {
        if self.flags.len() == HISTORY_WINDOW {
            self.flags.pop_front();
        }
        self.flags.push_back(critical);
    }
}

/// Builds the feature rows for a single restaurant.
///
/// `history` must already be sorted chronologically (as produced by
/// [`crate::normalize::normalize_records`]). Rows lacking a score or any
/// prior history are skipped, but their inspection still counts toward
/// the visit count and the critical window of later rows.
#[must_use]
pub fn entity_feature_rows(history: &[InspectionRecord]) -> Vec<FeatureRow> {
    let mut window = CriticalWindow::default();
    let mut visits: u32 = 0;
    let mut rows = Vec::new();

    for record in history {
        let hist_crit_rate_w3 = window.mean();

        if let (Some(prev_score), Some(hist_crit_rate_w3)) = (record.score, hist_crit_rate_w3) {
            rows.push(FeatureRow {
                record: record.clone(),
                prev_score,
                hist_crit_rate_w3,
                hist_visits_w3: visits,
                month: record.inspection_date.month(),
                year: record.inspection_date.year(),
            });
        }

        window.push(record.critical_flag.is_critical());
        visits = visits.saturating_add(1);
    }

    rows
}

/// Builds the feature table for every restaurant.
///
/// Rows are emitted restaurant by restaurant in ascending id order, and
/// chronologically within a restaurant.
#[must_use]
pub fn build_feature_table(
    records: &NormalizedRecords,
    progress: &dyn ProgressCallback,
) -> Vec<FeatureRow> {
    progress.set_total(records.entity_count() as u64);
    progress.set_message(format!(
        "Scanning {} restaurant histories",
        records.entity_count()
    ));

    let mut table = Vec::with_capacity(records.record_count());
    for (_, history) in records.histories() {
        table.extend(entity_feature_rows(history));
        progress.inc(1);
    }

    log::info!(
        "Built {} feature rows from {} inspections",
        table.len(),
        records.record_count()
    );
    progress.finish(format!("{} feature rows", table.len()));

    table
}
