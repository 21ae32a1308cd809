//! Record normalization.
//!
//! Converts raw export rows into [`InspectionRecord`]s, drops rows that
//! cannot be placed on a restaurant's timeline, and groups the survivors
//! into per-restaurant chronological histories.

use std::collections::BTreeMap;

use inspect_nyc_inspection_models::{CriticalFlag, InspectionRecord, RawInspectionRecord};

use crate::parsing::{clean_text, parse_inspection_date, parse_score};

/// Cleaned inspection records partitioned by restaurant.
///
/// Restaurants iterate in ascending `entity_id` order. Each history is
/// sorted ascending by inspection date; records sharing a date keep their
/// input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecords {
    histories: BTreeMap<String, Vec<InspectionRecord>>,
    dropped: usize,
}

impl NormalizedRecords {
    /// Iterates `(entity_id, history)` pairs in ascending id order.
    pub fn histories(&self) -> impl Iterator<Item = (&str, &[InspectionRecord])> {
        self.histories
            .iter()
            .map(|(id, records)| (id.as_str(), records.as_slice()))
    }

    /// Chronological history of one restaurant.
    #[must_use]
    pub fn history(&self, entity_id: &str) -> Option<&[InspectionRecord]> {
        self.histories.get(entity_id).map(Vec::as_slice)
    }

    /// Number of distinct restaurants.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.histories.len()
    }

    /// Number of records kept.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.histories.values().map(Vec::len).sum()
    }

    /// Number of raw rows dropped for a missing id or unparseable date.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Cleans a single raw row.
///
/// Returns `None` when the row has no `CAMIS` or its inspection date does
/// not parse. A bad score is not a reason to drop the row here; it only
/// becomes missing.
#[must_use]
pub fn normalize_record(raw: &RawInspectionRecord) -> Option<InspectionRecord> {
    let entity_id = clean_text(raw.camis.as_deref())?;
    let inspection_date = parse_inspection_date(raw.inspection_date.as_deref()?)?;

    Some(InspectionRecord {
        entity_id,
        entity_name: clean_text(raw.dba.as_deref()),
        inspection_date,
        score: raw.score.as_deref().and_then(parse_score),
        critical_flag: CriticalFlag::from_raw(raw.critical_flag.as_deref()),
        borough: clean_text(raw.boro.as_deref()),
        cuisine: clean_text(raw.cuisine_description.as_deref()),
        grade: clean_text(raw.grade.as_deref()),
        zip_code: clean_text(raw.zipcode.as_deref()),
    })
}

/// Normalizes every raw row and groups the result by restaurant.
pub fn normalize_records<'a, I>(raws: I) -> NormalizedRecords
where
    I: IntoIterator<Item = &'a RawInspectionRecord>,
{
    let mut histories: BTreeMap<String, Vec<InspectionRecord>> = BTreeMap::new();
    let mut dropped = 0_usize;

    for raw in raws {
        match normalize_record(raw) {
            Some(record) => histories
                .entry(record.entity_id.clone())
                .or_default()
                .push(record),
            None => dropped += 1,
        }
    }

    // `sort_by_key` is stable, so same-day inspections keep input order.
    for records in histories.values_mut() {
        records.sort_by_key(|r| r.inspection_date);
    }

    let normalized = NormalizedRecords { histories, dropped };

    if dropped > 0 {
        log::debug!("Dropped {dropped} rows with a missing CAMIS or unparseable inspection date");
    }
    log::info!(
        "Normalized {} inspections across {} restaurants",
        normalized.record_count(),
        normalized.entity_count()
    );

    normalized
}
