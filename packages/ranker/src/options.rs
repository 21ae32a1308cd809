//! Discovery of filter choices from the snapshot table.

use std::collections::{BTreeMap, BTreeSet};

use inspect_nyc_inspection_models::Snapshot;
use inspect_nyc_ranker_models::{CuisineCount, FilterOptions};

/// Lists the distinct boroughs and the `top_cuisines` most common cuisines
/// among `snapshots`.
///
/// Cuisines are ordered by descending count, then by name. Missing values
/// are not offered as choices.
#[must_use]
pub fn filter_options(snapshots: &[Snapshot], top_cuisines: usize) -> FilterOptions {
    let boroughs: BTreeSet<&str> = snapshots.iter().filter_map(Snapshot::borough).collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for cuisine in snapshots.iter().filter_map(Snapshot::cuisine) {
        *counts.entry(cuisine).or_default() += 1;
    }

    let mut cuisines: Vec<CuisineCount> = counts
        .into_iter()
        .map(|(cuisine, count)| CuisineCount {
            cuisine: cuisine.to_owned(),
            count,
        })
        .collect();
    // Stable: equal counts stay in name order.
    cuisines.sort_by(|a, b| b.count.cmp(&a.count));
    cuisines.truncate(top_cuisines);

    FilterOptions {
        boroughs: boroughs.into_iter().map(str::to_owned).collect(),
        cuisines,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use inspect_nyc_inspection_models::{CriticalFlag, FeatureRow, InspectionRecord};

    use super::*;

    fn snapshot(borough: Option<&str>, cuisine: Option<&str>) -> Snapshot {
        Snapshot::new(FeatureRow {
            record: InspectionRecord {
                entity_id: "1".to_string(),
                entity_name: None,
                inspection_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                score: Some(1.0),
                critical_flag: CriticalFlag::Other,
                borough: borough.map(ToString::to_string),
                cuisine: cuisine.map(ToString::to_string),
                grade: None,
                zip_code: None,
            },
            prev_score: 1.0,
            hist_crit_rate_w3: 0.0,
            hist_visits_w3: 1,
            month: 1,
            year: 2024,
        })
    }

    #[test]
    fn lists_sorted_distinct_boroughs() {
        let snapshots = vec![
            snapshot(Some("Queens"), None),
            snapshot(Some("Bronx"), None),
            snapshot(None, None),
            snapshot(Some("Queens"), None),
        ];
        let options = filter_options(&snapshots, 30);
        assert_eq!(options.boroughs, vec!["Bronx", "Queens"]);
        assert!(options.cuisines.is_empty());
    }

    #[test]
    fn ranks_cuisines_by_count_then_name() {
        let snapshots = vec![
            snapshot(None, Some("Thai")),
            snapshot(None, Some("Pizza")),
            snapshot(None, Some("Thai")),
            snapshot(None, Some("Bakery")),
            snapshot(None, Some("Pizza")),
            snapshot(None, Some("Chinese")),
        ];
        let options = filter_options(&snapshots, 3);
        let names: Vec<&str> = options.cuisines.iter().map(|c| c.cuisine.as_str()).collect();
        assert_eq!(names, vec!["Pizza", "Thai", "Bakery"]);
        assert_eq!(options.cuisines[0].count, 2);
    }
}
