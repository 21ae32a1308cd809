#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk ranking of restaurant snapshots.
//!
//! [`rank`] filters the snapshot table, scores the survivors with a
//! [`RiskScorer`], and returns the highest-risk restaurants at or above a
//! threshold. The scorer is never called when the filters leave nothing to
//! score.

pub mod export;
pub mod filter;
pub mod options;

use inspect_nyc_inspection_models::{FeatureVector, ScoredSnapshot, Snapshot};
use inspect_nyc_ranker_models::{RankOptions, RankOutcome, RiskFilter, Worklist};
use inspect_nyc_scorer::{RiskScorer, ScorerError};

/// Errors that can occur while ranking.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// Threshold outside `[0, 1]` or a zero limit.
    #[error("Invalid rank options: {message}")]
    InvalidOptions {
        /// Description of what went wrong.
        message: String,
    },

    /// A snapshot reached the scorer with an unusable feature value.
    #[error("Snapshot {entity_id} has a malformed feature {feature}")]
    MalformedFeatures {
        /// Restaurant whose snapshot is malformed.
        entity_id: String,
        /// Name of the offending feature.
        feature: &'static str,
    },

    /// The scorer returned a different number of scores than inputs.
    #[error("Scorer returned {returned} scores for {expected} snapshots")]
    ScoreCountMismatch {
        /// Number of snapshots submitted.
        expected: usize,
        /// Number of scores returned.
        returned: usize,
    },

    /// The scorer returned a value that is not a probability.
    #[error("Scorer returned {risk} for snapshot {entity_id}, expected a probability")]
    InvalidProbability {
        /// Restaurant that received the bad score.
        entity_id: String,
        /// The returned value.
        risk: f64,
    },

    /// The scorer itself failed.
    #[error("Scoring failed: {0}")]
    Scorer(#[from] ScorerError),
}

fn validate_options(options: &RankOptions) -> Result<(), RankError> {
    if !(0.0..=1.0).contains(&options.threshold) {
        return Err(RankError::InvalidOptions {
            message: format!("threshold {} is outside [0, 1]", options.threshold),
        });
    }
    if options.limit == 0 {
        return Err(RankError::InvalidOptions {
            message: "limit must be positive".to_owned(),
        });
    }
    Ok(())
}

/// Filters, scores, sorts and thresholds the snapshot table.
///
/// Restaurants with equal risk keep their snapshot-table order. The
/// returned [`Worklist`] counts every scored restaurant and every
/// restaurant at or above the threshold before truncation to
/// `options.limit`.
///
/// # Errors
///
/// Returns [`RankError`] for invalid options, a malformed snapshot, or a
/// scorer that fails or returns something other than one probability per
/// snapshot.
pub fn rank(
    snapshots: &[Snapshot],
    filter: &RiskFilter,
    options: &RankOptions,
    scorer: &dyn RiskScorer,
) -> Result<RankOutcome, RankError> {
    validate_options(options)?;

    let candidates = filter::apply_filter(filter, snapshots);
    log::debug!(
        "{} of {} snapshots match filter {filter:?}",
        candidates.len(),
        snapshots.len()
    );
    if candidates.is_empty() {
        return Ok(RankOutcome::NoCandidates);
    }

    let vectors = candidates
        .iter()
        .map(|snapshot| {
            let vector = snapshot.feature_vector();
            match vector.first_non_finite() {
                Some(feature) => Err(RankError::MalformedFeatures {
                    entity_id: snapshot.entity_id().to_owned(),
                    feature,
                }),
                None => Ok(vector),
            }
        })
        .collect::<Result<Vec<FeatureVector>, RankError>>()?;

    let risks = scorer.predict_batch(&vectors)?;
    if risks.len() != candidates.len() {
        return Err(RankError::ScoreCountMismatch {
            expected: candidates.len(),
            returned: risks.len(),
        });
    }

    let mut scored = candidates
        .into_iter()
        .zip(risks)
        .map(|(snapshot, risk)| {
            if (0.0..=1.0).contains(&risk) {
                Ok(ScoredSnapshot {
                    snapshot: snapshot.clone(),
                    risk,
                })
            } else {
                Err(RankError::InvalidProbability {
                    entity_id: snapshot.entity_id().to_owned(),
                    risk,
                })
            }
        })
        .collect::<Result<Vec<ScoredSnapshot>, RankError>>()?;

    // Stable: equal risks keep snapshot order.
    scored.sort_by(|a, b| b.risk.total_cmp(&a.risk));

    let total = scored.len();
    let mut passing: Vec<ScoredSnapshot> = scored
        .into_iter()
        .filter(|s| s.risk >= options.threshold)
        .collect();
    let passing_count = passing.len();

    log::info!(
        "Scored {total} restaurants, {passing_count} at or above {}",
        options.threshold
    );

    if passing.is_empty() {
        return Ok(RankOutcome::NoneAboveThreshold { scored: total });
    }

    passing.truncate(options.limit);

    Ok(RankOutcome::Ranked(Worklist {
        scored: total,
        passing: passing_count,
        entries: passing,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;
    use inspect_nyc_inspection_models::{CriticalFlag, FeatureRow, InspectionRecord};

    use super::*;

    /// Scores by looking up the snapshot's `prev_score`, counting calls.
    struct TableScorer {
        risks: BTreeMap<u32, f64>,
        calls: AtomicUsize,
    }

    impl TableScorer {
        fn new(risks: &[(u32, f64)]) -> Self {
            Self {
                risks: risks.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RiskScorer for TableScorer {
        fn predict(&self, features: &FeatureVector) -> Result<f64, ScorerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let key = features.prev_score as u32;
            Ok(self.risks.get(&key).copied().unwrap_or(0.0))
        }
    }

    /// Always returns the same number, valid or not.
    struct ConstantScorer(f64);

    impl RiskScorer for ConstantScorer {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, ScorerError> {
            Ok(self.0)
        }
    }

    /// Drops the last score of every batch.
    struct ShortScorer;

    impl RiskScorer for ShortScorer {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, ScorerError> {
            Ok(0.5)
        }

        fn predict_batch(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, ScorerError> {
            Ok(vec![0.5; batch.len().saturating_sub(1)])
        }
    }

    fn snapshot(id: &str, key: u32, borough: &str) -> Snapshot {
        Snapshot::new(FeatureRow {
            record: InspectionRecord {
                entity_id: id.to_string(),
                entity_name: Some(format!("PLACE {id}")),
                inspection_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                score: Some(f64::from(key)),
                critical_flag: CriticalFlag::NotCritical,
                borough: Some(borough.to_string()),
                cuisine: Some("Pizza".to_string()),
                grade: Some("A".to_string()),
                zip_code: Some("10001".to_string()),
            },
            prev_score: f64::from(key),
            hist_crit_rate_w3: 0.0,
            hist_visits_w3: 1,
            month: 2,
            year: 2024,
        })
    }

    fn options(threshold: f64, limit: usize) -> RankOptions {
        RankOptions { threshold, limit }
    }

    fn ranked_ids(outcome: &RankOutcome) -> Vec<String> {
        outcome
            .worklist()
            .map(|w| {
                w.entries
                    .iter()
                    .map(|e| e.snapshot.entity_id().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn threshold_keeps_only_risky_restaurant() {
        let snapshots = vec![snapshot("low", 1, "Bronx"), snapshot("high", 2, "Bronx")];
        let scorer = TableScorer::new(&[(1, 0.30), (2, 0.40)]);

        let outcome = rank(
            &snapshots,
            &RiskFilter::default(),
            &options(0.35, 10),
            &scorer,
        )
        .unwrap();

        let worklist = outcome.worklist().unwrap();
        assert_eq!(worklist.scored, 2);
        assert_eq!(worklist.passing, 1);
        assert_eq!(ranked_ids(&outcome), vec!["high"]);
        assert!((worklist.entries[0].risk - 0.40).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_filter_result_skips_scorer() {
        let snapshots = vec![snapshot("a", 1, "Bronx"), snapshot("b", 2, "Manhattan")];
        let scorer = TableScorer::new(&[(1, 0.9), (2, 0.9)]);
        let filter = RiskFilter::default().with_borough("Queens");

        let outcome = rank(&snapshots, &filter, &options(0.35, 10), &scorer).unwrap();

        assert_eq!(outcome, RankOutcome::NoCandidates);
        assert_eq!(scorer.calls(), 0);
    }

    #[test]
    fn nothing_above_threshold_is_reported() {
        let snapshots = vec![snapshot("a", 1, "Bronx"), snapshot("b", 2, "Bronx")];
        let scorer = TableScorer::new(&[(1, 0.1), (2, 0.2)]);

        let outcome = rank(
            &snapshots,
            &RiskFilter::default(),
            &options(0.5, 10),
            &scorer,
        )
        .unwrap();

        assert_eq!(outcome, RankOutcome::NoneAboveThreshold { scored: 2 });
        assert_eq!(scorer.calls(), 2);
    }

    #[test]
    fn sorts_descending_and_truncates_after_counting() {
        let snapshots = vec![
            snapshot("a", 1, "Bronx"),
            snapshot("b", 2, "Bronx"),
            snapshot("c", 3, "Bronx"),
            snapshot("d", 4, "Bronx"),
        ];
        let scorer = TableScorer::new(&[(1, 0.5), (2, 0.9), (3, 0.7), (4, 0.1)]);

        let outcome = rank(
            &snapshots,
            &RiskFilter::default(),
            &options(0.4, 2),
            &scorer,
        )
        .unwrap();

        let worklist = outcome.worklist().unwrap();
        assert_eq!(worklist.scored, 4);
        assert_eq!(worklist.passing, 3);
        assert_eq!(ranked_ids(&outcome), vec!["b", "c"]);
    }

    #[test]
    fn equal_risks_keep_snapshot_order() {
        let snapshots = vec![
            snapshot("a", 1, "Bronx"),
            snapshot("b", 2, "Bronx"),
            snapshot("c", 3, "Bronx"),
        ];
        let scorer = TableScorer::new(&[(1, 0.6), (2, 0.8), (3, 0.6)]);

        let outcome = rank(
            &snapshots,
            &RiskFilter::default(),
            &options(0.0, 10),
            &scorer,
        )
        .unwrap();
        assert_eq!(ranked_ids(&outcome), vec!["b", "a", "c"]);
    }

    #[test]
    fn threshold_is_inclusive_and_monotone() {
        let snapshots: Vec<Snapshot> = (1..=5)
            .map(|k| snapshot(&k.to_string(), k, "Bronx"))
            .collect();
        let scorer = TableScorer::new(&[(1, 0.1), (2, 0.3), (3, 0.5), (4, 0.7), (5, 0.9)]);

        let passing: Vec<usize> = [0.0, 0.3, 0.5, 0.8, 1.0]
            .iter()
            .map(|&t| {
                match rank(
                    &snapshots,
                    &RiskFilter::default(),
                    &options(t, 100),
                    &scorer,
                )
                .unwrap()
                {
                    RankOutcome::Ranked(w) => w.passing,
                    RankOutcome::NoneAboveThreshold { .. } | RankOutcome::NoCandidates => 0,
                }
            })
            .collect();

        assert_eq!(passing, vec![5, 4, 3, 1, 0]);
    }

    #[test]
    fn ranking_is_repeatable() {
        let snapshots = vec![
            snapshot("a", 1, "Bronx"),
            snapshot("b", 2, "Queens"),
            snapshot("c", 3, "Bronx"),
        ];
        let scorer = TableScorer::new(&[(1, 0.5), (2, 0.5), (3, 0.9)]);
        let run = || {
            rank(
                &snapshots,
                &RiskFilter::default(),
                &options(0.2, 10),
                &scorer,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn rejects_invalid_options() {
        let snapshots = vec![snapshot("a", 1, "Bronx")];
        let scorer = ConstantScorer(0.5);
        for bad in [options(-0.1, 10), options(1.5, 10), options(f64::NAN, 10), options(0.5, 0)] {
            assert!(matches!(
                rank(&snapshots, &RiskFilter::default(), &bad, &scorer),
                Err(RankError::InvalidOptions { .. })
            ));
        }
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let snapshots = vec![snapshot("a", 1, "Bronx")];
        for bad in [1.2, -0.01, f64::NAN] {
            assert!(matches!(
                rank(
                    &snapshots,
                    &RiskFilter::default(),
                    &options(0.5, 10),
                    &ConstantScorer(bad)
                ),
                Err(RankError::InvalidProbability { .. })
            ));
        }
    }

    #[test]
    fn rejects_short_score_batch() {
        let snapshots = vec![snapshot("a", 1, "Bronx"), snapshot("b", 2, "Bronx")];
        assert!(matches!(
            rank(
                &snapshots,
                &RiskFilter::default(),
                &options(0.5, 10),
                &ShortScorer
            ),
            Err(RankError::ScoreCountMismatch {
                expected: 2,
                returned: 1
            })
        ));
    }

    #[test]
    fn rejects_malformed_snapshot() {
        let mut bad = snapshot("a", 1, "Bronx");
        bad.row.hist_crit_rate_w3 = f64::INFINITY;
        let scorer = TableScorer::new(&[]);
        assert!(matches!(
            rank(
                &[bad],
                &RiskFilter::default(),
                &options(0.5, 10),
                &scorer
            ),
            Err(RankError::MalformedFeatures {
                feature: "hist_crit_rate_w3",
                ..
            })
        ));
        assert_eq!(scorer.calls(), 0);
    }
}
