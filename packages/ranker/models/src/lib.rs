#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ranking inputs and results.
//!
//! A [`RiskFilter`] narrows the snapshot table, [`RankOptions`] control the
//! cut-off and length of the worklist, and [`RankOutcome`] reports either a
//! ranked [`Worklist`] or one of the two "nothing to show" states.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use inspect_nyc_inspection_models::ScoredSnapshot;
use serde::{Deserialize, Serialize};

/// Value of the borough selector meaning "no borough constraint".
pub const ALL_BOROUGHS: &str = "All";

/// Attribute filters applied conjunctively before scoring.
///
/// An absent borough or an empty set means "no constraint" on that
/// attribute, never "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFilter {
    /// Exact borough name.
    pub borough: Option<String>,
    /// Accepted cuisine descriptions.
    pub cuisines: BTreeSet<String>,
    /// Accepted ZIP codes.
    pub zip_codes: BTreeSet<String>,
}

impl RiskFilter {
    /// Restricts to one borough. [`ALL_BOROUGHS`] or a blank value clears
    /// the constraint.
    #[must_use]
    pub fn with_borough(mut self, borough: &str) -> Self {
        let borough = borough.trim();
        self.borough = if borough.is_empty() || borough == ALL_BOROUGHS {
            None
        } else {
            Some(borough.to_owned())
        };
        self
    }

    /// Adds accepted cuisines.
    #[must_use]
    pub fn with_cuisines<I, S>(mut self, cuisines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cuisines.extend(
            cuisines
                .into_iter()
                .map(|c| c.as_ref().trim().to_owned())
                .filter(|c| !c.is_empty()),
        );
        self
    }

    /// Adds accepted ZIP codes from comma-separated text, e.g.
    /// `"10001, 10002"`.
    #[must_use]
    pub fn with_zip_list(mut self, zips: &str) -> Self {
        self.zip_codes.extend(parse_zip_list(zips));
        self
    }

    /// Whether no constraint is active.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.borough.is_none() && self.cuisines.is_empty() && self.zip_codes.is_empty()
    }
}

/// Splits comma-separated ZIP text into trimmed, non-empty codes.
#[must_use]
pub fn parse_zip_list(zips: &str) -> BTreeSet<String> {
    zips.split(',')
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Worklist cut-off and length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankOptions {
    /// Minimum risk, inclusive, in `[0, 1]`.
    pub threshold: f64,
    /// Maximum number of worklist entries. Must be positive.
    pub limit: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            threshold: 0.35,
            limit: 200,
        }
    }
}

/// Ranked restaurants plus headline counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worklist {
    /// Restaurants that were scored (after filtering).
    pub scored: usize,
    /// Restaurants at or above the threshold, before truncation.
    pub passing: usize,
    /// The first `limit` passing restaurants, highest risk first.
    pub entries: Vec<ScoredSnapshot>,
}

/// Result of a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RankOutcome {
    /// The filters matched no restaurant; nothing was scored.
    NoCandidates,
    /// Restaurants were scored but none reached the threshold.
    NoneAboveThreshold {
        /// Number of restaurants scored.
        scored: usize,
    },
    /// A non-empty worklist.
    Ranked(Worklist),
}

impl RankOutcome {
    /// Number of restaurants the scorer was run on.
    #[must_use]
    pub const fn scored(&self) -> usize {
        match self {
            Self::NoCandidates => 0,
            Self::NoneAboveThreshold { scored } => *scored,
            Self::Ranked(worklist) => worklist.scored,
        }
    }

    /// The worklist, if any restaurant passed the threshold.
    #[must_use]
    pub const fn worklist(&self) -> Option<&Worklist> {
        match self {
            Self::Ranked(worklist) => Some(worklist),
            Self::NoCandidates | Self::NoneAboveThreshold { .. } => None,
        }
    }
}

/// One worklist row as presented and exported.
///
/// Risk is rounded to three decimals here; the ranker itself never rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorklistEntry {
    /// Restaurant id (`CAMIS`).
    #[serde(rename = "CAMIS")]
    pub entity_id: String,
    /// Trading name (`DBA`).
    #[serde(rename = "Name")]
    pub name: Option<String>,
    /// Borough name.
    #[serde(rename = "Borough")]
    pub borough: Option<String>,
    /// ZIP code.
    #[serde(rename = "ZIP")]
    pub zip_code: Option<String>,
    /// Cuisine description.
    #[serde(rename = "Cuisine")]
    pub cuisine: Option<String>,
    /// Date of the snapshot inspection.
    #[serde(rename = "Last Inspection")]
    pub last_inspection: NaiveDate,
    /// Risk rounded to three decimals.
    #[serde(rename = "Predicted Risk")]
    pub predicted_risk: f64,
}

impl From<&ScoredSnapshot> for WorklistEntry {
    fn from(scored: &ScoredSnapshot) -> Self {
        let snapshot = &scored.snapshot;
        Self {
            entity_id: snapshot.entity_id().to_owned(),
            name: snapshot.entity_name().map(str::to_owned),
            borough: snapshot.borough().map(str::to_owned),
            zip_code: snapshot.zip_code().map(str::to_owned),
            cuisine: snapshot.cuisine().map(str::to_owned),
            last_inspection: snapshot.last_inspection(),
            predicted_risk: round_risk(scored.risk),
        }
    }
}

/// Rounds a probability to three decimals for display.
#[must_use]
pub fn round_risk(risk: f64) -> f64 {
    (risk * 1000.0).round() / 1000.0
}

/// A cuisine and how many snapshots carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuisineCount {
    /// Cuisine description.
    pub cuisine: String,
    /// Number of snapshots with this cuisine.
    pub count: usize,
}

/// Filter choices discovered from the snapshot table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct borough names, sorted.
    pub boroughs: Vec<String>,
    /// Most common cuisines, most frequent first.
    pub cuisines: Vec<CuisineCount>,
}
