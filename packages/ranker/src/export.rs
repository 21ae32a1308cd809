//! CSV export of the worklist and the feature table.
//!
//! Output is UTF-8, comma-separated, with a header row.

use std::io::Write;

use chrono::NaiveDate;
use inspect_nyc_inspection_models::{FeatureRow, ScoredSnapshot};
use inspect_nyc_ranker_models::WorklistEntry;
use serde::Serialize;

/// Errors that can occur while writing CSV output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes worklist rows with the risk rounded to three decimals.
///
/// # Errors
///
/// Returns [`ExportError`] if writing fails.
pub fn write_worklist_csv<W: Write>(writer: W, entries: &[ScoredSnapshot]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if entries.is_empty() {
        csv_writer.write_record(WORKLIST_HEADERS)?;
    }
    for entry in entries {
        csv_writer.serialize(WorklistEntry::from(entry))?;
    }
    csv_writer.flush()?;
    Ok(())
}

const WORKLIST_HEADERS: [&str; 7] = [
    "CAMIS",
    "Name",
    "Borough",
    "ZIP",
    "Cuisine",
    "Last Inspection",
    "Predicted Risk",
];

const FEATURE_HEADERS: [&str; 12] = [
    "CAMIS",
    "DBA",
    "INSPECTION DATE",
    "prev_score",
    "hist_crit_rate_w3",
    "hist_visits_w3",
    "month",
    "year",
    "CUISINE DESCRIPTION",
    "BORO",
    "GRADE",
    "ZIPCODE",
];

/// Flat feature-table row in training column order.
#[derive(Serialize)]
struct FeatureExportRow<'a> {
    #[serde(rename = "CAMIS")]
    camis: &'a str,
    #[serde(rename = "DBA")]
    dba: Option<&'a str>,
    #[serde(rename = "INSPECTION DATE")]
    inspection_date: NaiveDate,
    prev_score: f64,
    hist_crit_rate_w3: f64,
    hist_visits_w3: u32,
    month: u32,
    year: i32,
    #[serde(rename = "CUISINE DESCRIPTION")]
    cuisine: Option<&'a str>,
    #[serde(rename = "BORO")]
    borough: Option<&'a str>,
    #[serde(rename = "GRADE")]
    grade: Option<&'a str>,
    #[serde(rename = "ZIPCODE")]
    zip_code: Option<&'a str>,
}

impl<'a> From<&'a FeatureRow> for FeatureExportRow<'a> {
    fn from(row: &'a FeatureRow) -> Self {
        let record = &row.record;
        Self {
            camis: &record.entity_id,
            dba: record.entity_name.as_deref(),
            inspection_date: record.inspection_date,
            prev_score: row.prev_score,
            hist_crit_rate_w3: row.hist_crit_rate_w3,
            hist_visits_w3: row.hist_visits_w3,
            month: row.month,
            year: row.year,
            cuisine: record.cuisine.as_deref(),
            borough: record.borough.as_deref(),
            grade: record.grade.as_deref(),
            zip_code: record.zip_code.as_deref(),
        }
    }
}

/// Writes the full feature table, unrounded.
///
/// # Errors
///
/// Returns [`ExportError`] if writing fails.
pub fn write_feature_csv<W: Write>(writer: W, rows: &[FeatureRow]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(FEATURE_HEADERS)?;
    }
    for row in rows {
        csv_writer.serialize(FeatureExportRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use inspect_nyc_inspection_models::{CriticalFlag, InspectionRecord, Snapshot};

    use super::*;

    fn row(name: Option<&str>) -> FeatureRow {
        FeatureRow {
            record: InspectionRecord {
                entity_id: "41000001".to_string(),
                entity_name: name.map(ToString::to_string),
                inspection_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                score: Some(12.0),
                critical_flag: CriticalFlag::Critical,
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
    fn writes_worklist_with_rounded_risk() {
        let entries = vec![ScoredSnapshot {
            snapshot: Snapshot::new(row(Some("JOE'S, PIZZA"))),
            risk: 0.412_345,
        }];
        let mut out = Vec::new();
        write_worklist_csv(&mut out, &entries).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "CAMIS,Name,Borough,ZIP,Cuisine,Last Inspection,Predicted Risk\n\
             41000001,\"JOE'S, PIZZA\",Queens,11101,Pizza,2024-03-09,0.412\n"
        );
    }

    #[test]
    fn empty_worklist_still_has_header() {
        let mut out = Vec::new();
        write_worklist_csv(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "CAMIS,Name,Borough,ZIP,Cuisine,Last Inspection,Predicted Risk\n"
        );
    }

    #[test]
    fn writes_feature_table() {
        let mut out = Vec::new();
        write_feature_csv(&mut out, &[row(None)]).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "CAMIS,DBA,INSPECTION DATE,prev_score,hist_crit_rate_w3,hist_visits_w3,month,year,\
             CUISINE DESCRIPTION,BORO,GRADE,ZIPCODE"
        );
        assert_eq!(
            lines.next().unwrap(),
            "41000001,,2024-03-09,12.0,0.5,2,3,2024,Pizza,Queens,,11101"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_feature_table_matches_populated_header() {
        let mut empty = Vec::new();
        write_feature_csv(&mut empty, &[]).unwrap();

        let mut populated = Vec::new();
        write_feature_csv(&mut populated, &[row(None)]).unwrap();

        let empty = String::from_utf8(empty).unwrap();
        let populated = String::from_utf8(populated).unwrap();
        assert_eq!(empty.lines().count(), 1);
        assert_eq!(empty.lines().next(), populated.lines().next());
    }
}
