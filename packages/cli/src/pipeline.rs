//! Command implementations: load inputs, build features, rank and report.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use inspect_nyc_cli_utils::{IndicatifProgress, MultiProgress};
use inspect_nyc_dataset::config::AppConfig;
use inspect_nyc_dataset::{ensure_inputs_exist, load_raw_records};
use inspect_nyc_features::FeatureTables;
use inspect_nyc_features::progress::ProgressCallback;
use inspect_nyc_inspection_models::{RawInspectionRecord, ScoredSnapshot};
use inspect_nyc_ranker::export::{write_feature_csv, write_worklist_csv};
use inspect_nyc_ranker::options::filter_options;
use inspect_nyc_ranker::rank;
use inspect_nyc_ranker_models::{RankOptions, RankOutcome, RiskFilter, WorklistEntry};
use inspect_nyc_scorer::linear::LinearModel;
use inspect_nyc_scorer::metrics::{ModelMetrics, load_metrics};

type BoxError = Box<dyn std::error::Error>;

/// Filters and output destination for one `rank` run.
pub struct RankRequest {
    pub borough: Option<String>,
    pub cuisines: Vec<String>,
    pub zip: Option<String>,
    pub output: Option<PathBuf>,
}

impl RankRequest {
    pub(crate) fn filter(&self) -> RiskFilter {
        let mut filter = RiskFilter::default().with_cuisines(&self.cuisines);
        if let Some(borough) = &self.borough {
            filter = filter.with_borough(borough);
        }
        if let Some(zip) = &self.zip {
            filter = filter.with_zip_list(zip);
        }
        filter
    }
}

/// Ranks the latest snapshot of every matching restaurant.
///
/// # Errors
///
/// Returns an error if an input is missing or unreadable, the model is
/// invalid, ranking fails, or the output file cannot be written.
pub fn run_rank(multi: &MultiProgress, config: &AppConfig, request: &RankRequest) -> Result<(), BoxError> {
    ensure_inputs_exist(&[&config.paths.dataset, &config.paths.model])?;

    let loading = IndicatifProgress::spinner(multi, "Loading data and model...");
    let raws = load_raw_records(&config.paths.dataset)?;
    let model = LinearModel::load(&config.paths.model)?;
    loading.finish(format!("Loaded {} inspection rows", format_count(raws.len())));

    let tables = build(multi, &raws);

    let filter = request.filter();
    let options = RankOptions {
        threshold: config.rank.threshold,
        limit: config.rank.limit,
    };
    let outcome = rank(&tables.snapshots, &filter, &options, &model)?;

    print_report(&outcome, &config.paths.metrics);

    if let Some(output) = &request.output {
        match &outcome {
            RankOutcome::NoCandidates => {
                log::warn!("Nothing to write to {}", output.display());
            }
            RankOutcome::NoneAboveThreshold { .. } => write_worklist(output, &[])?,
            RankOutcome::Ranked(worklist) => write_worklist(output, &worklist.entries)?,
        }
    }

    Ok(())
}

/// Prints the filter choices available in the dataset.
///
/// # Errors
///
/// Returns an error if the dataset is missing or unreadable.
pub fn run_options(multi: &MultiProgress, config: &AppConfig) -> Result<(), BoxError> {
    ensure_inputs_exist(&[&config.paths.dataset])?;

    let loading = IndicatifProgress::spinner(multi, "Loading data...");
    let raws = load_raw_records(&config.paths.dataset)?;
    loading.finish_and_clear();

    let tables = build(multi, &raws);
    let options = filter_options(&tables.snapshots, config.rank.top_cuisines);

    println!("Boroughs:");
    for borough in &options.boroughs {
        println!("  {borough}");
    }
    println!();
    println!("{:<40} {:>8}", "CUISINE", "COUNT");
    println!("{}", "-".repeat(49));
    for cuisine in &options.cuisines {
        println!("{:<40} {:>8}", cuisine.cuisine, format_count(cuisine.count));
    }

    Ok(())
}

/// Writes the full feature table to `output`.
///
/// # Errors
///
/// Returns an error if the dataset is missing or unreadable, or writing
/// fails.
pub fn run_features(multi: &MultiProgress, config: &AppConfig, output: &Path) -> Result<(), BoxError> {
    ensure_inputs_exist(&[&config.paths.dataset])?;

    let loading = IndicatifProgress::spinner(multi, "Loading data...");
    let raws = load_raw_records(&config.paths.dataset)?;
    loading.finish_and_clear();

    let tables = build(multi, &raws);

    let writer = BufWriter::new(File::create(output)?);
    write_feature_csv(writer, &tables.features)?;
    log::info!(
        "Wrote {} feature rows to {}",
        format_count(tables.features.len()),
        output.display()
    );

    Ok(())
}

/// Verifies that the inputs exist and the model loads.
///
/// # Errors
///
/// Returns an error if an input is missing or the model is invalid.
pub fn run_check(multi: &MultiProgress, config: &AppConfig) -> Result<(), BoxError> {
    ensure_inputs_exist(&[&config.paths.dataset, &config.paths.model])?;

    let loading = IndicatifProgress::spinner(multi, "Loading model...");
    let model = LinearModel::load(&config.paths.model)?;
    loading.finish_and_clear();

    println!("Dataset: {}", config.paths.dataset.display());
    println!(
        "Model:   {} ({} features)",
        config.paths.model.display(),
        model.features.len()
    );
    println!("{}", metrics_line(load_metrics(&config.paths.metrics).as_ref()));

    Ok(())
}

fn build(multi: &MultiProgress, raws: &[RawInspectionRecord]) -> FeatureTables {
    let building = IndicatifProgress::spinner(multi, "Building features...");
    let tables = inspect_nyc_features::build_tables(raws, building.as_ref());
    building.finish(format!(
        "Built {} feature rows for {} restaurants",
        format_count(tables.features.len()),
        format_count(tables.snapshots.len())
    ));
    if tables.dropped > 0 {
        log::info!(
            "Dropped {} rows without a usable id or date",
            format_count(tables.dropped)
        );
    }
    tables
}

fn write_worklist(output: &Path, entries: &[ScoredSnapshot]) -> Result<(), BoxError> {
    let writer = BufWriter::new(File::create(output)?);
    write_worklist_csv(writer, entries)?;
    log::info!("Wrote {} rows to {}", entries.len(), output.display());
    Ok(())
}

fn print_report(outcome: &RankOutcome, metrics_path: &Path) {
    println!();
    println!("Restaurants scored: {}", format_count(outcome.scored()));

    match outcome {
        RankOutcome::NoCandidates => {
            log::warn!("No restaurants match the filters; nothing was scored.");
        }
        RankOutcome::NoneAboveThreshold { .. } => {
            println!("At or above threshold: 0");
            log::warn!("No restaurants at or above threshold.");
        }
        RankOutcome::Ranked(worklist) => {
            println!("At or above threshold: {}", format_count(worklist.passing));
        }
    }

    println!("{}", metrics_line(load_metrics(metrics_path).as_ref()));

    let Some(worklist) = outcome.worklist() else {
        return;
    };

    println!();
    println!(
        "{:<10} {:<32} {:<14} {:<6} {:<24} {:<12} {:>6}",
        "CAMIS", "NAME", "BOROUGH", "ZIP", "CUISINE", "LAST INSP", "RISK"
    );
    println!("{}", "-".repeat(110));
    for scored in &worklist.entries {
        let entry = WorklistEntry::from(scored);
        println!(
            "{:<10} {:<32} {:<14} {:<6} {:<24} {:<12} {:>6.3}",
            entry.entity_id,
            clip(entry.name.as_deref().unwrap_or("-"), 32),
            entry.borough.as_deref().unwrap_or("-"),
            entry.zip_code.as_deref().unwrap_or("-"),
            clip(entry.cuisine.as_deref().unwrap_or("-"), 24),
            entry.last_inspection.to_string(),
            entry.predicted_risk,
        );
    }
}

/// Headline line for the model's evaluation report.
fn metrics_line(metrics: Option<&ModelMetrics>) -> String {
    let Some(metrics) = metrics else {
        return "No metrics.json found.".to_string();
    };
    metrics.roc_auc().map_or_else(
        || "metrics.json has no roc_auc".to_string(),
        |auc| format!("Model ROC AUC: {auc:.3}"),
    )
}

/// Formats a count with comma thousands separators.
fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Truncates `text` to at most `width` characters.
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_owned()
    } else {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('~');
        clipped
    }
}
