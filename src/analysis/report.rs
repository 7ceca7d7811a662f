//! Report and chart generation for the quality analysis
//!
//! Writes the human-readable report (`quality-report.txt`), the machine-readable
//! summary (`quality-summary.json`) and the PNG charts into an output directory.

use crate::common::buckets::{create_log_buckets, format_bucket_table, with_title};
use crate::common::plots::{
    create_quality_histogram_plot, create_quality_quartile_plot, create_quality_scatter_plot,
};
use crate::common::{AggregateSummary, AnalysisResults, GroupStatistics, JoinedSample, PlotError};
use crate::settings::AnalysisSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use thiserror::Error;
use tracing::{info, warn};

/// Name of the text report inside the output directory
pub const REPORT_FILE_NAME: &str = "quality-report.txt";

/// Name of the JSON summary inside the output directory
pub const SUMMARY_FILE_NAME: &str = "quality-summary.json";

/// Names of the generated charts inside the output directory
pub const HISTOGRAM_FILE_NAME: &str = "score_histogram_by_quality.png";
pub const QUARTILE_FILE_NAME: &str = "score_quartiles_by_quality.png";
pub const SCATTER_FILE_NAME: &str = "score_vs_quality_scatter.png";

/// Errors that can occur while writing reports
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to generate plot: {0}")]
    PlotGeneration(#[from] PlotError),
}

type Result<T> = core::result::Result<T, ReportError>;

/// One row of the per-quality summary table
#[derive(Debug, Clone, Tabled)]
struct QualitySummaryRow {
    #[tabled(rename = "Quality")]
    level: u32,
    #[tabled(rename = "Answers")]
    answers: usize,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Q1")]
    q1: String,
    #[tabled(rename = "Median")]
    median: String,
    #[tabled(rename = "Q3")]
    q3: String,
}

/// Returns the four statistic columns, or "no data" in each.
fn statistic_columns(statistics: &GroupStatistics) -> [String; 4] {
    match statistics.summary() {
        Some(summary) => [summary.mean, summary.q1, summary.median, summary.q3]
            .map(|value| format!("{:.2}", value)),
        None => std::array::from_fn(|_| "no data".to_string()),
    }
}

/// Renders the complete text report.
pub fn format_quality_report(results: &AnalysisResults) -> String {
    let rows: Vec<QualitySummaryRow> = results
        .qualities
        .iter()
        .map(|stats| {
            let [mean, q1, median, q3] = statistic_columns(&stats.statistics);
            QualitySummaryRow {
                level: stats.level,
                answers: stats.sample_count,
                mean,
                q1,
                median,
                q3,
            }
        })
        .collect();

    let summary_table = if rows.is_empty() {
        "No quality levels configured".to_string()
    } else {
        with_title(
            Table::new(&rows).to_string(),
            Some("Answer Score by Quality"),
        )
    };

    let histogram_tables: Vec<String> = results
        .qualities
        .iter()
        .map(|stats| {
            let title = format!("Quality {} Score Distribution (Logarithmic Bins)", stats.level);
            if stats.sample_count == 0 {
                with_title("no data".to_string(), Some(&title))
            } else {
                let buckets = create_log_buckets(&results.log_edges, &stats.log_counts);
                format_bucket_table(&buckets, Some(&title))
            }
        })
        .collect();

    format!(
        "Answer Quality Analysis\n{}\n\n{}\n\n{}\n\n{}",
        "=".repeat(23),
        summary_table,
        histogram_tables.join("\n\n"),
        format_aggregate_summary(&results.aggregate)
    )
}

fn format_aggregate_summary(aggregate: &AggregateSummary) -> String {
    let [score_mean, score_q1, score_median, score_q3] =
        statistic_columns(&aggregate.answer_scores);
    let [question_mean, _, question_median, _] = statistic_columns(&aggregate.question_scores);

    let median_views = aggregate
        .median_views
        .map_or_else(|| "no data".to_string(), |views| format!("{:.1}", views));
    let answer_span = match (aggregate.first_answer, aggregate.last_answer) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "no data".to_string(),
    };

    format!(
        "Summary\n{}\n\
         Total answers: {}\n\
         Unrated answers: {}\n\
         Answers rated above maximum quality: {}\n\
         Ratings without a matching answer: {}\n\
         Answer score mean/Q1/median/Q3: {} / {} / {} / {}\n\
         Question score mean/median: {} / {}\n\
         Total views: {}\n\
         Median views: {}\n\
         Answers posted: {}",
        "=".repeat(7),
        aggregate.total_answers,
        aggregate.unrated_answers,
        aggregate.out_of_range_answers,
        aggregate.orphaned_ratings,
        score_mean,
        score_q1,
        score_median,
        score_q3,
        question_mean,
        question_median,
        aggregate.total_views,
        median_views,
        answer_span
    )
}

/// Generate the text report and JSON summary
///
/// # Arguments
/// * `results` - The complete analysis results
/// * `output_dir` - Directory where the report files should be saved
///
/// # Returns
/// * `Ok(PathBuf)` - Path of the text report
/// * `Err(ReportError)` - If serialization or file operations failed
pub fn generate_quality_report(results: &AnalysisResults, output_dir: &Path) -> Result<PathBuf> {
    let report_path = output_dir.join(REPORT_FILE_NAME);
    fs::write(&report_path, format_quality_report(results))?;

    let summary_path = output_dir.join(SUMMARY_FILE_NAME);
    fs::write(&summary_path, serde_json::to_string_pretty(results)?)?;

    info!(
        report = %report_path.display(),
        summary = %summary_path.display(),
        "Wrote quality report"
    );
    Ok(report_path)
}

/// Generate the histogram, quartile and scatter charts
///
/// Charts with nothing to show (e.g. no rated answers at all) are skipped with
/// a warning rather than failing the run.
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - Paths of the charts that were written
/// * `Err(ReportError)` - If drawing a chart failed
pub fn generate_quality_plots(
    results: &AnalysisResults,
    samples: &[JoinedSample],
    settings: &AnalysisSettings,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let histogram_path = output_dir.join(HISTOGRAM_FILE_NAME);
    create_quality_histogram_plot(results, &settings.plot, &histogram_path)?;
    written.push(histogram_path);

    let quartile_path = output_dir.join(QUARTILE_FILE_NAME);
    match create_quality_quartile_plot(&results.qualities, &settings.plot, &quartile_path) {
        Ok(()) => written.push(quartile_path),
        Err(PlotError::InvalidData(reason)) => warn!(%reason, "Skipping quartile chart"),
        Err(e) => return Err(e.into()),
    }

    let scatter_path = output_dir.join(SCATTER_FILE_NAME);
    match create_quality_scatter_plot(samples, settings.max_quality, &settings.plot, &scatter_path)
    {
        Ok(()) => written.push(scatter_path),
        Err(PlotError::InvalidData(reason)) => warn!(%reason, "Skipping scatter chart"),
        Err(e) => return Err(e.into()),
    }

    info!(charts = written.len(), "Wrote quality charts");
    Ok(written)
}
