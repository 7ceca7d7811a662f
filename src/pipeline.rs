//! End-to-end analysis run: parse, join, aggregate, report.

use crate::analysis::{self, generate_quality_plots, generate_quality_report};
use crate::common::AnalysisResults;
use crate::parsing::{self, parse_answers, parse_quality};
use crate::settings::{AnalysisSettings, ConfigError};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Parsing error: {0}")]
    Parsing(#[from] parsing::ParsingError),

    #[error("Failed to create output directory: {0}")]
    OutputDirectory(#[from] std::io::Error),

    #[error("Report error: {0}")]
    Report(#[from] analysis::report::ReportError),
}

type Result<T> = core::result::Result<T, AnalysisError>;

/// Inputs and outputs of one analysis run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Comma-separated answer export
    pub answers: PathBuf,
    /// Whitespace-separated quality ratings
    pub quality: PathBuf,
    /// Directory receiving the report and charts; created if missing
    pub output_dir: PathBuf,
    /// Whether to render PNG charts
    pub render_plots: bool,
    pub settings: AnalysisSettings,
}

/// Runs the full analysis and writes all outputs.
pub fn run(options: &RunOptions) -> Result<AnalysisResults> {
    options.settings.validate()?;

    let answers = parse_answers(&options.answers)?;
    let quality = parse_quality(&options.quality)?;
    let joined = analysis::associate_data(&answers, &quality);
    drop(answers);

    let results = analysis::analyze(&joined, &options.settings);

    fs::create_dir_all(&options.output_dir)?;
    generate_quality_report(&results, &options.output_dir)?;

    if options.render_plots {
        generate_quality_plots(
            &results,
            &joined.samples,
            &options.settings,
            &options.output_dir,
        )?;
    }

    info!(output = %options.output_dir.display(), "Analysis complete");
    Ok(results)
}
