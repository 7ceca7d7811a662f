//! Domain-specific analysis modules
//!
//! This module contains the analysis logic for:
//! - Joining engagement records with quality ratings
//! - Linear to logarithmic score binning
//! - Per-quality statistics
//! - Report and chart output

pub mod binning;
pub mod join;
pub mod report;
pub mod statistics;

// Re-export analysis functions for convenience
pub use join::{associate_data, JoinOutcome};
pub use report::{generate_quality_plots, generate_quality_report};
pub use statistics::QualityEngine;

use crate::common::AnalysisResults;
use crate::settings::AnalysisSettings;
use tracing::{info, warn};

/// Computes per-quality and aggregate statistics for joined answers.
pub fn analyze(joined: &JoinOutcome, settings: &AnalysisSettings) -> AnalysisResults {
    let engine = QualityEngine::new(&joined.samples, settings);
    let qualities = engine.aggregate(&joined.samples);
    let aggregate =
        statistics::summarize_all(&joined.samples, settings.max_quality, joined.orphaned_ratings);

    if aggregate.out_of_range_answers > 0 {
        warn!(
            count = aggregate.out_of_range_answers,
            max_quality = settings.max_quality,
            "Answers rated above the maximum quality level are excluded from every level"
        );
    }

    let empty_levels = qualities
        .iter()
        .filter(|stats| stats.sample_count == 0)
        .count();
    info!(
        levels = qualities.len(),
        empty_levels,
        unrated = aggregate.unrated_answers,
        "Aggregated answer scores by quality"
    );

    AnalysisResults {
        log_edges: engine.binning().logarithmic.edges().to_vec(),
        qualities,
        aggregate,
    }
}
