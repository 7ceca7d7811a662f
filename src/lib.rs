//! # answer-quality-stats
//!
//! Joins per-answer engagement metrics with self-assessed quality ratings and
//! summarizes how answer scores distribute across quality levels.
//!
//! The pipeline is:
//! 1. [`parsing`] reads the answer export and the quality ratings.
//! 2. [`analysis::associate_data`] joins them by answer identifier.
//! 3. [`analysis::analyze`] bins scores logarithmically and computes quartiles per level.
//! 4. [`analysis::report`] writes the text report, JSON summary and charts.
//!
//! [`pipeline::run`] performs all of the above.

pub mod analysis;
pub mod common;
pub mod parsing;
pub mod pipeline;
pub mod settings;

pub use pipeline::{run, AnalysisError, RunOptions};
pub use settings::{AnalysisSettings, PlotSettings};
