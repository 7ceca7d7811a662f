//! Common infrastructure modules shared across analysis phases
//!
//! This module provides reusable infrastructure for:
//! - Data structures for answers, ratings and their statistics
//! - Bucket types and ASCII table formatting
//! - Plotting score distribution charts

pub mod buckets;
pub mod data_structures;
pub mod plots;

// Re-export commonly used items
pub use data_structures::{
    AggregateSummary, AnalysisResults, DistributionSummary, EngagementDataset, EngagementRecord,
    GroupStatistics, JoinedSample, Quality, QualityMap, QualityStatistics,
};
pub use plots::PlotError;
