use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Engagement metrics for a single answer, as exported from the Q&A platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementRecord {
    /// Unique answer identifier
    pub id: String,
    /// Net score of the answer (may be negative)
    pub answer_score: i64,
    /// When the answer was posted
    pub answer_date: NaiveDateTime,
    /// Net score of the question being answered (may be negative)
    pub question_score: i64,
    /// When the question was posted
    pub question_date: NaiveDateTime,
    /// Number of times the question was viewed
    pub views: u64,
}

/// Engagement records in the order they appear in the input file
#[derive(Debug, Clone, Default)]
pub struct EngagementDataset {
    pub records: Vec<EngagementRecord>,
}

/// Quality rating per answer identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityMap {
    pub ratings: HashMap<String, u32>,
}

impl QualityMap {
    /// Returns the quality of the answer with the given identifier.
    pub fn quality_of(&self, id: &str) -> Quality {
        match self.ratings.get(id) {
            Some(&level) => Quality::Rated(level),
            None => Quality::Unrated,
        }
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// Subjective quality of an answer.
///
/// Answers that were never rated are [`Quality::Unrated`]; this is distinct
/// from a rating of level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Rated(u32),
    Unrated,
}

impl Quality {
    /// Returns the rating level, if any.
    pub fn level(self) -> Option<u32> {
        match self {
            Quality::Rated(level) => Some(level),
            Quality::Unrated => None,
        }
    }
}

/// An engagement record paired with its (optional) quality rating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedSample {
    pub answer_score: i64,
    pub quality: Quality,
    pub question_score: i64,
    pub answer_date: NaiveDateTime,
    pub views: u64,
}

/// Mean and quartiles of a non-empty score distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

/// Statistics for a single group of scores.
///
/// A group with no samples has no defined mean or percentiles and is reported
/// as [`GroupStatistics::NoData`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupStatistics {
    NoData,
    Measured(DistributionSummary),
}

impl GroupStatistics {
    pub fn summary(&self) -> Option<&DistributionSummary> {
        match self {
            GroupStatistics::Measured(summary) => Some(summary),
            GroupStatistics::NoData => None,
        }
    }
}

/// Aggregated score distribution for one quality level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityStatistics {
    /// Quality level this entry describes
    pub level: u32,
    /// Number of answers rated at this level
    pub sample_count: usize,
    /// Fractional answer counts, one per logarithmic bin
    pub log_counts: Vec<f64>,
    /// Mean and quartiles of the answer scores
    pub statistics: GroupStatistics,
}

/// Statistics over every joined answer, rated or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// Total number of answers in the engagement dataset
    pub total_answers: usize,
    /// Answers without a quality rating
    pub unrated_answers: usize,
    /// Answers rated above the configured maximum quality level
    pub out_of_range_answers: usize,
    /// Ratings whose identifier has no engagement record
    pub orphaned_ratings: usize,
    /// Answer score distribution across all answers
    pub answer_scores: GroupStatistics,
    /// Question score distribution across all answers
    pub question_scores: GroupStatistics,
    /// Sum of all view counts
    pub total_views: u64,
    /// Median view count
    pub median_views: Option<f64>,
    /// Earliest answer date
    pub first_answer: Option<NaiveDateTime>,
    /// Latest answer date
    pub last_answer: Option<NaiveDateTime>,
}

/// Complete output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    /// Edges of the logarithmic bins shared by all quality levels
    pub log_edges: Vec<f64>,
    /// One entry per quality level, in ascending level order
    pub qualities: Vec<QualityStatistics>,
    /// Statistics over all answers
    pub aggregate: AggregateSummary,
}
