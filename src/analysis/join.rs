//! Joins engagement records with their quality ratings

use crate::common::{EngagementDataset, JoinedSample, Quality, QualityMap};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result of joining the engagement dataset with the quality map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// One sample per engagement record, in engagement file order
    pub samples: Vec<JoinedSample>,
    /// Number of ratings whose identifier has no engagement record
    pub orphaned_ratings: usize,
}

/// Pairs every engagement record with its quality rating.
///
/// Records without a rating become [`Quality::Unrated`]; this is expected, as
/// not every answer has been rated.
pub fn associate_data(answers: &EngagementDataset, quality: &QualityMap) -> JoinOutcome {
    let samples: Vec<JoinedSample> = answers
        .records
        .iter()
        .map(|record| JoinedSample {
            answer_score: record.answer_score,
            quality: quality.quality_of(&record.id),
            question_score: record.question_score,
            answer_date: record.answer_date,
            views: record.views,
        })
        .collect();

    let known_ids: HashSet<&str> = answers
        .records
        .iter()
        .map(|record| record.id.as_str())
        .collect();
    let orphaned: Vec<&str> = quality
        .ratings
        .keys()
        .map(String::as_str)
        .filter(|id| !known_ids.contains(id))
        .collect();

    if !orphaned.is_empty() {
        warn!(
            count = orphaned.len(),
            "Quality ratings reference answers missing from the engagement data"
        );
        debug!(ids = ?orphaned, "Orphaned quality ratings");
    }

    let unrated = samples
        .iter()
        .filter(|sample| sample.quality == Quality::Unrated)
        .count();
    debug!(
        answers = samples.len(),
        unrated, "Joined engagement and quality data"
    );

    JoinOutcome {
        samples,
        orphaned_ratings: orphaned.len(),
    }
}
