//! Per-quality score aggregation
//!
//! Groups joined answers by quality level and computes, for every level, the
//! logarithmically binned score histogram along with the mean and quartiles.

use super::binning::ScoreBinning;
use crate::common::{
    AggregateSummary, DistributionSummary, GroupStatistics, JoinedSample, Quality,
    QualityStatistics,
};
use crate::settings::AnalysisSettings;
use rayon::prelude::*;
use tracing::debug;

/// Computes per-quality statistics over a fixed set of bins.
///
/// Bin edges are derived once, from every joined score, when the engine is
/// created and are shared by all quality levels.
#[derive(Debug, Clone)]
pub struct QualityEngine {
    max_quality: u32,
    binning: ScoreBinning,
}

impl QualityEngine {
    pub fn new(samples: &[JoinedSample], settings: &AnalysisSettings) -> Self {
        let binning = ScoreBinning::from_scores(
            samples.iter().map(|sample| sample.answer_score),
            settings.intervals_per_decade,
        );

        debug!(
            linear_bins = binning.linear.bin_count(),
            log_edges = ?binning.logarithmic.edges(),
            "Derived score bins"
        );

        Self {
            max_quality: settings.max_quality,
            binning,
        }
    }

    pub fn binning(&self) -> &ScoreBinning {
        &self.binning
    }

    /// Aggregates every quality level in `0..=max_quality`, in ascending order.
    ///
    /// Unrated answers are not part of any level.
    pub fn aggregate(&self, samples: &[JoinedSample]) -> Vec<QualityStatistics> {
        (0..=self.max_quality)
            .into_par_iter()
            .map(|level| self.aggregate_level(samples, level))
            .collect()
    }

    /// Aggregates the answers rated exactly `level`.
    pub fn aggregate_level(&self, samples: &[JoinedSample], level: u32) -> QualityStatistics {
        let scores: Vec<i64> = samples
            .iter()
            .filter(|sample| sample.quality == Quality::Rated(level))
            .map(|sample| sample.answer_score)
            .collect();

        if scores.is_empty() {
            debug!(level, "No answers at quality level");
        }

        QualityStatistics {
            level,
            sample_count: scores.len(),
            log_counts: self.binning.log_histogram(scores.iter().copied()),
            statistics: summarize(scores.iter().map(|&score| score as f64)),
        }
    }
}

/// Computes the mean and quartiles of the given values.
///
/// Returns [`GroupStatistics::NoData`] for an empty input.
pub fn summarize(values: impl IntoIterator<Item = f64>) -> GroupStatistics {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    if sorted.is_empty() {
        return GroupStatistics::NoData;
    }

    sorted.sort_by(f64::total_cmp);
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    GroupStatistics::Measured(DistributionSummary {
        mean,
        q1: percentile_of_sorted(&sorted, 25.0),
        median: percentile_of_sorted(&sorted, 50.0),
        q3: percentile_of_sorted(&sorted, 75.0),
    })
}

/// Returns the `percentile`th (0-100) percentile of ascending `sorted` data,
/// linearly interpolating between the two closest ranks.
///
/// `sorted` must not be empty.
fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Returns the median of the given values, or `None` if there are none.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    summarize(values).summary().map(|summary| summary.median)
}

/// Summarizes every joined answer, regardless of its rating.
pub fn summarize_all(
    samples: &[JoinedSample],
    max_quality: u32,
    orphaned_ratings: usize,
) -> AggregateSummary {
    let unrated_answers = samples
        .iter()
        .filter(|sample| sample.quality == Quality::Unrated)
        .count();
    let out_of_range_answers = samples
        .iter()
        .filter(|sample| matches!(sample.quality, Quality::Rated(level) if level > max_quality))
        .count();

    AggregateSummary {
        total_answers: samples.len(),
        unrated_answers,
        out_of_range_answers,
        orphaned_ratings,
        answer_scores: summarize(samples.iter().map(|sample| sample.answer_score as f64)),
        question_scores: summarize(samples.iter().map(|sample| sample.question_score as f64)),
        total_views: samples.iter().map(|sample| sample.views).sum(),
        median_views: median(samples.iter().map(|sample| sample.views as f64)),
        first_answer: samples.iter().map(|sample| sample.answer_date).min(),
        last_answer: samples.iter().map(|sample| sample.answer_date).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-9;

    fn sample(answer_score: i64, quality: Quality) -> JoinedSample {
        let answer_date = NaiveDate::from_ymd_opt(2015, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap();

        JoinedSample {
            answer_score,
            quality,
            question_score: 1,
            answer_date,
            views: 100,
        }
    }

    fn measured(statistics: GroupStatistics) -> DistributionSummary {
        *statistics.summary().expect("expected measured statistics")
    }

    #[test]
    fn summarizes_one_to_five() {
        let summary = measured(summarize([1.0, 2.0, 3.0, 4.0, 5.0]));

        assert_eq!(summary.mean, 3.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
    }

    #[test]
    fn interpolates_between_ranks() {
        // Ranks for n = 4: Q1 at 0.75, median at 1.5, Q3 at 2.25
        let summary = measured(summarize([10.0, 0.0, 30.0, 20.0]));

        assert!((summary.q1 - 7.5).abs() < TOLERANCE);
        assert!((summary.median - 15.0).abs() < TOLERANCE);
        assert!((summary.q3 - 22.5).abs() < TOLERANCE);
        assert!((summary.mean - 15.0).abs() < TOLERANCE);
    }

    #[test]
    fn single_value_is_every_quartile() {
        let summary = measured(summarize([-4.0]));
        assert_eq!(summary, DistributionSummary {
            mean: -4.0,
            q1: -4.0,
            median: -4.0,
            q3: -4.0,
        });
    }

    #[test]
    fn empty_input_has_no_data() {
        assert_eq!(summarize(std::iter::empty()), GroupStatistics::NoData);
        assert_eq!(median(std::iter::empty()), None);
    }

    #[rstest]
    #[case::ascending(vec![1.0, 2.0, 3.0])]
    #[case::skewed(vec![0.0, 0.0, 0.0, 1.0, 250.0])]
    #[case::negative(vec![-9.0, -3.0, -3.0, 4.0])]
    #[case::duplicates(vec![7.0; 6])]
    fn quartiles_are_monotonic(#[case] values: Vec<f64>) {
        let summary = measured(summarize(values));
        assert!(summary.q1 <= summary.median);
        assert!(summary.median <= summary.q3);
    }

    #[test]
    fn unrated_answers_join_no_level() {
        let samples = vec![
            sample(3, Quality::Rated(1)),
            sample(40, Quality::Unrated),
            sample(5, Quality::Rated(1)),
        ];
        let engine = QualityEngine::new(&samples, &AnalysisSettings::new());
        let results = engine.aggregate(&samples);

        let total_counted: usize = results.iter().map(|stats| stats.sample_count).sum();
        assert_eq!(total_counted, 2);

        let binned_total: f64 = results
            .iter()
            .flat_map(|stats| stats.log_counts.iter())
            .sum();
        assert!((binned_total - 2.0).abs() < TOLERANCE);
        assert_eq!(measured(results[1].statistics).mean, 4.0);
    }

    #[test]
    fn empty_levels_report_no_data_without_affecting_others() {
        let samples = vec![sample(2, Quality::Rated(0)), sample(8, Quality::Rated(5))];
        let engine = QualityEngine::new(&samples, &AnalysisSettings::new());
        let results = engine.aggregate(&samples);

        assert_eq!(results.len(), 6);
        assert_eq!(
            results.iter().map(|stats| stats.level).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5]
        );

        for stats in &results[1..5] {
            assert_eq!(stats.sample_count, 0);
            assert_eq!(stats.statistics, GroupStatistics::NoData);
            assert!(stats.log_counts.iter().all(|&count| count == 0.0));
        }

        assert_eq!(measured(results[0].statistics).median, 2.0);
        assert_eq!(measured(results[5].statistics).median, 8.0);
    }

    #[test]
    fn log_counts_align_with_shared_edges() {
        let samples = vec![
            sample(-2, Quality::Rated(0)),
            sample(0, Quality::Rated(0)),
            sample(12, Quality::Rated(2)),
            sample(300, Quality::Unrated),
        ];
        let engine = QualityEngine::new(&samples, &AnalysisSettings::new());
        let log_bins = engine.binning().logarithmic.bin_count();

        for stats in engine.aggregate(&samples) {
            assert_eq!(stats.log_counts.len(), log_bins);
        }
    }

    #[test]
    fn levels_above_maximum_are_counted_as_out_of_range() {
        let samples = vec![
            sample(1, Quality::Rated(2)),
            sample(2, Quality::Rated(9)),
            sample(3, Quality::Unrated),
        ];
        let summary = summarize_all(&samples, 5, 4);

        assert_eq!(summary.total_answers, 3);
        assert_eq!(summary.unrated_answers, 1);
        assert_eq!(summary.out_of_range_answers, 1);
        assert_eq!(summary.orphaned_ratings, 4);
        assert_eq!(summary.total_views, 300);
        assert_eq!(summary.median_views, Some(100.0));
        assert_eq!(measured(summary.answer_scores).mean, 2.0);
    }

    #[test]
    fn empty_dataset_summary() {
        let summary = summarize_all(&[], 5, 0);

        assert_eq!(summary.total_answers, 0);
        assert_eq!(summary.answer_scores, GroupStatistics::NoData);
        assert_eq!(summary.first_answer, None);
    }
}
