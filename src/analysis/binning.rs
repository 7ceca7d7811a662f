//! Linear and logarithmic score binning
//!
//! Scores are first counted per integer value (linear bins), then the linear
//! counts are redistributed into logarithmically spaced bins by fractional
//! overlap. Redistribution assumes answers are spread uniformly within each
//! linear bin, so logarithmic counts are fractional approximations rather than
//! exact recounts of the raw scores.

/// Integer-width bins covering every observed score, plus a terminal bin
/// that reaches the upper edge of the logarithmic range.
///
/// One edge is stored per integer in the score range, so memory grows with
/// `highest - lowest`. Input is bounded by
/// [`MAX_ANSWER_SCORE_MAGNITUDE`](crate::parsing::MAX_ANSWER_SCORE_MAGNITUDE).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearBinning {
    /// Lowest score covered by the first bin
    lowest_score: i64,
    /// Strictly increasing bin edges
    edges: Vec<f64>,
}

impl LinearBinning {
    /// Creates bins for scores in `lowest_score..=highest_score`.
    ///
    /// The terminal bin ends at `terminal_edge`, or one unit past the last
    /// integer bin if `terminal_edge` does not lie above it.
    pub fn new(lowest_score: i64, highest_score: i64, terminal_edge: f64) -> Self {
        let mut edges: Vec<f64> = (lowest_score..=highest_score)
            .map(|score| score as f64 - 0.5)
            .collect();

        let upper_edge = highest_score as f64 + 0.5;
        edges.push(upper_edge);
        edges.push(if terminal_edge > upper_edge {
            terminal_edge
        } else {
            upper_edge + 1.0
        });

        Self {
            lowest_score,
            edges,
        }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Counts scores per linear bin.
    ///
    /// Scores outside the binned range are not counted.
    pub fn histogram(&self, scores: impl IntoIterator<Item = i64>) -> Vec<u64> {
        let mut counts = vec![0u64; self.bin_count()];
        // Last bin is the terminal bin, never hit by an integer score.
        let integer_bins = self.bin_count() - 1;

        for score in scores {
            let Some(offset) = score.checked_sub(self.lowest_score) else {
                continue;
            };

            if let Ok(index) = usize::try_from(offset) {
                if index < integer_bins {
                    counts[index] += 1;
                }
            }
        }

        counts
    }
}

/// Bins whose edges grow geometrically, preceded by a single
/// "zero-or-below" bin.
#[derive(Debug, Clone, PartialEq)]
pub struct LogarithmicBinning {
    edges: Vec<f64>,
}

impl LogarithmicBinning {
    /// Creates edges `[lower_edge, 10^(0/n), 10^(1/n), ..., 10^(k/n)]` where
    /// `n` is `intervals_per_decade` and `k` is the smallest value with
    /// `10^(k/n) >= highest_score + 0.5`.
    ///
    /// `lower_edge` must be below 1.0 and `intervals_per_decade` non-zero.
    pub fn new(lower_edge: f64, highest_score: i64, intervals_per_decade: u32) -> Self {
        let intervals = f64::from(intervals_per_decade);
        let upper_edge = highest_score.max(0) as f64 + 0.5;

        let mut steps = (intervals * upper_edge.log10()).ceil().max(0.0) as u32;
        // Guard against log10 rounding leaving the top score uncovered.
        while decade_edge(steps, intervals) < upper_edge {
            steps += 1;
        }

        let mut edges = Vec::with_capacity(steps as usize + 2);
        edges.push(lower_edge);
        edges.extend((0..=steps).map(|step| decade_edge(step, intervals)));

        Self { edges }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn upper_edge(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }
}

fn decade_edge(step: u32, intervals: f64) -> f64 {
    10f64.powf(f64::from(step) / intervals)
}

/// Linear and logarithmic bins shared by every quality level of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBinning {
    pub linear: LinearBinning,
    pub logarithmic: LogarithmicBinning,
}

impl ScoreBinning {
    /// Derives bins covering all given scores and zero.
    pub fn from_scores(scores: impl IntoIterator<Item = i64>, intervals_per_decade: u32) -> Self {
        let (lowest, highest) = scores
            .into_iter()
            .fold((0i64, 0i64), |(lowest, highest), score| {
                (lowest.min(score), highest.max(score))
            });

        let lower_edge = lowest as f64 - 0.5;
        let logarithmic = LogarithmicBinning::new(lower_edge, highest, intervals_per_decade);
        let linear = LinearBinning::new(lowest, highest, logarithmic.upper_edge());

        Self {
            linear,
            logarithmic,
        }
    }

    /// Counts the given scores into logarithmic bins.
    pub fn log_histogram(&self, scores: impl IntoIterator<Item = i64>) -> Vec<f64> {
        let counts_lin = self.linear.histogram(scores);
        rebin(&counts_lin, self.linear.edges(), self.logarithmic.edges())
    }
}

/// Redistributes linear bin counts into logarithmic bins.
///
/// Each linear bin contributes to every logarithmic bin it overlaps, in
/// proportion to the fraction of its width inside that bin. Counts of linear
/// bins (or parts thereof) outside `bins_log` are dropped.
///
/// `counts_lin` holds one count per linear bin; both edge slices must be
/// strictly increasing.
pub fn rebin(counts_lin: &[u64], bins_lin: &[f64], bins_log: &[f64]) -> Vec<f64> {
    let mut counts_log = vec![0.0; bins_log.len().saturating_sub(1)];

    for (count_log, log_bin) in counts_log.iter_mut().zip(bins_log.windows(2)) {
        let (log_low, log_high) = (log_bin[0], log_bin[1]);

        for (&count, lin_bin) in counts_lin.iter().zip(bins_lin.windows(2)) {
            let (lin_low, lin_high) = (lin_bin[0], lin_bin[1]);
            if lin_high <= log_low {
                continue;
            }

            // Linear bins are ordered; nothing further can overlap.
            if lin_low >= log_high {
                break;
            }

            let covered = (lin_high.min(log_high) - lin_low.max(log_low)) / (lin_high - lin_low);
            *count_log += covered * count as f64;
        }
    }

    counts_log
}
