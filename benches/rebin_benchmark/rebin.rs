use answer_quality_stats::analysis::binning::{rebin, ScoreBinning};
use criterion::{black_box, Criterion};

/// Scores spread over a few orders of magnitude, like a long answer history.
pub fn generate_scores(count: usize) -> Vec<i64> {
    (0..count)
        .map(|x| {
            let x = x as i64;
            (x * x * 7919 % 4001) - 5
        })
        .collect()
}

pub fn bench_rebin(c: &mut Criterion) {
    let scores = generate_scores(5000);
    let mut group = c.benchmark_group("rebin_linear_to_log");

    for intervals_per_decade in [1u32, 4, 16] {
        let binning = ScoreBinning::from_scores(scores.iter().copied(), intervals_per_decade);
        let counts_lin = binning.linear.histogram(scores.iter().copied());

        group.bench_function(format!("intervals_per_decade_{}", intervals_per_decade), |b| {
            b.iter(|| {
                rebin(
                    black_box(&counts_lin),
                    black_box(binning.linear.edges()),
                    black_box(binning.logarithmic.edges()),
                )
            })
        });
    }

    group.finish();
}
