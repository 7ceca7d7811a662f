use crate::rebin::generate_scores;
use answer_quality_stats::analysis::QualityEngine;
use answer_quality_stats::common::{JoinedSample, Quality};
use answer_quality_stats::AnalysisSettings;
use chrono::NaiveDate;
use criterion::{black_box, Criterion};

fn generate_samples(count: usize) -> Vec<JoinedSample> {
    let answer_date = NaiveDate::from_ymd_opt(2015, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    generate_scores(count)
        .into_iter()
        .enumerate()
        .map(|(x, answer_score)| JoinedSample {
            answer_score,
            quality: if x % 7 == 0 {
                Quality::Unrated
            } else {
                Quality::Rated((x % 6) as u32)
            },
            question_score: 0,
            answer_date,
            views: x as u64,
        })
        .collect()
}

pub fn bench_aggregate_qualities(c: &mut Criterion) {
    let samples = generate_samples(5000);
    let settings = AnalysisSettings::new();
    let engine = QualityEngine::new(&samples, &settings);

    c.bench_function("aggregate_qualities", |b| {
        b.iter(|| engine.aggregate(black_box(&samples)))
    });
}
