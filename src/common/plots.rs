//! Plotting infrastructure for score distribution charts
//!
//! This module renders the analysis results using the [`plotters`] crate. Charts
//! are saved as PNG files whose size, margins, fonts and colours come from
//! [`PlotSettings`].
//!
//! # Headless Compatibility
//! All charts use plotters' bitmap backend, which needs no display server.
//! Text rendering still requires a system font to be resolvable.

use super::buckets::{format_bin_range, format_edge};
use super::data_structures::{AnalysisResults, JoinedSample, QualityStatistics};
use crate::settings::PlotSettings;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Pixel sizes of the axis label areas
const X_LABEL_AREA_SIZE: u32 = 60;
const Y_LABEL_AREA_SIZE: u32 = 85;

/// Half of the width of a box in the quartile chart, in quality level units
const QUARTILE_BOX_HALF_WIDTH: f64 = 0.3;

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

fn font(size: u32) -> (&'static str, f64) {
    ("sans-serif", f64::from(size))
}

/// Checks that the histogram inputs are consistent before drawing.
pub fn validate_histogram_data(results: &AnalysisResults) -> Result<()> {
    if results.log_edges.len() < 2 {
        return Err(PlotError::InvalidData(
            "At least two bin edges are required".to_string(),
        ));
    }

    if results.qualities.is_empty() {
        return Err(PlotError::InvalidData(
            "No quality levels to plot".to_string(),
        ));
    }

    let bin_count = results.log_edges.len() - 1;
    for stats in &results.qualities {
        if stats.log_counts.len() != bin_count {
            return Err(PlotError::InvalidData(format!(
                "Quality {} has {} bin counts, expected {}",
                stats.level,
                stats.log_counts.len(),
                bin_count
            )));
        }

        if stats.log_counts.iter().any(|count| !(*count >= 0.0)) {
            return Err(PlotError::InvalidData(format!(
                "Quality {} has a negative or undefined bin count",
                stats.level
            )));
        }
    }

    Ok(())
}

/// Creates a grouped bar chart of answer counts per logarithmic score bin,
/// with one bar per quality level in every bin.
///
/// # Arguments
/// * `results` - Analysis results holding the shared bin edges and per-level counts
/// * `settings` - Chart cosmetics
/// * `output_path` - Path where the PNG file should be saved
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If the data is inconsistent or drawing failed
pub fn create_quality_histogram_plot(
    results: &AnalysisResults,
    settings: &PlotSettings,
    output_path: &Path,
) -> Result<()> {
    validate_histogram_data(results)?;

    let bin_count = results.log_edges.len() - 1;
    let highest_count = results
        .qualities
        .iter()
        .flat_map(|stats| stats.log_counts.iter().copied())
        .fold(0.0, f64::max);
    let y_max = (highest_count * 1.1).max(1.0);

    let root = BitMapBackend::new(output_path, (settings.width, settings.height));
    let drawing_area = root.into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(
            "Answer Score Distribution by Quality",
            font(settings.caption_font_size),
        )
        .margin(settings.margin)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(0.0..bin_count as f64, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    // Bin i spans [i, i + 1) on the x axis; label each bin at its centre.
    let edges = &results.log_edges;
    let label_bin = |x: &f64| {
        let offset = x - 0.5;
        let index = offset.round();
        if (offset - index).abs() > 1e-6 || index < 0.0 || index as usize >= bin_count {
            return String::new();
        }

        let index = index as usize;
        format_bin_range(index, edges[index], edges[index + 1])
    };

    chart_context
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Answer Score")
        .y_desc("Answers")
        .x_labels(bin_count * 2 + 1)
        .x_label_formatter(&label_bin)
        .label_style(font(settings.label_font_size))
        .axis_desc_style(font(settings.label_font_size))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let level_count = results.qualities.len() as f64;
    let bar_width = settings.bar_width_factor / level_count;
    let group_offset = (1.0 - settings.bar_width_factor) / 2.0;

    for (slot, stats) in results.qualities.iter().enumerate() {
        let colour = rgb(settings.colour_for(stats.level));
        let bar_start = group_offset + slot as f64 * bar_width;

        chart_context
            .draw_series(stats.log_counts.iter().enumerate().map(|(bin, &count)| {
                let x0 = bin as f64 + bar_start;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, count)], colour.filled())
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(format!("Quality {}", stats.level))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], colour.filled()));
    }

    chart_context
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(font(settings.label_font_size))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Creates a chart of the answer score quartiles per quality level.
///
/// Every level with data gets a box from Q1 to Q3, a line at the median and a
/// dot at the mean. Levels without data are left blank.
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If no level has data or drawing failed
pub fn create_quality_quartile_plot(
    qualities: &[QualityStatistics],
    settings: &PlotSettings,
    output_path: &Path,
) -> Result<()> {
    let measured: Vec<_> = qualities
        .iter()
        .filter_map(|stats| stats.statistics.summary().map(|summary| (stats.level, *summary)))
        .collect();

    if measured.is_empty() {
        return Err(PlotError::InvalidData(
            "No quality level has any answers".to_string(),
        ));
    }

    let (y_min, y_max) = measured.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(low, high), (_, summary)| {
            (
                low.min(summary.q1).min(summary.mean),
                high.max(summary.q3).max(summary.mean),
            )
        },
    );
    let padding = ((y_max - y_min) * 0.1).max(1.0);
    let highest_level = qualities.iter().map(|stats| stats.level).max().unwrap_or(0);

    let root = BitMapBackend::new(output_path, (settings.width, settings.height));
    let drawing_area = root.into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(
            "Answer Score Quartiles by Quality",
            font(settings.caption_font_size),
        )
        .margin(settings.margin)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(
            -0.5..highest_level as f64 + 0.5,
            (y_min - padding)..(y_max + padding),
        )
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Quality")
        .y_desc("Answer Score")
        .x_labels(highest_level as usize * 2 + 3)
        .x_label_formatter(&format_level_label)
        .y_label_formatter(&|y| format_edge(*y))
        .label_style(font(settings.label_font_size))
        .axis_desc_style(font(settings.label_font_size))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart_context
        .draw_series(measured.iter().map(|(level, summary)| {
            let x = f64::from(*level);
            let colour = rgb(settings.colour_for(*level));
            Rectangle::new(
                [
                    (x - QUARTILE_BOX_HALF_WIDTH, summary.q1),
                    (x + QUARTILE_BOX_HALF_WIDTH, summary.q3),
                ],
                colour.mix(0.5).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart_context
        .draw_series(measured.iter().map(|(level, summary)| {
            let x = f64::from(*level);
            PathElement::new(
                vec![
                    (x - QUARTILE_BOX_HALF_WIDTH, summary.median),
                    (x + QUARTILE_BOX_HALF_WIDTH, summary.median),
                ],
                BLACK.stroke_width(3),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?
        .label("Median")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(3)));

    chart_context
        .draw_series(
            measured
                .iter()
                .map(|(level, summary)| Circle::new((f64::from(*level), summary.mean), 6, BLACK.filled())),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?
        .label("Mean")
        .legend(|(x, y)| Circle::new((x + 10, y), 6, BLACK.filled()));

    chart_context
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(font(settings.label_font_size))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Creates a scatter chart of answer score against quality for every answer
/// rated within `0..=max_quality`.
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If there are no rated answers or drawing failed
pub fn create_quality_scatter_plot(
    samples: &[JoinedSample],
    max_quality: u32,
    settings: &PlotSettings,
    output_path: &Path,
) -> Result<()> {
    let points = rated_points(samples, max_quality);
    if points.is_empty() {
        return Err(PlotError::InvalidData(
            "No rated answers to plot".to_string(),
        ));
    }

    let (y_min, y_max) = points
        .iter()
        .fold((0i64, 0i64), |(low, high), &(_, score)| {
            (low.min(score), high.max(score))
        });
    let padding = ((y_max - y_min) as f64 * 0.05).max(1.0);

    let root = BitMapBackend::new(output_path, (settings.width, settings.height));
    let drawing_area = root.into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption("Answer Score vs Quality", font(settings.caption_font_size))
        .margin(settings.margin)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(
            -0.5..max_quality as f64 + 0.5,
            (y_min as f64 - padding)..(y_max as f64 + padding),
        )
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .configure_mesh()
        .x_desc("Quality")
        .y_desc("Answer Score")
        .x_labels(max_quality as usize * 2 + 3)
        .x_label_formatter(&format_level_label)
        .y_label_formatter(&|y| format!("{:.0}", y.round()))
        .label_style(font(settings.label_font_size))
        .axis_desc_style(font(settings.label_font_size))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart_context
        .draw_series(points.iter().map(|&(level, score)| {
            let colour = rgb(settings.colour_for(level));
            Circle::new((f64::from(level), score as f64), 4, colour.filled())
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Returns `(quality, answer score)` for every answer rated within `0..=max_quality`.
pub fn rated_points(samples: &[JoinedSample], max_quality: u32) -> Vec<(u32, i64)> {
    samples
        .iter()
        .filter_map(|sample| {
            sample
                .quality
                .level()
                .filter(|&level| level <= max_quality)
                .map(|level| (level, sample.answer_score))
        })
        .collect()
}

/// Labels integral x positions with the quality level; other ticks stay blank.
fn format_level_label(x: &f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        String::new()
    } else {
        format!("{:.0}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AggregateSummary, DistributionSummary, GroupStatistics, Quality};
    use chrono::NaiveDate;
    use std::fs;

    fn quality_stats(level: u32, log_counts: Vec<f64>, statistics: GroupStatistics) -> QualityStatistics {
        QualityStatistics {
            level,
            sample_count: log_counts.iter().sum::<f64>() as usize,
            log_counts,
            statistics,
        }
    }

    fn results(log_edges: Vec<f64>, qualities: Vec<QualityStatistics>) -> AnalysisResults {
        AnalysisResults {
            log_edges,
            qualities,
            aggregate: AggregateSummary {
                total_answers: 0,
                unrated_answers: 0,
                out_of_range_answers: 0,
                orphaned_ratings: 0,
                answer_scores: GroupStatistics::NoData,
                question_scores: GroupStatistics::NoData,
                total_views: 0,
                median_views: None,
                first_answer: None,
                last_answer: None,
            },
        }
    }

    fn summary(value: f64) -> GroupStatistics {
        GroupStatistics::Measured(DistributionSummary {
            mean: value,
            q1: value - 1.0,
            median: value,
            q3: value + 1.0,
        })
    }

    fn sample(answer_score: i64, quality: Quality) -> JoinedSample {
        JoinedSample {
            answer_score,
            quality,
            question_score: 0,
            answer_date: NaiveDate::from_ymd_opt(2017, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            views: 0,
        }
    }

    #[test]
    fn test_histogram_validation() {
        let output_path = std::env::temp_dir().join("test_histogram_validation.png");
        let settings = PlotSettings::new();

        // Too few edges
        let data = results(vec![1.0], vec![quality_stats(0, vec![], GroupStatistics::NoData)]);
        let result = create_quality_histogram_plot(&data, &settings, &output_path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));

        // No quality levels
        let data = results(vec![-0.5, 1.0], vec![]);
        let result = create_quality_histogram_plot(&data, &settings, &output_path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));

        // Count length mismatch
        let data = results(
            vec![-0.5, 1.0, 10.0],
            vec![quality_stats(0, vec![1.0], summary(0.0))],
        );
        let result = create_quality_histogram_plot(&data, &settings, &output_path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));

        // Negative count
        let data = results(
            vec![-0.5, 1.0, 10.0],
            vec![quality_stats(0, vec![1.0, -2.0], summary(0.0))],
        );
        assert!(matches!(
            validate_histogram_data(&data),
            Err(PlotError::InvalidData(_))
        ));

        // Valid
        let data = results(
            vec![-0.5, 1.0, 10.0],
            vec![quality_stats(0, vec![1.0, 2.5], summary(0.0))],
        );
        assert!(validate_histogram_data(&data).is_ok());
    }

    #[test]
    fn test_quartile_validation() {
        let output_path = std::env::temp_dir().join("test_quartile_validation.png");
        let qualities = vec![
            quality_stats(0, vec![0.0], GroupStatistics::NoData),
            quality_stats(1, vec![0.0], GroupStatistics::NoData),
        ];

        let result = create_quality_quartile_plot(&qualities, &PlotSettings::new(), &output_path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
    }

    #[test]
    fn test_scatter_validation() {
        let output_path = std::env::temp_dir().join("test_scatter_validation.png");
        let samples = vec![sample(3, Quality::Unrated), sample(4, Quality::Rated(9))];

        let result =
            create_quality_scatter_plot(&samples, 5, &PlotSettings::new(), &output_path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
    }

    #[test]
    fn rated_points_skip_unrated_and_out_of_range() {
        let samples = vec![
            sample(3, Quality::Rated(2)),
            sample(-1, Quality::Unrated),
            sample(8, Quality::Rated(6)),
            sample(0, Quality::Rated(0)),
        ];

        assert_eq!(rated_points(&samples, 5), vec![(2, 3), (0, 0)]);
    }

    #[test]
    fn test_format_level_label() {
        assert_eq!(format_level_label(&0.0), "0");
        assert_eq!(format_level_label(&3.0000000001), "3");
        assert_eq!(format_level_label(&2.5), "");
        assert_eq!(format_level_label(&-0.5), "");
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_create_plots_success() {
        let temp_dir = std::env::temp_dir().join("quality_plot_tests");
        fs::create_dir_all(&temp_dir).unwrap();
        let settings = PlotSettings::new();

        let data = results(
            vec![-0.5, 1.0, 1.78, 3.16, 5.62, 10.0],
            vec![
                quality_stats(0, vec![4.0, 1.0, 0.5, 0.5, 0.0], summary(1.0)),
                quality_stats(1, vec![0.0, 0.0, 0.0, 0.0, 0.0], GroupStatistics::NoData),
                quality_stats(2, vec![1.0, 2.0, 3.0, 2.0, 1.0], summary(3.0)),
            ],
        );

        let histogram_path = temp_dir.join("histogram.png");
        assert!(create_quality_histogram_plot(&data, &settings, &histogram_path).is_ok());
        assert!(histogram_path.exists());

        let quartile_path = temp_dir.join("quartiles.png");
        assert!(create_quality_quartile_plot(&data.qualities, &settings, &quartile_path).is_ok());
        assert!(quartile_path.exists());

        let samples = vec![sample(3, Quality::Rated(2)), sample(-1, Quality::Rated(0))];
        let scatter_path = temp_dir.join("scatter.png");
        assert!(create_quality_scatter_plot(&samples, 5, &settings, &scatter_path).is_ok());
        assert!(scatter_path.exists());

        // Clean up test directory
        let _ = fs::remove_dir_all(&temp_dir);
    }
}
