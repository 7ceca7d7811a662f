//! Histogram bucket rows and ASCII table formatting
//!
//! This module provides shared functionality for bucket-based reporting:
//! - [`BucketEntry`] type for representing a logarithmic bin with range, count, and percentage
//! - Human-readable labels for logarithmic bin ranges
//! - ASCII table formatting using the [`tabled`] crate

use tabled::{Table, Tabled};

/// Represents a single bucket with its range, count, and percentage
#[derive(Debug, Clone, Tabled)]
pub struct BucketEntry {
    /// Human-readable range description (e.g., "<= 0", "1.78 - 3.16")
    #[tabled(rename = "Range")]
    pub range: String,
    /// Number of answers in this bucket. Fractional after rebinning.
    #[tabled(rename = "Count")]
    pub count: String,
    /// Percentage of total answers in this bucket
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

impl BucketEntry {
    /// Creates a new bucket entry with formatted count and percentage
    pub fn new(range: String, count: f64, total: f64) -> Self {
        let percentage = if total <= 0.0 {
            "0.00%".to_string()
        } else {
            format!("{:.2}%", (count / total) * 100.0)
        };

        Self {
            range,
            count: format!("{:.2}", count),
            percentage,
        }
    }
}

/// Creates one [`BucketEntry`] per logarithmic bin.
///
/// # Arguments
/// * `edges` - Logarithmic bin edges; the first bin collects scores of zero or below
/// * `counts` - Count per bin, one fewer than `edges`
pub fn create_log_buckets(edges: &[f64], counts: &[f64]) -> Vec<BucketEntry> {
    let total: f64 = counts.iter().sum();

    edges
        .windows(2)
        .zip(counts)
        .enumerate()
        .map(|(index, (bin, &count))| {
            BucketEntry::new(format_bin_range(index, bin[0], bin[1]), count, total)
        })
        .collect()
}

/// Formats the range of the logarithmic bin at `index`.
pub fn format_bin_range(index: usize, low: f64, high: f64) -> String {
    if index == 0 {
        "<= 0".to_string()
    } else {
        format!("{} - {}", format_edge(low), format_edge(high))
    }
}

/// Formats a bin edge with at most two decimals, dropping trailing zeros.
pub fn format_edge(edge: f64) -> String {
    let formatted = format!("{:.2}", edge);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Formats bucket entries as an ASCII table using the [`tabled`] crate
///
/// # Arguments
/// * `buckets` - A slice of [`BucketEntry`] to format
/// * `title` - Optional title for the table
///
/// # Returns
/// A formatted ASCII table as a [`String`]
pub fn format_bucket_table(buckets: &[BucketEntry], title: Option<&str>) -> String {
    if buckets.is_empty() {
        return "No data available for bucketing".to_string();
    }

    with_title(Table::new(buckets).to_string(), title)
}

/// Prefixes `table` with an underlined title, if one is given.
pub fn with_title(table: String, title: Option<&str>) -> String {
    if let Some(title) = title {
        format!("{}\n{}\n{}", title, "=".repeat(title.chars().count()), table)
    } else {
        table
    }
}
