//! File parsing functionality for answer engagement and quality data
//!
//! This module handles loading:
//! - The comma-separated answer export (`Id,Answer Score,Answer Date,Question Score,Question Date,Views`)
//! - The whitespace-separated quality file (`<id> <quality>` per line)
//!
//! Any field that fails to parse aborts loading; a malformed dataset cannot be
//! analyzed meaningfully.

use crate::common::{EngagementDataset, EngagementRecord, QualityMap};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Format of the date columns in the answer export
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest accepted absolute answer score.
///
/// Answer scores are binned once per integer value, so the span between the
/// lowest and highest score sets the size of the linear binning.
pub const MAX_ANSWER_SCORE_MAGNITUDE: i64 = 1_000_000;

/// Errors that can occur during file parsing
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Failed to read input file {source_name}: {error}")]
    FileRead {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to read CSV data from {source_name}: {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },

    #[error("Malformed record in {source_name} at line {line}: {reason}")]
    MalformedInput {
        source_name: String,
        line: u64,
        reason: String,
    },

    #[error("Duplicate identifier '{id}' in {source_name} at line {line}")]
    DuplicateIdentifier {
        source_name: String,
        id: String,
        line: u64,
    },
}

type Result<T> = core::result::Result<T, ParsingError>;

/// Raw CSV row before dates are parsed
#[derive(Debug, Deserialize)]
struct RawAnswerRow {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Answer Score")]
    answer_score: i64,
    #[serde(rename = "Answer Date")]
    answer_date: String,
    #[serde(rename = "Question Score")]
    question_score: i64,
    #[serde(rename = "Question Date")]
    question_date: String,
    #[serde(rename = "Views")]
    views: u64,
}

/// Parse the answer export at `file_path`
///
/// # Returns
/// * `Ok(EngagementDataset)` - Records in file order
/// * `Err(ParsingError)` - If the file could not be read, a field failed to parse,
///   or an identifier appears twice
pub fn parse_answers(file_path: &Path) -> Result<EngagementDataset> {
    let source_name = file_path.display().to_string();
    let file = open(file_path, &source_name)?;
    let answers = parse_answers_from_reader(file, &source_name)?;

    info!(
        answers = answers.records.len(),
        file = %source_name,
        "Loaded answer engagement data"
    );
    Ok(answers)
}

/// Parse answer records from any reader. `source_name` is used in error messages.
pub fn parse_answers_from_reader<R: Read>(reader: R, source_name: &str) -> Result<EngagementDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|error| csv_error(source_name, error))?
        .clone();

    let mut seen_ids = HashSet::new();
    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|error| csv_error(source_name, error))?;
        let line = row.position().map_or(0, |position| position.line());

        let raw: RawAnswerRow = row.deserialize(Some(&headers)).map_err(|error| {
            ParsingError::MalformedInput {
                source_name: source_name.to_string(),
                line,
                reason: error.to_string(),
            }
        })?;

        if !(-MAX_ANSWER_SCORE_MAGNITUDE..=MAX_ANSWER_SCORE_MAGNITUDE).contains(&raw.answer_score) {
            return Err(ParsingError::MalformedInput {
                source_name: source_name.to_string(),
                line,
                reason: format!(
                    "answer score {} is outside -{max}..={max}",
                    raw.answer_score,
                    max = MAX_ANSWER_SCORE_MAGNITUDE
                ),
            });
        }

        if !seen_ids.insert(raw.id.clone()) {
            return Err(ParsingError::DuplicateIdentifier {
                source_name: source_name.to_string(),
                id: raw.id,
                line,
            });
        }

        records.push(EngagementRecord {
            answer_date: parse_date(&raw.answer_date, "Answer Date", source_name, line)?,
            question_date: parse_date(&raw.question_date, "Question Date", source_name, line)?,
            id: raw.id,
            answer_score: raw.answer_score,
            question_score: raw.question_score,
            views: raw.views,
        });
    }

    Ok(EngagementDataset { records })
}

/// Parse the quality file at `file_path`
///
/// # Returns
/// * `Ok(QualityMap)` - Quality level per answer identifier
/// * `Err(ParsingError)` - If the file could not be read, a line lacks a quality,
///   a quality is not a non-negative integer, or an identifier appears twice
pub fn parse_quality(file_path: &Path) -> Result<QualityMap> {
    let source_name = file_path.display().to_string();
    let file = open(file_path, &source_name)?;
    let quality = parse_quality_from_reader(BufReader::new(file), &source_name)?;

    info!(
        ratings = quality.len(),
        file = %source_name,
        "Loaded quality ratings"
    );
    Ok(quality)
}

/// Parse quality ratings from any buffered reader. `source_name` is used in error messages.
///
/// Blank lines are skipped and tokens after the quality are ignored.
pub fn parse_quality_from_reader<R: BufRead>(reader: R, source_name: &str) -> Result<QualityMap> {
    let mut ratings = HashMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index as u64 + 1;
        let line = line.map_err(|error| ParsingError::FileRead {
            source_name: source_name.to_string(),
            error,
        })?;

        let mut tokens = line.split_whitespace();
        let Some(id) = tokens.next() else {
            continue;
        };

        let malformed = |reason: String| ParsingError::MalformedInput {
            source_name: source_name.to_string(),
            line: line_number,
            reason,
        };

        let token = tokens
            .next()
            .ok_or_else(|| malformed(format!("missing quality for identifier '{}'", id)))?;
        let level: u32 = token
            .parse()
            .map_err(|error| malformed(format!("invalid quality '{}': {}", token, error)))?;

        match ratings.entry(id.to_string()) {
            Entry::Occupied(_) => {
                return Err(ParsingError::DuplicateIdentifier {
                    source_name: source_name.to_string(),
                    id: id.to_string(),
                    line: line_number,
                })
            }
            Entry::Vacant(entry) => {
                entry.insert(level);
            }
        }
    }

    Ok(QualityMap { ratings })
}

fn open(file_path: &Path, source_name: &str) -> Result<File> {
    File::open(file_path).map_err(|error| ParsingError::FileRead {
        source_name: source_name.to_string(),
        error,
    })
}

fn csv_error(source_name: &str, error: csv::Error) -> ParsingError {
    ParsingError::Csv {
        source_name: source_name.to_string(),
        error,
    }
}

fn parse_date(value: &str, column: &str, source_name: &str, line: u64) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map_err(|error| {
        ParsingError::MalformedInput {
            source_name: source_name.to_string(),
            line,
            reason: format!("invalid {} '{}': {}", column, value, error),
        }
    })
}
