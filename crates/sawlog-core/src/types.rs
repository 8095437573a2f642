//! Core types for sawlog-core.
//!
//! This module defines the record produced for every valid log line
//! ([`CutRecord`]), the typed outcome of looking at a single line
//! ([`LineOutcome`] / [`SkipReason`]) and the per-run counters
//! ([`ExtractionSummary`]).

use crate::layout::Field;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One run of a cutting program, decoded from a single log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutRecord {
    /// Program (optimisation) name with the directory prefix removed.
    pub raw_program_name: String,
    /// `raw_program_name` without its last `.suffix`. Groups runs of the same
    /// cutting design.
    pub job_key: String,
    pub process_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub length_mm: f64,
    pub width_mm: f64,
    pub thickness_mm: f64,
    /// Number of identical plates cut by this run.
    pub plate_count: u32,
}

/// Which of the two time stamps on a line failed to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Start,
    End,
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeSlot::Start => write!(f, "start"),
            TimeSlot::End => write!(f, "end"),
        }
    }
}

/// Why a line produced no record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("blank line")]
    Blank,
    #[error("no '=' separator")]
    NoSeparator,
    #[error("expected at least {expected} fields, found {found}", expected = crate::layout::MIN_FIELDS)]
    TooFewFields { found: usize },
    #[error("field {field} is not a valid number: {value:?}")]
    InvalidNumber { field: Field, value: String },
    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: u32, month: u32, day: u32 },
    #[error("invalid {slot} time {hour:02}:{minute:02}:{second:02}")]
    InvalidTime {
        slot: TimeSlot,
        hour: u32,
        minute: u32,
        second: u32,
    },
}

impl SkipReason {
    pub fn kind(&self) -> SkipKind {
        match self {
            SkipReason::Blank => SkipKind::Blank,
            SkipReason::NoSeparator => SkipKind::NoSeparator,
            SkipReason::TooFewFields { .. } => SkipKind::TooFewFields,
            SkipReason::InvalidNumber { .. } => SkipKind::InvalidNumber,
            SkipReason::InvalidDate { .. } => SkipKind::InvalidDate,
            SkipReason::InvalidTime { .. } => SkipKind::InvalidTime,
        }
    }
}

/// Data-free discriminant of [`SkipReason`], used as a counter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    Blank,
    NoSeparator,
    TooFewFields,
    InvalidNumber,
    InvalidDate,
    InvalidTime,
}

impl SkipKind {
    /// Blank lines and lines without `=` are headers or padding, not broken
    /// records.
    pub fn is_non_data(self) -> bool {
        matches!(self, SkipKind::Blank | SkipKind::NoSeparator)
    }
}

/// Result of looking at one log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Record(CutRecord),
    Skipped(SkipReason),
}

impl LineOutcome {
    pub fn record(&self) -> Option<&CutRecord> {
        match self {
            LineOutcome::Record(r) => Some(r),
            LineOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            LineOutcome::Record(_) => None,
            LineOutcome::Skipped(reason) => Some(reason),
        }
    }

    pub fn into_record(self) -> Option<CutRecord> {
        match self {
            LineOutcome::Record(r) => Some(r),
            LineOutcome::Skipped(_) => None,
        }
    }
}

/// Line counters for one extraction run.
///
/// `lines == records + skipped()` holds after every [`observe`](Self::observe).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub lines: usize,
    pub records: usize,
    pub skipped_by_kind: BTreeMap<SkipKind, usize>,
}

impl ExtractionSummary {
    pub fn observe(&mut self, outcome: &LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Record(_) => self.records += 1,
            LineOutcome::Skipped(reason) => {
                *self.skipped_by_kind.entry(reason.kind()).or_default() += 1;
            }
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_by_kind.values().sum()
    }

    /// Skipped lines that were headers or padding.
    pub fn non_data(&self) -> usize {
        self.skipped_by_kind
            .iter()
            .filter(|(kind, _)| kind.is_non_data())
            .map(|(_, n)| n)
            .sum()
    }

    /// Skipped lines that looked like data but could not be decoded.
    pub fn rejected(&self) -> usize {
        self.skipped() - self.non_data()
    }

    pub fn skipped_for(&self, kind: SkipKind) -> usize {
        self.skipped_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Fold another run's counters into this one.
    pub fn merge(&mut self, other: &ExtractionSummary) {
        self.lines += other.lines;
        self.records += other.records;
        for (kind, n) in &other.skipped_by_kind {
            *self.skipped_by_kind.entry(*kind).or_default() += n;
        }
    }
}

impl std::fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} lines, {} records, {} skipped ({} non-data, {} rejected)",
            self.lines,
            self.records,
            self.skipped(),
            self.non_data(),
            self.rejected()
        )
    }
}

/// Records extracted from one input, in input order, with their counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<CutRecord>,
    pub summary: ExtractionSummary,
}

impl Extraction {
    pub fn push(&mut self, outcome: LineOutcome) {
        self.summary.observe(&outcome);
        if let Some(record) = outcome.into_record() {
            self.records.push(record);
        }
    }

    /// Concatenate `other` after `self`.
    pub fn append(&mut self, other: Extraction) {
        self.summary.merge(&other.summary);
        self.records.extend(other.records);
    }
}

impl FromIterator<LineOutcome> for Extraction {
    fn from_iter<I: IntoIterator<Item = LineOutcome>>(iter: I) -> Self {
        let mut extraction = Extraction::default();
        for outcome in iter {
            extraction.push(outcome);
        }
        extraction
    }
}
