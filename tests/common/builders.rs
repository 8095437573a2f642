//! Test builders — ergonomic constructors for raw saw log lines and records.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{NaiveDate, NaiveTime};
use sawlog::{CutRecord, Field, MIN_FIELDS};

// ---------------------------------------------------------------------------
// LogLineBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for raw controller log lines.
///
/// Starts from a valid 17-field line; every setter writes the raw token at the
/// position the controller uses, so tests can corrupt one field at a time.
///
/// # Example
///
/// ```rust
/// let line = LogLineBuilder::new("W954ST1418.301")
///     .prefix(".\\prg\\")
///     .plates("x")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct LogLineBuilder {
    key: String,
    prefix: String,
    fields: Vec<String>,
}

impl LogLineBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        let mut fields = vec!["0".to_string(); MIN_FIELDS];
        fields[Field::ProgramName.index()] = program.into();
        let b = Self {
            key: "PRG".to_string(),
            prefix: String::new(),
            fields,
        };
        b.dims("2440", "1830", "18")
            .date("2025", "8", "15")
            .start("7", "5", "0")
            .end("7", "9", "30")
            .plates("3")
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn field(mut self, field: Field, raw: impl Into<String>) -> Self {
        self.fields[field.index()] = raw.into();
        self
    }

    /// Overwrite a raw position, including reserved ones.
    pub fn raw(mut self, index: usize, raw: impl Into<String>) -> Self {
        if index >= self.fields.len() {
            self.fields.resize(index + 1, "0".to_string());
        }
        self.fields[index] = raw.into();
        self
    }

    pub fn dims(self, length: &str, width: &str, thickness: &str) -> Self {
        self.field(Field::Length, length)
            .field(Field::Width, width)
            .field(Field::Thickness, thickness)
    }

    pub fn date(self, year: &str, month: &str, day: &str) -> Self {
        self.field(Field::Year, year)
            .field(Field::Month, month)
            .field(Field::Day, day)
    }

    pub fn start(self, hour: &str, minute: &str, second: &str) -> Self {
        self.field(Field::StartHour, hour)
            .field(Field::StartMinute, minute)
            .field(Field::StartSecond, second)
    }

    pub fn end(self, hour: &str, minute: &str, second: &str) -> Self {
        self.field(Field::EndHour, hour)
            .field(Field::EndMinute, minute)
            .field(Field::EndSecond, second)
    }

    pub fn plates(self, plates: &str) -> Self {
        self.field(Field::PlateCount, plates)
    }

    /// Keep only the first `n` fields.
    pub fn truncate(mut self, n: usize) -> Self {
        self.fields.truncate(n);
        self
    }

    pub fn build(self) -> String {
        format!("{}={}{}", self.key, self.prefix, self.fields.join(","))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The record [`LogLineBuilder::new`] decodes to when left untouched.
pub fn default_record(program: &str) -> CutRecord {
    CutRecord {
        raw_program_name: program.to_string(),
        job_key: sawlog::job_key(program).to_string(),
        process_date: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
        start_time: NaiveTime::from_hms_opt(7, 5, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(7, 9, 30).unwrap(),
        length_mm: 2440.0,
        width_mm: 1830.0,
        thickness_mm: 18.0,
        plate_count: 3,
    }
}

/// `n` valid lines with distinct program names `JOB<i>.<i>`.
pub fn valid_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| LogLineBuilder::new(format!("JOB{i}.{i}")).build())
        .collect()
}
