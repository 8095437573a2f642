//! Extractor — decodes saw log lines into [`CutRecord`] values.
//!
//! A data line looks like `<anything>=<payload>`, where the payload is a
//! comma-separated list laid out as described in [`crate::layout`]. Lines that
//! cannot be decoded are never fatal: they come back as
//! [`LineOutcome::Skipped`] with the reason attached, and the run carries on.
//!
//! The only errors surfaced by this module are I/O failures on the input
//! itself (see [`ExtractError`]).

use crate::error::ExtractError;
use crate::layout::{strip_program_prefix, Field, MIN_FIELDS};
use crate::types::{CutRecord, Extraction, LineOutcome, SkipReason, TimeSlot};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// ---------------------------------------------------------------------------
// Pure line decoding
// ---------------------------------------------------------------------------

/// Decode a single line.
pub fn extract_line(line: &str) -> LineOutcome {
    match decode_line(line) {
        Ok(record) => LineOutcome::Record(record),
        Err(reason) => LineOutcome::Skipped(reason),
    }
}

/// Decode every line, yielding one outcome per input line in order.
pub fn outcomes<I, S>(lines: I) -> impl Iterator<Item = LineOutcome>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().map(|line| extract_line(line.as_ref()))
}

/// Decode every line and keep the records, in input order.
pub fn extract<I, S>(lines: I) -> Extraction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    outcomes(lines).collect()
}

/// Job key of a program name: everything before the last `.`.
///
/// A name without a dot is its own job key.
pub fn job_key(program_name: &str) -> &str {
    program_name
        .rsplit_once('.')
        .map_or(program_name, |(key, _suffix)| key)
}

fn decode_line(line: &str) -> Result<CutRecord, SkipReason> {
    let line = line.trim();
    if line.is_empty() {
        return Err(SkipReason::Blank);
    }
    let (_, payload) = line.split_once('=').ok_or(SkipReason::NoSeparator)?;

    let parts: Vec<&str> = strip_program_prefix(payload).split(',').collect();
    if parts.len() < MIN_FIELDS {
        return Err(SkipReason::TooFewFields { found: parts.len() });
    }
    let fields = Fields(&parts);

    let raw_program_name = fields.text(Field::ProgramName).trim().to_string();
    let job_key = job_key(&raw_program_name).to_string();

    let process_date = fields.date(Field::Year, Field::Month, Field::Day)?;
    let start_time = fields.time(
        TimeSlot::Start,
        Field::StartHour,
        Field::StartMinute,
        Field::StartSecond,
    )?;
    let end_time = fields.time(
        TimeSlot::End,
        Field::EndHour,
        Field::EndMinute,
        Field::EndSecond,
    )?;

    Ok(CutRecord {
        raw_program_name,
        job_key,
        process_date,
        start_time,
        end_time,
        length_mm: fields.float(Field::Length)?,
        width_mm: fields.float(Field::Width)?,
        thickness_mm: fields.float(Field::Thickness)?,
        plate_count: fields.integer(Field::PlateCount)?,
    })
}

/// Positional view over a split payload.
struct Fields<'a>(&'a [&'a str]);

impl<'a> Fields<'a> {
    fn text(&self, field: Field) -> &'a str {
        // `decode_line` checks the length against MIN_FIELDS, and every
        // index in the layout is below it.
        self.0[field.index()]
    }

    fn invalid(&self, field: Field) -> SkipReason {
        SkipReason::InvalidNumber {
            field,
            value: self.text(field).to_string(),
        }
    }

    fn integer(&self, field: Field) -> Result<u32, SkipReason> {
        self.text(field)
            .trim()
            .parse::<u32>()
            .map_err(|_| self.invalid(field))
    }

    fn float(&self, field: Field) -> Result<f64, SkipReason> {
        match self.text(field).trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.invalid(field)),
        }
    }

    fn date(&self, year: Field, month: Field, day: Field) -> Result<NaiveDate, SkipReason> {
        let (year, month, day) = (self.integer(year)?, self.integer(month)?, self.integer(day)?);
        // Four-digit years only; the controller has no notion of year zero.
        (1..=9999)
            .contains(&year)
            .then(|| NaiveDate::from_ymd_opt(year as i32, month, day))
            .flatten()
            .ok_or(SkipReason::InvalidDate { year, month, day })
    }

    fn time(
        &self,
        slot: TimeSlot,
        hour: Field,
        minute: Field,
        second: Field,
    ) -> Result<NaiveTime, SkipReason> {
        let (hour, minute, second) = (
            self.integer(hour)?,
            self.integer(minute)?,
            self.integer(second)?,
        );
        NaiveTime::from_hms_opt(hour, minute, second).ok_or(SkipReason::InvalidTime {
            slot,
            hour,
            minute,
            second,
        })
    }
}

// ---------------------------------------------------------------------------
// Byte-level input
// ---------------------------------------------------------------------------

/// What to do with byte sequences that are not valid UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidUtf8 {
    /// Remove the offending bytes.
    #[default]
    Drop,
    /// Substitute U+FFFD for each offending sequence.
    Replace,
}

/// Decode raw line bytes according to `policy`. Valid UTF-8 is borrowed.
pub fn decode_bytes(bytes: &[u8], policy: InvalidUtf8) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }
    match policy {
        InvalidUtf8::Replace => String::from_utf8_lossy(bytes),
        InvalidUtf8::Drop => Cow::Owned(bytes.utf8_chunks().map(|c| c.valid()).collect()),
    }
}

/// Split one `read_until(b'\n')` chunk into lines, treating bare `\r` as a
/// line end of its own. The chunk's terminator (`\n`, `\r\n` or a final
/// `\r`) does not produce an extra empty line.
fn split_line_ends(chunk: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    let body = chunk.strip_suffix(b"\n".as_slice()).unwrap_or(chunk);
    let body = body.strip_suffix(b"\r".as_slice()).unwrap_or(body);
    body.split(|&b| b == b'\r')
}

/// Reads log input from byte streams and files.
///
/// The extractor itself holds no state between calls, so one instance can be
/// shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    invalid_utf8: InvalidUtf8,
}

impl Extractor {
    pub fn new(invalid_utf8: InvalidUtf8) -> Self {
        Self { invalid_utf8 }
    }

    pub fn invalid_utf8(&self) -> InvalidUtf8 {
        self.invalid_utf8
    }

    /// Extract every line of `reader`. `\n`, `\r\n` and a lone `\r` all end
    /// a line.
    pub fn extract_reader<R: BufRead>(&self, mut reader: R) -> std::io::Result<Extraction> {
        let mut extraction = Extraction::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            for raw in split_line_ends(&buf) {
                let line = decode_bytes(raw, self.invalid_utf8);
                let outcome = extract_line(&line);
                if let LineOutcome::Skipped(reason) = &outcome {
                    tracing::trace!(line = extraction.summary.lines + 1, %reason, "line skipped");
                }
                extraction.push(outcome);
            }
        }
        Ok(extraction)
    }

    /// Extract a log file from disk.
    pub fn extract_file(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let file = File::open(path).map_err(|source| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let extraction =
            self.extract_reader(BufReader::new(file))
                .map_err(|source| ExtractError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
        tracing::debug!(path = %path.display(), summary = %extraction.summary, "file extracted");
        Ok(extraction)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
