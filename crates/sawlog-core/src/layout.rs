//! Field layout of a saw log payload.
//!
//! The controller writes each cut as a comma-separated payload whose meaning
//! is purely positional. [`Field::index`] is the single place those positions
//! are written down; everything else in the crate refers to fields by name.
//!
//! The date and time components are deliberately out of order (minute before
//! hour, day before month). That is how the controller lays them out.
//!
//! | Index | Field            |
//! |-------|------------------|
//! | 0     | program name     |
//! | 1     | length (mm)      |
//! | 2     | width (mm)       |
//! | 3     | thickness (mm)   |
//! | 4     | start minute     |
//! | 5     | start hour       |
//! | 6     | *reserved*       |
//! | 7     | start second     |
//! | 8     | year             |
//! | 9     | day              |
//! | 10    | month            |
//! | 11    | end minute       |
//! | 12    | end hour         |
//! | 13    | *reserved*       |
//! | 14    | end second       |
//! | 15    | *reserved*       |
//! | 16    | plate count      |

use serde::Serialize;

/// Minimum number of comma-separated fields for a payload to be a cut record.
pub const MIN_FIELDS: usize = 17;

/// Directory prefixes the controller has used in front of the program name,
/// in the order they are tried. Only the first match is stripped.
pub const PROGRAM_PREFIXES: [&str; 4] = [".\\prg\\", "C:\\WinCut\\prg\\", ".\\", "C:WinCut\\prg\\"];

/// A named position in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ProgramName,
    Length,
    Width,
    Thickness,
    StartMinute,
    StartHour,
    StartSecond,
    Year,
    Day,
    Month,
    EndMinute,
    EndHour,
    EndSecond,
    PlateCount,
}

impl Field {
    /// Every consumed field, in payload order.
    pub const ALL: [Field; 14] = [
        Field::ProgramName,
        Field::Length,
        Field::Width,
        Field::Thickness,
        Field::StartMinute,
        Field::StartHour,
        Field::StartSecond,
        Field::Year,
        Field::Day,
        Field::Month,
        Field::EndMinute,
        Field::EndHour,
        Field::EndSecond,
        Field::PlateCount,
    ];

    /// Zero-based position of this field in the payload.
    pub const fn index(self) -> usize {
        match self {
            Field::ProgramName => 0,
            Field::Length => 1,
            Field::Width => 2,
            Field::Thickness => 3,
            Field::StartMinute => 4,
            Field::StartHour => 5,
            Field::StartSecond => 7,
            Field::Year => 8,
            Field::Day => 9,
            Field::Month => 10,
            Field::EndMinute => 11,
            Field::EndHour => 12,
            Field::EndSecond => 14,
            Field::PlateCount => 16,
        }
    }

    /// Field occupying `index`, or `None` for reserved and trailing positions.
    pub fn at(index: usize) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.index() == index)
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::ProgramName => "program_name",
            Field::Length => "length",
            Field::Width => "width",
            Field::Thickness => "thickness",
            Field::StartMinute => "start_minute",
            Field::StartHour => "start_hour",
            Field::StartSecond => "start_second",
            Field::Year => "year",
            Field::Day => "day",
            Field::Month => "month",
            Field::EndMinute => "end_minute",
            Field::EndHour => "end_hour",
            Field::EndSecond => "end_second",
            Field::PlateCount => "plate_count",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name(), self.index())
    }
}

/// Strip the first matching entry of [`PROGRAM_PREFIXES`] from `payload`.
///
/// At most one prefix is removed; a payload matching none is returned as-is.
pub fn strip_program_prefix(payload: &str) -> &str {
    PROGRAM_PREFIXES
        .iter()
        .find_map(|prefix| payload.strip_prefix(prefix))
        .unwrap_or(payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
