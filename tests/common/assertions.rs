//! Domain-specific assertion macros for sawlog harnesses.
//!
//! These add context to failures: which line was looked at and why it was
//! skipped, not just that the record count was off.

/// Assert that a line decodes to a record and return it.
///
/// ```rust
/// let record = assert_record!("PRG=ABC.1,...");
/// ```
#[macro_export]
macro_rules! assert_record {
    ($line:expr) => {{
        let line: &str = &$line;
        match sawlog::extract_line(line) {
            sawlog::LineOutcome::Record(record) => record,
            sawlog::LineOutcome::Skipped(reason) => panic!(
                "assert_record! failed: line was skipped\n  reason: {}\n  line:   {:?}",
                reason, line
            ),
        }
    }};
}

/// Assert that a line is skipped for the given [`sawlog::SkipKind`].
///
/// ```rust
/// assert_skipped!("[Header]", SkipKind::NoSeparator);
/// ```
#[macro_export]
macro_rules! assert_skipped {
    ($line:expr, $kind:expr) => {{
        let line: &str = &$line;
        let expected: sawlog::SkipKind = $kind;
        match sawlog::extract_line(line) {
            sawlog::LineOutcome::Skipped(reason) if reason.kind() == expected => reason,
            sawlog::LineOutcome::Skipped(reason) => panic!(
                "assert_skipped! failed:\n  expected: {:?}\n  actual:   {:?} ({})\n  line: {:?}",
                expected,
                reason.kind(),
                reason,
                line
            ),
            sawlog::LineOutcome::Record(record) => panic!(
                "assert_skipped! failed: expected {:?}, got a record\n  record: {:?}\n  line:   {:?}",
                expected, record, line
            ),
        }
    }};
}

/// Assert that an extraction's counters add up.
pub fn assert_summary_consistent(summary: &sawlog::ExtractionSummary) {
    assert_eq!(
        summary.lines,
        summary.records + summary.skipped(),
        "lines must equal records + skipped: {summary:?}"
    );
    assert_eq!(
        summary.skipped(),
        summary.non_data() + summary.rejected(),
        "skipped must equal non-data + rejected: {summary:?}"
    );
}
