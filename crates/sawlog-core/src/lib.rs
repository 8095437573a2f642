//! sawlog-core — record extraction for panel-saw machine logs.
//!
//! This crate turns the saw controller's positional log lines into typed
//! [`CutRecord`] values. It does no I/O beyond reading its input and knows
//! nothing about where records end up.
//!
//! # Pipeline
//!
//! ```text
//! raw bytes ──► decode (utf-8 policy) ──► extract_line ──► LineOutcome
//!                                                      ├─► Record(CutRecord)
//!                                                      └─► Skipped(SkipReason)
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod types;

pub use error::ExtractError;
pub use extract::{extract, extract_line, job_key, outcomes, Extractor, InvalidUtf8};
pub use layout::{strip_program_prefix, Field, MIN_FIELDS};
pub use types::{
    CutRecord, Extraction, ExtractionSummary, LineOutcome, SkipKind, SkipReason, TimeSlot,
};
