//! sawlog-load — persistence sinks and the inbox load run for sawlog.
//!
//! Each sink is an append-only destination for extracted
//! [`sawlog_core::CutRecord`] batches. The inbox run drives extraction over a
//! directory of log files and hands the combined batch to one sink.

pub mod inbox;
pub mod sink;
pub mod sql;

pub use inbox::{run_inbox, run_inbox_at, FileReport, LoadError, LoadOutcome, LoadPlan, LoadReport};
pub use sink::{JsonlSink, MemorySink, RecordSink, SinkError, StoredCut};
pub use sql::SqlScriptSink;
