//! sawlog — panel-saw machine log extractor and loader.
//!
//! Re-exports the workspace crates so integration tests and the binary can
//! import everything from one place.
//!
//! # Architecture
//!
//! ```text
//! log files ──► Extractor ──► Extraction ──► RecordSink
//!  (inbox)      (core)        (records +     (memory / jsonl / sql)
//!                              summary)
//! ```
//!
//! Files are extracted in parallel on the blocking pool; the combined batch
//! is appended once, then the files are moved out of the inbox.

pub use sawlog_core::*;
pub use sawlog_load as load;
