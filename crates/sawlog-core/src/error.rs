//! Errors that abort a whole extraction.
//!
//! Bad lines never show up here; they are reported as
//! [`SkipReason`](crate::SkipReason) values instead.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ExtractError::Open { path, .. } | ExtractError::Read { path, .. } => path,
        }
    }
}
