//! Inbox load run.
//!
//! Picks up every log file in the inbox directory, extracts them in parallel,
//! appends the combined batch to a sink and then moves the files into the
//! processed directory with a timestamp suffix. Nothing is written or moved
//! unless every file was read successfully.

use crate::sink::{RecordSink, SinkError};
use chrono::{DateTime, Local, Utc};
use sawlog_core::config::InputConfig;
use sawlog_core::{ExtractError, Extraction, ExtractionSummary, Extractor};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot list inbox {}: {source}", path.display())]
    Inbox {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("cannot move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Where to read from and where to put files afterwards.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub inbox: PathBuf,
    pub processed: PathBuf,
    pub extractor: Extractor,
}

impl From<&InputConfig> for LoadPlan {
    fn from(cfg: &InputConfig) -> Self {
        Self {
            inbox: cfg.inbox.clone(),
            processed: cfg.processed.clone(),
            extractor: cfg.extractor(),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The inbox held no files.
    EmptyInbox,
    /// Files were read but none contained a record; they stay in the inbox.
    NoRecords,
    Loaded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub summary: ExtractionSummary,
    pub moved_to: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub outcome: LoadOutcome,
    pub files: Vec<FileReport>,
    pub rows_inserted: usize,
}

impl LoadReport {
    /// Counters of every file folded together.
    pub fn total(&self) -> ExtractionSummary {
        let mut total = ExtractionSummary::default();
        for file in &self.files {
            total.merge(&file.summary);
        }
        total
    }
}

/// Run a load now.
pub async fn run_inbox<S>(plan: &LoadPlan, sink: &mut S) -> Result<LoadReport, LoadError>
where
    S: RecordSink + ?Sized,
{
    run_inbox_at(plan, sink, Local::now()).await
}

/// Run a load as of `now`, which stamps both the loaded rows and the names of
/// the moved files.
pub async fn run_inbox_at<S>(
    plan: &LoadPlan,
    sink: &mut S,
    now: DateTime<Local>,
) -> Result<LoadReport, LoadError>
where
    S: RecordSink + ?Sized,
{
    let paths = list_inbox(&plan.inbox).await?;
    if paths.is_empty() {
        tracing::warn!(inbox = %plan.inbox.display(), "no log files to process");
        return Ok(LoadReport {
            outcome: LoadOutcome::EmptyInbox,
            files: Vec::new(),
            rows_inserted: 0,
        });
    }

    let extractions = extract_all(plan.extractor, &paths).await?;

    let mut files = Vec::with_capacity(paths.len());
    let mut batch = Extraction::default();
    for (path, extraction) in paths.into_iter().zip(extractions) {
        tracing::info!(file = %path.display(), summary = %extraction.summary, "extracted");
        files.push(FileReport {
            path,
            summary: extraction.summary.clone(),
            moved_to: None,
        });
        batch.append(extraction);
    }

    if batch.records.is_empty() {
        tracing::warn!(files = files.len(), "log files held no valid records");
        return Ok(LoadReport {
            outcome: LoadOutcome::NoRecords,
            files,
            rows_inserted: 0,
        });
    }

    tracing::info!(records = batch.records.len(), "appending to sink");
    let rows_inserted = sink.append_at(&batch.records, now.with_timezone(&Utc))?;
    tracing::info!(rows_inserted, "sink append complete");

    tokio::fs::create_dir_all(&plan.processed)
        .await
        .map_err(|source| LoadError::Move {
            from: plan.inbox.clone(),
            to: plan.processed.clone(),
            source,
        })?;
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    for file in &mut files {
        let to = processed_path(&plan.processed, &file.path, &stamp);
        move_file(&file.path, &to).await?;
        tracing::info!(from = %file.path.display(), to = %to.display(), "moved");
        file.moved_to = Some(to);
    }

    Ok(LoadReport {
        outcome: LoadOutcome::Loaded,
        files,
        rows_inserted,
    })
}

/// Regular files directly inside `inbox`, sorted by name.
async fn list_inbox(inbox: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let inbox_err = |source| LoadError::Inbox {
        path: inbox.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(inbox).await.map_err(inbox_err)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(inbox_err)? {
        if entry.file_type().await.map_err(inbox_err)?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Extract every file on the blocking pool; results come back in `paths`
/// order regardless of completion order.
async fn extract_all(extractor: Extractor, paths: &[PathBuf]) -> Result<Vec<Extraction>, LoadError> {
    let mut set = JoinSet::new();
    for (i, path) in paths.iter().cloned().enumerate() {
        set.spawn_blocking(move || (i, extractor.extract_file(&path)));
    }

    let mut done: Vec<Option<Extraction>> = vec![None; paths.len()];
    while let Some(joined) = set.join_next().await {
        let (i, result) = joined?;
        done[i] = Some(result?);
    }
    Ok(done.into_iter().flatten().collect())
}

fn processed_path(processed: &Path, file: &Path, stamp: &str) -> PathBuf {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    processed.join(format!("{name}_{stamp}"))
}

async fn move_file(from: &Path, to: &Path) -> Result<(), LoadError> {
    let move_err = |source| LoadError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    // rename fails across filesystems; fall back to copy + remove.
    tokio::fs::copy(from, to).await.map_err(move_err)?;
    tokio::fs::remove_file(from).await.map_err(move_err)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
