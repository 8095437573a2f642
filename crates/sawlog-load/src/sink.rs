//! Persistence sinks — append-only destinations for [`CutRecord`] batches.
//!
//! A sink owns whatever handle it writes through; callers construct one and
//! pass it to the load run explicitly. Rows are never updated, and identity
//! plus load timestamp are assigned by the sink at append time.

use chrono::{DateTime, Utc};
use sawlog_core::CutRecord;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode row: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid table name {0:?}")]
    InvalidTable(String),
}

/// A persisted cut record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCut {
    pub id: u64,
    pub loaded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: CutRecord,
}

/// Append-only destination for extracted records.
pub trait RecordSink: Send {
    /// Append `batch`, stamping every row with `loaded_at`. Returns the number
    /// of rows written. An empty batch writes nothing.
    fn append_at(
        &mut self,
        batch: &[CutRecord],
        loaded_at: DateTime<Utc>,
    ) -> Result<usize, SinkError>;

    fn append(&mut self, batch: &[CutRecord]) -> Result<usize, SinkError> {
        self.append_at(batch, Utc::now())
    }
}

// ---------------------------------------------------------------------------
// In-memory table
// ---------------------------------------------------------------------------

/// Table held in memory. Ids start at 1.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Vec<StoredCut>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[StoredCut] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<StoredCut> {
        self.rows
    }
}

impl RecordSink for MemorySink {
    fn append_at(
        &mut self,
        batch: &[CutRecord],
        loaded_at: DateTime<Utc>,
    ) -> Result<usize, SinkError> {
        let first_id = self.rows.len() as u64 + 1;
        self.rows
            .extend(batch.iter().cloned().zip(first_id..).map(|(record, id)| StoredCut {
                id,
                loaded_at,
                record,
            }));
        Ok(batch.len())
    }
}

// ---------------------------------------------------------------------------
// JSON-lines table file
// ---------------------------------------------------------------------------

/// Table stored as one JSON object per line.
///
/// Reopening an existing file continues numbering after the rows already in
/// it.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
    next_id: u64,
}

impl JsonlSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let existing = match File::open(&path) {
            Ok(file) => count_rows(BufReader::new(file))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!(path = %path.display(), existing, "opened jsonl table");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            next_id: existing as u64 + 1,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every row of a JSON-lines table.
    pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<StoredCut>, SinkError> {
        let reader = BufReader::new(File::open(path)?);
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(&line)?);
        }
        Ok(rows)
    }
}

fn count_rows<R: BufRead>(reader: R) -> std::io::Result<usize> {
    let mut n = 0;
    for line in reader.lines() {
        if !line?.trim().is_empty() {
            n += 1;
        }
    }
    Ok(n)
}

/// JSON lines for `batch`, numbered from `first_id`.
fn encode_rows(
    first_id: u64,
    batch: &[CutRecord],
    loaded_at: DateTime<Utc>,
) -> Result<Vec<u8>, serde_json::Error> {
    let mut encoded = Vec::new();
    for (id, record) in (first_id..).zip(batch) {
        let row = StoredCut {
            id,
            loaded_at,
            record: record.clone(),
        };
        serde_json::to_writer(&mut encoded, &row)?;
        encoded.push(b'\n');
    }
    Ok(encoded)
}

impl RecordSink for JsonlSink {
    fn append_at(
        &mut self,
        batch: &[CutRecord],
        loaded_at: DateTime<Utc>,
    ) -> Result<usize, SinkError> {
        // Encode everything before touching the writer; no partial rows.
        let encoded = encode_rows(self.next_id, batch, loaded_at)?;
        self.writer.write_all(&encoded)?;
        self.writer.flush()?;
        self.next_id += batch.len() as u64;
        Ok(batch.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use pretty_assertions::assert_eq;

    fn cut(name: &str) -> CutRecord {
        CutRecord {
            raw_program_name: name.to_string(),
            job_key: sawlog_core::job_key(name).to_string(),
            process_date: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 5).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 20, 25).unwrap(),
            length_mm: 2440.0,
            width_mm: 1830.0,
            thickness_mm: 18.0,
            plate_count: 3,
        }
    }

    #[test]
    fn memory_ids_continue_across_appends() {
        let ts = Utc.with_ymd_and_hms(2025, 8, 15, 18, 0, 0).unwrap();
        let mut sink = MemorySink::new();
        assert_eq!(sink.append_at(&[cut("A.1"), cut("B.2")], ts).unwrap(), 2);
        assert_eq!(sink.append_at(&[], ts).unwrap(), 0);
        assert_eq!(sink.append_at(&[cut("C.3")], ts).unwrap(), 1);

        let ids: Vec<u64> = sink.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(sink.rows()[2].record.job_key, "C");
        assert!(sink.rows().iter().all(|r| r.loaded_at == ts));
    }

    #[test]
    fn jsonl_rows_read_back_and_numbering_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuts.jsonl");
        let ts = Utc.with_ymd_and_hms(2025, 8, 15, 18, 0, 0).unwrap();

        let mut sink = JsonlSink::open(&path).unwrap();
        sink.append_at(&[cut("A.1"), cut("B.2")], ts).unwrap();
        drop(sink);

        let mut sink = JsonlSink::open(&path).unwrap();
        sink.append_at(&[cut("C.3")], ts).unwrap();
        drop(sink);

        let rows = JsonlSink::read_rows(&path).unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(rows[0].record, cut("A.1"));
        assert_eq!(rows[2].loaded_at, ts);
    }

    #[test]
    fn batch_is_encoded_as_whole_lines() {
        let ts = Utc.with_ymd_and_hms(2025, 8, 15, 18, 0, 0).unwrap();
        let encoded = encode_rows(41, &[cut("A.1"), cut("B.2"), cut("C.3")], ts).unwrap();
        let text = String::from_utf8(encoded).unwrap();

        assert!(text.ends_with('\n'));
        let ids: Vec<u64> = text
            .lines()
            .map(|l| serde_json::from_str::<StoredCut>(l).unwrap().id)
            .collect();
        assert_eq!(ids, [41, 42, 43]);
        assert!(encode_rows(1, &[], ts).unwrap().is_empty());
    }

    #[test]
    fn jsonl_file_holds_exactly_the_appended_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuts.jsonl");
        let ts = Utc.with_ymd_and_hms(2025, 8, 15, 18, 0, 0).unwrap();

        let mut sink = JsonlSink::open(&path).unwrap();
        sink.append_at(&[cut("A.1"), cut("B.2")], ts).unwrap();
        // Flushed on append, readable while the sink is still open.
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk.lines().count(), 2);
        assert!(on_disk.ends_with('\n'));
        assert_eq!(sink.next_id, 3);
    }

    #[test]
    fn stored_row_is_flat_json() {
        let ts = Utc.with_ymd_and_hms(2025, 8, 15, 18, 0, 0).unwrap();
        let row = StoredCut {
            id: 7,
            loaded_at: ts,
            record: cut("W954ST1418.301"),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["job_key"], "W954ST1418");
        assert_eq!(json["process_date"], "2025-08-15");
        assert_eq!(json["start_time"], "10:00:05");
        assert_eq!(json["plate_count"], 3);
    }
}
