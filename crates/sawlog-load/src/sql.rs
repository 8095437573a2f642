//! SQL insert script output.
//!
//! Renders record batches as plain `INSERT` statements that can be run
//! against the reporting database by hand. Identity columns are left to the
//! database.

use crate::sink::{RecordSink, SinkError};
use chrono::{DateTime, Utc};
use sawlog_core::CutRecord;
use std::io::Write;

/// Column list of the cut table, in insert order.
pub const COLUMNS: [&str; 10] = [
    "nombre_optimizacion",
    "job_key",
    "fecha_proceso",
    "hora_inicio",
    "hora_fin",
    "largo_mm",
    "ancho_mm",
    "espesor_mm",
    "cantidad_placas",
    "fecha_carga",
];

/// Check that `table` is a bare or schema-qualified SQL identifier.
pub fn validate_table(table: &str) -> Result<(), SinkError> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|p| valid_part(p)) {
        Ok(())
    } else {
        Err(SinkError::InvalidTable(table.to_string()))
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn values_row(record: &CutRecord, loaded_at: &DateTime<Utc>) -> String {
    format!(
        "({}, {}, '{}', '{}', '{}', {}, {}, {}, {}, '{}')",
        quote(&record.raw_program_name),
        quote(&record.job_key),
        record.process_date.format("%Y-%m-%d"),
        record.start_time.format("%H:%M:%S"),
        record.end_time.format("%H:%M:%S"),
        record.length_mm,
        record.width_mm,
        record.thickness_mm,
        record.plate_count,
        loaded_at.format("%Y-%m-%d %H:%M:%S%:z"),
    )
}

/// Render `records` as `INSERT` statements of at most `batch_size` rows each.
///
/// `first_batch` numbers the batch comments, so consecutive calls can share
/// one script.
pub fn render_inserts(
    table: &str,
    records: &[CutRecord],
    loaded_at: DateTime<Utc>,
    batch_size: usize,
    first_batch: usize,
) -> String {
    let mut out = String::new();
    for (i, chunk) in records.chunks(batch_size.max(1)).enumerate() {
        out.push_str(&format!(
            "-- Batch {}\nINSERT INTO {table} (\n    {},\n    {}\n) VALUES\n",
            first_batch + i,
            COLUMNS[..5].join(", "),
            COLUMNS[5..].join(", "),
        ));
        let rows: Vec<String> = chunk.iter().map(|r| values_row(r, &loaded_at)).collect();
        out.push_str(&rows.join(",\n"));
        out.push_str("\n;\n\n");
    }
    out
}

/// Sink writing an insert script to any [`Write`].
pub struct SqlScriptSink<W: Write> {
    writer: W,
    table: String,
    batch_size: usize,
    batches_written: usize,
}

impl<W: Write> SqlScriptSink<W> {
    pub fn new(writer: W, table: impl Into<String>, batch_size: usize) -> Result<Self, SinkError> {
        let table = table.into();
        validate_table(&table)?;
        Ok(Self {
            writer,
            table,
            batch_size: batch_size.max(1),
            batches_written: 0,
        })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RecordSink for SqlScriptSink<W> {
    fn append_at(
        &mut self,
        batch: &[CutRecord],
        loaded_at: DateTime<Utc>,
    ) -> Result<usize, SinkError> {
        if batch.is_empty() {
            return Ok(0);
        }
        writeln!(self.writer, "-- sawlog insert script")?;
        writeln!(self.writer, "-- Loaded at: {}", loaded_at.to_rfc3339())?;
        writeln!(self.writer, "-- Total rows: {}", batch.len())?;
        writeln!(self.writer)?;
        let script = render_inserts(
            &self.table,
            batch,
            loaded_at,
            self.batch_size,
            self.batches_written + 1,
        );
        self.writer.write_all(script.as_bytes())?;
        self.writer.flush()?;
        self.batches_written += batch.len().div_ceil(self.batch_size);
        Ok(batch.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
