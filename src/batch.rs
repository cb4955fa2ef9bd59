//! Column-oriented output buffer and the batch producer that fills it.
//!
//! The producer pulls lines from a [`ScanCursor`], decodes them, and appends
//! accepted records to one Arrow builder per column until the batch is full
//! or the source runs dry. Lines that are not `T10` records, or that fail to
//! decode, are consumed and counted but never stop the scan.

use std::io::BufRead;
use std::sync::Arc;

use arrow_array::builder::{Date32Builder, Int32Builder, Int64Builder, StringBuilder};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{ArrowError, SchemaRef};
use tracing::{debug, trace};

use crate::cursor::ScanCursor;
use crate::error::Result;
use crate::layout::{FieldKind, LAYOUT, schema};
use crate::record::{FieldValue, TransactionRecord, try_decode};

/// Bytes reserved per row for each text column.
const TEXT_BYTES_PER_ROW: usize = 16;

enum ColumnBuilder {
    Utf8(StringBuilder),
    Int32(Int32Builder),
    Int64(Int64Builder),
    Date32(Date32Builder),
}

impl ColumnBuilder {
    fn for_kind(kind: FieldKind, capacity: usize) -> Self {
        match kind {
            FieldKind::Text | FieldKind::TrimmedText => ColumnBuilder::Utf8(
                StringBuilder::with_capacity(capacity, capacity * TEXT_BYTES_PER_ROW),
            ),
            FieldKind::Integer32 => ColumnBuilder::Int32(Int32Builder::with_capacity(capacity)),
            FieldKind::Integer64 | FieldKind::SignedAmount64 => {
                ColumnBuilder::Int64(Int64Builder::with_capacity(capacity))
            }
            FieldKind::Date => ColumnBuilder::Date32(Date32Builder::with_capacity(capacity)),
        }
    }

    fn append(&mut self, name: &str, value: FieldValue<'_>) -> Result<()> {
        match (self, value) {
            (ColumnBuilder::Utf8(b), FieldValue::Text(v)) => b.append_value(v),
            (ColumnBuilder::Int32(b), FieldValue::Int32(v)) => b.append_value(v),
            (ColumnBuilder::Int64(b), FieldValue::Int64(v)) => b.append_value(v),
            (ColumnBuilder::Date32(b), FieldValue::Date(v)) => b.append_value(v),
            (_, value) => {
                return Err(ArrowError::InvalidArgumentError(format!(
                    "column '{name}' cannot hold {value:?}"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Utf8(b) => Arc::new(b.finish()),
            ColumnBuilder::Int32(b) => Arc::new(b.finish()),
            ColumnBuilder::Int64(b) => Arc::new(b.finish()),
            ColumnBuilder::Date32(b) => Arc::new(b.finish()),
        }
    }
}

/// Rows of decoded records, stored column by column.
pub struct OutputBuffer {
    schema: SchemaRef,
    columns: Vec<ColumnBuilder>,
    len: usize,
}

impl OutputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let columns = LAYOUT
            .iter()
            .map(|f| ColumnBuilder::for_kind(f.kind, capacity))
            .collect();
        Self {
            schema: schema(),
            columns,
            len: 0,
        }
    }

    /// Add one row. Every column grows by exactly one value.
    pub fn append(&mut self, record: &TransactionRecord) -> Result<()> {
        for (c, builder) in self.columns.iter_mut().enumerate() {
            let value = record.value(c).ok_or_else(|| {
                ArrowError::InvalidArgumentError(format!("record has no column {c}"))
            })?;
            builder.append(LAYOUT[c].name, value)?;
        }
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop the buffered rows, leaving every column empty.
    pub fn clear(&mut self) {
        for builder in &mut self.columns {
            builder.finish();
        }
        self.len = 0;
    }

    /// Hand the buffered rows over as a batch and start a fresh one.
    pub fn finish(&mut self) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = self.columns.iter_mut().map(ColumnBuilder::finish).collect();
        self.len = 0;
        Ok(RecordBatch::try_new(self.schema.clone(), arrays)?)
    }
}

/// Outcome of one [`BatchProducer::fill_batch`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub rows_filled: usize,
    /// No further batches will be produced from this cursor.
    pub exhausted: bool,
    pub lines_read: u64,
    /// Lines consumed without producing a row.
    pub lines_skipped: u64,
}

/// Running totals over a whole scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub lines_read: u64,
    pub rows_emitted: u64,
    /// Lines with a record tag other than `T10`.
    pub lines_filtered: u64,
    /// `T10` lines that failed to decode.
    pub lines_rejected: u64,
}

/// Turns a line source into fixed-capacity Arrow batches.
pub struct BatchProducer {
    buffer: OutputBuffer,
    stats: ScanStats,
}

impl BatchProducer {
    pub fn new(batch_size: usize) -> Self {
        Self {
            buffer: OutputBuffer::with_capacity(batch_size),
            stats: ScanStats::default(),
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Fill one batch of at most `max_rows` rows from `cursor`.
    ///
    /// Stops when the batch is full or the source is exhausted. A partially
    /// filled batch is final for that call; `exhausted` tells the caller
    /// whether to come back for more. If reading fails, the rows gathered by
    /// this call are dropped and the next call starts an empty batch.
    pub fn fill_batch<R: BufRead>(
        &mut self,
        cursor: &mut ScanCursor<R>,
        max_rows: usize,
    ) -> Result<(RecordBatch, BatchResult)> {
        let mut result = BatchResult::default();
        let filled = self.fill_rows(cursor, max_rows, &mut result);
        self.stats.lines_read += result.lines_read;

        if let Err(e) = filled {
            debug!(rows = self.buffer.len(), error = %e, "discarding partial batch");
            self.buffer.clear();
            return Err(e);
        }
        result.exhausted = cursor.exhausted();
        self.stats.rows_emitted += result.rows_filled as u64;

        let batch = self.buffer.finish()?;
        debug!(
            rows = result.rows_filled,
            lines = result.lines_read,
            skipped = result.lines_skipped,
            exhausted = result.exhausted,
            "filled batch"
        );
        Ok((batch, result))
    }

    fn fill_rows<R: BufRead>(
        &mut self,
        cursor: &mut ScanCursor<R>,
        max_rows: usize,
        result: &mut BatchResult,
    ) -> Result<()> {
        while result.rows_filled < max_rows {
            let line_no = cursor.position() + 1;
            let decoded = match cursor.next_line() {
                Ok(Some(line)) => try_decode(line),
                Ok(None) => break,
                // Overlong line, already consumed.
                Err(e) if e.is_line_local() => Err(e),
                Err(e) => return Err(e),
            };
            result.lines_read += 1;

            match decoded {
                Ok(Some(record)) => {
                    self.buffer.append(&record)?;
                    result.rows_filled += 1;
                }
                Ok(None) => {
                    trace!(line = line_no, "skipping non-T10 line");
                    self.stats.lines_filtered += 1;
                    result.lines_skipped += 1;
                }
                Err(e) if e.is_line_local() => {
                    debug!(line = line_no, error = %e, "rejecting malformed line");
                    self.stats.lines_rejected += 1;
                    result.lines_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
