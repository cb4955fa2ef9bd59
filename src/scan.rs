//! Host-facing table function: schema declaration, scan initialization and
//! batch fill.
//!
//! A query engine drives a scan in three steps. It asks for the schema, binds
//! a source path, then calls [`TableFunction::fill`] until a batch comes back
//! marked exhausted. [`ReadKton`] implements that protocol without tying it
//! to any particular engine, and [`Scan`] wraps it as an iterator for
//! callers that just want the batches.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use tracing::info;

use crate::batch::{BatchProducer, BatchResult, ScanStats};
use crate::cursor::{ScanCursor, open_source};
use crate::error::{KtonError, Result};
use crate::layout::{FieldKind, columns, schema};

/// Default rows per batch, one DuckDB vector.
pub const DEFAULT_BATCH_SIZE: usize = 2048;

/// Scan settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub batch_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ScanConfig {
    pub fn with_batch_size(batch_size: usize) -> Result<Self> {
        let config = Self { batch_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(KtonError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The three entry points a host engine calls.
pub trait TableFunction {
    /// What `bind` hands to `init`.
    type BindData;
    /// Per-scan mutable state.
    type State;

    /// Output columns, independent of any data.
    fn schema(&self) -> SchemaRef;

    /// Open the source. Errors here are reported to the user at bind time.
    fn bind(&self, path: &Path) -> Result<Self::BindData>;

    /// Create fresh scan state over bound data.
    fn init(&self, bind: Self::BindData) -> Result<Self::State>;

    /// Produce the next batch.
    fn fill(&self, state: &mut Self::State) -> Result<(RecordBatch, BatchResult)>;
}

/// `read_kton(path)`: scans a KTON file for `T10` transaction records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadKton {
    config: ScanConfig,
}

/// An opened source, ready for [`ReadKton::init`].
pub struct BoundSource<R> {
    path: PathBuf,
    reader: R,
}

impl<R> BoundSource<R> {
    pub fn new(path: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            path: path.into(),
            reader,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// State of one scan: its cursor and the producer filling its batches.
pub struct ScanState<R> {
    path: PathBuf,
    cursor: ScanCursor<R>,
    producer: BatchProducer,
    batch_size: usize,
    done: bool,
}

impl<R: BufRead> ScanState<R> {
    pub fn stats(&self) -> ScanStats {
        self.producer.stats()
    }

    /// Lines consumed so far.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn fill(&mut self) -> Result<(RecordBatch, BatchResult)> {
        let (batch, result) = self.producer.fill_batch(&mut self.cursor, self.batch_size)?;
        if result.exhausted && !self.done {
            self.done = true;
            let stats = self.producer.stats();
            info!(
                path = %self.path.display(),
                lines = stats.lines_read,
                rows = stats.rows_emitted,
                filtered = stats.lines_filtered,
                rejected = stats.lines_rejected,
                "scan complete"
            );
        }
        Ok((batch, result))
    }
}

impl ReadKton {
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> ScanConfig {
        self.config
    }

    /// Column names and semantic types, in emitted order.
    pub fn columns(&self) -> Vec<(&'static str, FieldKind)> {
        columns()
    }

    /// Start a scan over an already open reader.
    pub fn init_reader<R: BufRead>(&self, bind: BoundSource<R>) -> ScanState<R> {
        info!(path = %bind.path.display(), batch_size = self.config.batch_size, "scan opened");
        ScanState {
            path: bind.path,
            cursor: ScanCursor::new(bind.reader),
            producer: BatchProducer::new(self.config.batch_size),
            batch_size: self.config.batch_size,
            done: false,
        }
    }

    /// Iterate over every batch of a bound source.
    pub fn scan<R: BufRead>(&self, bind: BoundSource<R>) -> Scan<R> {
        Scan {
            state: self.init_reader(bind),
        }
    }
}

impl TableFunction for ReadKton {
    type BindData = BoundSource<BufReader<File>>;
    type State = ScanState<BufReader<File>>;

    fn schema(&self) -> SchemaRef {
        schema()
    }

    fn bind(&self, path: &Path) -> Result<Self::BindData> {
        let reader = open_source(path)?;
        Ok(BoundSource::new(path, reader))
    }

    fn init(&self, bind: Self::BindData) -> Result<Self::State> {
        Ok(self.init_reader(bind))
    }

    fn fill(&self, state: &mut Self::State) -> Result<(RecordBatch, BatchResult)> {
        state.fill()
    }
}

/// Batches of one scan, ending after the batch that exhausts the source.
///
/// The final batch may be empty when the row count is a multiple of the
/// batch size; it is skipped rather than yielded.
pub struct Scan<R> {
    state: ScanState<R>,
}

impl<R: BufRead> Scan<R> {
    pub fn stats(&self) -> ScanStats {
        self.state.stats()
    }

    pub fn position(&self) -> u64 {
        self.state.position()
    }
}

impl<R: BufRead> Iterator for Scan<R> {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_done() {
            return None;
        }
        match self.state.fill() {
            Ok((batch, result)) => {
                if result.exhausted && batch.num_rows() == 0 {
                    None
                } else {
                    Some(Ok(batch))
                }
            }
            Err(e) => {
                self.state.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Open `path` and iterate over its `T10` records in batches.
pub fn read_kton(path: impl AsRef<Path>, config: ScanConfig) -> Result<Scan<BufReader<File>>> {
    let function = ReadKton::new(config)?;
    let bind = function.bind(path.as_ref())?;
    Ok(function.scan(bind))
}

/// Iterate over the `T10` records of any buffered reader.
pub fn decode_reader<R: BufRead>(reader: R, config: ScanConfig) -> Result<Scan<R>> {
    let function = ReadKton::new(config)?;
    Ok(function.scan(BoundSource::new("<reader>", reader)))
}
