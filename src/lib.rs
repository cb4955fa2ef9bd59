//! # kton-rs
//!
//! A decoder for KTON account statement files, the fixed-width bank
//! transaction log format, producing Apache Arrow record batches.
//!
//! ## Overview
//!
//! A KTON file is a sequence of text lines, each starting with a
//! three-byte record tag. This crate reads the basic transaction records
//! (`T10`) and ignores the rest:
//! - **Fixed-width fields**: 21 columns at fixed byte offsets, 188 bytes total
//! - **Typed conversion**: `YYMMDD` dates become epoch days, signed amounts
//!   become cents, reference numbers become integers
//! - **Filtering**: other record types and malformed `T10` lines are skipped
//! - **Batching**: records are appended column by column into batches of a
//!   fixed maximum size
//!
//! ## Example
//!
//! ```
//! use std::io::Cursor;
//! use kton_rs::{ScanConfig, decode_reader};
//!
//! let line = format!(
//!     "T10188000001{:18}2312312312312312291710{:35}{}A {:35}A{:14} {:20}{:8}0",
//!     "", "", "+000000000000012345", "", "", "00012300", ""
//! );
//! let input = format!("T00322100000000000\n{line}\n");
//!
//! let batches: Vec<_> = decode_reader(Cursor::new(input), ScanConfig::default())
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(batches.len(), 1);
//! assert_eq!(batches[0].num_rows(), 1);
//! ```

pub mod batch;
pub mod cursor;
pub mod date;
pub mod error;
pub mod field;
pub mod layout;
pub mod numeric;
pub mod record;
pub mod scan;

pub use batch::{BatchProducer, BatchResult, OutputBuffer, ScanStats};
pub use cursor::ScanCursor;
pub use date::parse_date;
pub use error::{KtonError, Result};
pub use field::slice;
pub use layout::{FieldKind, FieldSpec, LAYOUT, RECORD_TAG, RECORD_WIDTH, schema};
pub use numeric::{parse_amount, parse_reference};
pub use record::{FieldValue, TransactionRecord, decode, try_decode};
pub use scan::{
    DEFAULT_BATCH_SIZE, ReadKton, Scan, ScanConfig, ScanState, TableFunction, decode_reader,
    read_kton,
};
