//! The fixed layout of a KTON basic transaction record (`T10`).
//!
//! [`LAYOUT`] is the single source of truth for both the emitted schema and
//! the byte ranges the decoder reads. It is declared in emitted column
//! order; `transaction_amount` comes before `transaction_code` even though
//! its bytes sit later in the line.

use std::sync::{Arc, LazyLock};

use arrow_schema::{DataType, Field, Schema, SchemaRef};

/// Record-type tag that marks a basic transaction line.
pub const RECORD_TAG: &[u8; 3] = b"T10";

/// Number of bytes a `T10` line must have to cover every field.
pub const RECORD_WIDTH: usize = 188;

/// Semantic type of a layout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Raw text, kept byte for byte.
    Text,
    /// Text with trailing spaces removed.
    TrimmedText,
    /// `atoi`-style signed 32-bit integer.
    Integer32,
    /// Unsigned digit run up to the first blank, as 64-bit integer.
    Integer64,
    /// Sign byte followed by a digit run of minor currency units.
    SignedAmount64,
    /// `YYMMDD` calendar date, as days since 1970-01-01.
    Date,
}

impl FieldKind {
    /// Arrow type used for columns of this kind.
    pub fn data_type(self) -> DataType {
        match self {
            FieldKind::Text | FieldKind::TrimmedText => DataType::Utf8,
            FieldKind::Integer32 => DataType::Int32,
            FieldKind::Integer64 | FieldKind::SignedAmount64 => DataType::Int64,
            FieldKind::Date => DataType::Date32,
        }
    }

    /// Whether trailing spaces are stripped on extraction.
    pub fn trims(self) -> bool {
        matches!(self, FieldKind::TrimmedText)
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::TrimmedText => "trimmed-text",
            FieldKind::Integer32 => "integer32",
            FieldKind::Integer64 => "integer64",
            FieldKind::SignedAmount64 => "signed-amount64",
            FieldKind::Date => "date",
        }
    }
}

/// One column of the layout: where it lives in the line and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// 0-based byte offset.
    pub offset: usize,
    pub len: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, offset: usize, len: usize, kind: FieldKind) -> Self {
        Self {
            name,
            offset,
            len,
            kind,
        }
    }

    /// Exclusive end offset.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Position of each column in [`LAYOUT`].
pub mod col {
    pub const MATERIAL_CODE: usize = 0;
    pub const RECORD_NUMBER: usize = 1;
    pub const RECORD_LENGTH: usize = 2;
    pub const TRANSACTION_NUMBER: usize = 3;
    pub const FILING_ID: usize = 4;
    pub const BOOKING_DATE: usize = 5;
    pub const VALUE_DATE: usize = 6;
    pub const PAYMENT_DATE: usize = 7;
    pub const TRANSACTION_AMOUNT: usize = 8;
    pub const TRANSACTION_CODE: usize = 9;
    pub const ENTRY_NODE_CODE: usize = 10;
    pub const NARRATIVE_TEXT: usize = 11;
    pub const RECEIPT_CODE: usize = 12;
    pub const TRANSFER_TYPE: usize = 13;
    pub const PAYEE_PAYER_NAME: usize = 14;
    pub const PAYEE_PAYER_NAME_SOURCE: usize = 15;
    pub const PAYEE_ACCOUNT_NUMBER: usize = 16;
    pub const PAYEE_ACCOUNT_CHANGE_INFO: usize = 17;
    pub const REFERENCE: usize = 18;
    pub const FORM_NUMBER: usize = 19;
    pub const LEVEL_ID: usize = 20;
}

/// Number of columns in a decoded record.
pub const FIELD_COUNT: usize = 21;

/// The `T10` layout in emitted column order.
pub const LAYOUT: [FieldSpec; FIELD_COUNT] = [
    FieldSpec::new("material_code", 0, 1, FieldKind::Text),
    FieldSpec::new("record_number", 1, 2, FieldKind::Text),
    FieldSpec::new("record_length", 3, 3, FieldKind::Text),
    FieldSpec::new("transaction_number", 6, 6, FieldKind::Integer32),
    FieldSpec::new("filing_id", 12, 18, FieldKind::Text),
    FieldSpec::new("booking_date", 30, 6, FieldKind::Date),
    FieldSpec::new("value_date", 36, 6, FieldKind::Date),
    FieldSpec::new("payment_date", 42, 6, FieldKind::Date),
    FieldSpec::new("transaction_amount", 87, 19, FieldKind::SignedAmount64),
    FieldSpec::new("transaction_code", 48, 1, FieldKind::Text),
    FieldSpec::new("entry_node_code", 49, 3, FieldKind::Text),
    FieldSpec::new("narrative_text", 52, 35, FieldKind::TrimmedText),
    FieldSpec::new("receipt_code", 106, 1, FieldKind::Text),
    FieldSpec::new("transfer_type", 107, 1, FieldKind::Text),
    FieldSpec::new("payee_payer_name", 108, 35, FieldKind::TrimmedText),
    FieldSpec::new("payee_payer_name_source", 143, 1, FieldKind::Text),
    FieldSpec::new("payee_account_number", 144, 14, FieldKind::TrimmedText),
    FieldSpec::new("payee_account_change_info", 158, 1, FieldKind::Text),
    FieldSpec::new("reference", 159, 20, FieldKind::Integer64),
    FieldSpec::new("form_number", 179, 8, FieldKind::TrimmedText),
    FieldSpec::new("level_id", 187, 1, FieldKind::Text),
];

/// The same fields ordered by where they sit in the line.
pub fn layout_by_offset() -> Vec<FieldSpec> {
    let mut fields = LAYOUT.to_vec();
    fields.sort_by_key(|f| f.offset);
    fields
}

/// Ordered `(name, kind)` pairs, as handed to a host at bind time.
pub fn columns() -> Vec<(&'static str, FieldKind)> {
    LAYOUT.iter().map(|f| (f.name, f.kind)).collect()
}

static SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    let fields: Vec<Field> = LAYOUT
        .iter()
        .map(|f| Field::new(f.name, f.kind.data_type(), false))
        .collect();
    Arc::new(Schema::new(fields))
});

/// Arrow schema of a decoded batch. Built once and shared.
pub fn schema() -> SchemaRef {
    SCHEMA.clone()
}
