//! Decoded `T10` transaction records.
//!
//! A KTON stream interleaves several record types (batch headers, sums,
//! other transaction kinds). Only lines tagged `T10` are decoded; every
//! other line is filtered out without being treated as an error.

use crate::date::parse_date;
use crate::error::Result;
use crate::field::{latin1, slice_bytes};
use crate::layout::{FieldSpec, LAYOUT, RECORD_TAG, col};
use crate::numeric::{parse_amount, parse_integer32, parse_reference};

/// One basic transaction, fully typed.
///
/// Dates are days since 1970-01-01 and `transaction_amount` is in cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub material_code: String,
    pub record_number: String,
    pub record_length: String,
    pub transaction_number: i32,
    pub filing_id: String,
    pub booking_date: i32,
    pub value_date: i32,
    pub payment_date: i32,
    pub transaction_amount: i64,
    pub transaction_code: String,
    pub entry_node_code: String,
    pub narrative_text: String,
    pub receipt_code: String,
    pub transfer_type: String,
    pub payee_payer_name: String,
    pub payee_payer_name_source: String,
    pub payee_account_number: String,
    pub payee_account_change_info: String,
    pub reference: i64,
    pub form_number: String,
    pub level_id: String,
}

/// A borrowed view of one column of a [`TransactionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int32(i32),
    Int64(i64),
    /// Days since 1970-01-01.
    Date(i32),
}

impl TransactionRecord {
    /// Value of column `c`, in [`LAYOUT`] order.
    ///
    /// Returns `None` past the last column.
    pub fn value(&self, c: usize) -> Option<FieldValue<'_>> {
        use FieldValue::{Date, Int32, Int64, Text};
        let v = match c {
            col::MATERIAL_CODE => Text(&self.material_code),
            col::RECORD_NUMBER => Text(&self.record_number),
            col::RECORD_LENGTH => Text(&self.record_length),
            col::TRANSACTION_NUMBER => Int32(self.transaction_number),
            col::FILING_ID => Text(&self.filing_id),
            col::BOOKING_DATE => Date(self.booking_date),
            col::VALUE_DATE => Date(self.value_date),
            col::PAYMENT_DATE => Date(self.payment_date),
            col::TRANSACTION_AMOUNT => Int64(self.transaction_amount),
            col::TRANSACTION_CODE => Text(&self.transaction_code),
            col::ENTRY_NODE_CODE => Text(&self.entry_node_code),
            col::NARRATIVE_TEXT => Text(&self.narrative_text),
            col::RECEIPT_CODE => Text(&self.receipt_code),
            col::TRANSFER_TYPE => Text(&self.transfer_type),
            col::PAYEE_PAYER_NAME => Text(&self.payee_payer_name),
            col::PAYEE_PAYER_NAME_SOURCE => Text(&self.payee_payer_name_source),
            col::PAYEE_ACCOUNT_NUMBER => Text(&self.payee_account_number),
            col::PAYEE_ACCOUNT_CHANGE_INFO => Text(&self.payee_account_change_info),
            col::REFERENCE => Int64(self.reference),
            col::FORM_NUMBER => Text(&self.form_number),
            col::LEVEL_ID => Text(&self.level_id),
            _ => return None,
        };
        Some(v)
    }
}

/// Whether `line` carries the `T10` tag.
pub fn is_transaction_line(line: &[u8]) -> bool {
    line.starts_with(RECORD_TAG)
}

/// Remove a trailing `\n` or `\r\n`.
pub fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Decode one line, returning `None` for anything that is not a usable
/// `T10` record.
pub fn decode(line: &[u8]) -> Option<TransactionRecord> {
    try_decode(line).ok().flatten()
}

/// Decode one line.
///
/// `Ok(None)` means the line is some other record type. An error means the
/// line is tagged `T10` but is too short or has a bad date or number; no
/// partial record is produced in that case.
pub fn try_decode(line: &[u8]) -> Result<Option<TransactionRecord>> {
    let line = strip_line_ending(line);
    if !is_transaction_line(line) {
        return Ok(None);
    }

    let raw = |c: usize| column_bytes(line, c);
    let text = |c: usize| column_bytes(line, c).map(latin1);

    // Reject short lines before any conversion runs.
    raw(col::LEVEL_ID)?;

    Ok(Some(TransactionRecord {
        material_code: text(col::MATERIAL_CODE)?,
        record_number: text(col::RECORD_NUMBER)?,
        record_length: text(col::RECORD_LENGTH)?,
        transaction_number: parse_integer32(raw(col::TRANSACTION_NUMBER)?)?,
        filing_id: text(col::FILING_ID)?,
        booking_date: parse_date(raw(col::BOOKING_DATE)?)?,
        value_date: parse_date(raw(col::VALUE_DATE)?)?,
        payment_date: parse_date(raw(col::PAYMENT_DATE)?)?,
        transaction_amount: parse_amount(raw(col::TRANSACTION_AMOUNT)?),
        transaction_code: text(col::TRANSACTION_CODE)?,
        entry_node_code: text(col::ENTRY_NODE_CODE)?,
        narrative_text: text(col::NARRATIVE_TEXT)?,
        receipt_code: text(col::RECEIPT_CODE)?,
        transfer_type: text(col::TRANSFER_TYPE)?,
        payee_payer_name: text(col::PAYEE_PAYER_NAME)?,
        payee_payer_name_source: text(col::PAYEE_PAYER_NAME_SOURCE)?,
        payee_account_number: text(col::PAYEE_ACCOUNT_NUMBER)?,
        payee_account_change_info: text(col::PAYEE_ACCOUNT_CHANGE_INFO)?,
        reference: parse_reference(raw(col::REFERENCE)?)?,
        form_number: text(col::FORM_NUMBER)?,
        level_id: text(col::LEVEL_ID)?,
    }))
}

fn column_bytes(line: &[u8], c: usize) -> Result<&[u8]> {
    let FieldSpec {
        offset, len, kind, ..
    } = LAYOUT[c];
    slice_bytes(line, offset, len, kind.trims())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::KtonError;
    use crate::layout::RECORD_WIDTH;

    /// Build a 188-byte `T10` line field by field.
    pub(crate) struct LineBuilder {
        bytes: Vec<u8>,
    }

    impl LineBuilder {
        pub(crate) fn new() -> Self {
            let mut b = Self {
                bytes: vec![b' '; RECORD_WIDTH],
            };
            b.set(col::MATERIAL_CODE, "T")
                .set(col::RECORD_NUMBER, "10")
                .set(col::RECORD_LENGTH, "188")
                .set(col::TRANSACTION_NUMBER, "000001")
                .set(col::FILING_ID, "231231123456789012")
                .set(col::BOOKING_DATE, "231231")
                .set(col::VALUE_DATE, "231231")
                .set(col::PAYMENT_DATE, "231229")
                .set(col::TRANSACTION_CODE, "1")
                .set(col::ENTRY_NODE_CODE, "710")
                .set(col::NARRATIVE_TEXT, "TILISIIRTO")
                .set(col::TRANSACTION_AMOUNT, "+000000000000012345")
                .set(col::RECEIPT_CODE, "A")
                .set(col::TRANSFER_TYPE, " ")
                .set(col::PAYEE_PAYER_NAME, "MEIKALAINEN MATTI")
                .set(col::PAYEE_PAYER_NAME_SOURCE, "A")
                .set(col::PAYEE_ACCOUNT_NUMBER, "FI2112345600")
                .set(col::PAYEE_ACCOUNT_CHANGE_INFO, " ")
                .set(col::REFERENCE, "00012300")
                .set(col::FORM_NUMBER, "FORM01")
                .set(col::LEVEL_ID, "0");
            b
        }

        /// Left-align `value` in the column, space padded.
        pub(crate) fn set(&mut self, c: usize, value: &str) -> &mut Self {
            let spec = LAYOUT[c];
            assert!(value.len() <= spec.len, "{} too long", spec.name);
            let field = &mut self.bytes[spec.offset..spec.end()];
            field.fill(b' ');
            field[..value.len()].copy_from_slice(value.as_bytes());
            self
        }

        pub(crate) fn build(&self) -> Vec<u8> {
            self.bytes.clone()
        }

        pub(crate) fn build_string(&self) -> String {
            latin1(&self.bytes)
        }
    }

    #[test]
    fn test_decode_full_record() {
        let line = LineBuilder::new().build();
        let rec = decode(&line).expect("valid T10 line");

        assert_eq!(rec.material_code, "T");
        assert_eq!(rec.record_number, "10");
        assert_eq!(rec.record_length, "188");
        assert_eq!(rec.transaction_number, 1);
        assert_eq!(rec.filing_id, "231231123456789012");
        assert_eq!(rec.booking_date, 19722);
        assert_eq!(rec.value_date, 19722);
        assert_eq!(rec.payment_date, 19720);
        assert_eq!(rec.transaction_amount, 12345);
        assert_eq!(rec.transaction_code, "1");
        assert_eq!(rec.entry_node_code, "710");
        assert_eq!(rec.narrative_text, "TILISIIRTO");
        assert_eq!(rec.receipt_code, "A");
        assert_eq!(rec.transfer_type, " ");
        assert_eq!(rec.payee_payer_name, "MEIKALAINEN MATTI");
        assert_eq!(rec.payee_payer_name_source, "A");
        assert_eq!(rec.payee_account_number, "FI2112345600");
        assert_eq!(rec.payee_account_change_info, " ");
        assert_eq!(rec.reference, 12300);
        assert_eq!(rec.form_number, "FORM01");
        assert_eq!(rec.level_id, "0");
    }

    #[test]
    fn test_untrimmed_text_keeps_padding() {
        let line = LineBuilder::new().set(col::FILING_ID, "ABC").build();
        let rec = decode(&line).unwrap();
        assert_eq!(rec.filing_id, format!("ABC{}", " ".repeat(15)));
    }

    #[test]
    fn test_other_record_types_filtered() {
        let mut line = LineBuilder::new().build();
        line[1] = b'0';
        line[2] = b'0';
        assert!(try_decode(&line).unwrap().is_none());
        assert!(try_decode(b"T11").unwrap().is_none());
        assert!(try_decode(b"").unwrap().is_none());
    }

    #[test]
    fn test_line_endings_stripped() {
        let mut line = LineBuilder::new().build();
        line.extend_from_slice(b"\r\n");
        let rec = decode(&line).unwrap();
        assert_eq!(rec.level_id, "0");

        assert_eq!(strip_line_ending(b"abc\n"), b"abc");
        assert_eq!(strip_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(strip_line_ending(b"abc"), b"abc");
    }

    #[test]
    fn test_short_line_rejected() {
        let line = LineBuilder::new().build();
        let err = try_decode(&line[..187]).unwrap_err();
        assert!(matches!(err, KtonError::OutOfRange { line_len: 187, .. }));
        assert!(decode(b"T10").is_none());
    }

    #[test]
    fn test_bad_date_rejects_whole_record() {
        let line = LineBuilder::new().set(col::VALUE_DATE, "230229").build();
        assert!(matches!(
            try_decode(&line),
            Err(KtonError::InvalidDate { .. })
        ));
        assert!(decode(&line).is_none());
    }

    #[test]
    fn test_negative_amount() {
        let line = LineBuilder::new()
            .set(col::TRANSACTION_AMOUNT, "-000000000000000250")
            .build();
        assert_eq!(decode(&line).unwrap().transaction_amount, -250);
    }

    #[test]
    fn test_value_follows_layout_kinds() {
        use crate::layout::{FIELD_COUNT, FieldKind};

        let rec = decode(&LineBuilder::new().build()).unwrap();
        for (c, spec) in LAYOUT.iter().enumerate() {
            let value = rec.value(c).unwrap();
            let ok = match spec.kind {
                FieldKind::Text | FieldKind::TrimmedText => matches!(value, FieldValue::Text(_)),
                FieldKind::Integer32 => matches!(value, FieldValue::Int32(_)),
                FieldKind::Integer64 | FieldKind::SignedAmount64 => {
                    matches!(value, FieldValue::Int64(_))
                }
                FieldKind::Date => matches!(value, FieldValue::Date(_)),
            };
            assert!(ok, "{} has {:?}", spec.name, value);
        }
        assert_eq!(rec.value(col::TRANSACTION_AMOUNT), Some(FieldValue::Int64(12345)));
        assert_eq!(rec.value(FIELD_COUNT), None);
    }

    #[test]
    fn test_longer_line_ignores_tail() {
        let mut line = LineBuilder::new().build();
        line.extend_from_slice(b"EXTRA TRAILING DATA");
        assert!(decode(&line).is_some());
    }
}
