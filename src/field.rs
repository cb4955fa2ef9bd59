//! Bounds-checked fixed-width field extraction.
//!
//! Lines are treated as Latin-1 bytes: every byte is one character, so
//! offsets are byte offsets and text conversion never fails.

use crate::error::{KtonError, Result};

/// Byte range `offset..offset + len` of `line`, optionally without trailing
/// spaces. Leading spaces are kept.
pub fn slice_bytes(line: &[u8], offset: usize, len: usize, trim: bool) -> Result<&[u8]> {
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= line.len())
        .ok_or(KtonError::OutOfRange {
            offset,
            len,
            line_len: line.len(),
        })?;
    let bytes = &line[offset..end];
    if trim {
        Ok(trim_trailing_spaces(bytes))
    } else {
        Ok(bytes)
    }
}

/// Text of the field at `offset..offset + len`.
pub fn slice(line: &[u8], offset: usize, len: usize, trim: bool) -> Result<String> {
    slice_bytes(line, offset, len, trim).map(latin1)
}

/// Decode Latin-1 bytes.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ')
        .map_or(0, |last| last + 1);
    &bytes[..end]
}
