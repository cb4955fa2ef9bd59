//! Numeric field parsers: signed amounts, reference numbers and the
//! `atoi`-style transaction number.

use crate::error::{KtonError, Result};
use crate::field::latin1;

/// Parse a signed amount field into minor currency units (cents).
///
/// The first byte is the sign: `+` is positive, anything else negative.
/// Every digit in the rest of the field is accumulated; other bytes are
/// ignored. There is no decimal point, so `+000000000000012345` is 12345.
pub fn parse_amount(field: &[u8]) -> i64 {
    let Some((&sign, digits)) = field.split_first() else {
        return 0;
    };
    let magnitude = digits
        .iter()
        .filter(|b| b.is_ascii_digit())
        .fold(0i64, |acc, &b| {
            acc.wrapping_mul(10).wrapping_add(i64::from(b - b'0'))
        });
    if sign == b'+' {
        magnitude
    } else {
        magnitude.wrapping_neg()
    }
}

/// Parse a reference number: digits up to the first blank, other bytes
/// before the blank ignored. No sign.
pub fn parse_reference(field: &[u8]) -> Result<i64> {
    let mut value: i64 = 0;
    for &b in field.iter().take_while(|&&b| b != b' ') {
        if b.is_ascii_digit() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(b - b'0')))
                .ok_or_else(|| KtonError::NumericOverflow {
                    digits: latin1(field),
                    target: "i64",
                })?;
        }
    }
    Ok(value)
}

/// Parse a transaction number the way C `atoi` does: skip leading
/// whitespace, take an optional sign, then digits up to the first
/// non-digit. No digits yields 0.
pub fn parse_integer32(field: &[u8]) -> Result<i32> {
    let start = field
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(field.len());
    let rest = &field[start..];

    let (negative, rest) = match rest.split_first() {
        Some((&b'-', tail)) => (true, tail),
        Some((&b'+', tail)) => (false, tail),
        _ => (false, rest),
    };

    let mut value: i64 = 0;
    for &b in rest.iter().take_while(|b| b.is_ascii_digit()) {
        value = value * 10 + i64::from(b - b'0');
        if value > i64::from(i32::MAX) + 1 {
            return Err(overflow_i32(field));
        }
    }
    let value = if negative { -value } else { value };
    i32::try_from(value).map_err(|_| overflow_i32(field))
}

fn overflow_i32(field: &[u8]) -> KtonError {
    KtonError::NumericOverflow {
        digits: latin1(field),
        target: "i32",
    }
}
