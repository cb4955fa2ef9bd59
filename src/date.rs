//! `YYMMDD` to epoch-day conversion.
//!
//! Two-digit years always land in 2000-2099. The result is the number of
//! days since 1970-01-01, which is what an Arrow `Date32` stores.

use crate::error::{KtonError, Result};

const EPOCH_YEAR: i32 = 1970;

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Length of `month` in `year`, or `None` when `month` is not 1-12.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if month == 2 && is_leap_year(year) {
        return Some(29);
    }
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    DAYS_IN_MONTH.get(index).copied()
}

/// Days from 1970-01-01 to a date already checked by [`parse_date`].
fn days_from_civil(year: i32, month: u32, day: u32) -> i32 {
    let mut days: i32 = (EPOCH_YEAR..year)
        .map(|y| if is_leap_year(y) { 366 } else { 365 })
        .sum();
    days += (1..month)
        .filter_map(|m| days_in_month(year, m))
        .map(|d| d as i32)
        .sum::<i32>();
    days + day as i32 - 1
}

/// Parse a six-digit `YYMMDD` field into days since 1970-01-01.
///
/// Fails with [`KtonError::InvalidDate`] on non-digits, a month outside
/// 1-12, or a day past the end of its month (`230229` is rejected).
pub fn parse_date(digits: &[u8]) -> Result<i32> {
    let invalid = || KtonError::InvalidDate {
        digits: crate::field::latin1(digits),
    };

    if digits.len() != 6 || !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let pair = |i: usize| u32::from(digits[i] - b'0') * 10 + u32::from(digits[i + 1] - b'0');

    let year = 2000 + pair(0) as i32;
    let month = pair(2);
    let day = pair(4);

    let Some(last_day) = days_in_month(year, month) else {
        return Err(invalid());
    };
    if day == 0 || day > last_day {
        return Err(invalid());
    }
    Ok(days_from_civil(year, month, day))
}
