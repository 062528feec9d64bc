// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::MembershipDuration;
use time::{Date, Month};

/// The ISO 8601 calendar-date format used throughout the system.
const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'_>] =
    time::macros::format_description!("[year]-[month]-[day]");

/// Parses an ISO 8601 calendar date (e.g., "2026-03-15").
///
/// # Arguments
///
/// * `value` - The date string to parse
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid
/// ISO 8601 calendar date.
pub fn parse_iso_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, DATE_FORMAT).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}

/// Computes a membership end date from a start date and duration.
///
/// This is calendar-aware month/year addition, not a fixed day count:
/// `2024-01-15` plus one year is exactly `2025-01-15`, and `2024-01-31`
/// plus six months clamps to `2024-07-31` while `2025-08-31` plus six
/// months clamps to `2026-02-28`.
///
/// # Arguments
///
/// * `start_date` - The membership start date
/// * `duration` - The membership duration
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if the resulting date
/// cannot be represented.
pub fn compute_end_date(
    start_date: Date,
    duration: MembershipDuration,
) -> Result<Date, DomainError> {
    add_calendar_months(start_date, duration.months())
}

/// Adds whole calendar months to a date, clamping the day to the length of
/// the target month.
fn add_calendar_months(date: Date, months: u32) -> Result<Date, DomainError> {
    let overflow_error = || DomainError::DateArithmeticOverflow {
        operation: format!("adding {months} months to {date}"),
    };

    // Zero-based month arithmetic so the year carry is a plain division.
    let month_index: i64 = i64::from(u8::from(date.month())) - 1 + i64::from(months);
    let year: i32 = i32::try_from(i64::from(date.year()) + month_index.div_euclid(12))
        .map_err(|_| overflow_error())?;
    let month: Month = Month::try_from(
        u8::try_from(month_index.rem_euclid(12) + 1).map_err(|_| overflow_error())?,
    )
    .map_err(|_| overflow_error())?;

    let day: u8 = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).map_err(|_| overflow_error())
}
