//! Decomposition of epoch-millisecond timestamps into calendar attributes.
//!
//! The source logs record play times as integer milliseconds since the Unix
//! epoch. The time dimension and the songplay fact table both need those
//! timestamps expanded into calendar fields, and every derived field must be
//! computed from the *same* instant interpretation. This module standardizes
//! on UTC for all fields:
//!
//! - `start_time` is an RFC3339 UTC string with millisecond precision
//!   (for example `2018-11-12T02:37:38.796Z`).
//! - `week` is the ISO 8601 week number, kept as a string to match the
//!   historical column type.
//! - `weekday` counts from Monday, so Monday is 0 and Sunday is 6.
//!
//! Note that `year` is the calendar year while `week` is the ISO week
//! number; around New Year these can disagree (an ISO-week-year concern the
//! downstream schema has never modeled).

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Timelike, Utc};
use snafu::{Backtrace, prelude::*};

/// Result alias for calendar decomposition.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors produced when a raw timestamp cannot be decomposed.
///
/// These are record-level faults: callers are expected to skip and log the
/// offending record rather than abort the run.
#[derive(Debug, Snafu)]
pub enum CalendarError {
    /// The timestamp is negative (before the Unix epoch).
    #[snafu(display("Timestamp {ts} ms precedes the Unix epoch"))]
    PreEpoch {
        /// The offending raw timestamp in milliseconds.
        ts: i64,
        /// The backtrace captured when the error occurred.
        backtrace: Backtrace,
    },

    /// The timestamp is outside the range chrono can represent.
    #[snafu(display("Timestamp {ts} ms is outside the representable calendar range"))]
    OutOfRange {
        /// The offending raw timestamp in milliseconds.
        ts: i64,
        /// The backtrace captured when the error occurred.
        backtrace: Backtrace,
    },
}

/// Calendar attributes derived from a single epoch-millisecond timestamp.
///
/// All fields describe the same UTC instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarParts {
    /// RFC3339 UTC rendering with millisecond precision and `Z` suffix.
    pub start_time: String,
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// ISO 8601 week number rendered as a string.
    pub week: String,
    /// Month of year, 1-12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Day of week where Monday is 0 and Sunday is 6.
    pub weekday: u32,
}

/// Convert an epoch-millisecond timestamp into a UTC [`DateTime`].
///
/// Rejects negative timestamps and values chrono cannot represent.
pub fn datetime_from_millis(ts: i64) -> CalendarResult<DateTime<Utc>> {
    ensure!(ts >= 0, PreEpochSnafu { ts });

    Utc.timestamp_millis_opt(ts)
        .single()
        .context(OutOfRangeSnafu { ts })
}

/// Decompose an epoch-millisecond timestamp into [`CalendarParts`].
///
/// Pure and total for any non-negative timestamp within chrono's range.
/// Every field is derived from the same UTC instant.
pub fn decompose_millis(ts: i64) -> CalendarResult<CalendarParts> {
    let dt = datetime_from_millis(ts)?;

    Ok(CalendarParts {
        start_time: dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        hour: dt.hour(),
        day: dt.day(),
        week: dt.iso_week().week().to_string(),
        month: dt.month(),
        year: dt.year(),
        weekday: dt.weekday().num_days_from_monday(),
    })
}
