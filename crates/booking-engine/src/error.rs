//! Error types for booking-engine operations.
//!
//! `InvalidRange`, `TimeConflict`, and `InsufficientWindow` are expected
//! scheduling verdicts the caller matches on; the remaining variants are
//! hard input errors (malformed intervals, zero durations, bad specs).

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("time conflict with booking {booking_id} ({start} - {end})")]
    TimeConflict {
        booking_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("no free window of at least {duration_minutes} minutes on {date}")]
    InsufficientWindow {
        date: NaiveDate,
        duration_minutes: u32,
    },

    #[error("invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("invalid duration: {0} minutes")]
    InvalidDuration(u32),

    #[error("invalid recurrence spec: {0}")]
    InvalidRecurrence(String),

    #[error("local time {0} does not exist in the operating zone")]
    InvalidLocalTime(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
