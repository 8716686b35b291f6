//! Conflict detection and the coexistence policy.
//!
//! A time overlap alone does not reject a candidate: a long or multi-day
//! custodial sitting means a caretaker is present at the location all day,
//! and a short walk-type booking can physically coexist with it. Overlap is
//! tested against the booking's unbuffered bounds -- buffering applies to the
//! day-availability display path, not here.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::interval::{ServiceKind, TimeInterval};

/// Lifecycle state of a booking row. Only confirmed bookings are visible to
/// conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
    Completed,
}

/// Read model of an existing booking, used only for conflict checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingBooking {
    pub id: String,
    pub interval: TimeInterval,
    pub service_kind: ServiceKind,
    pub status: BookingStatus,
}

/// Whether a booking/event is an exempt custodial sitting: kind `Sitting`
/// and either spanning at least the configured hour threshold or crossing a
/// local calendar-day boundary.
///
/// A half-open interval ending exactly at local midnight does not count as
/// crossing into the next day.
pub fn is_exempt_custodial(
    kind: Option<ServiceKind>,
    interval: &TimeInterval,
    config: &EngineConfig,
) -> bool {
    if kind != Some(ServiceKind::Sitting) {
        return false;
    }
    let span = interval.end - interval.start;
    if span >= Duration::hours(config.custodial_min_hours) {
        return true;
    }
    let tz = config.time_zone;
    let start_date = interval.start.with_timezone(&tz).date_naive();
    let end_date = (interval.end.with_timezone(&tz) - Duration::nanoseconds(1)).date_naive();
    end_date > start_date
}

/// Test a candidate interval against the existing confirmed bookings.
///
/// Bookings in any state other than `Confirmed` are invisible. When
/// rescheduling, the booking's own row is excluded by `exclude_id` -- by
/// identity, never by time equality. Exempt custodial sittings
/// ([`is_exempt_custodial`]) never block.
///
/// # Errors
/// Returns [`EngineError::TimeConflict`] identifying the first non-exempt
/// overlapping booking.
pub fn detect_conflict(
    candidate: &TimeInterval,
    bookings: &[ExistingBooking],
    exclude_id: Option<&str>,
    config: &EngineConfig,
) -> Result<()> {
    for booking in bookings {
        if booking.status != BookingStatus::Confirmed {
            continue;
        }
        if exclude_id == Some(booking.id.as_str()) {
            continue;
        }
        if !candidate.overlaps(&booking.interval) {
            continue;
        }
        if is_exempt_custodial(Some(booking.service_kind), &booking.interval, config) {
            debug!(booking_id = %booking.id, "overlap with exempt custodial sitting, coexisting");
            continue;
        }
        return Err(EngineError::TimeConflict {
            booking_id: booking.id.clone(),
            start: booking.interval.start,
            end: booking.interval.end,
        });
    }
    Ok(())
}
