//! Single-day availability computation.
//!
//! Given a day's operating window and its merged busy set, a cursor sweep
//! derives the complementary list of free windows. Windows are maximal and
//! never overlap a buffered busy block.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::interval::{pad_and_merge, BusyEvent, TimeInterval};

/// The bookable span of one calendar day in the operating zone.
///
/// The reference deployment runs a 24-hour window: `[local midnight, next
/// local midnight)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OperatingWindow {
    /// The full-day window for `date` in the operating zone.
    pub fn full_day(date: NaiveDate, tz: Tz) -> Result<Self> {
        let start = local_midnight(date, tz)?;
        let next = date
            .succ_opt()
            .ok_or_else(|| EngineError::InvalidLocalTime(format!("{date} has no next day")))?;
        let end = local_midnight(next, tz)?;
        Ok(Self { start, end })
    }
}

/// Resolve local midnight on `date` to a UTC instant.
///
/// Zones that skip midnight over a DST gap resolve to the earliest valid
/// local time that day; an ambiguous midnight resolves to its earlier
/// occurrence.
fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    for hour in 0..=3u32 {
        let local = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default());
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    Err(EngineError::InvalidLocalTime(format!("{date}T00:00:00")))
}

/// A free slot within an operating window; produced only, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Result of a single-day availability query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub available: bool,
    pub windows: Vec<FreeWindow>,
}

/// Compute the gaps between merged busy blocks within the window.
///
/// `merged` must be sorted and non-overlapping (the output of
/// [`pad_and_merge`]). The cursor starts at the window start; each busy
/// block emits the gap before it and advances the cursor past its end. A
/// trailing gap after the last block is emitted as the final window.
pub fn free_windows(window: OperatingWindow, merged: &[TimeInterval]) -> Vec<FreeWindow> {
    let mut windows = Vec::new();
    let mut cursor = window.start;

    for busy in merged {
        if cursor < busy.start {
            windows.push(FreeWindow {
                start: cursor,
                end: busy.start,
                duration_minutes: (busy.start - cursor).num_minutes(),
            });
        }
        cursor = cursor.max(busy.end);
    }

    if cursor < window.end {
        windows.push(FreeWindow {
            start: cursor,
            end: window.end,
            duration_minutes: (window.end - cursor).num_minutes(),
        });
    }

    windows
}

/// First free window that can hold `duration_minutes`.
///
/// # Errors
/// Returns [`EngineError::InsufficientWindow`] when no window on `date` is
/// long enough.
pub fn first_window_fitting<'a>(
    windows: &'a [FreeWindow],
    duration_minutes: u32,
    date: NaiveDate,
) -> Result<&'a FreeWindow> {
    windows
        .iter()
        .find(|w| w.duration_minutes >= i64::from(duration_minutes))
        .ok_or(EngineError::InsufficientWindow {
            date,
            duration_minutes,
        })
}

/// Free windows for one calendar day, from that day's raw busy feed.
///
/// Every busy event is buffered and merged first; `available` is true iff
/// at least one free window remains. This is the display path -- coexistence
/// filtering (long custodial sittings) is applied by the multi-day scanner
/// and the recurrence expander, not here.
pub fn check_single_day(
    date: NaiveDate,
    busy: &[BusyEvent],
    config: &EngineConfig,
) -> Result<DayAvailability> {
    let window = OperatingWindow::full_day(date, config.time_zone)?;
    let availability = day_availability(date, window, busy, config);
    debug!(
        %date,
        events = busy.len(),
        windows = availability.windows.len(),
        "single-day availability computed"
    );
    Ok(availability)
}

/// Shared day computation: buffer, merge, sweep.
pub(crate) fn day_availability(
    date: NaiveDate,
    window: OperatingWindow,
    busy: &[BusyEvent],
    config: &EngineConfig,
) -> DayAvailability {
    let merged = pad_and_merge(busy, window.start, window.end, config.buffer_minutes);
    let windows = free_windows(window, &merged);
    DayAvailability {
        date,
        available: !windows.is_empty(),
        windows,
    }
}

/// UTC instant for `date + time` in the operating zone.
pub(crate) fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>> {
    let local = date.and_time(time);
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| EngineError::InvalidLocalTime(local.to_string()))
}

// Minute-granular duration helper shared by conflict/recurrence paths.
pub(crate) fn minutes(n: u32) -> Duration {
    Duration::minutes(i64::from(n))
}
