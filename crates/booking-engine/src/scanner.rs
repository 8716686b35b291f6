//! Multi-day conflict scanning.
//!
//! Walks each calendar day of an inclusive date range and tests whether any
//! buffered busy block (after coexistence filtering) intersects it. A
//! multi-day reservation occupies interior days in full, so availability
//! windows are computed for the boundary days only -- those are what matter
//! for arrival/departure negotiation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::availability::{day_availability, FreeWindow, OperatingWindow};
use crate::config::EngineConfig;
use crate::conflict::is_exempt_custodial;
use crate::error::{EngineError, Result};
use crate::interval::{pad_and_merge, BusyEvent};

/// One conflicting day in a multi-day scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub date: NaiveDate,
    pub reason: String,
}

/// Result of a multi-day availability query. All-or-nothing: any conflicting
/// day makes the whole span unavailable and suppresses window computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanAvailability {
    pub available: bool,
    pub conflicts: Vec<ConflictRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_day_windows: Option<Vec<FreeWindow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_day_windows: Option<Vec<FreeWindow>>,
}

/// Scan `[start_date, end_date]` (inclusive) against the busy feed.
///
/// Exempt custodial sittings are filtered out before the scan. Every day
/// with at least one intersecting buffered block becomes a
/// [`ConflictRecord`]; if any exist the result is unavailable with no
/// windows. Otherwise windows are computed for the start day and, if
/// different, the end day.
///
/// # Errors
/// Returns [`EngineError::InvalidRange`] when `end_date < start_date`,
/// before any scan.
pub fn check_multi_day(
    start_date: NaiveDate,
    end_date: NaiveDate,
    busy: &[BusyEvent],
    config: &EngineConfig,
) -> Result<SpanAvailability> {
    if end_date < start_date {
        return Err(EngineError::InvalidRange {
            start: start_date,
            end: end_date,
        });
    }

    let blocking: Vec<BusyEvent> = busy
        .iter()
        .filter(|e| !is_exempt_custodial(e.service_kind, &e.interval, config))
        .cloned()
        .collect();

    let mut conflicts = Vec::new();
    for date in start_date.iter_days().take_while(|d| *d <= end_date) {
        let window = OperatingWindow::full_day(date, config.time_zone)?;
        let merged = pad_and_merge(&blocking, window.start, window.end, config.buffer_minutes);
        trace!(%date, blocks = merged.len(), "scanned day");
        if let Some(block) = merged.first() {
            let tz = config.time_zone;
            conflicts.push(ConflictRecord {
                date,
                reason: format!(
                    "provider busy {} - {}",
                    block.start.with_timezone(&tz).format("%H:%M"),
                    block.end.with_timezone(&tz).format("%H:%M"),
                ),
            });
        }
    }

    debug!(
        %start_date,
        %end_date,
        conflicts = conflicts.len(),
        "multi-day scan complete"
    );

    if !conflicts.is_empty() {
        return Ok(SpanAvailability {
            available: false,
            conflicts,
            start_day_windows: None,
            end_day_windows: None,
        });
    }

    let start_window = OperatingWindow::full_day(start_date, config.time_zone)?;
    let start_day_windows =
        Some(day_availability(start_date, start_window, &blocking, config).windows);
    let end_day_windows = if end_date != start_date {
        let end_window = OperatingWindow::full_day(end_date, config.time_zone)?;
        Some(day_availability(end_date, end_window, &blocking, config).windows)
    } else {
        None
    };

    Ok(SpanAvailability {
        available: true,
        conflicts,
        start_day_windows,
        end_day_windows,
    })
}
