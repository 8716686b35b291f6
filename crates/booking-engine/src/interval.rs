//! Interval primitives and the buffer/merge stage.
//!
//! Busy events are padded symmetrically with the configured buffer, clipped
//! to the bounded range under consideration, sorted, then swept left to
//! right into a minimal non-overlapping busy set. Padded intervals that
//! merely touch are merged: a gap shorter than the round-trip buffer is not
//! usable and must never surface as available.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A half-open time interval `[start, end)`. Invariant: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Construct an interval, rejecting `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Two half-open intervals overlap iff `a.start < b.end && b.start < a.end`.
    /// Touching intervals (one ends exactly when the other starts) do NOT overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely inside this interval.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Category of service an event or booking represents.
///
/// Carried as an explicit tag; the coexistence policy keys off this enum,
/// never off free-text matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Walk,
    Sitting,
    MeetAndGreet,
    Other,
}

/// An externally sourced occupied interval from the calendar feed.
///
/// The engine never mutates or persists busy events; each call receives a
/// fresh feed from the calendar collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyEvent {
    pub interval: TimeInterval,
    /// Service category when the feed knows it; `None` for opaque events.
    pub service_kind: Option<ServiceKind>,
}

impl BusyEvent {
    pub fn new(interval: TimeInterval, service_kind: Option<ServiceKind>) -> Self {
        Self {
            interval,
            service_kind,
        }
    }

    /// Span of the event in whole hours (derived, not stored).
    pub fn duration_hours(&self) -> i64 {
        (self.interval.end - self.interval.start).num_hours()
    }
}

/// Pad each busy event with the buffer, clip to `[range_start, range_end)`,
/// and merge into a minimal, sorted, non-overlapping busy set.
///
/// Events entirely outside the range (after padding) are discarded. Padded
/// intervals that overlap or touch are fused. Empty input yields an empty
/// list -- the whole range is free.
pub fn pad_and_merge(
    events: &[BusyEvent],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    buffer_minutes: u32,
) -> Vec<TimeInterval> {
    let buffer = Duration::minutes(i64::from(buffer_minutes));

    let mut intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = events
        .iter()
        .map(|e| (e.interval.start - buffer, e.interval.end + buffer))
        .filter(|&(start, end)| start < range_end && end > range_start)
        .map(|(start, end)| (start.max(range_start), end.min(range_end)))
        .collect();

    if intervals.is_empty() {
        return Vec::new();
    }

    intervals.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<TimeInterval> = Vec::new();
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            // `<=` fuses touching intervals as well as overlapping ones.
            if start <= last.end {
                last.end = last.end.max(end);
                continue;
            }
        }
        merged.push(TimeInterval { start, end });
    }

    merged
}
