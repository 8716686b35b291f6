//! Recurrence expansion and per-date classification.
//!
//! A recurrence spec (weekly, biweekly, or a custom weekday set) is lowered
//! to RFC 5545 rule text and expanded via the `rrule` crate, anchored at
//! `date + preferred_time` in the operating zone. Each target date is then
//! classified against that day's busy feed: confirmed, conflicting (with
//! alternative start times), or blocked outright.
//!
//! The expander never reserves anything -- committing a slot is a separate
//! write operation outside this engine.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::availability::{
    first_window_fitting, free_windows, local_instant, minutes, OperatingWindow,
};
use crate::config::EngineConfig;
use crate::conflict::is_exempt_custodial;
use crate::error::{EngineError, Result};
use crate::interval::{pad_and_merge, BusyEvent, TimeInterval};

/// Repetition pattern of a recurrence spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Weekly,
    Biweekly,
    Custom,
}

/// A recurrence request: pattern, weekday set (custom only), preferred
/// start time, anchor date, and horizon.
///
/// Invariant: `days_of_week` is required and non-empty iff the pattern is
/// `Custom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceSpec {
    pub pattern: RecurrencePattern,
    #[serde(default)]
    pub days_of_week: Vec<Weekday>,
    pub preferred_time: NaiveTime,
    pub start_date: NaiveDate,
    pub horizon_weeks: u32,
}

impl RecurrenceSpec {
    fn validate(&self) -> Result<()> {
        match self.pattern {
            RecurrencePattern::Custom if self.days_of_week.is_empty() => Err(
                EngineError::InvalidRecurrence("custom pattern requires days_of_week".into()),
            ),
            RecurrencePattern::Weekly | RecurrencePattern::Biweekly
                if !self.days_of_week.is_empty() =>
            {
                Err(EngineError::InvalidRecurrence(
                    "days_of_week is only valid with the custom pattern".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// A target date the expander confirmed as bookable at the preferred time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDate {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A suggested alternative start on a conflicting date, formatted for
/// display in the operating zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub display: String,
}

/// A target date whose preferred slot is taken but which still has usable
/// free windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictingDate {
    pub date: NaiveDate,
    pub requested: TimeInterval,
    pub alternatives: Vec<Alternative>,
}

/// A target date with no free window long enough for the request at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedDate {
    pub date: NaiveDate,
    pub reason: String,
}

/// The three partitions produced by recurrence expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceOutcome {
    pub confirmed: Vec<CandidateDate>,
    pub conflicting: Vec<ConflictingDate>,
    pub blocked: Vec<BlockedDate>,
}

impl RecurrenceOutcome {
    fn empty() -> Self {
        Self {
            confirmed: Vec::new(),
            conflicting: Vec::new(),
            blocked: Vec::new(),
        }
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Lower the spec to iCalendar text and expand it into candidate start
/// instants, anchored in the operating zone.
fn enumerate_starts(spec: &RecurrenceSpec, config: &EngineConfig) -> Result<Vec<DateTime<Utc>>> {
    let tz_name = config.time_zone.name();
    let dtstart_ical = format!(
        "{}T{}",
        spec.start_date.format("%Y%m%d"),
        spec.preferred_time.format("%H%M%S")
    );

    let (rrule_str, limit) = match spec.pattern {
        RecurrencePattern::Weekly => (
            format!("FREQ=WEEKLY;COUNT={}", spec.horizon_weeks),
            spec.horizon_weeks,
        ),
        RecurrencePattern::Biweekly => (
            format!("FREQ=WEEKLY;INTERVAL=2;COUNT={}", spec.horizon_weeks),
            spec.horizon_weeks,
        ),
        RecurrencePattern::Custom => {
            // Dedupe the weekday set in a fixed (Monday-first) order.
            let days: BTreeSet<(u32, &str)> = spec
                .days_of_week
                .iter()
                .map(|d| (d.num_days_from_monday(), weekday_code(*d)))
                .collect();
            let codes: Vec<&str> = days.into_iter().map(|(_, code)| code).collect();

            // Horizon bound is exclusive of the week after the last one.
            let last_day = spec.start_date + Duration::days(i64::from(spec.horizon_weeks) * 7 - 1);
            let mut until_ical = format!("{}T235959", last_day.format("%Y%m%d"));
            // The rrule crate requires UNTIL and DTSTART to share a zone;
            // UTC must be flagged with a trailing Z.
            if tz_name == "UTC" {
                until_ical.push('Z');
            }
            (
                format!("FREQ=WEEKLY;BYDAY={};UNTIL={}", codes.join(","), until_ical),
                spec.horizon_weeks.saturating_mul(7),
            )
        }
    };

    let rrule_text = format!("DTSTART;TZID={}:{}\nRRULE:{}", tz_name, dtstart_ical, rrule_str);
    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| EngineError::InvalidRecurrence(format!("{e}")))?;

    // The expansion cap comes straight from the horizon; the rrule crate
    // takes a u16, so horizons beyond that cannot be expanded.
    let max_count = u16::try_from(limit).map_err(|_| {
        EngineError::InvalidRecurrence(format!("horizon of {limit} occurrences is too large"))
    })?;
    let instances = rrule_set.all(max_count);

    Ok(instances
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .collect())
}

/// Expand a recurrence spec over the per-date busy feed and classify every
/// target date.
///
/// Fully deterministic: identical spec, duration, feed, and config always
/// produce identical partitions.
///
/// # Errors
/// - [`EngineError::InvalidDuration`] when `duration_minutes` is zero.
/// - [`EngineError::InvalidRecurrence`] when the spec violates its weekday
///   invariant or cannot be lowered to a valid rule.
pub fn expand_recurrence(
    spec: &RecurrenceSpec,
    duration_minutes: u32,
    busy_by_date: &BTreeMap<NaiveDate, Vec<BusyEvent>>,
    config: &EngineConfig,
) -> Result<RecurrenceOutcome> {
    if duration_minutes == 0 {
        return Err(EngineError::InvalidDuration(duration_minutes));
    }
    spec.validate()?;
    if spec.horizon_weeks == 0 {
        return Ok(RecurrenceOutcome::empty());
    }

    let duration = minutes(duration_minutes);
    let mut outcome = RecurrenceOutcome::empty();

    for start in enumerate_starts(spec, config)? {
        let date = start.with_timezone(&config.time_zone).date_naive();
        let candidate = TimeInterval::new(start, start + duration)?;
        let empty: &[BusyEvent] = &[];
        let busy = busy_by_date.get(&date).map_or(empty, Vec::as_slice);

        match classify_date(date, &candidate, duration_minutes, busy, config)? {
            Classification::Confirmed => {
                trace!(%date, "recurrence date confirmed");
                outcome.confirmed.push(CandidateDate {
                    date,
                    start: candidate.start,
                    end: candidate.end,
                });
            }
            Classification::Conflicting(alternatives) => {
                trace!(%date, alternatives = alternatives.len(), "recurrence date conflicts");
                outcome.conflicting.push(ConflictingDate {
                    date,
                    requested: candidate,
                    alternatives,
                });
            }
            Classification::Blocked(reason) => {
                trace!(%date, "recurrence date blocked");
                outcome.blocked.push(BlockedDate { date, reason });
            }
        }
    }

    debug!(
        confirmed = outcome.confirmed.len(),
        conflicting = outcome.conflicting.len(),
        blocked = outcome.blocked.len(),
        "recurrence expansion complete"
    );
    Ok(outcome)
}

enum Classification {
    Confirmed,
    Conflicting(Vec<Alternative>),
    Blocked(String),
}

/// Classify one target date against its busy feed.
///
/// Exempt custodial sittings are removed first, the remainder buffered and
/// merged, and the candidate tested for containment in a free window. A
/// non-fitting candidate yields up to `max_alternatives` suggested starts
/// (nearest to the preferred start first) from the day's windows of
/// sufficient length, or a blocked verdict when none qualify.
fn classify_date(
    date: NaiveDate,
    candidate: &TimeInterval,
    duration_minutes: u32,
    busy: &[BusyEvent],
    config: &EngineConfig,
) -> Result<Classification> {
    let blocking: Vec<BusyEvent> = busy
        .iter()
        .filter(|e| !is_exempt_custodial(e.service_kind, &e.interval, config))
        .cloned()
        .collect();

    let window = OperatingWindow::full_day(date, config.time_zone)?;
    let merged = pad_and_merge(&blocking, window.start, window.end, config.buffer_minutes);
    let free = free_windows(window, &merged);

    if free
        .iter()
        .any(|w| w.start <= candidate.start && candidate.end <= w.end)
    {
        return Ok(Classification::Confirmed);
    }

    // Blocked outright when nothing on the day can hold the request.
    if let Err(err) = first_window_fitting(&free, duration_minutes, date) {
        return Ok(Classification::Blocked(err.to_string()));
    }

    let duration = minutes(duration_minutes);
    let mut alternatives: Vec<Alternative> = free
        .iter()
        .filter(|w| w.duration_minutes >= i64::from(duration_minutes))
        .map(|w| {
            // Nearest feasible start to the requested one within this window.
            let latest = w.end - duration;
            let start = candidate.start.clamp(w.start, latest);
            Alternative {
                start,
                end: start + duration,
                display: start
                    .with_timezone(&config.time_zone)
                    .format("%H:%M")
                    .to_string(),
            }
        })
        .collect();

    // Stable sort: ties go to the chronologically earlier window.
    alternatives.sort_by_key(|a| (a.start - candidate.start).abs());
    alternatives.truncate(config.max_alternatives);
    Ok(Classification::Conflicting(alternatives))
}

/// Candidate interval for `date` at the spec's preferred time -- exposed for
/// callers that build one-off candidates outside a full expansion.
pub fn candidate_interval(
    date: NaiveDate,
    preferred_time: NaiveTime,
    duration_minutes: u32,
    config: &EngineConfig,
) -> Result<TimeInterval> {
    if duration_minutes == 0 {
        return Err(EngineError::InvalidDuration(duration_minutes));
    }
    let start = local_instant(date, preferred_time, config.time_zone)?;
    TimeInterval::new(start, start + minutes(duration_minutes))
}
