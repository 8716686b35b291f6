//! Engine configuration.
//!
//! Every policy knob is an explicit field threaded through each call -- the
//! engine has no globals and never consults the ambient system time zone.

use chrono_tz::Tz;

/// Configuration for one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// The single operating time zone. All day boundaries and
    /// `date + preferred_time` candidates are resolved in this zone.
    pub time_zone: Tz,
    /// Travel/turnaround padding applied to both ends of every busy event
    /// before merging.
    pub buffer_minutes: u32,
    /// A confirmed sitting booking spanning at least this many hours (or
    /// crossing a calendar-day boundary) is custodial and never blocks a
    /// short booking.
    pub custodial_min_hours: i64,
    /// Maximum number of alternative start times suggested for a
    /// conflicting recurrence date.
    pub max_alternatives: usize,
}

impl EngineConfig {
    /// Config with the reference policy values in the given operating zone.
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            buffer_minutes: 15,
            custodial_min_hours: 6,
            max_alternatives: 3,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(chrono_tz::UTC)
    }
}
