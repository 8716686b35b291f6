//! # booking-engine
//!
//! Deterministic availability, conflict, and recurrence engine for pet-care
//! appointment scheduling.
//!
//! The engine turns an externally sourced feed of busy time blocks into
//! free windows, applies travel/turnaround buffers, detects conflicts
//! between a candidate appointment and existing bookings (with a custodial
//! coexistence exception), and expands recurrence specs into a concrete
//! per-date accept/reject schedule. Every call is a pure function of its
//! inputs: the engine holds no state, writes to no store, and calls no
//! third-party service. All date/time arithmetic happens in the single
//! operating zone carried on [`EngineConfig`].
//!
//! Its verdicts are advisory -- the engine reports availability at read
//! time; serializing the final "commit a slot" step is the persistence
//! layer's job.
//!
//! ## Modules
//!
//! - [`interval`] -- interval primitives and the buffer/merge stage
//! - [`availability`] -- single-day free-window computation
//! - [`scanner`] -- multi-day conflict scanning
//! - [`conflict`] -- conflict detection and the coexistence policy
//! - [`recurrence`] -- recurrence expansion and per-date classification
//! - [`config`] -- operating zone and policy knobs
//! - [`error`] -- error types

pub mod availability;
pub mod config;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod recurrence;
pub mod scanner;

pub use availability::{
    check_single_day, first_window_fitting, DayAvailability, FreeWindow, OperatingWindow,
};
pub use config::EngineConfig;
pub use conflict::{detect_conflict, BookingStatus, ExistingBooking};
pub use error::{EngineError, Result};
pub use interval::{pad_and_merge, BusyEvent, ServiceKind, TimeInterval};
pub use recurrence::{expand_recurrence, RecurrenceOutcome, RecurrencePattern, RecurrenceSpec};
pub use scanner::{check_multi_day, ConflictRecord, SpanAvailability};
