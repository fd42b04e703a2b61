//! crates/attendance_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the kiosk's core logic.
//! These traits form the boundary of the hexagonal architecture: the view models
//! only ever talk to the remote attendance service and the wall clock through them.

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveTime, Timelike};

use crate::domain::{AttendanceAction, AttendanceRecord};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The remote side reported a failure. The message is shown to users verbatim.
    #[error("{0}")]
    Remote(String),
    #[error("Malformed response from {function}: {reason}")]
    Malformed { function: String, reason: String },
    #[error("The host dropped the call to {0} without answering")]
    Abandoned(String),
    #[error("No response from {0} in time")]
    TimedOut(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote attendance service. It is the sole source of truth for records.
#[async_trait]
pub trait AttendanceService: Send + Sync {
    /// All records for the current date.
    async fn get_today_status(&self) -> PortResult<Vec<AttendanceRecord>>;

    /// Records a check-in or check-out and returns a human-readable confirmation.
    async fn record_attendance(&self, name: &str, action: AttendanceAction) -> PortResult<String>;

    /// All records for the given date.
    async fn get_attendance_for_date(&self, date: NaiveDate) -> PortResult<Vec<AttendanceRecord>>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Current wall-clock time, truncated to whole seconds.
    fn now_time(&self) -> NaiveTime;
}

/// The machine's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_time(&self) -> NaiveTime {
        let now = Local::now().time();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Formats a date the way the remote service expects it (`YYYY-MM-DD`).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats a time the way records carry it (`HH:MM:SS`).
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}
