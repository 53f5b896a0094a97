//! Shared value types for the report domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. a day window is strictly positive,
//! counts are non-negative integers) and participate in domain computations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuditAction, RepositoryId};

/// Milliseconds in one day.
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns this instant as an [`EventTime`] on the audit log's time axis.
    pub fn as_event_time(self) -> EventTime {
        EventTime::from_millis(self.0.timestamp_millis())
    }

    /// Second-precision ISO-8601 rendering with a `Z` suffix,
    /// e.g. `2024-03-01T09:15:42Z`.
    pub fn to_second_precision(self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Calendar date rendering, e.g. `2024-03-01`.
    pub fn to_date(self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------

/// An audit log event time, in milliseconds since the Unix epoch.
///
/// This is the unit GitHub reports in the `@timestamp` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventTime(i64);

impl EventTime {
    /// Creates an [`EventTime`] from epoch milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the epoch milliseconds.
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for EventTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match DateTime::<Utc>::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// The trailing number of days of audit history covered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayWindow(u32);

impl DayWindow {
    /// Window used when none is configured.
    pub const DEFAULT: Self = Self(7);

    /// Creates a [`DayWindow`], returning `None` for a zero-day window.
    #[must_use]
    pub fn new(days: u32) -> Option<Self> {
        if days == 0 {
            None
        } else {
            Some(Self(days))
        }
    }

    /// Returns the number of days.
    pub fn days(self) -> u32 {
        self.0
    }

    /// Returns the earliest event time inside the window ending at `now`.
    ///
    /// Computed as `now - days * 86_400_000` milliseconds.
    pub fn start(self, now: Timestamp) -> EventTime {
        let span = i64::from(self.0) * MILLIS_PER_DAY;
        EventTime::from_millis(now.as_event_time().as_millis().saturating_sub(span))
    }
}

impl Default for DayWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for DayWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Audit events
// ---------------------------------------------------------------------------

/// One Git transport event from an organization's audit log.
///
/// Immutable and owned only for the duration of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the event happened.
    pub timestamp: EventTime,
    /// Full name of the repository the event targeted.
    pub repo: RepositoryId,
    /// The action performed (e.g. `git.clone`).
    pub action: AuditAction,
}

// ---------------------------------------------------------------------------
// Commit attribution
// ---------------------------------------------------------------------------

/// The name/email pair attributed to the commit that writes a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitterIdentity {
    /// Display name of the committer.
    pub name: String,
    /// Email address of the committer.
    pub email: String,
}

impl CommitterIdentity {
    /// Committer name used when none is configured.
    pub const DEFAULT_NAME: &'static str = "github-actions";
    /// Committer email used when none is configured.
    pub const DEFAULT_EMAIL: &'static str = "github-actions@github.com";

    /// Creates a committer identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Default for CommitterIdentity {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME, Self::DEFAULT_EMAIL)
    }
}

impl std::fmt::Display for CommitterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
