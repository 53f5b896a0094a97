//! Top-level error types for a report run.
//!
//! [`ReportRunError`] is what a run returns. Component-level errors
//! ([`FetchError`], [`ReportError`], [`PublishError`]) are defined next to the
//! component that raises them and are wrapped here without altering their
//! message, so the failure surfaced to the caller is the component's own text.
//!
//! [`ConfigError`] covers invalid inputs and is raised before any network call.

use thiserror::Error;

use crate::{FetchError, PublishError, ReportError};

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a report run. None of them are retried.
#[derive(Debug, Error)]
pub enum ReportRunError {
    /// Reading the audit log failed; nothing was aggregated.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Building or serialising the report failed; nothing was written.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The report was rendered but could not be persisted.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// The run configuration is invalid.
///
/// Produced at start-up; a run never begins with an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The day window is not a positive integer.
    #[error("Invalid days value '{value}': expected a positive whole number of days")]
    InvalidDays {
        /// The value as supplied.
        value: String,
    },

    /// The sort column does not name a report field.
    #[error(transparent)]
    InvalidSort(#[from] ReportError),

    /// No organization was configured and none could be derived.
    #[error("No organization configured and none found in the triggering event")]
    MissingOrganization,

    /// A required value is absent or malformed.
    #[error("Configuration error: {message}")]
    Invalid {
        /// Description of the configuration problem.
        message: String,
    },
}
