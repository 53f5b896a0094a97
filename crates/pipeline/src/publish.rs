//! Port for committing a rendered report to a repository, plus the rules for
//! naming that commit.

use async_trait::async_trait;
use thiserror::Error;

use crate::{CommitterIdentity, DayWindow, OrganizationName, ReportPath, Timestamp};

/// Failures while persisting a report. Every variant is terminal for the run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The credential was missing, invalid, or lacks write access.
    #[error("{message}")]
    Unauthorized {
        /// Message returned by the API.
        message: String,
    },

    /// A file already exists at the destination path.
    #[error("{message}")]
    Conflict {
        /// Path that was being written.
        path: ReportPath,
        /// Message returned by the API.
        message: String,
    },

    /// The API answered with an unexpected status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message returned by the API.
        message: String,
    },

    /// The request never produced a response.
    #[error("{message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}

/// Everything needed to commit one report file.
///
/// `content` is the raw CSV; publishers apply whatever transfer encoding their
/// API requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Destination path relative to the repository root.
    pub path: ReportPath,
    /// Raw file content.
    pub content: Vec<u8>,
    /// Commit message.
    pub message: String,
    /// Commit attribution.
    pub committer: CommitterIdentity,
}

impl PublishRequest {
    /// Builds the request for a report generated at `generated_at`.
    pub fn for_report(
        org: &OrganizationName,
        window: DayWindow,
        generated_at: Timestamp,
        csv: String,
        committer: CommitterIdentity,
    ) -> Self {
        Self {
            path: ReportPath::for_report(org, generated_at, window),
            content: csv.into_bytes(),
            message: commit_message(generated_at),
            committer,
        }
    }
}

/// Commit message for a report generated at `generated_at`,
/// e.g. `2024-03-01 Git audit log report`.
pub fn commit_message(generated_at: Timestamp) -> String {
    format!("{} Git audit log report", generated_at.to_date())
}

/// Destination that accepts rendered reports.
#[async_trait]
pub trait ReportPublisher: Send + Sync {
    /// Creates the file described by `request` in a single commit.
    async fn put(&self, request: &PublishRequest) -> Result<(), PublishError>;
}
