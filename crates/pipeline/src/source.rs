//! Port for reading an organization's Git audit log.
//!
//! Infrastructure crates implement [`AuditLogSource`]; this crate never sees
//! pagination, authentication, or wire formats.

use async_trait::async_trait;
use thiserror::Error;

use crate::{AuditEvent, OrganizationName};

/// Failures while reading the audit log. Every variant is terminal for the run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The credential was missing, invalid, or lacks audit-log access.
    #[error("{message}")]
    Unauthorized {
        /// Message returned by the API.
        message: String,
    },

    /// The API refused the request because a rate limit was exhausted.
    #[error("{message}")]
    RateLimited {
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

    /// A response body could not be decoded.
    #[error("Malformed audit log response: {message}")]
    MalformedResponse {
        /// Description of the decoding failure.
        message: String,
    },
}

/// Source of Git transport events for one organization.
#[async_trait]
pub trait AuditLogSource: Send + Sync {
    /// Returns every retrievable Git-category audit event for `org`, across
    /// all pages, in the order the API returned them.
    async fn git_events(&self, org: &OrganizationName) -> Result<Vec<AuditEvent>, FetchError>;
}
