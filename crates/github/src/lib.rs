//! GitHub infrastructure adapter for the Git audit log report.
//!
//! Implements the ports defined in the [`pipeline`] crate
//! ([`pipeline::AuditLogSource`], [`pipeline::ReportPublisher`]) over the
//! GitHub REST API using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (authentication headers, pagination, error
//! classification, content encoding) are handled here; the [`pipeline`] crate
//! never sees them.
//!
//! ## Endpoints
//!
//! | Port | Endpoint |
//! |------|----------|
//! | `AuditLogSource` | `GET /orgs/{org}/audit-log?include=git` (paginated via `Link`) |
//! | `ReportPublisher` | `PUT /repos/{owner}/{repo}/contents/{path}` |
//!
//! The base URL is configurable so GitHub Enterprise Server instances work
//! unchanged.

mod audit_log;
mod client;
mod contents;

pub use client::{GithubClient, GithubClientConfig, GithubClientError, DEFAULT_API_URL};
