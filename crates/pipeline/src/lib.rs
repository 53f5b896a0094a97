//! Core domain for the Git audit log report.
//!
//! This crate contains every domain concept, newtype identifier, value type,
//! and error type used to turn an organization's Git audit log into a CSV
//! report. Infrastructure crates implement the port traits defined here; they
//! never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`OrganizationName`, `RepositoryId`, etc.) |
//! | [`types`] | Value types (`Timestamp`, `EventTime`, `DayWindow`, `AuditEvent`, etc.) |
//! | [`filter`] | Event Filter: window selection |
//! | [`aggregate`] | Aggregator: per-repository action counts |
//! | [`report`] | Reporter: rows, sorting, CSV rendering |
//! | [`source`] | `AuditLogSource` port and `FetchError` |
//! | [`publish`] | `ReportPublisher` port, `PublishRequest`, and `PublishError` |
//! | [`config`] | Explicit run configuration |
//! | [`run`] | Run orchestration |
//! | [`errors`] | Run-level and configuration error types |

pub mod aggregate;
pub mod config;
pub mod errors;
pub mod filter;
pub mod identifiers;
pub mod publish;
pub mod report;
pub mod run;
pub mod source;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use aggregate::{aggregate, ActionCounts, RepoCounts};
pub use config::ReportConfig;
pub use errors::{ConfigError, ReportRunError};
pub use filter::filter_window;
pub use identifiers::{AuditAction, OrganizationName, ReportPath, ReportRunId, RepositoryId};
pub use publish::{commit_message, PublishError, PublishRequest, ReportPublisher};
pub use report::{Report, ReportError, ReportRow, SortColumn};
pub use run::{publish_report, render_report, run_report, RenderedReport, CONSOLE_TARGET};
pub use source::{AuditLogSource, FetchError};
pub use types::{AuditEvent, CommitterIdentity, DayWindow, EventTime, Timestamp};
