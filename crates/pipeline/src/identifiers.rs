//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! an [`OrganizationName`] with a [`RepositoryId`] even though both are strings
//! under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DayWindow, Timestamp};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single report run (one invocation of the CLI).
///
/// Generated fresh for every invocation; attached to the root span so all
/// activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportRunId(Uuid);

impl ReportRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ReportRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (GitHub names)
// ---------------------------------------------------------------------------

string_id! {
    /// A GitHub organization login (e.g. `"acme"`).
    ///
    /// The audit log is always scoped to exactly one organization per run.
    OrganizationName
}

string_id! {
    /// Identifies a GitHub repository by its full name in `"owner/repo"` format.
    ///
    /// Comparison is case-sensitive: `"acme/Foo"` and `"acme/foo"` are distinct
    /// repositories for aggregation purposes.
    RepositoryId
}

impl RepositoryId {
    /// Returns the repository's short name: everything after the last `/`.
    ///
    /// An identifier without a `/` is returned whole.
    ///
    /// ```
    /// # use pipeline::RepositoryId;
    /// let repo = RepositoryId::new("acme/some-repo").unwrap();
    /// assert_eq!(repo.short_name(), "some-repo");
    /// ```
    pub fn short_name(&self) -> &str {
        match self.0.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }
}

string_id! {
    /// An audit log action name (e.g. `"git.clone"`).
    ///
    /// Unknown actions are kept verbatim; only the tracked Git transport
    /// actions surface in the report.
    AuditAction
}

impl AuditAction {
    /// `git.clone`
    pub const GIT_CLONE: &'static str = "git.clone";
    /// `git.push`
    pub const GIT_PUSH: &'static str = "git.push";
    /// `git.fetch`
    pub const GIT_FETCH: &'static str = "git.fetch";
}

string_id! {
    /// A file-system path relative to the destination repository root.
    ///
    /// Identifies where a rendered report is committed.
    ReportPath
}

impl ReportPath {
    /// Path of the report for `org` generated at `generated_at` over `window`,
    /// e.g. `reports/acme-2024-03-01T09:15:42Z-7days.csv`.
    ///
    /// Second precision means two runs in the same second target the same path.
    pub fn for_report(org: &OrganizationName, generated_at: Timestamp, window: DayWindow) -> Self {
        Self(format!(
            "reports/{org}-{}-{window}days.csv",
            generated_at.to_second_precision()
        ))
    }
}
