//! Reporter: turns aggregated counts into a sorted CSV report.
//!
//! Only the three tracked Git transport actions surface as columns; any other
//! action recorded by the aggregator is dropped here. Every row is zero-filled,
//! so a repository that was only ever pushed to still reports `0` clones.
//!
//! The rendered CSV always starts with a header row whose clone/push/fetch
//! labels embed the day window, e.g. `Git clones (<7 days)`.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AuditAction, DayWindow, RepoCounts};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while building or serialising a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested sort column does not name a report field.
    #[error("Unknown sort column '{column}' (expected one of: repoName, gitClone, gitPush, gitFetch)")]
    UnknownSortColumn {
        /// The column name as supplied by the caller.
        column: String,
    },

    /// The CSV encoder rejected a record.
    #[error("Failed to serialise report: {0}")]
    Csv(#[from] csv::Error),

    /// The encoded report could not be recovered from the encoder's buffer.
    #[error("Failed to serialise report: {message}")]
    Serialization {
        /// Description of the underlying failure.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Rows and columns
// ---------------------------------------------------------------------------

/// One aggregated, per-repository line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Repository short name (last path segment of the full name).
    pub repo_name: String,
    /// Number of `git.clone` events in the window.
    pub git_clone: u64,
    /// Number of `git.push` events in the window.
    pub git_push: u64,
    /// Number of `git.fetch` events in the window.
    pub git_fetch: u64,
}

/// A report column that rows can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    /// Repository short name, compared lexicographically.
    RepoName,
    /// Clone count.
    #[default]
    GitClone,
    /// Push count.
    GitPush,
    /// Fetch count.
    GitFetch,
}

impl SortColumn {
    /// All columns, in report order.
    pub const ALL: [SortColumn; 4] = [
        SortColumn::RepoName,
        SortColumn::GitClone,
        SortColumn::GitPush,
        SortColumn::GitFetch,
    ];

    /// Returns the column key as used in configuration (e.g. `"gitClone"`).
    pub fn key(self) -> &'static str {
        match self {
            SortColumn::RepoName => "repoName",
            SortColumn::GitClone => "gitClone",
            SortColumn::GitPush => "gitPush",
            SortColumn::GitFetch => "gitFetch",
        }
    }

    /// Returns the human-readable header label for this column.
    pub fn label(self, window: DayWindow) -> String {
        match self {
            SortColumn::RepoName => "Repository".to_owned(),
            SortColumn::GitClone => format!("Git clones (<{window} days)"),
            SortColumn::GitPush => format!("Git pushes (<{window} days)"),
            SortColumn::GitFetch => format!("Git fetches (<{window} days)"),
        }
    }

    fn compare(self, a: &ReportRow, b: &ReportRow) -> Ordering {
        match self {
            SortColumn::RepoName => a.repo_name.cmp(&b.repo_name),
            SortColumn::GitClone => a.git_clone.cmp(&b.git_clone),
            SortColumn::GitPush => a.git_push.cmp(&b.git_push),
            SortColumn::GitFetch => a.git_fetch.cmp(&b.git_fetch),
        }
    }
}

impl FromStr for SortColumn {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .into_iter()
            .find(|column| column.key() == s)
            .ok_or_else(|| ReportError::UnknownSortColumn {
                column: s.to_owned(),
            })
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// An ordered set of [`ReportRow`]s for one day window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    window: DayWindow,
    rows: Vec<ReportRow>,
}

impl Report {
    /// Builds one zero-filled row per repository, in the counts' first-seen order.
    pub fn from_counts(counts: &RepoCounts, window: DayWindow) -> Self {
        let rows = counts
            .iter()
            .map(|(repo, actions)| ReportRow {
                repo_name: repo.short_name().to_owned(),
                git_clone: actions.get(AuditAction::GIT_CLONE),
                git_push: actions.get(AuditAction::GIT_PUSH),
                git_fetch: actions.get(AuditAction::GIT_FETCH),
            })
            .collect();
        Self { window, rows }
    }

    /// Sorts rows in descending order of `column`.
    ///
    /// The sort is stable: rows with equal values keep their relative order.
    pub fn sort_descending(&mut self, column: SortColumn) {
        self.rows.sort_by(|a, b| column.compare(b, a));
    }

    /// The data rows, excluding the header.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// The header row labels, in column order.
    pub fn header(&self) -> Vec<String> {
        SortColumn::ALL
            .iter()
            .map(|column| column.label(self.window))
            .collect()
    }

    /// Serialises the header followed by every row as CSV.
    ///
    /// Fields are comma-separated, records end in `\n`, and fields are quoted
    /// only when they contain a delimiter, quote, or line break.
    pub fn to_csv(&self) -> Result<String, ReportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());

        writer.write_record(self.header())?;
        for row in &self.rows {
            writer.serialize(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Serialization {
                message: e.error().to_string(),
            })?;
        String::from_utf8(bytes).map_err(|e| ReportError::Serialization {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate, AuditEvent, EventTime, RepositoryId};

    fn event(repo: &str, action: &str) -> AuditEvent {
        AuditEvent {
            timestamp: EventTime::from_millis(0),
            repo: RepositoryId::new(repo).unwrap(),
            action: AuditAction::new(action).unwrap(),
        }
    }

    fn row(name: &str, clone: u64, push: u64, fetch: u64) -> ReportRow {
        ReportRow {
            repo_name: name.to_owned(),
            git_clone: clone,
            git_push: push,
            git_fetch: fetch,
        }
    }

    fn seven_days() -> DayWindow {
        DayWindow::new(7).unwrap()
    }

    #[test]
    fn clone_heavy_repo_sorts_first() {
        let counts = aggregate(&[
            event("acme/foo", "git.clone"),
            event("acme/foo", "git.clone"),
            event("acme/bar", "git.push"),
        ]);

        let mut report = Report::from_counts(&counts, seven_days());
        report.sort_descending(SortColumn::GitClone);

        assert_eq!(report.rows(), [row("foo", 2, 0, 0), row("bar", 0, 1, 0)]);
    }

    #[test]
    fn missing_actions_are_zero_filled() {
        let counts = aggregate(&[event("acme/only-fetched", "git.fetch")]);

        let report = Report::from_counts(&counts, seven_days());

        assert_eq!(report.rows(), [row("only-fetched", 0, 0, 1)]);
    }

    #[test]
    fn untracked_actions_are_dropped() {
        let counts = aggregate(&[
            event("acme/foo", "git.lfs.download"),
            event("acme/foo", "git.push"),
        ]);

        let report = Report::from_counts(&counts, seven_days());

        assert_eq!(report.rows(), [row("foo", 0, 1, 0)]);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let counts = aggregate(&[
            event("acme/first", "git.push"),
            event("acme/second", "git.push"),
            event("acme/top", "git.push"),
            event("acme/top", "git.push"),
            event("acme/third", "git.push"),
        ]);

        let mut report = Report::from_counts(&counts, seven_days());
        report.sort_descending(SortColumn::GitPush);

        let names: Vec<_> = report.rows().iter().map(|r| r.repo_name.as_str()).collect();
        assert_eq!(names, ["top", "first", "second", "third"]);
    }

    #[test]
    fn sort_by_repo_name_is_descending_lexicographic() {
        let counts = aggregate(&[
            event("acme/beta", "git.clone"),
            event("acme/alpha", "git.clone"),
            event("acme/gamma", "git.clone"),
        ]);

        let mut report = Report::from_counts(&counts, seven_days());
        report.sort_descending(SortColumn::RepoName);

        let names: Vec<_> = report.rows().iter().map(|r| r.repo_name.as_str()).collect();
        assert_eq!(names, ["gamma", "beta", "alpha"]);
    }

    #[test]
    fn sort_column_parses_known_keys_only() {
        assert_eq!("gitFetch".parse::<SortColumn>().unwrap(), SortColumn::GitFetch);
        assert_eq!("repoName".parse::<SortColumn>().unwrap(), SortColumn::RepoName);
        assert!(matches!(
            "gitclone".parse::<SortColumn>(),
            Err(ReportError::UnknownSortColumn { column }) if column == "gitclone"
        ));
    }

    #[test]
    fn header_labels_embed_window() {
        let report = Report::from_counts(&RepoCounts::new(), DayWindow::new(30).unwrap());

        assert_eq!(
            report.header(),
            [
                "Repository",
                "Git clones (<30 days)",
                "Git pushes (<30 days)",
                "Git fetches (<30 days)",
            ]
        );
    }

    #[test]
    fn empty_report_renders_header_only() {
        let report = Report::from_counts(&RepoCounts::new(), seven_days());

        assert_eq!(
            report.to_csv().unwrap(),
            "Repository,Git clones (<7 days),Git pushes (<7 days),Git fetches (<7 days)\n"
        );
    }

    #[test]
    fn csv_has_header_then_rows() {
        let counts = aggregate(&[
            event("acme/foo", "git.clone"),
            event("acme/foo", "git.clone"),
            event("acme/bar", "git.push"),
        ]);
        let mut report = Report::from_counts(&counts, seven_days());
        report.sort_descending(SortColumn::GitClone);

        let csv = report.to_csv().unwrap();

        assert_eq!(
            csv,
            "Repository,Git clones (<7 days),Git pushes (<7 days),Git fetches (<7 days)\n\
             foo,2,0,0\n\
             bar,0,1,0\n"
        );
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        let counts = aggregate(&[event("acme/odd,name", "git.clone")]);
        let report = Report::from_counts(&counts, seven_days());

        let csv = report.to_csv().unwrap();

        assert!(csv.ends_with("\"odd,name\",1,0,0\n"), "{csv}");
    }

    #[test]
    fn csv_round_trips_row_values() {
        let counts = aggregate(&[
            event("acme/foo", "git.clone"),
            event("acme/foo", "git.fetch"),
            event("acme/with \"quotes\"", "git.push"),
            event("acme/bar", "git.fetch"),
        ]);
        let mut report = Report::from_counts(&counts, seven_days());
        report.sort_descending(SortColumn::GitFetch);
        let csv = report.to_csv().unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv.as_bytes());
        let parsed: Vec<ReportRow> = reader
            .records()
            .map(|record| record.unwrap().deserialize(None).unwrap())
            .collect();

        assert_eq!(parsed, report.rows());
    }
}
