//! Explicit run configuration.
//!
//! A [`ReportConfig`] is constructed once at the entry point and passed by
//! reference into the run; nothing in this crate reads process-wide state.

use std::str::FromStr;

use crate::{CommitterIdentity, ConfigError, DayWindow, OrganizationName, SortColumn};

/// What to report on and how to attribute the resulting commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Organization whose audit log is read.
    pub org: OrganizationName,
    /// Trailing window of days to include.
    pub window: DayWindow,
    /// Column the report is sorted by, descending.
    pub sort: SortColumn,
    /// Identity the report commit is attributed to.
    pub committer: CommitterIdentity,
}

impl ReportConfig {
    /// Creates a configuration with the default window, sort column, and
    /// committer.
    pub fn new(org: OrganizationName) -> Self {
        Self {
            org,
            window: DayWindow::default(),
            sort: SortColumn::default(),
            committer: CommitterIdentity::default(),
        }
    }

    /// Replaces the day window.
    #[must_use]
    pub fn with_window(mut self, window: DayWindow) -> Self {
        self.window = window;
        self
    }

    /// Replaces the sort column.
    #[must_use]
    pub fn with_sort(mut self, sort: SortColumn) -> Self {
        self.sort = sort;
        self
    }

    /// Replaces the committer identity.
    #[must_use]
    pub fn with_committer(mut self, committer: CommitterIdentity) -> Self {
        self.committer = committer;
        self
    }
}

impl FromStr for DayWindow {
    type Err = ConfigError;

    /// Parses a string-encoded whole number of days, ignoring surrounding
    /// whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(DayWindow::new)
            .ok_or_else(|| ConfigError::InvalidDays {
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_action_inputs() {
        let config = ReportConfig::new(OrganizationName::new("acme").unwrap());

        assert_eq!(config.window.days(), 7);
        assert_eq!(config.sort, SortColumn::GitClone);
        assert_eq!(config.committer.name, "github-actions");
    }

    #[test]
    fn builder_overrides_apply() {
        let config = ReportConfig::new(OrganizationName::new("acme").unwrap())
            .with_window(DayWindow::new(30).unwrap())
            .with_sort(SortColumn::GitPush)
            .with_committer(CommitterIdentity::new("bot", "bot@example.com"));

        assert_eq!(config.window.days(), 30);
        assert_eq!(config.sort, SortColumn::GitPush);
        assert_eq!(config.committer.email, "bot@example.com");
    }

    #[test]
    fn days_parse_from_string() {
        assert_eq!("14".parse::<DayWindow>().unwrap().days(), 14);
        assert_eq!(" 3 ".parse::<DayWindow>().unwrap().days(), 3);
    }

    #[test]
    fn days_are_normalised_for_labels_and_paths() {
        let window = "07".parse::<DayWindow>().unwrap();

        assert_eq!(window.to_string(), "7");
        assert_eq!(SortColumn::GitClone.label(window), "Git clones (<7 days)");
    }

    #[test]
    fn non_positive_or_non_numeric_days_are_rejected() {
        for bad in ["0", "-1", "seven", "", "1.5"] {
            assert!(
                matches!(bad.parse::<DayWindow>(), Err(ConfigError::InvalidDays { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
