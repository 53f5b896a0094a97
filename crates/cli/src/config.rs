//! Command-line and GitHub Actions input handling.
//!
//! Every input can be given as a flag or through the environment variable the
//! Actions runner sets for it (`INPUT_<NAME>`). The runner passes inputs that
//! were not supplied as empty strings, so empty values count as absent.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use github::{GithubClientConfig, DEFAULT_API_URL};
use pipeline::{
    CommitterIdentity, ConfigError, DayWindow, OrganizationName, ReportConfig, RepositoryId,
    SortColumn,
};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "git-audit-report",
    version,
    about = "Summarise an organization's Git audit log into a CSV report and commit it"
)]
pub struct Cli {
    /// Access token with audit-log read and contents write permissions
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Organization to report on (defaults to the triggering organization)
    #[arg(long, env = "INPUT_ORG")]
    pub org: Option<String>,

    /// Number of trailing days to include
    #[arg(long, env = "INPUT_DAYS")]
    pub days: Option<String>,

    /// Column to sort by, descending: repoName, gitClone, gitPush, or gitFetch
    #[arg(long, env = "INPUT_SORT")]
    pub sort: Option<String>,

    /// Name attributed to the report commit
    #[arg(long = "committer-name", env = "INPUT_COMMITTER-NAME")]
    pub committer_name: Option<String>,

    /// Email attributed to the report commit
    #[arg(long = "committer-email", env = "INPUT_COMMITTER-EMAIL")]
    pub committer_email: Option<String>,

    /// Repository (owner/name) the report is committed to
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long = "api-url", env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Path to the JSON payload of the triggering event
    #[arg(long = "event-path", env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Print the report to stdout instead of committing it
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Log output format
    #[arg(long = "log-format", env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Fully validated settings for one run.
#[derive(Debug)]
pub struct Settings {
    /// What to report on.
    pub report: ReportConfig,
    /// How to reach GitHub and where to commit.
    pub client: GithubClientConfig,
    /// Render only; skip the commit.
    pub dry_run: bool,
}

impl Cli {
    /// Validates every input and resolves defaults.
    ///
    /// Fails before any network call if an input is missing or malformed.
    pub fn resolve(self) -> Result<Settings> {
        let token = non_empty(self.token)
            .ok_or_else(|| anyhow!("Input required and not supplied: token"))?;

        let org = match non_empty(self.org) {
            Some(org) => org,
            None => match self.event_path.as_deref() {
                Some(path) => org_from_event(path)?.ok_or(ConfigError::MissingOrganization)?,
                None => return Err(ConfigError::MissingOrganization.into()),
            },
        };
        let org = OrganizationName::new(org).ok_or(ConfigError::MissingOrganization)?;

        let window = match non_empty(self.days) {
            Some(days) => days.parse::<DayWindow>()?,
            None => DayWindow::default(),
        };

        let sort = match non_empty(self.sort) {
            Some(sort) => sort.parse::<SortColumn>().map_err(ConfigError::from)?,
            None => SortColumn::default(),
        };

        let committer = CommitterIdentity::new(
            non_empty(self.committer_name)
                .unwrap_or_else(|| CommitterIdentity::DEFAULT_NAME.to_owned()),
            non_empty(self.committer_email)
                .unwrap_or_else(|| CommitterIdentity::DEFAULT_EMAIL.to_owned()),
        );

        let repository = non_empty(self.repository)
            .and_then(RepositoryId::new)
            .ok_or_else(|| ConfigError::Invalid {
                message: "destination repository not set (use --repository or GITHUB_REPOSITORY)"
                    .to_owned(),
            })?;

        Ok(Settings {
            report: ReportConfig::new(org)
                .with_window(window)
                .with_sort(sort)
                .with_committer(committer),
            client: GithubClientConfig {
                api_url: non_empty(self.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
                token,
                repository,
            },
            dry_run: self.dry_run,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
struct EventPayload {
    organization: Option<EventOrganization>,
}

#[derive(Deserialize)]
struct EventOrganization {
    login: String,
}

/// Reads `organization.login` from a webhook event payload file.
///
/// Returns `Ok(None)` if the event was not triggered within an organization.
pub fn org_from_event(path: &Path) -> Result<Option<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event payload {}", path.display()))?;
    let payload: EventPayload = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse event payload {}", path.display()))?;
    Ok(payload.organization.map(|o| o.login))
}
