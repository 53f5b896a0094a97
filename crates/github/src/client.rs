//! Shared HTTP client, configuration, and response-to-error mapping.

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use pipeline::RepositoryId;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("git-audit-log-report/", env!("CARGO_PKG_VERSION"));

/// Errors raised while constructing a [`GithubClient`].
#[derive(Debug, Error)]
pub enum GithubClientError {
    /// The destination repository is not in `owner/name` form.
    #[error("Invalid destination repository '{0}': expected 'owner/name'")]
    InvalidRepository(String),

    /// The token contains characters that cannot be sent in a header.
    #[error("Access token contains characters not permitted in an HTTP header")]
    InvalidToken,

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Connection settings for [`GithubClient`].
#[derive(Clone)]
pub struct GithubClientConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
    /// Access token; needs `read:audit_log` on the organization and
    /// `contents: write` on the destination repository.
    pub token: String,
    /// Repository reports are committed to.
    pub repository: RepositoryId,
}

impl std::fmt::Debug for GithubClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClientConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .finish()
    }
}

/// GitHub REST client implementing both report ports.
///
/// See [`pipeline::AuditLogSource`] and [`pipeline::ReportPublisher`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    pub(crate) http: reqwest::Client,
    pub(crate) api_url: String,
    pub(crate) owner: String,
    pub(crate) repo: String,
}

impl GithubClient {
    /// Builds a client with authentication and API-version headers preset.
    pub fn new(config: GithubClientConfig) -> Result<Self, GithubClientError> {
        let (owner, repo) = config
            .repository
            .as_str()
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| GithubClientError::InvalidRepository(config.repository.to_string()))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GithubClientError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            owner: owner.to_owned(),
            repo: repo.to_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Error responses
// ---------------------------------------------------------------------------

/// How a non-success response should be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    Unauthorized,
    RateLimited,
    /// 409, or a 422 complaining that no `sha` was supplied for an existing file.
    Conflict,
    Other,
}

/// A non-success response reduced to its status, class, and message.
#[derive(Debug, Clone)]
pub(crate) struct ApiFailure {
    pub(crate) status: StatusCode,
    pub(crate) kind: FailureKind,
    pub(crate) message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Consumes a non-success response and classifies it.
///
/// The message is GitHub's own `message` field when the body carries one.
pub(crate) async fn api_failure(response: Response) -> ApiFailure {
    let status = response.status();
    let rate_limit_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
        });

    let kind = match status {
        StatusCode::TOO_MANY_REQUESTS => FailureKind::RateLimited,
        StatusCode::FORBIDDEN if rate_limit_exhausted => FailureKind::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Unauthorized,
        StatusCode::CONFLICT => FailureKind::Conflict,
        StatusCode::UNPROCESSABLE_ENTITY if message.contains("\"sha\"") => FailureKind::Conflict,
        _ => FailureKind::Other,
    };

    ApiFailure {
        status,
        kind,
        message,
    }
}
