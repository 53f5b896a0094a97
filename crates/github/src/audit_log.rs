//! Paginated read of an organization's Git audit log.
//!
//! `GET /orgs/{org}/audit-log?include=git&per_page=100`, following the
//! `Link: <…>; rel="next"` header until no further page is advertised.

use async_trait::async_trait;
use reqwest::header::LINK;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use pipeline::{
    AuditAction, AuditEvent, AuditLogSource, EventTime, FetchError, OrganizationName,
    RepositoryId,
};

use crate::client::{api_failure, FailureKind, GithubClient};

const PAGE_SIZE: u32 = 100;

/// One audit log entry as GitHub returns it. Only the fields the report uses
/// are decoded; everything is optional so that a single odd entry does not
/// fail the page.
#[derive(Debug, Deserialize)]
struct WireAuditEvent {
    #[serde(rename = "@timestamp")]
    timestamp: Option<Value>,
    repo: Option<String>,
    action: Option<String>,
}

impl WireAuditEvent {
    /// Converts to a domain event, or `None` if a required field is absent or
    /// malformed.
    fn into_domain(self) -> Option<AuditEvent> {
        let millis = match self.timestamp? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
            _ => return None,
        };
        Some(AuditEvent {
            timestamp: EventTime::from_millis(millis),
            repo: RepositoryId::new(self.repo?)?,
            action: AuditAction::new(self.action?)?,
        })
    }
}

#[async_trait]
impl AuditLogSource for GithubClient {
    #[instrument(skip(self), fields(org = %org))]
    async fn git_events(&self, org: &OrganizationName) -> Result<Vec<AuditEvent>, FetchError> {
        let mut next = Some(format!(
            "{}/orgs/{}/audit-log?include=git&per_page={PAGE_SIZE}",
            self.api_url, org
        ));
        let mut events = Vec::new();
        let mut skipped = 0usize;
        let mut page = 0u32;

        while let Some(url) = next.take() {
            page += 1;
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    message: e.to_string(),
                })?;

            if !response.status().is_success() {
                return Err(fetch_error(response).await);
            }

            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);

            let entries: Vec<WireAuditEvent> =
                response
                    .json()
                    .await
                    .map_err(|e| FetchError::MalformedResponse {
                        message: e.to_string(),
                    })?;

            debug!(page, entries = entries.len(), "fetched audit log page");

            for entry in entries {
                match entry.into_domain() {
                    Some(event) => events.push(event),
                    None => skipped += 1,
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, "ignored audit log entries without a timestamp, repository, or action");
        }
        debug!(pages = page, events = events.len(), "audit log fetch complete");

        Ok(events)
    }
}

async fn fetch_error(response: reqwest::Response) -> FetchError {
    let failure = api_failure(response).await;
    match failure.kind {
        FailureKind::Unauthorized => FetchError::Unauthorized {
            message: failure.message,
        },
        FailureKind::RateLimited => FetchError::RateLimited {
            message: failure.message,
        },
        FailureKind::Conflict | FailureKind::Other => FetchError::Api {
            status: failure.status.as_u16(),
            message: failure.message,
        },
    }
}

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header.
fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params.split(';').any(|param| {
            param
                .trim()
                .strip_prefix("rel=")
                .map(|rel| rel.trim_matches('"'))
                .is_some_and(|rel| rel.split_whitespace().any(|r| r == "next"))
        });
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        is_next.then(|| target.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn finds_next_link_among_relations() {
        let header = r#"<https://api.github.com/organizations/1/audit-log?after=abc&before=>; rel="next", <https://api.github.com/organizations/1/audit-log?before=xyz>; rel="prev""#;

        assert_eq!(
            next_page_url(header).as_deref(),
            Some("https://api.github.com/organizations/1/audit-log?after=abc&before=")
        );
    }

    #[test]
    fn no_next_link_on_last_page() {
        let header = r#"<https://api.github.com/x?page=1>; rel="first", <https://api.github.com/x?page=3>; rel="prev""#;
        assert_eq!(next_page_url(header), None);
    }

    #[test]
    fn garbage_link_header_is_ignored() {
        assert_eq!(next_page_url("not a link header"), None);
    }

    #[test]
    fn wire_event_with_all_fields_converts() {
        let wire: WireAuditEvent = serde_json::from_value(json!({
            "@timestamp": 1_709_290_542_000_i64,
            "action": "git.clone",
            "repo": "acme/foo",
            "actor": "octocat",
            "transport_protocol_name": "http",
        }))
        .unwrap();

        let event = wire.into_domain().unwrap();

        assert_eq!(event.timestamp.as_millis(), 1_709_290_542_000);
        assert_eq!(event.repo.as_str(), "acme/foo");
        assert_eq!(event.action.as_str(), "git.clone");
    }

    #[test]
    fn wire_event_missing_repo_or_timestamp_is_dropped() {
        let no_repo: WireAuditEvent =
            serde_json::from_value(json!({ "@timestamp": 1, "action": "git.clone" })).unwrap();
        let no_time: WireAuditEvent =
            serde_json::from_value(json!({ "repo": "acme/foo", "action": "git.clone" })).unwrap();
        let text_time: WireAuditEvent = serde_json::from_value(
            json!({ "@timestamp": "yesterday", "repo": "acme/foo", "action": "git.clone" }),
        )
        .unwrap();

        assert!(no_repo.into_domain().is_none());
        assert!(no_time.into_domain().is_none());
        assert!(text_time.into_domain().is_none());
    }
}
