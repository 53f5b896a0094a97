//! Report persistence through the repository contents API.
//!
//! `PUT /repos/{owner}/{repo}/contents/{path}` with base64-encoded content.
//! No `sha` is sent, so GitHub refuses to replace an existing file; that
//! refusal surfaces as [`PublishError::Conflict`]. Other validation failures
//! (also 422) surface as [`PublishError::Api`].

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use tracing::{debug, instrument};

use pipeline::{PublishError, PublishRequest, ReportPublisher};

use crate::client::{api_failure, FailureKind, GithubClient};

#[derive(Debug, Serialize)]
struct CreateFileBody<'a> {
    message: &'a str,
    content: String,
    committer: Committer<'a>,
}

#[derive(Debug, Serialize)]
struct Committer<'a> {
    name: &'a str,
    email: &'a str,
}

#[async_trait]
impl ReportPublisher for GithubClient {
    #[instrument(skip(self, request), fields(owner = %self.owner, repo = %self.repo, path = %request.path))]
    async fn put(&self, request: &PublishRequest) -> Result<(), PublishError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, self.owner, self.repo, request.path
        );
        let body = CreateFileBody {
            message: &request.message,
            content: STANDARD.encode(&request.content),
            committer: Committer {
                name: &request.committer.name,
                email: &request.committer.email,
            },
        };

        let response = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::Transport {
                message: e.to_string(),
            })?;

        if response.status().is_success() {
            debug!(status = response.status().as_u16(), "report committed");
            return Ok(());
        }

        let failure = api_failure(response).await;
        Err(match failure.kind {
            FailureKind::Unauthorized => PublishError::Unauthorized {
                message: failure.message,
            },
            FailureKind::Conflict => PublishError::Conflict {
                path: request.path.clone(),
                message: failure.message,
            },
            FailureKind::RateLimited | FailureKind::Other => PublishError::Api {
                status: failure.status.as_u16(),
                message: failure.message,
            },
        })
    }
}
