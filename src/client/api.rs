use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::poller::{FetchError, ProposalFetcher};
use crate::models::proposal::Proposal;

/// Thin consumer of the HTTP API, enough to drive a [`ProposalPoller`] from
/// outside the server process.
///
/// [`ProposalPoller`]: super::poller::ProposalPoller
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient {
            http: reqwest::Client::new(),
            base_url,
            session_cookie: None,
        }
    }

    /// Attach the session cookie obtained from login.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}

#[async_trait]
impl ProposalFetcher for ApiClient {
    async fn list_proposals(&self, project_id: Uuid) -> Result<Vec<Proposal>, FetchError> {
        #[derive(Deserialize)]
        struct ProposalsBody {
            proposals: Vec<Proposal>,
        }

        let url = format!("{}/api/projects/{}/proposals", self.base_url, project_id);
        let mut request = self.http.get(&url);
        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: ProposalsBody = response.json().await?;
        Ok(body.proposals)
    }
}
