use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{AutomationError, token};
use crate::config::AutomationConfig;
use crate::models::entry::Entry;
use crate::models::file::ProjectFile;
use crate::models::project::Project;

/// Everything the automation workflow gets to see about a project, frozen at
/// the moment generation started.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSnapshot {
    pub project: Project,
    pub entries: Vec<Entry>,
    pub files: Vec<ProjectFile>,
    pub generated_at: DateTime<Utc>,
}

/// Body of the outbound trigger request.
#[derive(Debug, Serialize)]
struct TriggerRequest<'a> {
    project_id: Uuid,
    id: Uuid,
    project_data: &'a ProjectSnapshot,
    callback_url: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The workflow endpoint accepted the trigger.
    Triggered,
    /// No signing secret configured; nothing was sent.
    Skipped,
}

/// Outbound side of the automation integration. The HTTP implementation is
/// swapped out in tests.
#[async_trait]
pub trait WorkflowTrigger: Send + Sync {
    async fn trigger_workflow(
        &self,
        project_id: Uuid,
        proposal_id: Uuid,
        snapshot: &ProjectSnapshot,
    ) -> Result<DispatchOutcome, AutomationError>;
}

pub struct HttpAutomationGateway {
    http: reqwest::Client,
    config: AutomationConfig,
}

impl HttpAutomationGateway {
    pub fn new(config: AutomationConfig) -> Self {
        HttpAutomationGateway {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl WorkflowTrigger for HttpAutomationGateway {
    async fn trigger_workflow(
        &self,
        project_id: Uuid,
        proposal_id: Uuid,
        snapshot: &ProjectSnapshot,
    ) -> Result<DispatchOutcome, AutomationError> {
        let Some(secret) = &self.config.signing_secret else {
            log::info!(
                "Automation secret not configured, skipping workflow trigger \
                 for proposal {proposal_id}"
            );
            return Ok(DispatchOutcome::Skipped);
        };

        let token = token::mint(secret, project_id, proposal_id)?;
        let request = TriggerRequest {
            project_id,
            id: proposal_id,
            project_data: snapshot,
            callback_url: &self.config.callback_url,
        };

        let response = self
            .http
            .post(&self.config.webhook_url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutomationError::Dispatch(status.as_u16()));
        }

        log::info!("Workflow triggered for proposal {proposal_id} (project {project_id})");
        Ok(DispatchOutcome::Triggered)
    }
}
