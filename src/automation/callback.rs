use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::proposal::{self, AutomationStatus, CallbackUpdate};

/// Inbound callback body. Workflow configurations are loose about field
/// names, so several spellings are accepted and normalized at this boundary:
/// the document link may arrive as `link` or `id`, the AI summary as
/// `ai_content` or a bare `statusMessage` string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AutomationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_content: Option<serde_json::Value>,
    #[serde(rename = "statusMessage", skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// A callback reduced to canonical form: ids parsed, aliases folded, status
/// defaulted and the error override applied.
#[derive(Debug, Clone)]
pub struct NormalizedCallback {
    pub project_id: Uuid,
    pub proposal_id: Option<Uuid>,
    pub update: CallbackUpdate,
}

impl CallbackPayload {
    pub fn normalize(self) -> Result<NormalizedCallback, AppError> {
        let project_id = self
            .project_id
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| AppError::Validation("Missing project_id".to_string()))?;
        let project_id = Uuid::parse_str(project_id)
            .map_err(|_| AppError::Validation("Invalid project_id".to_string()))?;

        let proposal_id = match self.proposal_id.as_deref().filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::Validation("Invalid proposal_id".to_string()))?,
            ),
            None => None,
        };

        let doc_link = self.link.or(self.id).filter(|link| !link.is_empty());
        let ai_content = self.ai_content.or_else(|| {
            self.status_message
                .map(|summary| serde_json::json!({ "summary": summary }))
        });

        let error_message = self.error_message;
        let status = if error_message.is_some() {
            AutomationStatus::Failed
        } else {
            self.status.unwrap_or(AutomationStatus::Completed)
        };

        Ok(NormalizedCallback {
            project_id,
            proposal_id,
            update: CallbackUpdate {
                status,
                content: self.content,
                doc_link,
                ai_content,
                error_message,
            },
        })
    }
}

/// Resolve the target proposal and apply the callback. When the payload
/// names no proposal, the latest `processing` one of the project is used.
/// Returns the id of the updated proposal.
pub async fn apply(pool: &DbPool, payload: CallbackPayload) -> Result<Uuid, AppError> {
    let normalized = payload.normalize()?;

    let proposal_id = match normalized.proposal_id {
        Some(id) => id,
        None => {
            proposal::find_latest_processing(pool, normalized.project_id)
                .await?
                .ok_or(AppError::NoProcessingProposal)?
                .id
        }
    };

    proposal::apply_callback(pool, proposal_id, normalized.project_id, &normalized.update)
        .await?;

    log::info!(
        "Proposal {proposal_id} updated from automation callback ({})",
        normalized.update.status.as_str()
    );
    Ok(proposal_id)
}
