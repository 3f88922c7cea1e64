use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Human review state of a proposal. Independent of the automation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Sent => "sent",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "sent" => ProposalStatus::Sent,
            "approved" => ProposalStatus::Approved,
            "rejected" => ProposalStatus::Rejected,
            _ => ProposalStatus::Draft,
        }
    }
}

/// Where a proposal sits in the generation pipeline.
///
/// `pending -> processing -> completed | failed`. The terminal states are
/// final: a failed generation is retried by creating a new version, never by
/// flipping this field back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AutomationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AutomationStatus::Pending => "pending",
            AutomationStatus::Processing => "processing",
            AutomationStatus::Completed => "completed",
            AutomationStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "processing" => AutomationStatus::Processing,
            "completed" => AutomationStatus::Completed,
            "failed" => AutomationStatus::Failed,
            _ => AutomationStatus::Pending,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AutomationStatus::Completed | AutomationStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: String,
    /// Per-project counter starting at 1. Versions are never reused, even
    /// after failed or deleted proposals.
    pub version: i64,
    pub title: String,
    pub content: serde_json::Value,
    pub status: ProposalStatus,
    pub automation_status: AutomationStatus,
    /// Failure details (`error`, `failed_at`). Absent unless generation failed.
    pub automation_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field updates distilled from an automation callback, after alias and
/// default handling. `status` is the final value to store, error override
/// already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackUpdate {
    pub status: AutomationStatus,
    pub content: Option<serde_json::Value>,
    pub doc_link: Option<String>,
    pub ai_content: Option<serde_json::Value>,
    pub error_message: Option<String>,
}
