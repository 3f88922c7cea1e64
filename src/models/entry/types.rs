use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of knowledge captured by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Note,
    Meeting,
    Requirement,
    Feedback,
    General,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Note => "note",
            EntryType::Meeting => "meeting",
            EntryType::Requirement => "requirement",
            EntryType::Feedback => "feedback",
            EntryType::General => "general",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "note" => EntryType::Note,
            "meeting" => EntryType::Meeting,
            "requirement" => EntryType::Requirement,
            "feedback" => EntryType::Feedback,
            _ => EntryType::General,
        }
    }
}

/// A timestamped note attached to a project. Entries are part of the
/// snapshot handed to the automation workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub entry_type: EntryType,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of POST /api/projects/{id}/entries.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryData {
    pub title: String,
    pub body: String,
    pub entry_type: Option<EntryType>,
    pub metadata: Option<serde_json::Value>,
}

/// Body of PUT /api/projects/{id}/entries/{entry_id}.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntryData {
    pub title: Option<String>,
    pub body: Option<String>,
    pub entry_type: Option<EntryType>,
    pub metadata: Option<serde_json::Value>,
}
