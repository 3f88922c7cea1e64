use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project lifecycle state. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }

    /// Parse a stored value; unknown text falls back to `Active`.
    pub fn parse(value: &str) -> Self {
        match value {
            "completed" => ProjectStatus::Completed,
            "archived" => ProjectStatus::Archived,
            _ => ProjectStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of POST /api/projects.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectData {
    pub name: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
}

/// Body of PUT /api/projects/{id}. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectData {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub status: Option<ProjectStatus>,
}
