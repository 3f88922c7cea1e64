use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Document,
    Image,
    Audio,
    Video,
    Other,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Document => "document",
            FileType::Image => "image",
            FileType::Audio => "audio",
            FileType::Video => "video",
            FileType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "document" => FileType::Document,
            "image" => FileType::Image,
            "audio" => FileType::Audio,
            "video" => FileType::Video,
            _ => FileType::Other,
        }
    }

    /// Coarse bucket from a MIME type, used when the caller does not pick one.
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            FileType::Image
        } else if mime_type.starts_with("audio/") {
            FileType::Audio
        } else if mime_type.starts_with("video/") {
            FileType::Video
        } else if mime_type.starts_with("text/") || mime_type == "application/pdf" {
            FileType::Document
        } else {
            FileType::Other
        }
    }
}

/// Metadata record for a file held in external storage. The bytes themselves
/// never pass through this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub original_name: String,
    pub file_type: FileType,
    pub mime_type: String,
    pub file_size: i64,
    pub storage_path: String,
    pub folder_path: String,
    pub tags: Vec<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of POST /api/projects/{id}/files.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterFileData {
    pub name: String,
    pub original_name: Option<String>,
    pub file_type: Option<FileType>,
    pub mime_type: String,
    pub file_size: i64,
    pub storage_path: String,
    pub folder_path: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<serde_json::Value>,
}
