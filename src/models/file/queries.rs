use chrono::Utc;
use uuid::Uuid;

use super::types::*;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{parse_datetime, parse_uuid};

#[derive(sqlx::FromRow)]
struct Row {
    id: String,
    project_id: String,
    user_id: String,
    name: String,
    original_name: String,
    file_type: String,
    mime_type: String,
    file_size: i64,
    storage_path: String,
    folder_path: String,
    tags: String,
    metadata: String,
    created_at: String,
    updated_at: String,
}

impl Row {
    fn into_file(self) -> ProjectFile {
        ProjectFile {
            id: parse_uuid(&self.id),
            project_id: parse_uuid(&self.project_id),
            user_id: self.user_id,
            name: self.name,
            original_name: self.original_name,
            file_type: FileType::parse(&self.file_type),
            mime_type: self.mime_type,
            file_size: self.file_size,
            storage_path: self.storage_path,
            folder_path: self.folder_path,
            tags: serde_json::from_str(&self.tags).unwrap_or_default(),
            metadata: serde_json::from_str(&self.metadata)
                .unwrap_or(serde_json::Value::Null),
            created_at: parse_datetime(&self.created_at),
            updated_at: parse_datetime(&self.updated_at),
        }
    }
}

/// All file records of a project, newest first.
pub async fn find_all_for_project(
    pool: &DbPool,
    project_id: Uuid,
) -> Result<Vec<ProjectFile>, AppError> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, project_id, user_id, name, original_name, file_type, mime_type, \
         file_size, storage_path, folder_path, tags, metadata, created_at, updated_at \
         FROM project_files WHERE project_id = ?1 ORDER BY created_at DESC",
    )
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Row::into_file).collect())
}

pub async fn create(
    pool: &DbPool,
    project_id: Uuid,
    user_id: &str,
    data: &RegisterFileData,
) -> Result<ProjectFile, AppError> {
    let now = Utc::now();
    let file = ProjectFile {
        id: Uuid::new_v4(),
        project_id,
        user_id: user_id.to_string(),
        name: data.name.clone(),
        original_name: data.original_name.clone().unwrap_or_else(|| data.name.clone()),
        file_type: data
            .file_type
            .unwrap_or_else(|| FileType::from_mime(&data.mime_type)),
        mime_type: data.mime_type.clone(),
        file_size: data.file_size,
        storage_path: data.storage_path.clone(),
        folder_path: data.folder_path.clone().unwrap_or_else(|| "/".to_string()),
        tags: data.tags.clone().unwrap_or_default(),
        metadata: data
            .metadata
            .clone()
            .unwrap_or_else(|| serde_json::json!({})),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO project_files (id, project_id, user_id, name, original_name, file_type, \
         mime_type, file_size, storage_path, folder_path, tags, metadata, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )
    .bind(file.id.to_string())
    .bind(file.project_id.to_string())
    .bind(&file.user_id)
    .bind(&file.name)
    .bind(&file.original_name)
    .bind(file.file_type.as_str())
    .bind(&file.mime_type)
    .bind(file.file_size)
    .bind(&file.storage_path)
    .bind(&file.folder_path)
    .bind(serde_json::to_string(&file.tags)?)
    .bind(file.metadata.to_string())
    .bind(file.created_at.to_rfc3339())
    .bind(file.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(file)
}

pub async fn delete(pool: &DbPool, project_id: Uuid, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM project_files WHERE id = ?1 AND project_id = ?2")
        .bind(id.to_string())
        .bind(project_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
