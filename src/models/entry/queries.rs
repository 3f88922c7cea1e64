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
    title: String,
    body: String,
    entry_type: String,
    metadata: String,
    created_at: String,
    updated_at: String,
}

impl Row {
    fn into_entry(self) -> Entry {
        Entry {
            id: parse_uuid(&self.id),
            project_id: parse_uuid(&self.project_id),
            user_id: self.user_id,
            title: self.title,
            body: self.body,
            entry_type: EntryType::parse(&self.entry_type),
            metadata: serde_json::from_str(&self.metadata)
                .unwrap_or(serde_json::Value::Null),
            created_at: parse_datetime(&self.created_at),
            updated_at: parse_datetime(&self.updated_at),
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, project_id, user_id, title, body, entry_type, \
     metadata, created_at, updated_at FROM project_entries";

/// All entries of a project, newest first.
pub async fn find_all_for_project(
    pool: &DbPool,
    project_id: Uuid,
) -> Result<Vec<Entry>, AppError> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_COLUMNS} WHERE project_id = ?1 ORDER BY created_at DESC"
    ))
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Row::into_entry).collect())
}

pub async fn find_by_id(
    pool: &DbPool,
    project_id: Uuid,
    id: Uuid,
) -> Result<Option<Entry>, AppError> {
    let row = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_COLUMNS} WHERE id = ?1 AND project_id = ?2"
    ))
    .bind(id.to_string())
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Row::into_entry))
}

pub async fn create(
    pool: &DbPool,
    project_id: Uuid,
    user_id: &str,
    data: &CreateEntryData,
) -> Result<Entry, AppError> {
    let now = Utc::now();
    let entry = Entry {
        id: Uuid::new_v4(),
        project_id,
        user_id: user_id.to_string(),
        title: data.title.trim().to_string(),
        body: data.body.clone(),
        entry_type: data.entry_type.unwrap_or(EntryType::General),
        metadata: data
            .metadata
            .clone()
            .unwrap_or_else(|| serde_json::json!({})),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO project_entries (id, project_id, user_id, title, body, entry_type, \
         metadata, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(entry.id.to_string())
    .bind(entry.project_id.to_string())
    .bind(&entry.user_id)
    .bind(&entry.title)
    .bind(&entry.body)
    .bind(entry.entry_type.as_str())
    .bind(entry.metadata.to_string())
    .bind(entry.created_at.to_rfc3339())
    .bind(entry.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(entry)
}

pub async fn update(
    pool: &DbPool,
    project_id: Uuid,
    id: Uuid,
    data: &UpdateEntryData,
) -> Result<Option<Entry>, AppError> {
    let Some(mut entry) = find_by_id(pool, project_id, id).await? else {
        return Ok(None);
    };

    if let Some(title) = &data.title {
        entry.title = title.trim().to_string();
    }
    if let Some(body) = &data.body {
        entry.body = body.clone();
    }
    if let Some(entry_type) = data.entry_type {
        entry.entry_type = entry_type;
    }
    if let Some(metadata) = &data.metadata {
        entry.metadata = metadata.clone();
    }
    entry.updated_at = Utc::now();

    sqlx::query(
        "UPDATE project_entries SET title = ?1, body = ?2, entry_type = ?3, metadata = ?4, \
         updated_at = ?5 WHERE id = ?6 AND project_id = ?7",
    )
    .bind(&entry.title)
    .bind(&entry.body)
    .bind(entry.entry_type.as_str())
    .bind(entry.metadata.to_string())
    .bind(entry.updated_at.to_rfc3339())
    .bind(id.to_string())
    .bind(project_id.to_string())
    .execute(pool)
    .await?;

    Ok(Some(entry))
}

pub async fn delete(pool: &DbPool, project_id: Uuid, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM project_entries WHERE id = ?1 AND project_id = ?2")
        .bind(id.to_string())
        .bind(project_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
