use chrono::Utc;
use uuid::Uuid;

use super::types::*;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{parse_datetime, parse_uuid};

#[derive(sqlx::FromRow)]
struct Row {
    id: String,
    user_id: String,
    name: String,
    description: Option<String>,
    client_name: Option<String>,
    client_email: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl Row {
    fn into_project(self) -> Project {
        Project {
            id: parse_uuid(&self.id),
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            client_name: self.client_name,
            client_email: self.client_email,
            status: ProjectStatus::parse(&self.status),
            created_at: parse_datetime(&self.created_at),
            updated_at: parse_datetime(&self.updated_at),
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, name, description, client_name, \
     client_email, status, created_at, updated_at FROM projects";

// Optional text fields store NULL rather than empty strings.
fn clean_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// All projects owned by a user, newest first.
pub async fn find_all_for_user(pool: &DbPool, user_id: &str) -> Result<Vec<Project>, AppError> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Row::into_project).collect())
}

/// A single project, scoped to its owner. Returns None when the project does
/// not exist or belongs to someone else.
pub async fn find_for_user(
    pool: &DbPool,
    id: Uuid,
    user_id: &str,
) -> Result<Option<Project>, AppError> {
    let row = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_COLUMNS} WHERE id = ?1 AND user_id = ?2"
    ))
    .bind(id.to_string())
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Row::into_project))
}

pub async fn create(
    pool: &DbPool,
    user_id: &str,
    data: &CreateProjectData,
) -> Result<Project, AppError> {
    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        name: data.name.trim().to_string(),
        description: data.description.as_deref().and_then(clean_text),
        client_name: data.client_name.as_deref().and_then(clean_text),
        client_email: data.client_email.as_deref().and_then(clean_text),
        status: ProjectStatus::Active,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO projects (id, user_id, name, description, client_name, client_email, \
         status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(project.id.to_string())
    .bind(&project.user_id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.client_name)
    .bind(&project.client_email)
    .bind(project.status.as_str())
    .bind(project.created_at.to_rfc3339())
    .bind(project.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(project)
}

/// Apply a partial update. Returns the updated project, or None when the
/// project is not visible to this user.
pub async fn update(
    pool: &DbPool,
    id: Uuid,
    user_id: &str,
    data: &UpdateProjectData,
) -> Result<Option<Project>, AppError> {
    let Some(mut project) = find_for_user(pool, id, user_id).await? else {
        return Ok(None);
    };

    if let Some(name) = &data.name {
        project.name = name.trim().to_string();
    }
    if let Some(description) = &data.description {
        project.description = clean_text(description);
    }
    if let Some(client_name) = &data.client_name {
        project.client_name = clean_text(client_name);
    }
    if let Some(client_email) = &data.client_email {
        project.client_email = clean_text(client_email);
    }
    if let Some(status) = data.status {
        project.status = status;
    }
    project.updated_at = Utc::now();

    sqlx::query(
        "UPDATE projects SET name = ?1, description = ?2, client_name = ?3, \
         client_email = ?4, status = ?5, updated_at = ?6 \
         WHERE id = ?7 AND user_id = ?8",
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.client_name)
    .bind(&project.client_email)
    .bind(project.status.as_str())
    .bind(project.updated_at.to_rfc3339())
    .bind(id.to_string())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(Some(project))
}

/// Delete a project and, via cascade, its entries, files and proposals.
/// Returns false when nothing was deleted.
pub async fn delete(pool: &DbPool, id: Uuid, user_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?1 AND user_id = ?2")
        .bind(id.to_string())
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
