use chrono::Utc;
use serde_json::json;
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
    version: i64,
    title: String,
    content: String,
    status: String,
    automation_status: String,
    automation_data: Option<String>,
    created_at: String,
    updated_at: String,
}

impl Row {
    fn into_proposal(self) -> Proposal {
        Proposal {
            id: parse_uuid(&self.id),
            project_id: parse_uuid(&self.project_id),
            user_id: self.user_id,
            version: self.version,
            title: self.title,
            content: serde_json::from_str(&self.content).unwrap_or_else(|_| json!({})),
            status: ProposalStatus::parse(&self.status),
            automation_status: AutomationStatus::parse(&self.automation_status),
            automation_data: self
                .automation_data
                .and_then(|data| serde_json::from_str(&data).ok()),
            created_at: parse_datetime(&self.created_at),
            updated_at: parse_datetime(&self.updated_at),
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, project_id, user_id, version, title, content, \
     status, automation_status, automation_data, created_at, updated_at \
     FROM project_proposals";

/// All proposals of a project, newest version first.
pub async fn find_all_for_project(
    pool: &DbPool,
    project_id: Uuid,
) -> Result<Vec<Proposal>, AppError> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_COLUMNS} WHERE project_id = ?1 ORDER BY version DESC"
    ))
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Row::into_proposal).collect())
}

pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Proposal>, AppError> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Row::into_proposal))
}

/// Next free version number for a project. Counts from 1 and only ever grows,
/// regardless of deleted or failed proposals.
pub async fn next_version(pool: &DbPool, project_id: Uuid) -> Result<i64, AppError> {
    let result: (i64,) = sqlx::query_as(
        "SELECT COALESCE(MAX(version), 0) + 1 FROM project_proposals WHERE project_id = ?1",
    )
    .bind(project_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}

/// Insert a fresh draft proposal at the given version.
///
/// The UNIQUE (project_id, version) index rejects a version taken by a
/// concurrent writer; callers detect that via [`is_version_conflict`] and
/// retry with a re-read counter.
pub async fn create(
    pool: &DbPool,
    project_id: Uuid,
    user_id: &str,
    version: i64,
    title: &str,
) -> Result<Proposal, AppError> {
    let now = Utc::now();
    let proposal = Proposal {
        id: Uuid::new_v4(),
        project_id,
        user_id: user_id.to_string(),
        version,
        title: title.to_string(),
        content: json!({}),
        status: ProposalStatus::Draft,
        automation_status: AutomationStatus::Pending,
        automation_data: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO project_proposals (id, project_id, user_id, version, title, content, \
         status, automation_status, automation_data, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(proposal.id.to_string())
    .bind(proposal.project_id.to_string())
    .bind(&proposal.user_id)
    .bind(proposal.version)
    .bind(&proposal.title)
    .bind(proposal.content.to_string())
    .bind(proposal.status.as_str())
    .bind(proposal.automation_status.as_str())
    .bind(None::<String>)
    .bind(proposal.created_at.to_rfc3339())
    .bind(proposal.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(proposal)
}

/// True when an insert lost the race for a (project_id, version) slot.
pub fn is_version_conflict(err: &AppError) -> bool {
    match err {
        AppError::Db(e) => e
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation()),
        _ => false,
    }
}

pub async fn set_automation_status(
    pool: &DbPool,
    id: Uuid,
    status: AutomationStatus,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE project_proposals SET automation_status = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(status.as_str())
    .bind(Utc::now().to_rfc3339())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Record a terminal failure together with its cause.
pub async fn mark_failed(pool: &DbPool, id: Uuid, error: &str) -> Result<(), AppError> {
    let now = Utc::now();
    let automation_data = json!({
        "error": error,
        "failed_at": now.to_rfc3339(),
    });

    sqlx::query(
        "UPDATE project_proposals SET automation_status = ?1, automation_data = ?2, \
         updated_at = ?3 WHERE id = ?4",
    )
    .bind(AutomationStatus::Failed.as_str())
    .bind(automation_data.to_string())
    .bind(now.to_rfc3339())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// The proposal a callback without an explicit proposal_id refers to: the
/// most recently created one still in `processing`.
pub async fn find_latest_processing(
    pool: &DbPool,
    project_id: Uuid,
) -> Result<Option<Proposal>, AppError> {
    let row = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_COLUMNS} WHERE project_id = ?1 AND automation_status = 'processing' \
         ORDER BY created_at DESC, version DESC LIMIT 1"
    ))
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Row::into_proposal))
}

/// Apply the outcome of an automation run to a proposal row.
///
/// Payload content keys are merged into the existing `content` object,
/// overwriting on collision but never clearing other keys. The same update
/// applied twice produces the same row.
pub async fn apply_callback(
    pool: &DbPool,
    proposal_id: Uuid,
    project_id: Uuid,
    update: &CallbackUpdate,
) -> Result<(), AppError> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT content FROM project_proposals WHERE id = ?1 AND project_id = ?2",
    )
    .bind(proposal_id.to_string())
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    let Some((content_text,)) = row else {
        return Err(AppError::NotFound);
    };

    let mut content: serde_json::Value =
        serde_json::from_str(&content_text).unwrap_or_else(|_| json!({}));
    if !content.is_object() {
        content = json!({});
    }

    if let Some(serde_json::Value::Object(fields)) = &update.content {
        for (key, value) in fields {
            content[key.as_str()] = value.clone();
        }
    }
    if let Some(link) = &update.doc_link {
        content["link"] = json!(link);
    }
    if let Some(ai_content) = &update.ai_content {
        content["ai_generated_content"] = ai_content.clone();
    }

    let now = Utc::now();
    let result = match &update.error_message {
        Some(error) => {
            let automation_data = json!({
                "error": error,
                "failed_at": now.to_rfc3339(),
            });
            sqlx::query(
                "UPDATE project_proposals SET content = ?1, automation_status = ?2, \
                 automation_data = ?3, updated_at = ?4 WHERE id = ?5 AND project_id = ?6",
            )
            .bind(content.to_string())
            .bind(update.status.as_str())
            .bind(automation_data.to_string())
            .bind(now.to_rfc3339())
            .bind(proposal_id.to_string())
            .bind(project_id.to_string())
            .execute(pool)
            .await
        }
        None => {
            sqlx::query(
                "UPDATE project_proposals SET content = ?1, automation_status = ?2, \
                 updated_at = ?3 WHERE id = ?4 AND project_id = ?5",
            )
            .bind(content.to_string())
            .bind(update.status.as_str())
            .bind(now.to_rfc3339())
            .bind(proposal_id.to_string())
            .bind(project_id.to_string())
            .execute(pool)
            .await
        }
    };

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Callback update for proposal {proposal_id} failed: {e}");
            Err(AppError::UpdateFailed)
        }
    }
}
