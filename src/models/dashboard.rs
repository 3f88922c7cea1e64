use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::project::{self, Project};
use crate::models::{parse_datetime, parse_uuid};

// ---------- Types ----------

/// Aggregate numbers and recent items for the dashboard, scoped to one user.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_projects: i64,
    pub active_projects: i64,
    pub completed_projects: i64,
    pub total_entries: i64,
    pub total_files: i64,
    pub total_proposals: i64,
    pub recent_projects: Vec<Project>,
    pub recent_activity: Vec<ActivityItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Entry,
    File,
    Proposal,
}

/// One row in the merged "recent activity" feed.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------- Queries ----------

/// Load the full stats block. Dashboard data is advisory, so query failures
/// degrade to zeros and empty lists instead of failing the request.
pub async fn load_stats(pool: &DbPool, user_id: &str) -> DashboardStats {
    let total_projects =
        count(pool, "SELECT COUNT(*) FROM projects WHERE user_id = ?1", user_id).await;
    let active_projects = count(
        pool,
        "SELECT COUNT(*) FROM projects WHERE user_id = ?1 AND status = 'active'",
        user_id,
    )
    .await;
    let completed_projects = count(
        pool,
        "SELECT COUNT(*) FROM projects WHERE user_id = ?1 AND status = 'completed'",
        user_id,
    )
    .await;
    let total_entries = count(
        pool,
        "SELECT COUNT(*) FROM project_entries WHERE user_id = ?1",
        user_id,
    )
    .await;
    let total_files = count(
        pool,
        "SELECT COUNT(*) FROM project_files WHERE user_id = ?1",
        user_id,
    )
    .await;
    let total_proposals = count(
        pool,
        "SELECT COUNT(*) FROM project_proposals WHERE user_id = ?1",
        user_id,
    )
    .await;

    let mut recent_projects = project::find_all_for_user(pool, user_id)
        .await
        .unwrap_or_default();
    recent_projects.truncate(5);

    let recent_activity = find_recent_activity(pool, user_id).await;

    DashboardStats {
        total_projects,
        active_projects,
        completed_projects,
        total_entries,
        total_files,
        total_proposals,
        recent_projects,
        recent_activity,
    }
}

async fn count(pool: &DbPool, sql: &str, user_id: &str) -> i64 {
    let result: Result<(i64,), _> = sqlx::query_as(sql).bind(user_id).fetch_one(pool).await;
    result.map(|r| r.0).unwrap_or(0)
}

/// Latest entries, files and proposals merged into one feed, newest first.
async fn find_recent_activity(pool: &DbPool, user_id: &str) -> Vec<ActivityItem> {
    #[derive(sqlx::FromRow)]
    struct ActivityRow {
        id: String,
        title: String,
        project_id: String,
        created_at: String,
    }

    let sources = [
        (
            ActivityKind::Entry,
            "SELECT id, title, project_id, created_at FROM project_entries \
             WHERE user_id = ?1 ORDER BY created_at DESC LIMIT 10",
        ),
        (
            ActivityKind::File,
            "SELECT id, name AS title, project_id, created_at FROM project_files \
             WHERE user_id = ?1 ORDER BY created_at DESC LIMIT 10",
        ),
        (
            ActivityKind::Proposal,
            "SELECT id, title, project_id, created_at FROM project_proposals \
             WHERE user_id = ?1 ORDER BY created_at DESC LIMIT 10",
        ),
    ];

    let mut items: Vec<ActivityItem> = Vec::new();
    for (kind, sql) in sources {
        let rows = sqlx::query_as::<_, ActivityRow>(sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
            .unwrap_or_default();
        items.extend(rows.into_iter().map(|row| ActivityItem {
            id: parse_uuid(&row.id),
            kind,
            title: row.title,
            project_id: parse_uuid(&row.project_id),
            created_at: parse_datetime(&row.created_at),
        }));
    }

    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.truncate(10);
    items
}
