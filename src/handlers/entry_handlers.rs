use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;
use uuid::Uuid;

use crate::auth::session::require_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::entry::{self, CreateEntryData, UpdateEntryData};
use crate::models::project;

/// GET /api/projects/{id}/entries - All entries of a project
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;
    let project_id = path.into_inner();

    project::find_for_user(&pool, project_id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let entries = entry::find_all_for_project(&pool, project_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "entries": entries })))
}

/// POST /api/projects/{id}/entries - Add an entry
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<Uuid>,
    body: web::Json<CreateEntryData>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;
    let project_id = path.into_inner();

    project::find_for_user(&pool, project_id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Entry title is required".to_string()));
    }
    if body.body.trim().is_empty() {
        return Err(AppError::Validation("Entry body is required".to_string()));
    }

    let entry = entry::create(&pool, project_id, &user_id, &body).await?;

    Ok(HttpResponse::Created().json(json!({ "entry": entry })))
}

/// PUT /api/projects/{id}/entries/{entry_id} - Partial update
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdateEntryData>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;
    let (project_id, entry_id) = path.into_inner();

    project::find_for_user(&pool, project_id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(title) = &body.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Entry title cannot be empty".to_string()));
        }
    }

    let entry = entry::update(&pool, project_id, entry_id, &body)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(json!({ "entry": entry })))
}

/// DELETE /api/projects/{id}/entries/{entry_id}
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;
    let (project_id, entry_id) = path.into_inner();

    project::find_for_user(&pool, project_id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let deleted = entry::delete(&pool, project_id, entry_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
