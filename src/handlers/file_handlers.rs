use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;
use uuid::Uuid;

use crate::auth::session::require_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::file::{self, RegisterFileData};
use crate::models::project;

/// GET /api/projects/{id}/files - All file records of a project
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

    let files = file::find_all_for_project(&pool, project_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "files": files })))
}

/// POST /api/projects/{id}/files - Register a file already placed in storage
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<Uuid>,
    body: web::Json<RegisterFileData>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;
    let project_id = path.into_inner();

    project::find_for_user(&pool, project_id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("File name is required".to_string()));
    }
    if body.storage_path.trim().is_empty() {
        return Err(AppError::Validation("Storage path is required".to_string()));
    }
    if body.file_size < 0 {
        return Err(AppError::Validation("File size cannot be negative".to_string()));
    }

    let file = file::create(&pool, project_id, &user_id, &body).await?;

    Ok(HttpResponse::Created().json(json!({ "file": file })))
}

/// DELETE /api/projects/{id}/files/{file_id}
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;
    let (project_id, file_id) = path.into_inner();

    project::find_for_user(&pool, project_id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let deleted = file::delete(&pool, project_id, file_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
