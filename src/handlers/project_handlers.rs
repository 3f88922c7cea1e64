use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;
use uuid::Uuid;

use crate::auth::session::require_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::events::ProjectsHub;
use crate::models::project::{self, CreateProjectData, UpdateProjectData};

/// GET /api/projects - List the caller's projects, newest first
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;

    let projects = project::find_all_for_user(&pool, &user_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "projects": projects })))
}

/// POST /api/projects - Create a project
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    hub: web::Data<ProjectsHub>,
    body: web::Json<CreateProjectData>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Project name is required".to_string()));
    }

    let project = project::create(&pool, &user_id, &body).await?;
    hub.project_list_changed(&user_id);

    Ok(HttpResponse::Created().json(json!({ "project": project })))
}

/// GET /api/projects/{id} - Single project, owner only
pub async fn read(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;

    let project = project::find_for_user(&pool, path.into_inner(), &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(json!({ "project": project })))
}

/// PUT /api/projects/{id} - Partial update
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    hub: web::Data<ProjectsHub>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProjectData>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;

    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Project name cannot be empty".to_string()));
        }
    }

    let project = project::update(&pool, path.into_inner(), &user_id, &body)
        .await?
        .ok_or(AppError::NotFound)?;
    hub.project_list_changed(&user_id);

    Ok(HttpResponse::Ok().json(json!({ "project": project })))
}

/// DELETE /api/projects/{id} - Remove a project and everything under it
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    hub: web::Data<ProjectsHub>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;

    let deleted = project::delete(&pool, path.into_inner(), &user_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    hub.project_list_changed(&user_id);

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
