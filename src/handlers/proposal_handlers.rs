use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;
use uuid::Uuid;

use crate::auth::session::require_user;
use crate::automation::gateway::WorkflowTrigger;
use crate::automation::orchestrator;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::project;
use crate::models::proposal;

/// GET /api/projects/{id}/proposals - All proposals, newest version first
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

    let proposals = proposal::find_all_for_project(&pool, project_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "proposals": proposals })))
}

/// POST /api/projects/{id}/proposals - Create the next version and trigger
/// automated generation
///
/// Responds as soon as the draft exists; generation continues detached and
/// is observed by polling the list.
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    trigger: web::Data<dyn WorkflowTrigger>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;
    let project_id = path.into_inner();

    let project = project::find_for_user(&pool, project_id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let proposal = orchestrator::generate(&pool, trigger.into_inner(), &project).await?;

    Ok(HttpResponse::Created().json(json!({
        "proposal": proposal,
        "proposal_id": proposal.id,
    })))
}
