use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::session::require_user;
use crate::automation::callback::{self, CallbackPayload};
use crate::automation::token;
use crate::config::AutomationConfig;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::project;
use crate::models::proposal::AutomationStatus;

/// POST /webhooks/proposal-callback - Result delivery from the automation
/// service
///
/// Authenticated by the bearer credential minted at trigger time, not by a
/// session. With no signing secret configured the endpoint is closed.
pub async fn proposal_callback(
    pool: web::Data<DbPool>,
    config: web::Data<AutomationConfig>,
    req: HttpRequest,
    body: web::Json<CallbackPayload>,
) -> Result<HttpResponse, AppError> {
    let Some(secret) = &config.signing_secret else {
        return Err(AppError::AutomationDisabled);
    };

    let token = bearer_token(&req).ok_or(AppError::InvalidCallbackToken)?;
    let claims = token::verify(secret, token).map_err(|_| AppError::InvalidCallbackToken)?;

    let payload = body.into_inner();
    // The credential is bound to one project; a payload naming any other
    // project is rejected before it can touch data.
    if let Some(project_id) = payload.project_id.as_deref() {
        if project_id != claims.project_id {
            return Err(AppError::InvalidCallbackToken);
        }
    }

    let proposal_id = callback::apply(&pool, payload).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Proposal updated",
        "proposal_id": proposal_id,
    })))
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub project_id: Uuid,
}

/// POST /api/test-webhook - Apply a canned successful callback to the
/// caller's own project, in process, without the external service. Exists so
/// the pipeline can be exercised end to end in development.
pub async fn simulate(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<SimulateRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;

    let project = project::find_for_user(&pool, body.project_id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let payload = CallbackPayload {
        project_id: Some(project.id.to_string()),
        status: Some(AutomationStatus::Completed),
        link: Some(Uuid::new_v4().simple().to_string()),
        ai_content: Some(json!({
            "summary": format!("Mock proposal summary for {}", project.name),
            "timeline": "4-6 weeks",
            "estimated_cost": "10,000 - 15,000 EUR",
            "deliverables": [
                "Requirements analysis",
                "Implementation",
                "Handover and documentation",
            ],
        })),
        ..Default::default()
    };

    let proposal_id = callback::apply(&pool, payload.clone()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Mock callback applied",
        "mock_payload": payload,
        "proposal_id": proposal_id,
    })))
}
