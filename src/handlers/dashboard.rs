use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::auth::session::require_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::dashboard;

/// GET /api/dashboard/stats - Aggregate counts plus recent items
pub async fn stats(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&session)?;

    let stats = dashboard::load_stats(&pool, &user_id).await;

    Ok(HttpResponse::Ok().json(json!({ "stats": stats })))
}
