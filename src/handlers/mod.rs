pub mod dashboard;
pub mod entry_handlers;
pub mod file_handlers;
pub mod project_handlers;
pub mod proposal_handlers;
pub mod webhook_handlers;

use actix_web::web;

use crate::auth::middleware::require_json_content_type;

/// Configure the session-protected JSON API mounted under /api.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projects")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(project_handlers::list))
            .route("", web::post().to(project_handlers::create))
            .route("/{id}", web::get().to(project_handlers::read))
            .route("/{id}", web::put().to(project_handlers::update))
            .route("/{id}", web::delete().to(project_handlers::delete))
            .route("/{id}/entries", web::get().to(entry_handlers::list))
            .route("/{id}/entries", web::post().to(entry_handlers::create))
            .route("/{id}/entries/{entry_id}", web::put().to(entry_handlers::update))
            .route("/{id}/entries/{entry_id}", web::delete().to(entry_handlers::delete))
            .route("/{id}/files", web::get().to(file_handlers::list))
            .route("/{id}/files", web::post().to(file_handlers::create))
            .route("/{id}/files/{file_id}", web::delete().to(file_handlers::delete))
            .route("/{id}/proposals", web::get().to(proposal_handlers::list))
            .route("/{id}/proposals", web::post().to(proposal_handlers::create)),
    );
    cfg.route("/dashboard/stats", web::get().to(dashboard::stats));
    cfg.service(
        web::scope("/test-webhook")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::post().to(webhook_handlers::simulate)),
    );
}
