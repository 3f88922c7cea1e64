use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use propgen::auth;
use propgen::automation::gateway::{HttpAutomationGateway, WorkflowTrigger};
use propgen::config::AppConfig;
use propgen::db;
use propgen::events::ProjectsHub;
use propgen::handlers;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();

    // Ensure the data directory exists
    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Initialize database
    let pool = db::init_pool(&config.database_path)
        .await
        .expect("Failed to open database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+) — generating random key", val.len());
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let trigger: Arc<dyn WorkflowTrigger> =
        Arc::new(HttpAutomationGateway::new(config.automation.clone()));
    let hub = ProjectsHub::new();
    let automation_config = config.automation.clone();

    log::info!("Starting server at http://{}", config.bind_addr);

    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::from(trigger.clone()))
            .app_data(web::Data::new(automation_config.clone()))
            .app_data(web::Data::new(hub.clone()))
            // Callback endpoint is public; the workflow engine authenticates
            // with the bearer credential it was handed at trigger time
            .route(
                "/webhooks/proposal-callback",
                web::post().to(handlers::webhook_handlers::proposal_callback),
            )
            // Session-protected JSON API
            .service(
                web::scope("/api")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .configure(handlers::configure),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
