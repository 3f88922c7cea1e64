use std::env;

/// Runtime settings, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_path: String,
    pub automation: AutomationConfig,
}

/// Settings for the outbound workflow trigger and the inbound callback.
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Endpoint of the external automation service.
    pub webhook_url: String,
    /// Shared HS256 secret. When absent, proposal generation still works but
    /// no workflow is ever dispatched and no callback is accepted.
    pub signing_secret: Option<String>,
    /// Absolute URL the automation service posts results back to.
    pub callback_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "data/propgen.db".to_string());

        let webhook_url = env::var("AUTOMATION_WEBHOOK_URL")
            .unwrap_or_else(|_| "http://localhost:5678/webhook/generate-proposal".to_string());

        let signing_secret = match env::var("AUTOMATION_JWT_SECRET") {
            Ok(val) if !val.trim().is_empty() => Some(val),
            _ => {
                log::warn!(
                    "No AUTOMATION_JWT_SECRET set — proposal automation disabled, \
                     new proposals will stay in processing"
                );
                None
            }
        };

        let base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| format!("http://{bind_addr}"));
        let callback_url = format!(
            "{}/webhooks/proposal-callback",
            base_url.trim_end_matches('/')
        );

        AppConfig {
            bind_addr,
            database_path,
            automation: AutomationConfig {
                webhook_url,
                signing_secret,
                callback_url,
            },
        }
    }
}
