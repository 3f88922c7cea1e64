use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

use crate::automation::AutomationError;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Json(serde_json::Error),
    Automation(AutomationError),
    Validation(String),
    Unauthorized,
    InvalidCallbackToken,
    AutomationDisabled,
    NotFound,
    NoProcessingProposal,
    UpdateFailed,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Json(e) => write!(f, "JSON error: {e}"),
            AppError::Automation(e) => write!(f, "Automation error: {e}"),
            AppError::Validation(msg) => write!(f, "{msg}"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::InvalidCallbackToken => write!(f, "Invalid callback token"),
            AppError::AutomationDisabled => write!(f, "Automation is not configured"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::NoProcessingProposal => write!(f, "No processing proposal found"),
            AppError::UpdateFailed => write!(f, "Failed to update proposal"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(msg) => HttpResponse::BadRequest().json(json!({ "error": msg })),
            AppError::Unauthorized => {
                HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))
            }
            AppError::InvalidCallbackToken => {
                HttpResponse::Unauthorized().json(json!({ "error": "Invalid callback token" }))
            }
            AppError::AutomationDisabled => HttpResponse::ServiceUnavailable()
                .json(json!({ "error": "Automation is not configured" })),
            AppError::NotFound => HttpResponse::NotFound().json(json!({ "error": "Not found" })),
            AppError::NoProcessingProposal => HttpResponse::NotFound()
                .json(json!({ "error": "No processing proposal found" })),
            AppError::UpdateFailed => HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to update proposal" })),
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Internal server error" }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}

impl From<AutomationError> for AppError {
    fn from(e: AutomationError) -> Self {
        AppError::Automation(e)
    }
}
