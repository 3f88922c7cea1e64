pub mod callback;
pub mod gateway;
pub mod orchestrator;
pub mod token;

use std::fmt;

#[derive(Debug)]
pub enum AutomationError {
    Token(jsonwebtoken::errors::Error),
    Http(reqwest::Error),
    Dispatch(u16),
}

impl fmt::Display for AutomationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomationError::Token(e) => write!(f, "Token error: {e}"),
            AutomationError::Http(e) => write!(f, "HTTP error: {e}"),
            AutomationError::Dispatch(status) => {
                write!(f, "Workflow endpoint returned status {status}")
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AutomationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AutomationError::Token(e)
    }
}

impl From<reqwest::Error> for AutomationError {
    fn from(e: reqwest::Error) -> Self {
        AutomationError::Http(e)
    }
}
