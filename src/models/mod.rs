use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod dashboard;
pub mod entry;
pub mod file;
pub mod project;
pub mod proposal;

/// Parse a stored RFC 3339 timestamp. Rows are only ever written by this
/// crate, so a parse failure means a corrupted row; fall back to now.
pub(crate) fn parse_datetime(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn parse_uuid(value: &str) -> Uuid {
    Uuid::parse_str(value).unwrap_or_else(|_| Uuid::nil())
}
