//! Timestamp helpers
//!
//! Timestamps are persisted as RFC 3339 UTC strings with a fixed
//! microsecond precision, so comparing the stored strings orders rows
//! chronologically (the reservation queue relies on this).

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::DomainError;

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::Internal(format!("Invalid stored timestamp '{}': {}", value, e)))
}
