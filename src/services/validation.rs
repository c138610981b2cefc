//! Input validation
//!
//! Checks run before a transaction is opened, so a rejected request never
//! touches the store.

use chrono::{DateTime, NaiveDate};

use super::ServiceError;

/// Reject empty or whitespace-only values.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{} must not be blank", field)));
    }
    Ok(())
}

/// Accept a calendar date (`2024-01-31`) or an RFC 3339 timestamp.
pub fn validate_date(field: &str, value: &str) -> Result<(), ServiceError> {
    let value = value.trim();
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
    {
        return Ok(());
    }
    Err(ServiceError::InvalidInput(format!(
        "{} must be a date (YYYY-MM-DD) or an RFC 3339 timestamp, got '{}'",
        field, value
    )))
}
