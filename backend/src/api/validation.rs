//! Request validation utilities.

use chrono::DateTime;

use crate::api::errors::ValidationError;

/// MIME types accepted by the upload endpoint.
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError {
            field: field.to_string(),
            message: format!("{} cannot be empty", field),
        });
    }
    Ok(())
}

/// Deadlines must be ISO-8601 / RFC 3339 timestamps.
pub fn validate_deadline(value: &str) -> Result<(), ValidationError> {
    if DateTime::parse_from_rfc3339(value).is_err() {
        return Err(ValidationError {
            field: "deadline".to_string(),
            message: "deadline must be an ISO-8601 timestamp".to_string(),
        });
    }
    Ok(())
}
