//! Error response body.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ValidationFieldError;

/// Standard error response format.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "code": "NOT_FOUND",
    "message": "Resource not found: user with id=9999"
}))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationFieldError>>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches per-field validation failures.
    pub fn with_details(mut self, details: Vec<ValidationFieldError>) -> Self {
        self.details = Some(details);
        self
    }
}
