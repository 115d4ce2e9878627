use crate::qr::GenerationError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request parsed but violates one or more input constraints
    #[error("{message}")]
    Validation { message: String, issues: Vec<ValidationIssue> },

    /// Request body is not valid JSON or does not have the expected shape
    #[error("Invalid request body: {message}")]
    InvalidPayload { message: String },

    /// Request body was not declared as JSON
    #[error("{message}")]
    UnsupportedMediaType { message: String },

    /// Request body exceeds the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Configuration failed consistency checks at startup
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Encoding or rasterization failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One failed input constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationIssue {
    /// Field the constraint applies to, e.g. `value` or `fitTo`
    pub path: String,
    /// Machine-readable constraint name, e.g. `length` or `positive`
    pub code: String,
    /// Human-readable description of the failure
    pub message: String,
}

/// Body returned for every 400 response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RejectionBody {
    pub message: String,
    pub issues: Vec<ValidationIssue>,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } | Error::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            Error::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Internal { .. } | Error::InvalidConfig { .. } | Error::Generation(_) | Error::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { message, .. } => message.clone(),
            Error::InvalidPayload { .. } | Error::UnsupportedMediaType { .. } | Error::PayloadTooLarge => self.to_string(),
            Error::Internal { .. } | Error::InvalidConfig { .. } | Error::Generation(_) | Error::Other(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Shorthand for a rejection with a single failed constraint.
    pub fn invalid(path: &str, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Error::Validation {
            message: format!("Invalid request: {message}"),
            issues: vec![ValidationIssue {
                path: path.to_string(),
                code: code.to_string(),
                message,
            }],
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Internal { .. } | Error::InvalidConfig { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Generation(_) => {
                // already logged with its pipeline stage by QrService
                tracing::debug!("Generation error: {}", self);
            }
            Error::Validation { .. } | Error::InvalidPayload { .. } | Error::UnsupportedMediaType { .. } | Error::PayloadTooLarge => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        match self {
            Error::Validation { message, issues } => (status, axum::Json(RejectionBody { message, issues })).into_response(),
            Error::InvalidPayload { .. } => {
                let body = RejectionBody {
                    message: self.user_message(),
                    issues: Vec::new(),
                };
                (status, axum::Json(body)).into_response()
            }
            // For all other errors, return simple text message
            _ => (status, self.user_message()).into_response(),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut issues: Vec<ValidationIssue> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |e| ValidationIssue {
                    path: field.to_string(),
                    code: e.code.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} failed the {} check", e.code)),
                })
            })
            .collect();
        // field_errors() is a HashMap; keep the response deterministic
        issues.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.code.cmp(&b.code)));

        let summary = issues.iter().map(|i| i.message.as_str()).collect::<Vec<_>>().join("; ");
        Error::Validation {
            message: format!("Invalid request: {summary}"),
            issues,
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => Error::UnsupportedMediaType {
                message: "Expected request with `Content-Type: application/json`".to_string(),
            },
            JsonRejection::BytesRejection(r) if r.status() == StatusCode::PAYLOAD_TOO_LARGE => Error::PayloadTooLarge,
            other => Error::InvalidPayload { message: other.body_text() },
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 3, message = "name must be between 1 and 3 characters"))]
        name: String,
        #[validate(range(min = 1))]
        count: i64,
    }

    #[test]
    fn test_validation_errors_become_sorted_issues() {
        let sample = Sample {
            name: String::new(),
            count: 0,
        };
        let err: Error = sample.validate().unwrap_err().into();

        match &err {
            Error::Validation { message, issues } => {
                assert_eq!(issues.len(), 2);
                assert_eq!(issues[0].path, "count");
                assert_eq!(issues[0].code, "range");
                assert_eq!(issues[1].path, "name");
                assert_eq!(issues[1].code, "length");
                assert_eq!(issues[1].message, "name must be between 1 and 3 characters");
                assert!(message.starts_with("Invalid request: "));
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = Error::Other(anyhow::anyhow!("pixmap exploded at 0xdeadbeef"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Internal server error");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_invalid_shorthand() {
        let err = Error::invalid("fitTo", "max_width", "width must be at most 10 pixels");
        assert!(err.is_client_error());
        assert_eq!(err.user_message(), "Invalid request: width must be at most 10 pixels");
    }
}
