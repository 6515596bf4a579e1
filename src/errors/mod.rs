//! Error handling module for the CommunityConnect backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const AUTH_ERROR: &str = "AUTH_ERROR";
    pub const REGISTRATION_ERROR: &str = "REGISTRATION_ERROR";
    pub const MUTATION_ERROR: &str = "MUTATION_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// A single form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Bad credentials or missing role profile
    Auth(String),
    /// Sign-up or profile creation failed
    Registration(String),
    /// Backend write failure for a task or application
    Mutation(String),
    /// Form constraints violated before any backend call
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    /// Missing or expired session
    Unauthorized(String),
    /// Authenticated, but the role may not perform the operation
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Uniqueness or state-transition conflict
    Conflict(String),
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Validation error without per-field details.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Registration(_) => StatusCode::BAD_REQUEST,
            AppError::Mutation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => codes::AUTH_ERROR,
            AppError::Registration(_) => codes::REGISTRATION_ERROR,
            AppError::Mutation(_) => codes::MUTATION_ERROR,
            AppError::Validation { .. } => codes::VALIDATION_ERROR,
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Forbidden(_) => codes::FORBIDDEN,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Auth(msg) => msg.clone(),
            AppError::Registration(msg) => msg.clone(),
            AppError::Mutation(msg) => msg.clone(),
            AppError::Validation { message, .. } => message.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Database(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }

    /// Re-tag a generic backend failure as a failed write.
    ///
    /// Errors that already carry domain meaning pass through unchanged.
    pub fn into_mutation(self) -> Self {
        match self {
            AppError::Database(msg) | AppError::Internal(msg) => AppError::Mutation(msg),
            other => other,
        }
    }

    /// Re-tag any backend failure during sign-up as a registration error.
    pub fn into_registration(self) -> Self {
        match self {
            AppError::Validation { .. } | AppError::Registration(_) => self,
            other => AppError::Registration(other.message()),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                tracing::debug!("Unique constraint violated: {}", db_err.message());
                return AppError::Conflict(format!("Duplicate record: {}", db_err.message()));
            }
        }
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let details = match error {
            AppError::Validation { fields, .. } if !fields.is_empty() => {
                Some(serde_json::json!({ "fields": fields }))
            }
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_envelope_lists_fields() {
        let err = AppError::Validation {
            message: "Task form is invalid".to_string(),
            fields: vec![FieldError::new("title", "Task title must be at least 10 characters")],
        };
        let body = ErrorResponse::new(&err);

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, codes::VALIDATION_ERROR);
        let details = body.error.details.unwrap();
        assert_eq!(details["fields"][0]["field"], "title");
    }

    #[test]
    fn test_into_mutation_keeps_domain_errors() {
        let conflict = AppError::Conflict("already accepted".to_string()).into_mutation();
        assert_eq!(conflict.error_code(), codes::CONFLICT);

        let db = AppError::Database("disk I/O error".to_string()).into_mutation();
        assert_eq!(db.error_code(), codes::MUTATION_ERROR);
        assert_eq!(db.message(), "disk I/O error");
    }

    #[test]
    fn test_into_registration_wraps_backend_errors() {
        let err = AppError::Database("constraint failed".to_string()).into_registration();
        assert_eq!(err.error_code(), codes::REGISTRATION_ERROR);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
