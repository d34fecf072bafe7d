//! Application error taxonomy and HTTP mapping.
//!
//! Every variant carries a stable machine-readable code (see [`AppError::code`]).
//! Internal and transport failures never leak their details to clients.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Error payload embedded in JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug)]
pub enum AppError {
    NotFound { message: String, details: Value },
    AlreadyExists { message: String, details: Value },
    InvalidCredentials { message: String, details: Value },
    InvalidToken { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Forbidden { message: String, details: Value },
    Validation { message: String, details: Value },
    Timeout { message: String, details: Value },
    Transport { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn already_exists(message: impl Into<String>, details: Value) -> Self {
        Self::AlreadyExists {
            message: message.into(),
            details,
        }
    }
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials {
            message: "Invalid email or password".to_string(),
            details: json!({}),
        }
    }
    pub fn invalid_token(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidToken {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn validation(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn timeout(message: impl Into<String>, details: Value) -> Self {
        Self::Timeout {
            message: message.into(),
            details,
        }
    }
    pub fn transport(message: impl Into<String>, details: Value) -> Self {
        Self::Transport {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "USER_NOT_FOUND",
            AppError::AlreadyExists { .. } => "USER_ALREADY_EXISTS",
            AppError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            AppError::InvalidToken { .. } => "INVALID_TOKEN",
            AppError::Unauthorized { .. } => "UNAUTHORIZED",
            AppError::Forbidden { .. } => "FORBIDDEN",
            AppError::Validation { .. } => "VALIDATION_FAILED",
            AppError::Timeout { .. } => "TIMEOUT",
            AppError::Transport { .. } => "TRANSPORT_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AlreadyExists { .. } => StatusCode::CONFLICT,
            AppError::InvalidCredentials { .. }
            | AppError::InvalidToken { .. }
            | AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Transport { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::NotFound { message, .. }
            | AppError::AlreadyExists { message, .. }
            | AppError::InvalidCredentials { message, .. }
            | AppError::InvalidToken { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::Validation { message, .. }
            | AppError::Timeout { message, .. }
            | AppError::Transport { message, .. }
            | AppError::Internal { message, .. } => message,
        }
    }

    /// Converts the error into its client-facing payload.
    ///
    /// Transport and internal failures are reduced to a generic message with
    /// no details; everything else is passed through.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            AppError::Internal { .. } => ErrorInfo {
                code: self.code(),
                message: "Internal server error".to_string(),
                details: json!({}),
            },
            AppError::Transport { .. } => ErrorInfo {
                code: self.code(),
                message: "Storage backend unavailable".to_string(),
                details: json!({}),
            },
            AppError::NotFound { message, details }
            | AppError::AlreadyExists { message, details }
            | AppError::InvalidCredentials { message, details }
            | AppError::InvalidToken { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::Forbidden { message, details }
            | AppError::Validation { message, details }
            | AppError::Timeout { message, details } => ErrorInfo {
                code: self.code(),
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Internal { message, details } | AppError::Transport { message, details } => {
                tracing::error!(code = self.code(), %details, "{}", message);
            }
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::validation("Validation failed", details)
    }
}

/// Maps SQLx errors onto the domain taxonomy.
///
/// Unique violations become [`AppError::AlreadyExists`]; pool and I/O
/// failures become [`AppError::Transport`]; anything else is internal.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::already_exists(
            "User with this email already exists",
            json!({ "constraint": db.constraint() }),
        );
    }

    let reason = e.to_string();
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("User not found", json!({})),
        sqlx::Error::PoolTimedOut => {
            AppError::timeout("Timed out waiting for a database connection", json!({}))
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
            AppError::transport("Database connection error", json!({ "reason": reason }))
        }
        _ => AppError::internal("Database error", json!({ "reason": reason })),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            AppError::not_found("x", json!({})).code(),
            "USER_NOT_FOUND"
        );
        assert_eq!(
            AppError::already_exists("x", json!({})).code(),
            "USER_ALREADY_EXISTS"
        );
        assert_eq!(AppError::invalid_credentials().code(), "INVALID_CREDENTIALS");
        assert_eq!(AppError::forbidden("x", json!({})).code(), "FORBIDDEN");
        assert_eq!(AppError::timeout("x", json!({})).code(), "TIMEOUT");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let info = AppError::internal("pg exploded", json!({ "reason": "secret" })).to_error_info();
        assert_eq!(info.code, "INTERNAL_ERROR");
        assert_eq!(info.message, "Internal server error");
        assert_eq!(info.details, json!({}));
    }

    #[test]
    fn test_unauthorized_sets_www_authenticate() {
        let response = AppError::unauthorized("nope", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_forbidden_status() {
        let response = AppError::forbidden("nope", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
