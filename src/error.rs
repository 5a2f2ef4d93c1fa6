use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repository::RepoError;

/// AuthError
///
/// The closed outcome taxonomy of the authentication and visibility engine.
/// Callers branch on the variant, never on the message text.
///
/// - `InvalidToken` is produced by the token codec and absorbed by the identity resolver;
///   it never reaches a client.
/// - `AccessDenied` and `NotFound` are produced by the visibility policy and propagate to
///   handlers as typed outcomes.
/// - `Configuration` is fatal and only occurs while the process is starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("login required")]
    AccessDenied,
    #[error("not found")]
    NotFound,
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// ErrorResponse
///
/// JSON body shared by every failed request: `{ "error": { "code": ..., "message": ... } }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// AppError
///
/// HTTP-facing error type. Handlers return `Result<_, AppError>` and rely on `?`
/// to lift repository and engine errors into a transport-level response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("login required")]
    LoginRequired,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("{code}: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "authentication required".into(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "invalid email or password".into(),
            ),
            // Distinct from NOT_FOUND: the resource exists and logging in reveals it.
            AppError::LoginRequired => (
                StatusCode::UNAUTHORIZED,
                "LOGIN_REQUIRED",
                "login is required to view this content".into(),
            ),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("CONFLICT", "resource already exists"),
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "repository failure");
                AppError::Internal
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            // Only reachable on routes that demand an identity; elsewhere the resolver absorbs it.
            AuthError::InvalidToken => AppError::Unauthorized,
            AuthError::AccessDenied => AppError::LoginRequired,
            // Hidden content and absent content are reported identically.
            AuthError::NotFound => AppError::not_found("article"),
            AuthError::Configuration(reason) => {
                tracing::error!(%reason, "configuration error surfaced at request time");
                AppError::Internal
            }
        }
    }
}

// Extractor rejections keep the JSON error envelope instead of axum's plain-text bodies.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection, "path rejected");
        AppError::bad_request("INVALID_PATH", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection, "query string rejected");
        AppError::bad_request("INVALID_QUERY", rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "request body rejected");
        AppError::bad_request("INVALID_REQUEST", rejection.body_text())
    }
}
