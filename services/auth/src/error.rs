//! Error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;

/// Errors raised by user storage
#[derive(Error, Debug)]
pub enum UserError {
    /// A user with this email already exists
    #[error("User already exists")]
    EmailTaken,

    /// Password hashing or hash parsing failed
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Database error
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// HTTP-facing authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid or incomplete input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login attempts exhausted
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl AuthError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AuthError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AuthError::Unauthorized(msg.into())
    }
}

impl From<UserError> for AuthError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::EmailTaken => AuthError::bad_request("User already exists."),
            other => {
                tracing::error!("User storage error: {}", other);
                AuthError::InternalServerError
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for authentication handler results
pub type AuthResult<T> = Result<T, AuthError>;
