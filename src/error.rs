//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application,
//! together with `AuthHeaderError`, the failures of the bearer-header validation chain.
//!
//! `AppError` implements `actix_web::error::ResponseError` so every failure reaches the
//! client as a single-field JSON body, `{"status": "<message>"}`, with the status code
//! of its kind. It also provides `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error`, `bcrypt::BcryptError`
//! and `actix_web::error::BlockingError`, allowing for easy conversion using `?`.

use actix_web::{error::BlockingError, error::ResponseError, http::StatusCode, HttpResponse};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

/// Message returned for any request body that fails to deserialize or validate.
pub const INVALID_INPUT_BODY: &str = "Invalid input body";

/// Message returned for sign-in failures, whether the username or the password was wrong.
pub const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Represents all possible errors that can occur within the application.
///
/// Each variant carries the message that is sent to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or missing input (HTTP 400).
    Validation(String),
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(String),
    /// The requested resource does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// A uniqueness constraint was violated, e.g. a duplicate username (HTTP 500).
    Conflict(String),
    /// A database or transport failure, including transaction timeouts (HTTP 500).
    Persistence(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl AppError {
    /// The client-facing message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Persistence(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Persistence(msg) => write!(f, "Persistence Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Body shape shared by every error response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Conflicts are deliberately not distinguished from other server failures.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(StatusResponse {
            status: self.message().to_owned(),
        })
    }
}

/// Failures of the `Authorization: Bearer <token>` validation chain.
///
/// All of them are rejected with HTTP 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthHeaderError {
    /// No `Authorization` header, or an empty one.
    Missing,
    /// The value is not exactly `Bearer <token>`.
    Malformed,
    /// The scheme is right but the token part is empty.
    EmptyToken,
    /// The token was rejected by the authentication service; carries its message.
    InvalidToken(String),
}

impl fmt::Display for AuthHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthHeaderError::Missing => f.write_str("empty auth header"),
            AuthHeaderError::Malformed => f.write_str("invalid auth header"),
            AuthHeaderError::EmptyToken => f.write_str("token is empty"),
            AuthHeaderError::InvalidToken(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for AuthHeaderError {}

impl From<AuthHeaderError> for AppError {
    fn from(error: AuthHeaderError) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, unique violations become `Conflict`,
/// everything else is a `Persistence` failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(db.message().to_owned())
            }
            _ => AppError::Persistence(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// Field details are logged; the client only sees the generic body message.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        debug!("request body failed validation: {}", error);
        AppError::Validation(INVALID_INPUT_BODY.into())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        let msg = match error.kind() {
            JwtErrorKind::ExpiredSignature => "token has expired",
            JwtErrorKind::InvalidSignature => "invalid token signature",
            _ => "invalid token",
        };
        debug!("token rejected: {}", error);
        AppError::Unauthorized(msg.into())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

/// Converts a failure of the blocking thread pool into `AppError::Internal`.
impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
