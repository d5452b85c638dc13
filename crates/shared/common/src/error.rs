//! Unified error handling for account services.
//!
//! Every domain failure keeps its own variant so callers can tell
//! "already exists" from "not found" from "invalid input". The API layer
//! renders errors through the Axum `IntoResponse` impl.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{AccountStatus, DomainError};
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Lookup
    #[error("{0} not found")]
    NotFound(String),

    // Uniqueness
    #[error("Email {0} is already registered")]
    DuplicateEmail(String),

    #[error("National id {0} is already registered")]
    DuplicateNationalId(String),

    #[error("Referral code {0} is already in use")]
    DuplicateReferralCode(String),

    #[error("Status {0} already exists")]
    DuplicateStatus(String),

    // Dangling references
    #[error("Role {0} does not exist")]
    UnknownRole(i64),

    #[error("Status {0} is not a known account status")]
    UnknownStatus(String),

    #[error("Referral code {0} does not belong to any account")]
    UnknownReferralCode(String),

    // Lifecycle
    #[error("Cannot move account from {from} to {to}")]
    InvalidTransition {
        from: AccountStatus,
        to: AccountStatus,
    },

    #[error("Cannot redeem {requested} points with a balance of {balance}")]
    InsufficientPoints { balance: u32, requested: u32 },

    // Validation
    #[error("{0}")]
    Validation(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            AppError::DuplicateNationalId(_) => "DUPLICATE_NATIONAL_ID",
            AppError::DuplicateReferralCode(_) => "DUPLICATE_REFERRAL_CODE",
            AppError::DuplicateStatus(_) => "DUPLICATE_STATUS",
            AppError::UnknownRole(_) => "UNKNOWN_ROLE",
            AppError::UnknownStatus(_) => "UNKNOWN_STATUS",
            AppError::UnknownReferralCode(_) => "UNKNOWN_REFERRAL_CODE",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            AppError::Validation(_) => "VALIDATION_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail(_)
            | AppError::DuplicateNationalId(_)
            | AppError::DuplicateReferralCode(_)
            | AppError::DuplicateStatus(_)
            | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::UnknownRole(_)
            | AppError::UnknownStatus(_)
            | AppError::UnknownReferralCode(_)
            | AppError::InsufficientPoints { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Client errors carry their full message
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::NotFound(what) => AppError::NotFound(what),
            DomainError::DuplicateEmail(email) => AppError::DuplicateEmail(email),
            DomainError::DuplicateNationalId(id) => AppError::DuplicateNationalId(id),
            DomainError::DuplicateReferralCode(code) => AppError::DuplicateReferralCode(code),
            DomainError::DuplicateStatus(name) => AppError::DuplicateStatus(name),
            DomainError::UnknownRole(id) => AppError::UnknownRole(id),
            DomainError::UnknownStatus(name) => AppError::UnknownStatus(name),
            DomainError::UnknownReferralCode(code) => AppError::UnknownReferralCode(code),
            DomainError::InvalidTransition { from, to } => {
                AppError::InvalidTransition { from, to }
            }
            DomainError::InsufficientPoints { balance, requested } => {
                AppError::InsufficientPoints { balance, requested }
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, what: impl FnOnce() -> String) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, what: impl FnOnce() -> String) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(what()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
