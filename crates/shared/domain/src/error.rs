//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, database).

use thiserror::Error;

use crate::status::AccountStatus;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is missing, malformed or oversized
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lookup target is absent
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Email {0} is already registered")]
    DuplicateEmail(String),

    #[error("National id {0} is already registered")]
    DuplicateNationalId(String),

    #[error("Referral code {0} is already in use")]
    DuplicateReferralCode(String),

    #[error("Status {0} already exists")]
    DuplicateStatus(String),

    /// Role reference does not resolve
    #[error("Role {0} does not exist")]
    UnknownRole(i64),

    #[error("Status {0} is not a known account status")]
    UnknownStatus(String),

    #[error("Referral code {0} does not belong to any account")]
    UnknownReferralCode(String),

    #[error("Cannot move account from {from} to {to}")]
    InvalidTransition {
        from: AccountStatus,
        to: AccountStatus,
    },

    #[error("Cannot redeem {requested} points with a balance of {balance}")]
    InsufficientPoints { balance: u32, requested: u32 },

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(errors.to_string())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
