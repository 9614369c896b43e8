//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Malformed or invalid input (e.g. unknown role)
    Validation(String),
    /// Referenced resource does not exist
    NotFound(String),
    /// The caller's role may not perform the action
    Forbidden(String),
    /// No eligible copy to check out
    Unavailable(String),
    /// Checkout was already returned
    AlreadyReturned,
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "{}", msg),
            DomainError::NotFound(msg) => write!(f, "{}", msg),
            DomainError::Forbidden(msg) => write!(f, "{}", msg),
            DomainError::Unavailable(msg) => write!(f, "{}", msg),
            DomainError::AlreadyReturned => write!(f, "Already returned"),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
