//! Domain-level errors.
//!
//! These errors represent business rule violations. They are independent of
//! infrastructure concerns (HTTP, database, cache).

use thiserror::Error;
use uuid::Uuid;

use super::price_profile::PriceProfileKind;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("{0}")]
    Validation(String),

    /// Password does not meet the minimum length
    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// No active price profile of the given kind applies
    #[error("No active {0} price profile")]
    NoActivePriceProfile(PriceProfileKind),

    /// A requested product has no entry in one of the current profiles
    #[error("Product {product_id} is not priced in the current {kind} profile")]
    ProductNotPriced {
        product_id: Uuid,
        kind: PriceProfileKind,
    },

    /// A state transition is not allowed from the current state
    #[error("{0}")]
    InvalidTransition(String),

    /// Entity not found
    #[error("{0} not found")]
    NotFound(String),

    /// Entity already exists (conflict)
    #[error("{0} already exists")]
    Conflict(String),

    /// Caller lacks the role or ownership for the action
    #[error("Access denied")]
    Forbidden,

    /// Password hashing itself failed
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create an invalid transition error
    pub fn transition(msg: impl Into<String>) -> Self {
        DomainError::InvalidTransition(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a conflict error
    pub fn conflict(entity: impl Into<String>) -> Self {
        DomainError::Conflict(entity.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
