//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod customer;
pub mod order;
pub mod price_profile;
pub mod product;
pub mod seller;
pub mod seller_session;

use crate::errors::{AppError, AppResult};

/// Map a stored enum string back to its domain value.
///
/// A value that no longer parses means the row was written by something
/// other than this service.
pub(crate) fn decode_enum<T>(column: &str, raw: &str, parsed: Option<T>) -> AppResult<T> {
    parsed.ok_or_else(|| {
        AppError::internal(format!("Unexpected value '{}' in column {}", raw, column))
    })
}

/// Decode a JSON column into its domain shape.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    column: &str,
    value: serde_json::Value,
) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::internal(format!("Malformed JSON in column {}: {}", column, e)))
}

/// Encode a domain value for a JSON column.
pub(crate) fn encode_json<T: serde::Serialize>(column: &str, value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::internal(format!("Cannot encode column {}: {}", column, e)))
}
