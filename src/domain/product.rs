//! Catalog products. Sold by weight, never hard-deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::{DomainError, DomainResult};
use crate::config::PRODUCT_UNIT_KG;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Trà Thái Nguyên")]
    pub name: String,
    #[schema(example = "kg")]
    pub unit: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trim a product name and reject blanks.
pub fn normalize_product_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Product name is required"));
    }
    Ok(name.to_string())
}

/// Unit every product is sold in.
pub fn default_unit() -> String {
    PRODUCT_UNIT_KG.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(normalize_product_name("  Trà Ô Long ").unwrap(), "Trà Ô Long");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(normalize_product_name("   ").is_err());
        assert!(normalize_product_name("").is_err());
    }

    #[test]
    fn test_unit_is_kg() {
        assert_eq!(default_unit(), "kg");
    }
}
