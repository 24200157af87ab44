//! Price profiles: named, dated lists of per-kg prices.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::{DomainError, DomainResult};
use crate::config::{MAX_DECIMAL_PLACES, MAX_PRICE_PER_KG};

/// Whether a profile lists purchase costs or selling prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceProfileKind {
    Cost,
    Sale,
}

impl PriceProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceProfileKind::Cost => "COST",
            PriceProfileKind::Sale => "SALE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "COST" => Some(PriceProfileKind::Cost),
            "SALE" => Some(PriceProfileKind::Sale),
            _ => None,
        }
    }
}

impl std::fmt::Display for PriceProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product price inside a profile. The name is captured at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceItem {
    pub product_id: Uuid,
    pub product_name: String,
    #[schema(value_type = String, example = "130000")]
    pub price_per_kg: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceProfile {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: PriceProfileKind,
    pub name: String,
    /// Set only for seller-specific SALE profiles.
    pub seller_id: Option<Uuid>,
    pub effective_from: DateTime<Utc>,
    pub is_active: bool,
    pub items: Vec<PriceItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PriceProfile {
    pub fn price_for(&self, product_id: Uuid) -> Option<Decimal> {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.price_per_kg)
    }

    /// The scope within which at most one profile may be active.
    pub fn scope(&self) -> ProfileScope {
        ProfileScope {
            kind: self.kind,
            seller_id: self.seller_id,
        }
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            profile_id: self.id,
            profile_name: self.name.clone(),
            effective_from: self.effective_from,
        }
    }
}

/// Activation scope: COST global, SALE global, or SALE for one seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileScope {
    pub kind: PriceProfileKind,
    pub seller_id: Option<Uuid>,
}

/// Frozen reference to the profile an order was priced from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub profile_id: Uuid,
    pub profile_name: String,
    pub effective_from: DateTime<Utc>,
}

/// Data required to persist a new profile.
#[derive(Debug, Clone)]
pub struct NewPriceProfile {
    pub kind: PriceProfileKind,
    pub name: String,
    pub seller_id: Option<Uuid>,
    pub effective_from: DateTime<Utc>,
    pub is_active: bool,
    pub items: Vec<PriceItem>,
}

/// Replacement values for an existing profile.
#[derive(Debug, Clone)]
pub struct PriceProfileChanges {
    pub name: Option<String>,
    pub effective_from: Option<DateTime<Utc>>,
    pub items: Option<Vec<PriceItem>>,
}

/// Check the structural rules every stored profile obeys.
///
/// Product existence is checked by the caller against the catalog.
pub fn validate_profile(
    kind: PriceProfileKind,
    seller_id: Option<Uuid>,
    items: &[PriceItem],
) -> DomainResult<()> {
    if kind == PriceProfileKind::Cost && seller_id.is_some() {
        return Err(DomainError::validation(
            "COST profiles cannot be scoped to a seller",
        ));
    }
    validate_items(items)
}

pub fn validate_items(items: &[PriceItem]) -> DomainResult<()> {
    if items.is_empty() {
        return Err(DomainError::validation(
            "A price profile needs at least one item",
        ));
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.price_per_kg.is_sign_negative() {
            return Err(DomainError::validation(format!(
                "Price for {} must not be negative",
                item.product_name
            )));
        }
        if item.price_per_kg > Decimal::from(MAX_PRICE_PER_KG) {
            return Err(DomainError::validation(format!(
                "Price for {} must be at most {}",
                item.product_name, MAX_PRICE_PER_KG
            )));
        }
        if item.price_per_kg.normalize().scale() > MAX_DECIMAL_PLACES {
            return Err(DomainError::validation(format!(
                "Price for {} is limited to two decimal places",
                item.product_name
            )));
        }
        if !seen.insert(item.product_id) {
            return Err(DomainError::validation(format!(
                "Product {} is listed more than once",
                item.product_name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: Uuid, price: i64) -> PriceItem {
        PriceItem {
            product_id: id,
            product_name: "Trà Thái".to_string(),
            price_per_kg: Decimal::from(price),
        }
    }

    fn profile(items: Vec<PriceItem>) -> PriceProfile {
        let now = Utc::now();
        PriceProfile {
            id: Uuid::new_v4(),
            kind: PriceProfileKind::Sale,
            name: "Bảng giá tháng 1".to_string(),
            seller_id: None,
            effective_from: now,
            is_active: true,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(PriceProfileKind::parse("COST"), Some(PriceProfileKind::Cost));
        assert_eq!(PriceProfileKind::parse("cost"), None);
        assert_eq!(PriceProfileKind::Sale.to_string(), "SALE");
        assert_eq!(
            serde_json::to_string(&PriceProfileKind::Cost).unwrap(),
            "\"COST\""
        );
    }

    #[test]
    fn test_price_lookup() {
        let a = Uuid::new_v4();
        let p = profile(vec![item(a, 130_000)]);

        assert_eq!(p.price_for(a), Some(Decimal::from(130_000)));
        assert_eq!(p.price_for(Uuid::new_v4()), None);
    }

    #[test]
    fn test_empty_items_rejected() {
        assert!(matches!(
            validate_items(&[]),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = validate_items(&[item(Uuid::new_v4(), -1)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_zero_price_allowed() {
        assert!(validate_items(&[item(Uuid::new_v4(), 0)]).is_ok());
    }

    #[test]
    fn test_price_upper_bound() {
        let a = Uuid::new_v4();
        assert!(validate_items(&[item(a, MAX_PRICE_PER_KG as i64)]).is_ok());
        assert!(validate_items(&[item(a, MAX_PRICE_PER_KG as i64 + 1)]).is_err());

        let huge = PriceItem {
            price_per_kg: Decimal::MAX,
            ..item(a, 0)
        };
        assert!(matches!(
            validate_items(&[huge]),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_price_scale_is_limited() {
        let a = Uuid::new_v4();
        let priced = |price: Decimal| PriceItem {
            price_per_kg: price,
            ..item(a, 0)
        };

        assert!(validate_items(&[priced(Decimal::new(1009, 3))]).is_err());
        assert!(validate_items(&[priced(Decimal::new(1010, 3))]).is_ok());
        assert!(validate_items(&[priced(Decimal::new(1250, 2))]).is_ok());
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let a = Uuid::new_v4();
        assert!(validate_items(&[item(a, 1), item(a, 2)]).is_err());
    }

    #[test]
    fn test_cost_profile_cannot_be_seller_scoped() {
        let items = [item(Uuid::new_v4(), 1)];
        assert!(validate_profile(PriceProfileKind::Cost, Some(Uuid::new_v4()), &items).is_err());
        assert!(validate_profile(PriceProfileKind::Sale, Some(Uuid::new_v4()), &items).is_ok());
        assert!(validate_profile(PriceProfileKind::Cost, None, &items).is_ok());
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let json = serde_json::to_value(profile(vec![item(Uuid::new_v4(), 5)])).unwrap();
        assert_eq!(json["type"], "SALE");
        assert_eq!(json["items"][0]["pricePerKg"], "5");
    }
}
