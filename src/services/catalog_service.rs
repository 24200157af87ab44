//! Catalog service - products and price profiles.
//!
//! Product names are snapshotted into profile items at write time, so later
//! renames do not alter existing profiles or the orders priced from them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::price_profile::validate_profile;
use crate::domain::product::normalize_product_name;
use crate::domain::{
    DomainError, NewPriceProfile, PriceItem, PriceProfile, PriceProfileChanges, PriceProfileKind,
    Product, ProfileScope,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{ProfileFilter, UnitOfWork};

/// One requested price in a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPrice {
    pub product_id: Uuid,
    pub price_per_kg: Decimal,
}

/// Input for a new price profile.
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub kind: PriceProfileKind,
    pub name: String,
    pub seller_id: Option<Uuid>,
    /// Defaults to now
    pub effective_from: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub items: Vec<ItemPrice>,
}

/// Replacement values for an existing profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub effective_from: Option<DateTime<Utc>>,
    pub items: Option<Vec<ItemPrice>>,
}

/// Catalog service trait for dependency injection.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_products(&self, active_only: bool) -> AppResult<Vec<Product>>;

    async fn get_product(&self, id: Uuid) -> AppResult<Product>;

    async fn create_product(&self, name: String) -> AppResult<Product>;

    async fn rename_product(&self, id: Uuid, name: String) -> AppResult<Product>;

    async fn set_product_active(&self, id: Uuid, active: bool) -> AppResult<Product>;

    async fn list_profiles(&self, filter: ProfileFilter) -> AppResult<Vec<PriceProfile>>;

    async fn get_profile(&self, id: Uuid) -> AppResult<PriceProfile>;

    async fn create_profile(&self, draft: ProfileDraft) -> AppResult<PriceProfile>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<PriceProfile>;

    async fn activate_profile(&self, id: Uuid) -> AppResult<PriceProfile>;

    async fn deactivate_profile(&self, id: Uuid) -> AppResult<PriceProfile>;

    /// The active COST profile
    async fn current_cost_profile(&self) -> AppResult<PriceProfile>;

    /// The seller's own active SALE profile, else the global one
    async fn current_sale_profile(&self, seller_id: Option<Uuid>) -> AppResult<PriceProfile>;
}

pub struct Catalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Catalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Resolve requested prices against active products, snapshotting names.
    async fn price_items(&self, requested: Vec<ItemPrice>) -> AppResult<Vec<PriceItem>> {
        let ids: Vec<Uuid> = requested.iter().map(|item| item.product_id).collect();
        let products: HashMap<Uuid, Product> = self
            .uow
            .products()
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        requested
            .into_iter()
            .map(|item| {
                let product = products
                    .get(&item.product_id)
                    .ok_or_else(|| AppError::not_found(format!("Product {}", item.product_id)))?;
                if !product.is_active {
                    return Err(AppError::validation(format!(
                        "Product {} is inactive",
                        product.name
                    )));
                }
                Ok(PriceItem {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    price_per_kg: item.price_per_kg,
                })
            })
            .collect()
    }
}

fn profile_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("Profile name is required"));
    }
    Ok(name.to_string())
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for Catalog<U> {
    async fn list_products(&self, active_only: bool) -> AppResult<Vec<Product>> {
        self.uow.products().list(active_only).await
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        self.uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Product")
    }

    async fn create_product(&self, name: String) -> AppResult<Product> {
        let name = normalize_product_name(&name)?;
        if self.uow.products().find_by_name(&name).await?.is_some() {
            return Err(AppError::conflict("Product"));
        }

        let product = self.uow.products().create(name).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    async fn rename_product(&self, id: Uuid, name: String) -> AppResult<Product> {
        let name = normalize_product_name(&name)?;
        if let Some(existing) = self.uow.products().find_by_name(&name).await? {
            if existing.id != id {
                return Err(AppError::conflict("Product"));
            }
        }
        self.uow.products().rename(id, name).await
    }

    async fn set_product_active(&self, id: Uuid, active: bool) -> AppResult<Product> {
        let product = self.uow.products().set_active(id, active).await?;
        tracing::info!(product_id = %id, active, "Product availability changed");
        Ok(product)
    }

    async fn list_profiles(&self, filter: ProfileFilter) -> AppResult<Vec<PriceProfile>> {
        self.uow.price_profiles().list(filter).await
    }

    async fn get_profile(&self, id: Uuid) -> AppResult<PriceProfile> {
        self.uow
            .price_profiles()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Price profile")
    }

    async fn create_profile(&self, draft: ProfileDraft) -> AppResult<PriceProfile> {
        let name = profile_name(&draft.name)?;
        if let Some(seller_id) = draft.seller_id {
            self.uow
                .sellers()
                .find_by_id(seller_id)
                .await?
                .ok_or_not_found("Seller")?;
        }

        let items = self.price_items(draft.items).await?;
        validate_profile(draft.kind, draft.seller_id, &items)?;

        let profile = self
            .uow
            .price_profiles()
            .create(NewPriceProfile {
                kind: draft.kind,
                name,
                seller_id: draft.seller_id,
                effective_from: draft.effective_from.unwrap_or_else(Utc::now),
                is_active: draft.is_active,
                items,
            })
            .await?;

        tracing::info!(
            profile_id = %profile.id,
            kind = %profile.kind,
            seller_id = ?profile.seller_id,
            active = profile.is_active,
            "Price profile created"
        );
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<PriceProfile> {
        let current = self.get_profile(id).await?;

        let name = update.name.as_deref().map(profile_name).transpose()?;
        let items = match update.items {
            Some(requested) => {
                let items = self.price_items(requested).await?;
                validate_profile(current.kind, current.seller_id, &items)?;
                Some(items)
            }
            None => None,
        };

        self.uow
            .price_profiles()
            .update(
                id,
                PriceProfileChanges {
                    name,
                    effective_from: update.effective_from,
                    items,
                },
            )
            .await
    }

    async fn activate_profile(&self, id: Uuid) -> AppResult<PriceProfile> {
        let profile = self.uow.price_profiles().activate(id).await?;
        tracing::info!(profile_id = %id, kind = %profile.kind, "Price profile activated");
        Ok(profile)
    }

    async fn deactivate_profile(&self, id: Uuid) -> AppResult<PriceProfile> {
        let profile = self.uow.price_profiles().deactivate(id).await?;
        tracing::info!(profile_id = %id, kind = %profile.kind, "Price profile deactivated");
        Ok(profile)
    }

    async fn current_cost_profile(&self) -> AppResult<PriceProfile> {
        self.uow
            .price_profiles()
            .find_active(ProfileScope {
                kind: PriceProfileKind::Cost,
                seller_id: None,
            })
            .await?
            .ok_or_else(|| DomainError::NoActivePriceProfile(PriceProfileKind::Cost).into())
    }

    async fn current_sale_profile(&self, seller_id: Option<Uuid>) -> AppResult<PriceProfile> {
        let profiles = self.uow.price_profiles();

        if let Some(seller_id) = seller_id {
            let scoped = profiles
                .find_active(ProfileScope {
                    kind: PriceProfileKind::Sale,
                    seller_id: Some(seller_id),
                })
                .await?;
            if let Some(profile) = scoped {
                return Ok(profile);
            }
        }

        profiles
            .find_active(ProfileScope {
                kind: PriceProfileKind::Sale,
                seller_id: None,
            })
            .await?
            .ok_or_else(|| DomainError::NoActivePriceProfile(PriceProfileKind::Sale).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockPriceProfileRepository, MockProductRepository};
    use crate::services::test_support::{product, profile, BuiltUnitOfWork, TestUnitOfWork};

    fn catalog(uow: TestUnitOfWork) -> Catalog<BuiltUnitOfWork> {
        Catalog::new(uow.build())
    }

    #[tokio::test]
    async fn test_sale_profile_prefers_seller_scope() {
        let seller_id = Uuid::new_v4();
        let scoped = profile(PriceProfileKind::Sale, Some(seller_id), &[]);
        let scoped_id = scoped.id;

        let mut profiles = MockPriceProfileRepository::new();
        profiles.expect_find_active().returning(move |scope| {
            Ok(match scope.seller_id {
                Some(_) => Some(scoped.clone()),
                None => Some(profile(PriceProfileKind::Sale, None, &[])),
            })
        });

        let found = catalog(TestUnitOfWork::default().with_price_profiles(profiles))
            .current_sale_profile(Some(seller_id))
            .await
            .unwrap();

        assert_eq!(found.id, scoped_id);
    }

    #[tokio::test]
    async fn test_sale_profile_falls_back_to_global() {
        let mut profiles = MockPriceProfileRepository::new();
        profiles.expect_find_active().returning(|scope| {
            Ok(match scope.seller_id {
                Some(_) => None,
                None => Some(profile(PriceProfileKind::Sale, None, &[])),
            })
        });

        let found = catalog(TestUnitOfWork::default().with_price_profiles(profiles))
            .current_sale_profile(Some(Uuid::new_v4()))
            .await
            .unwrap();

        assert!(found.seller_id.is_none());
    }

    #[tokio::test]
    async fn test_missing_cost_profile_is_not_found() {
        let mut profiles = MockPriceProfileRepository::new();
        profiles.expect_find_active().returning(|_| Ok(None));

        let result = catalog(TestUnitOfWork::default().with_price_profiles(profiles))
            .current_cost_profile()
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_profile_snapshots_product_names() {
        let tea = product("Trà Thái xanh");
        let tea_id = tea.id;

        let mut products = MockProductRepository::new();
        products
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![tea.clone()]));

        let mut profiles = MockPriceProfileRepository::new();
        profiles.expect_create().times(1).returning(|new| {
            assert_eq!(new.items[0].product_name, "Trà Thái xanh");
            assert_eq!(new.name, "Giá vốn tháng 6");
            let mut created = profile(new.kind, new.seller_id, &[]);
            created.items = new.items;
            Ok(created)
        });

        let created = catalog(
            TestUnitOfWork::default()
                .with_products(products)
                .with_price_profiles(profiles),
        )
        .create_profile(ProfileDraft {
            kind: PriceProfileKind::Cost,
            name: " Giá vốn tháng 6 ".to_string(),
            seller_id: None,
            effective_from: None,
            is_active: true,
            items: vec![ItemPrice {
                product_id: tea_id,
                price_per_kg: Decimal::from(100_000),
            }],
        })
        .await
        .unwrap();

        assert_eq!(created.items.len(), 1);
    }

    #[tokio::test]
    async fn test_create_profile_rejects_inactive_product() {
        let mut retired = product("Trà đen");
        retired.is_active = false;
        let retired_id = retired.id;

        let mut products = MockProductRepository::new();
        products
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![retired.clone()]));
        let mut profiles = MockPriceProfileRepository::new();
        profiles.expect_create().never();

        let result = catalog(
            TestUnitOfWork::default()
                .with_products(products)
                .with_price_profiles(profiles),
        )
        .create_profile(ProfileDraft {
            kind: PriceProfileKind::Sale,
            name: "Giá bán".to_string(),
            seller_id: None,
            effective_from: None,
            is_active: false,
            items: vec![ItemPrice {
                product_id: retired_id,
                price_per_kg: Decimal::from(130_000),
            }],
        })
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_product_rejects_duplicate_name() {
        let existing = product("Trà Thái");
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_name()
            .returning(move |_| Ok(Some(existing.clone())));
        products.expect_create().never();

        let result = catalog(TestUnitOfWork::default().with_products(products))
            .create_product("  Trà Thái ".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
