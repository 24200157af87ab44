//! Seller accounts.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::seller::{self, ActiveModel, Entity as SellerEntity};
use super::unique_violation_as;
use crate::domain::{NewSeller, Seller};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Seller repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SellerRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Seller>>;

    /// Exact match on the login name
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Seller>>;

    /// All sellers ordered by username
    async fn list(&self) -> AppResult<Vec<Seller>>;

    /// Insert a seller; a taken username is a conflict
    async fn create(&self, seller: NewSeller) -> AppResult<Seller>;

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> AppResult<Seller>;

    /// Replace the stored hash and the forced-change flag
    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
        must_change_password: bool,
    ) -> AppResult<Seller>;
}

/// Concrete implementation of SellerRepository
pub struct SellerStore {
    db: DatabaseConnection,
}

impl SellerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: Uuid) -> AppResult<seller::Model> {
        SellerEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Seller")
    }
}

#[async_trait]
impl SellerRepository for SellerStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Seller>> {
        let result = SellerEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Seller::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Seller>> {
        let result = SellerEntity::find()
            .filter(seller::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Seller::from))
    }

    async fn list(&self) -> AppResult<Vec<Seller>> {
        let models = SellerEntity::find()
            .order_by_asc(seller::Column::Username)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Seller::from).collect())
    }

    async fn create(&self, seller: NewSeller) -> AppResult<Seller> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(seller.username),
            display_name: Set(seller.display_name),
            role: Set(seller.role.as_str().to_string()),
            is_enabled: Set(true),
            password_hash: Set(seller.password_hash),
            must_change_password: Set(seller.must_change_password),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(unique_violation_as("Seller"))?;
        Ok(Seller::from(model))
    }

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> AppResult<Seller> {
        let mut active: ActiveModel = self.load(id).await?.into();
        active.is_enabled = Set(enabled);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Seller::from(model))
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
        must_change_password: bool,
    ) -> AppResult<Seller> {
        let mut active: ActiveModel = self.load(id).await?.into();
        active.password_hash = Set(password_hash);
        active.must_change_password = Set(must_change_password);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Seller::from(model))
    }
}
