//! Product catalog storage.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use super::unique_violation_as;
use crate::domain::product::default_unit;
use crate::domain::Product;
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// Fetch several products at once; missing ids are simply absent
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Product>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>>;

    /// Products ordered by name
    async fn list(&self, active_only: bool) -> AppResult<Vec<Product>>;

    /// Insert an active product; a taken name is a conflict
    async fn create(&self, name: String) -> AppResult<Product>;

    async fn rename(&self, id: Uuid, name: String) -> AppResult<Product>;

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<Product>;
}

pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: Uuid) -> AppResult<product::Model> {
        ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Product")
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Product::from))
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>> {
        let result = ProductEntity::find()
            .filter(product::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Product::from))
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Product>> {
        let mut query = ProductEntity::find();
        if active_only {
            query = query.filter(product::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn create(&self, name: String) -> AppResult<Product> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            unit: Set(default_unit()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(unique_violation_as("Product"))?;
        Ok(Product::from(model))
    }

    async fn rename(&self, id: Uuid, name: String) -> AppResult<Product> {
        let mut active: ActiveModel = self.load(id).await?.into();
        active.name = Set(name);
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(unique_violation_as("Product"))?;
        Ok(Product::from(model))
    }

    async fn set_active(&self, id: Uuid, active_flag: bool) -> AppResult<Product> {
        let mut active: ActiveModel = self.load(id).await?.into();
        active.is_active = Set(active_flag);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }
}
