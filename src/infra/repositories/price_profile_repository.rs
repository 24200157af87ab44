//! Price profile storage.
//!
//! Creating or activating a profile deactivates the previously active one of
//! the same scope inside a single transaction, so a scope never ends up with
//! two active profiles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::encode_json;
use super::entities::price_profile::{self, ActiveModel, Entity as ProfileEntity};
use crate::domain::{
    NewPriceProfile, PriceProfile, PriceProfileChanges, PriceProfileKind, ProfileScope,
};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Listing filter; unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFilter {
    pub kind: Option<PriceProfileKind>,
    pub seller_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PriceProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PriceProfile>>;

    /// Newest first
    async fn list(&self, filter: ProfileFilter) -> AppResult<Vec<PriceProfile>>;

    /// The active profile of exactly this scope, without fallback
    async fn find_active(&self, scope: ProfileScope) -> AppResult<Option<PriceProfile>>;

    async fn create(&self, profile: NewPriceProfile) -> AppResult<PriceProfile>;

    async fn update(&self, id: Uuid, changes: PriceProfileChanges) -> AppResult<PriceProfile>;

    async fn activate(&self, id: Uuid) -> AppResult<PriceProfile>;

    async fn deactivate(&self, id: Uuid) -> AppResult<PriceProfile>;
}

pub struct PriceProfileStore {
    db: DatabaseConnection,
}

impl PriceProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<price_profile::Model> {
        ProfileEntity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_not_found("Price profile")
    }
}

fn seller_condition(seller_id: Option<Uuid>) -> SimpleExpr {
    match seller_id {
        Some(id) => price_profile::Column::SellerId.eq(id),
        None => price_profile::Column::SellerId.is_null(),
    }
}

/// Deactivate every active profile in `scope` other than `keep`.
async fn deactivate_scope<C: ConnectionTrait>(
    conn: &C,
    scope: ProfileScope,
    keep: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let mut query = ProfileEntity::update_many()
        .col_expr(price_profile::Column::IsActive, Expr::value(false))
        .col_expr(price_profile::Column::UpdatedAt, Expr::value(now))
        .filter(price_profile::Column::Kind.eq(scope.kind.as_str()))
        .filter(seller_condition(scope.seller_id))
        .filter(price_profile::Column::IsActive.eq(true));
    if let Some(id) = keep {
        query = query.filter(price_profile::Column::Id.ne(id));
    }

    let result = query.exec(conn).await?;
    if result.rows_affected > 0 {
        tracing::info!(
            kind = %scope.kind,
            seller_id = ?scope.seller_id,
            replaced = result.rows_affected,
            "Deactivated previous price profile"
        );
    }
    Ok(result.rows_affected)
}

#[async_trait]
impl PriceProfileRepository for PriceProfileStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PriceProfile>> {
        let result = ProfileEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(PriceProfile::try_from).transpose()
    }

    async fn list(&self, filter: ProfileFilter) -> AppResult<Vec<PriceProfile>> {
        let mut query = ProfileEntity::find();
        if let Some(kind) = filter.kind {
            query = query.filter(price_profile::Column::Kind.eq(kind.as_str()));
        }
        if let Some(seller_id) = filter.seller_id {
            query = query.filter(price_profile::Column::SellerId.eq(seller_id));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(price_profile::Column::IsActive.eq(active));
        }

        let models = query
            .order_by_desc(price_profile::Column::EffectiveFrom)
            .order_by_desc(price_profile::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(PriceProfile::try_from).collect()
    }

    async fn find_active(&self, scope: ProfileScope) -> AppResult<Option<PriceProfile>> {
        let result = ProfileEntity::find()
            .filter(price_profile::Column::Kind.eq(scope.kind.as_str()))
            .filter(seller_condition(scope.seller_id))
            .filter(price_profile::Column::IsActive.eq(true))
            .order_by_desc(price_profile::Column::EffectiveFrom)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(PriceProfile::try_from).transpose()
    }

    async fn create(&self, profile: NewPriceProfile) -> AppResult<PriceProfile> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let scope = ProfileScope {
            kind: profile.kind,
            seller_id: profile.seller_id,
        };
        let active_model = ActiveModel {
            id: Set(id),
            kind: Set(profile.kind.as_str().to_string()),
            name: Set(profile.name),
            seller_id: Set(profile.seller_id),
            effective_from: Set(profile.effective_from),
            is_active: Set(profile.is_active),
            items: Set(encode_json("price_profiles.items", &profile.items)?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let txn = self.db.begin().await?;
        if profile.is_active {
            deactivate_scope(&txn, scope, Some(id), now).await?;
        }
        let model = active_model.insert(&txn).await?;
        txn.commit().await?;

        PriceProfile::try_from(model)
    }

    async fn update(&self, id: Uuid, changes: PriceProfileChanges) -> AppResult<PriceProfile> {
        let mut active: ActiveModel = Self::load(&self.db, id).await?.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(effective_from) = changes.effective_from {
            active.effective_from = Set(effective_from);
        }
        if let Some(items) = changes.items {
            active.items = Set(encode_json("price_profiles.items", &items)?);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        PriceProfile::try_from(model)
    }

    async fn activate(&self, id: Uuid) -> AppResult<PriceProfile> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let current = PriceProfile::try_from(Self::load(&txn, id).await?)?;
        deactivate_scope(&txn, current.scope(), Some(id), now).await?;

        let mut active: ActiveModel = Self::load(&txn, id).await?.into();
        active.is_active = Set(true);
        active.updated_at = Set(now);
        let model = active.update(&txn).await?;

        txn.commit().await?;
        PriceProfile::try_from(model)
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<PriceProfile> {
        let mut active: ActiveModel = Self::load(&self.db, id).await?.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        PriceProfile::try_from(model)
    }
}
