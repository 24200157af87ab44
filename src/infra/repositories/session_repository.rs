//! Persistent session records, addressed by token hash.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use super::entities::seller_session::{self, ActiveModel, Entity as SessionEntity};
use super::unique_violation_as;
use crate::domain::{NewSession, Session};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Session repository trait for dependency injection.
///
/// Deletions report the number of rows removed and never fail on absence.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: NewSession) -> AppResult<Session>;

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>>;

    /// Refresh `last_seen_at`
    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    async fn delete(&self, id: Uuid) -> AppResult<u64>;

    async fn delete_by_token_hash(&self, token_hash: &str) -> AppResult<u64>;

    /// Revoke every session of a seller
    async fn delete_for_seller(&self, seller_id: Uuid) -> AppResult<u64>;

    /// Remove sessions whose expiry is at or before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

pub struct SessionStore {
    db: DatabaseConnection,
}

impl SessionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn create(&self, session: NewSession) -> AppResult<Session> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            seller_id: Set(session.seller_id),
            token_hash: Set(session.token_hash),
            expires_at: Set(session.expires_at),
            last_seen_at: Set(now),
            created_at: Set(now),
            user_agent: Set(session.context.user_agent),
            ip_address: Set(session.context.ip_address),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(unique_violation_as("Session"))?;
        Ok(Session::from(model))
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        let result = SessionEntity::find()
            .filter(seller_session::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Session::from))
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        SessionEntity::update_many()
            .col_expr(seller_session::Column::LastSeenAt, Expr::value(at))
            .filter(seller_session::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = SessionEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected)
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> AppResult<u64> {
        let result = SessionEntity::delete_many()
            .filter(seller_session::Column::TokenHash.eq(token_hash))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected)
    }

    async fn delete_for_seller(&self, seller_id: Uuid) -> AppResult<u64> {
        let result = SessionEntity::delete_many()
            .filter(seller_session::Column::SellerId.eq(seller_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = SessionEntity::delete_many()
            .filter(seller_session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected)
    }
}
