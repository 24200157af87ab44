//! Seller administration: bootstrap, accounts, enable/disable, password reset.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::SessionManager;
use crate::domain::{NewSeller, Password, Seller, SellerRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Input for an admin-created account.
#[derive(Debug, Clone)]
pub struct SellerDraft {
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub role: SellerRole,
}

/// Seller service trait for dependency injection.
#[async_trait]
pub trait SellerService: Send + Sync {
    /// Create the first admin unless the username is already taken.
    ///
    /// Returns `None` when the account already exists.
    async fn bootstrap_admin(
        &self,
        username: String,
        password: String,
        display_name: String,
    ) -> AppResult<Option<Seller>>;

    async fn create(&self, draft: SellerDraft) -> AppResult<Seller>;

    async fn get(&self, id: Uuid) -> AppResult<Seller>;

    async fn list(&self) -> AppResult<Vec<Seller>>;

    async fn enable(&self, id: Uuid) -> AppResult<Seller>;

    /// Disable an account and end its sessions. Admins cannot disable themselves.
    async fn disable(&self, actor_id: Uuid, id: Uuid) -> AppResult<Seller>;

    /// Set a temporary password the seller must change at next login
    async fn reset_password(&self, id: Uuid, new_password: String) -> AppResult<Seller>;
}

pub struct SellerManager<U: UnitOfWork> {
    uow: Arc<U>,
    sessions: Arc<dyn SessionManager>,
}

impl<U: UnitOfWork> SellerManager<U> {
    pub fn new(uow: Arc<U>, sessions: Arc<dyn SessionManager>) -> Self {
        Self { uow, sessions }
    }
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl<U: UnitOfWork> SellerService for SellerManager<U> {
    async fn bootstrap_admin(
        &self,
        username: String,
        password: String,
        display_name: String,
    ) -> AppResult<Option<Seller>> {
        let username = required("Username", &username)?;
        if self.uow.sellers().find_by_username(&username).await?.is_some() {
            tracing::info!(username = %username, "Admin account already present, skipping bootstrap");
            return Ok(None);
        }

        let password_hash = Password::new(&password)?.into_string();
        let seller = self
            .uow
            .sellers()
            .create(NewSeller {
                username,
                display_name: required("Display name", &display_name)?,
                role: SellerRole::Admin,
                password_hash,
                must_change_password: true,
            })
            .await?;

        tracing::info!(seller_id = %seller.id, username = %seller.username, "Bootstrapped admin account");
        Ok(Some(seller))
    }

    async fn create(&self, draft: SellerDraft) -> AppResult<Seller> {
        let username = required("Username", &draft.username)?;
        if self.uow.sellers().find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("Seller"));
        }

        let password_hash = Password::new(&draft.password)?.into_string();
        let seller = self
            .uow
            .sellers()
            .create(NewSeller {
                username,
                display_name: required("Display name", &draft.display_name)?,
                role: draft.role,
                password_hash,
                must_change_password: true,
            })
            .await?;

        tracing::info!(seller_id = %seller.id, role = %seller.role, "Seller created");
        Ok(seller)
    }

    async fn get(&self, id: Uuid) -> AppResult<Seller> {
        self.uow
            .sellers()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Seller")
    }

    async fn list(&self) -> AppResult<Vec<Seller>> {
        self.uow.sellers().list().await
    }

    async fn enable(&self, id: Uuid) -> AppResult<Seller> {
        let seller = self.uow.sellers().set_enabled(id, true).await?;
        tracing::info!(seller_id = %id, "Seller enabled");
        Ok(seller)
    }

    async fn disable(&self, actor_id: Uuid, id: Uuid) -> AppResult<Seller> {
        if actor_id == id {
            return Err(AppError::validation("You cannot disable your own account"));
        }

        let seller = self.uow.sellers().set_enabled(id, false).await?;
        self.sessions.revoke_all(id).await?;
        tracing::info!(seller_id = %id, "Seller disabled");
        Ok(seller)
    }

    async fn reset_password(&self, id: Uuid, new_password: String) -> AppResult<Seller> {
        let password_hash = Password::new(&new_password)?.into_string();
        let seller = self.uow.sellers().set_password(id, password_hash, true).await?;
        self.sessions.revoke_all(id).await?;
        tracing::info!(seller_id = %id, "Seller password reset");
        Ok(seller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockSellerRepository, MockSessionRepository};
    use crate::services::test_support::{seller, BuiltUnitOfWork, TestUnitOfWork};
    use crate::services::SessionRegistry;
    use mockall::predicate::eq;

    fn manager(
        sellers: MockSellerRepository,
        sessions: MockSessionRepository,
    ) -> SellerManager<BuiltUnitOfWork> {
        let uow = TestUnitOfWork::default()
            .with_sellers(sellers)
            .with_sessions(sessions)
            .build();
        let registry = Arc::new(SessionRegistry::new(uow.clone()));
        SellerManager::new(uow, registry)
    }

    #[tokio::test]
    async fn test_bootstrap_skips_existing_admin() {
        let existing = seller(SellerRole::Admin, "password1");
        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_username()
            .returning(move |_| Ok(Some(existing.clone())));
        sellers.expect_create().never();

        let created = manager(sellers, MockSessionRepository::new())
            .bootstrap_admin("admin".into(), "password1".into(), "Admin".into())
            .await
            .unwrap();

        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_creates_admin_that_must_change_password() {
        let mut sellers = MockSellerRepository::new();
        sellers.expect_find_by_username().returning(|_| Ok(None));
        sellers.expect_create().times(1).returning(|new| {
            assert_eq!(new.role, SellerRole::Admin);
            assert!(new.must_change_password);
            let mut created = seller(SellerRole::Admin, "password1");
            created.username = new.username;
            created.must_change_password = new.must_change_password;
            Ok(created)
        });

        let created = manager(sellers, MockSessionRepository::new())
            .bootstrap_admin(" admin ".into(), "password1".into(), "Admin".into())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.username, "admin");
    }

    #[tokio::test]
    async fn test_create_rejects_taken_username() {
        let existing = seller(SellerRole::Seller, "password1");
        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_username()
            .returning(move |_| Ok(Some(existing.clone())));

        let result = manager(sellers, MockSessionRepository::new())
            .create(SellerDraft {
                username: "lan".into(),
                display_name: "Lan".into(),
                password: "password1".into(),
                role: SellerRole::Seller,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_disable_revokes_sessions() {
        let target = seller(SellerRole::Seller, "password1");
        let target_id = target.id;

        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_set_enabled()
            .with(eq(target_id), eq(false))
            .returning(move |_, enabled| {
                let mut updated = target.clone();
                updated.is_enabled = enabled;
                Ok(updated)
            });
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_delete_for_seller()
            .with(eq(target_id))
            .times(1)
            .returning(|_| Ok(2));

        let updated = manager(sellers, sessions)
            .disable(Uuid::new_v4(), target_id)
            .await
            .unwrap();

        assert!(!updated.is_enabled);
    }

    #[tokio::test]
    async fn test_admin_cannot_disable_self() {
        let id = Uuid::new_v4();
        let result = manager(MockSellerRepository::new(), MockSessionRepository::new())
            .disable(id, id)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reset_password_forces_change_and_revokes_sessions() {
        let target = seller(SellerRole::Seller, "password1");
        let target_id = target.id;

        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_set_password()
            .times(1)
            .returning(move |_, hash, must_change| {
                let mut updated = target.clone();
                updated.password_hash = hash;
                updated.must_change_password = must_change;
                Ok(updated)
            });
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_delete_for_seller()
            .times(1)
            .returning(|_| Ok(1));

        let updated = manager(sellers, sessions)
            .reset_password(target_id, "temporary1".into())
            .await
            .unwrap();

        assert!(updated.must_change_password);
    }
}
