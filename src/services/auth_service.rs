//! Authentication service - login, logout and self-service password change.
//!
//! DDD: Uses the domain Password value object for hashing and verification.
//! Sessions are delegated to the SessionManager.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::SessionManager;
use crate::domain::password::DUMMY_PASSWORD_HASH;
use crate::domain::{ClientContext, Password, Seller, SellerResponse, SessionToken};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: SessionToken,
    pub seller: Seller,
}

/// Login response body; the token itself travels in the cookie
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub seller: SellerResponse,
    /// Client should route to the password change screen
    pub must_change_password: bool,
}

impl From<&LoginOutcome> for LoginResponse {
    fn from(outcome: &LoginOutcome) -> Self {
        Self {
            seller: SellerResponse::from(outcome.seller.clone()),
            must_change_password: outcome.seller.must_change_password,
        }
    }
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and open a session
    async fn login(
        &self,
        username: String,
        password: String,
        context: ClientContext,
    ) -> AppResult<LoginOutcome>;

    /// Close the session behind a token
    async fn logout(&self, raw_token: &str) -> AppResult<()>;

    /// Replace the caller's password and revoke all of their sessions
    async fn change_password(
        &self,
        seller_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<Seller>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    sessions: Arc<dyn SessionManager>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, sessions: Arc<dyn SessionManager>) -> Self {
        Self { uow, sessions }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(
        &self,
        username: String,
        password: String,
        context: ClientContext,
    ) -> AppResult<LoginOutcome> {
        let seller = self.uow.sellers().find_by_username(username.trim()).await?;

        // SECURITY: verify against a dummy hash for unknown usernames so
        // response timing does not reveal which accounts exist.
        let stored = Password::from_hash(
            seller
                .as_ref()
                .map_or(DUMMY_PASSWORD_HASH, |s| s.password_hash.as_str()),
        );
        let password_valid = stored.verify(&password);

        let seller = match seller {
            Some(seller) if password_valid && seller.is_enabled => seller,
            _ => {
                tracing::warn!(username = %username.trim(), "Failed login attempt");
                return Err(AppError::InvalidCredentials);
            }
        };

        let issued = self.sessions.issue(seller.id, context).await?;
        tracing::info!(seller_id = %seller.id, "Seller logged in");

        Ok(LoginOutcome {
            token: issued.token,
            seller,
        })
    }

    async fn logout(&self, raw_token: &str) -> AppResult<()> {
        self.sessions.revoke(raw_token).await
    }

    async fn change_password(
        &self,
        seller_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<Seller> {
        let seller = self
            .uow
            .sellers()
            .find_by_id(seller_id)
            .await?
            .ok_or_not_found("Seller")?;

        if !Password::from_hash(seller.password_hash.as_str()).verify(&current_password) {
            return Err(AppError::validation("Current password is incorrect"));
        }
        if current_password == new_password {
            return Err(AppError::validation(
                "New password must differ from the current password",
            ));
        }

        let hash = Password::new(&new_password)?.into_string();
        let seller = self.uow.sellers().set_password(seller_id, hash, false).await?;
        self.sessions.revoke_all(seller_id).await?;

        tracing::info!(seller_id = %seller_id, "Password changed");
        Ok(seller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SellerRole;
    use crate::infra::{MockSellerRepository, MockSessionRepository};
    use crate::services::test_support::{seller, session_for, BuiltUnitOfWork, TestUnitOfWork};
    use crate::services::SessionRegistry;

    fn authenticator(
        sellers: MockSellerRepository,
        sessions: MockSessionRepository,
    ) -> Authenticator<BuiltUnitOfWork> {
        let uow = TestUnitOfWork::default()
            .with_sellers(sellers)
            .with_sessions(sessions)
            .build();
        let registry = Arc::new(SessionRegistry::new(uow.clone()));
        Authenticator::new(uow, registry)
    }

    fn no_sessions() -> MockSessionRepository {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_create().never();
        sessions
    }

    #[tokio::test]
    async fn test_login_success_issues_session() {
        let account = seller(SellerRole::Seller, "correct-horse");
        let account_id = account.id;

        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_username()
            .returning(move |_| Ok(Some(account.clone())));
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_create()
            .times(1)
            .returning(|new| Ok(session_for(new.seller_id, &new.token_hash)));

        let outcome = authenticator(sellers, sessions)
            .login(
                " lan ".to_string(),
                "correct-horse".to_string(),
                ClientContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.seller.id, account_id);
        assert_eq!(outcome.token.as_str().len(), 64);
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_invalid_credentials() {
        let mut sellers = MockSellerRepository::new();
        sellers.expect_find_by_username().returning(|_| Ok(None));

        let result = authenticator(sellers, no_sessions())
            .login("ghost".to_string(), "whatever1".to_string(), ClientContext::default())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_invalid_credentials() {
        let account = seller(SellerRole::Seller, "correct-horse");
        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_username()
            .returning(move |_| Ok(Some(account.clone())));

        let result = authenticator(sellers, no_sessions())
            .login("lan".to_string(), "wrong-horse".to_string(), ClientContext::default())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_disabled_seller_is_invalid_credentials() {
        let mut account = seller(SellerRole::Seller, "correct-horse");
        account.is_enabled = false;
        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_username()
            .returning(move |_| Ok(Some(account.clone())));

        let result = authenticator(sellers, no_sessions())
            .login("lan".to_string(), "correct-horse".to_string(), ClientContext::default())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_change_password_rejects_wrong_current() {
        let account = seller(SellerRole::Seller, "correct-horse");
        let account_id = account.id;
        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        sellers.expect_set_password().never();

        let result = authenticator(sellers, MockSessionRepository::new())
            .change_password(account_id, "nope-nope".to_string(), "new-password".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_change_password_clears_flag_and_revokes_sessions() {
        let mut account = seller(SellerRole::Seller, "correct-horse");
        account.must_change_password = true;
        let account_id = account.id;

        let mut sellers = MockSellerRepository::new();
        let stored = account.clone();
        sellers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        sellers
            .expect_set_password()
            .times(1)
            .returning(move |_, hash, must_change| {
                assert!(!must_change);
                assert!(hash.starts_with("$argon2id$"));
                let mut updated = account.clone();
                updated.password_hash = hash;
                updated.must_change_password = must_change;
                Ok(updated)
            });
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_delete_for_seller()
            .times(1)
            .returning(|_| Ok(3));

        let updated = authenticator(sellers, sessions)
            .change_password(
                account_id,
                "correct-horse".to_string(),
                "battery-staple".to_string(),
            )
            .await
            .unwrap();

        assert!(!updated.must_change_password);
        assert!(Password::from_hash(updated.password_hash).verify("battery-staple"));
    }

    #[tokio::test]
    async fn test_change_password_rejects_short_password() {
        let account = seller(SellerRole::Seller, "correct-horse");
        let account_id = account.id;
        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        sellers.expect_set_password().never();

        let result = authenticator(sellers, MockSessionRepository::new())
            .change_password(account_id, "correct-horse".to_string(), "short".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
