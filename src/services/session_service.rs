//! Session service - issues, resolves and revokes login sessions.
//!
//! Only the SHA-256 hash of a token is stored. Lookups never surface storage
//! errors: a session that cannot be verified is treated as absent.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::session::{hash_token, session_expiry};
use crate::domain::{AuthSession, ClientContext, NewSession, Session, SessionGate, SessionToken};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// A freshly issued session with the raw token for the client cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub session: Session,
}

/// Session service trait for dependency injection.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Create a session for a seller and return its raw token
    async fn issue(&self, seller_id: Uuid, context: ClientContext) -> AppResult<IssuedSession>;

    /// Look up a live session and its enabled owner
    async fn resolve(&self, raw_token: &str) -> Option<AuthSession>;

    /// Gate a request on a live session
    async fn require(&self, raw_token: Option<&str>) -> SessionGate;

    /// Delete the session behind a token; unknown tokens are ignored
    async fn revoke(&self, raw_token: &str) -> AppResult<()>;

    /// Delete every session of a seller
    async fn revoke_all(&self, seller_id: Uuid) -> AppResult<u64>;

    /// Delete expired sessions
    async fn sweep_expired(&self) -> AppResult<u64>;
}

/// Concrete implementation of SessionManager using Unit of Work.
pub struct SessionRegistry<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> SessionRegistry<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn lookup(&self, raw_token: &str) -> AppResult<Option<AuthSession>> {
        if raw_token.is_empty() {
            return Ok(None);
        }

        let sessions = self.uow.sessions();
        let Some(mut session) = sessions.find_by_token_hash(&hash_token(raw_token)).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if session.is_expired(now) {
            sessions.delete(session.id).await?;
            tracing::debug!(session_id = %session.id, "Removed expired session");
            return Ok(None);
        }

        let seller = match self.uow.sellers().find_by_id(session.seller_id).await? {
            Some(seller) if seller.is_enabled => seller,
            _ => {
                sessions.delete(session.id).await?;
                tracing::info!(
                    session_id = %session.id,
                    seller_id = %session.seller_id,
                    "Removed session of missing or disabled seller"
                );
                return Ok(None);
            }
        };

        if session.needs_touch(now) {
            match sessions.touch(session.id, now).await {
                Ok(()) => session.last_seen_at = now,
                Err(e) => tracing::warn!(session_id = %session.id, error = %e, "Failed to refresh session"),
            }
        }

        Ok(Some(AuthSession { session, seller }))
    }
}

#[async_trait]
impl<U: UnitOfWork> SessionManager for SessionRegistry<U> {
    async fn issue(&self, seller_id: Uuid, context: ClientContext) -> AppResult<IssuedSession> {
        let token = SessionToken::generate();
        let session = self
            .uow
            .sessions()
            .create(NewSession {
                seller_id,
                token_hash: token.hash(),
                expires_at: session_expiry(Utc::now()),
                context,
            })
            .await?;

        tracing::info!(seller_id = %seller_id, session_id = %session.id, "Session issued");
        Ok(IssuedSession { token, session })
    }

    async fn resolve(&self, raw_token: &str) -> Option<AuthSession> {
        match self.lookup(raw_token).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed, treating as signed out");
                None
            }
        }
    }

    async fn require(&self, raw_token: Option<&str>) -> SessionGate {
        match raw_token {
            Some(token) => match self.resolve(token).await {
                Some(auth) => SessionGate::Authenticated(auth),
                None => SessionGate::RedirectRequired,
            },
            None => SessionGate::RedirectRequired,
        }
    }

    async fn revoke(&self, raw_token: &str) -> AppResult<()> {
        if raw_token.is_empty() {
            return Ok(());
        }
        let removed = self
            .uow
            .sessions()
            .delete_by_token_hash(&hash_token(raw_token))
            .await?;
        tracing::debug!(removed, "Session revoked");
        Ok(())
    }

    async fn revoke_all(&self, seller_id: Uuid) -> AppResult<u64> {
        let removed = self.uow.sessions().delete_for_seller(seller_id).await?;
        tracing::info!(seller_id = %seller_id, removed, "Revoked all sessions");
        Ok(removed)
    }

    async fn sweep_expired(&self) -> AppResult<u64> {
        let removed = self.uow.sessions().delete_expired(Utc::now()).await?;
        if removed > 0 {
            tracing::info!(removed, "Swept expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SellerRole;
    use crate::errors::AppError;
    use crate::infra::{MockSellerRepository, MockSessionRepository};
    use crate::services::test_support::{seller, session_for, BuiltUnitOfWork, TestUnitOfWork};
    use chrono::Duration;
    use mockall::predicate::eq;

    const RAW: &str = "raw-token";

    fn registry(
        sellers: MockSellerRepository,
        sessions: MockSessionRepository,
    ) -> SessionRegistry<BuiltUnitOfWork> {
        SessionRegistry::new(
            TestUnitOfWork::default()
                .with_sellers(sellers)
                .with_sessions(sessions)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_resolve_live_session() {
        let owner = seller(SellerRole::Seller, "password1");
        let session = session_for(owner.id, &hash_token(RAW));

        let mut sessions = MockSessionRepository::new();
        let found = session.clone();
        sessions
            .expect_find_by_token_hash()
            .returning(move |hash| {
                assert_eq!(hash, hash_token(RAW).as_str());
                Ok(Some(found.clone()))
            });
        sessions.expect_delete().never();
        sessions.expect_touch().never();

        let mut sellers = MockSellerRepository::new();
        let owner_clone = owner.clone();
        sellers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(owner_clone.clone())));

        let auth = registry(sellers, sessions).resolve(RAW).await.unwrap();
        assert_eq!(auth.seller.id, owner.id);
        assert_eq!(auth.session.id, session.id);
    }

    #[tokio::test]
    async fn test_resolve_deletes_expired_session() {
        let mut session = session_for(Uuid::new_v4(), &hash_token(RAW));
        session.expires_at = Utc::now() - Duration::seconds(1);
        let session_id = session.id;

        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_token_hash()
            .returning(move |_| Ok(Some(session.clone())));
        sessions
            .expect_delete()
            .with(eq(session_id))
            .times(1)
            .returning(|_| Ok(1));

        let resolved = registry(MockSellerRepository::new(), sessions).resolve(RAW).await;
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_resolve_deletes_session_of_disabled_seller() {
        let mut owner = seller(SellerRole::Seller, "password1");
        owner.is_enabled = false;
        let session = session_for(owner.id, &hash_token(RAW));

        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_token_hash()
            .returning(move |_| Ok(Some(session.clone())));
        sessions.expect_delete().times(1).returning(|_| Ok(1));

        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));

        assert!(registry(sellers, sessions).resolve(RAW).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_refreshes_stale_last_seen() {
        let owner = seller(SellerRole::Seller, "password1");
        let mut session = session_for(owner.id, &hash_token(RAW));
        session.last_seen_at = Utc::now() - Duration::minutes(30);
        let stale = session.last_seen_at;

        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_token_hash()
            .returning(move |_| Ok(Some(session.clone())));
        sessions.expect_touch().times(1).returning(|_, _| Ok(()));

        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));

        let auth = registry(sellers, sessions).resolve(RAW).await.unwrap();
        assert!(auth.session.last_seen_at > stale);
    }

    #[tokio::test]
    async fn test_resolve_treats_storage_failure_as_absent() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_token_hash()
            .returning(|_| Err(AppError::ServiceUnavailable));

        let resolved = registry(MockSellerRepository::new(), sessions).resolve(RAW).await;
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_require_without_token_redirects() {
        let gate = registry(MockSellerRepository::new(), MockSessionRepository::new())
            .require(None)
            .await;
        assert!(matches!(gate, SessionGate::RedirectRequired));
    }

    #[tokio::test]
    async fn test_revoke_all_deletes_every_session_of_seller() {
        let seller_id = Uuid::new_v4();
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_delete_for_seller()
            .with(eq(seller_id))
            .times(1)
            .returning(|_| Ok(3));

        let removed = registry(MockSellerRepository::new(), sessions)
            .revoke_all(seller_id)
            .await
            .unwrap();
        assert_eq!(removed, 3);
    }

    #[tokio::test]
    async fn test_revoke_all_propagates_storage_failure() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_delete_for_seller()
            .returning(|_| Err(AppError::ServiceUnavailable));

        let result = registry(MockSellerRepository::new(), sessions)
            .revoke_all(Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable)));
    }

    #[tokio::test]
    async fn test_issue_stores_only_the_hash() {
        let seller_id = Uuid::new_v4();
        let mut sessions = MockSessionRepository::new();
        sessions.expect_create().times(1).returning(|new| {
            assert_eq!(new.token_hash.len(), 64);
            Ok(session_for(new.seller_id, &new.token_hash))
        });

        let issued = registry(MockSellerRepository::new(), sessions)
            .issue(seller_id, ClientContext::default())
            .await
            .unwrap();

        assert_eq!(issued.session.seller_id, seller_id);
        assert_eq!(issued.session.token_hash, issued.token.hash());
        assert_ne!(issued.session.token_hash, issued.token.as_str());
    }

    #[tokio::test]
    async fn test_revoke_deletes_by_hash_and_is_idempotent() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_delete_by_token_hash()
            .times(2)
            .returning(|hash| {
                assert_eq!(hash, hash_token(RAW).as_str());
                Ok(0)
            });

        let registry = registry(MockSellerRepository::new(), sessions);
        assert!(registry.revoke(RAW).await.is_ok());
        assert!(registry.revoke(RAW).await.is_ok());
    }
}
