//! Seller session records and opaque bearer tokens.
//!
//! The raw token only ever lives in the client cookie; storage keeps the
//! SHA-256 hex digest. A session is `ACTIVE` until it expires or is revoked,
//! and both terminal states look the same to callers: absent.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::seller::Seller;
use crate::config::{SESSION_TOKEN_BYTES, SESSION_TOUCH_INTERVAL_MINUTES, SESSION_TTL_DAYS};

/// Persisted session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub seller_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether `last_seen_at` is stale enough to be worth a write.
    pub fn needs_touch(&self, now: DateTime<Utc>) -> bool {
        now - self.last_seen_at >= Duration::minutes(SESSION_TOUCH_INTERVAL_MINUTES)
    }
}

/// Request metadata recorded alongside a new session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Data required to persist a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub seller_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub context: ClientContext,
}

/// Freshly minted raw token. Never stored server-side.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl SessionToken {
    /// Generate a new cryptographically random token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Digest stored in place of the token.
    pub fn hash(&self) -> String {
        hash_token(&self.0)
    }
}

/// SHA-256 hex digest of a presented token.
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Expiry of a session issued at `now`.
pub fn session_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(SESSION_TTL_DAYS)
}

/// A resolved, valid session together with its owner.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session: Session,
    pub seller: Seller,
}

/// Outcome of requiring a session at a request boundary.
///
/// `RedirectRequired` is not an error: the boundary decides whether it
/// becomes a redirect to the login page or a 401.
#[derive(Debug, Clone)]
pub enum SessionGate {
    Authenticated(AuthSession),
    RedirectRequired,
}

impl SessionGate {
    pub fn authenticated(self) -> Option<AuthSession> {
        match self {
            SessionGate::Authenticated(auth) => Some(auth),
            SessionGate::RedirectRequired => None,
        }
    }
}
