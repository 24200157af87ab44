//! Seller domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_SELLER};

/// Seller roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SellerRole {
    Admin,
    Seller,
}

impl SellerRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, SellerRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SellerRole::Admin => ROLE_ADMIN,
            SellerRole::Seller => ROLE_SELLER,
        }
    }
}

impl From<&str> for SellerRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => SellerRole::Admin,
            _ => SellerRole::Seller,
        }
    }
}

impl std::fmt::Display for SellerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seller domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: SellerRole,
    pub is_enabled: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub must_change_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    /// Check if seller has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Identity used for authorization decisions
    pub fn actor(&self) -> Actor {
        Actor {
            seller_id: self.id,
            role: self.role,
        }
    }
}

/// Data required to persist a new seller.
#[derive(Debug, Clone)]
pub struct NewSeller {
    pub username: String,
    pub display_name: String,
    pub role: SellerRole,
    pub password_hash: String,
    pub must_change_password: bool,
}

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub seller_id: Uuid,
    pub role: SellerRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admins act on everything, sellers only on what they own.
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.seller_id == owner_id
    }

    /// Seller filter to apply to list queries for this caller.
    ///
    /// Sellers are always pinned to themselves; admins may narrow to one
    /// seller or see everyone.
    pub fn scope(&self, requested: Option<Uuid>) -> Option<Uuid> {
        if self.is_admin() {
            requested
        } else {
            Some(self.seller_id)
        }
    }
}

/// Seller response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerResponse {
    /// Unique seller identifier
    pub id: Uuid,
    /// Login name
    #[schema(example = "lan.nguyen")]
    pub username: String,
    /// Display name
    #[schema(example = "Lan Nguyen")]
    pub display_name: String,
    /// Seller role
    pub role: SellerRole,
    /// Whether the seller may sign in
    pub is_enabled: bool,
    /// Whether the seller must pick a new password before continuing
    pub must_change_password: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Seller> for SellerResponse {
    fn from(seller: Seller) -> Self {
        Self {
            id: seller.id,
            username: seller.username,
            display_name: seller.display_name,
            role: seller.role,
            is_enabled: seller.is_enabled,
            must_change_password: seller.must_change_password,
            created_at: seller.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(SellerRole::from("ADMIN"), SellerRole::Admin);
        assert_eq!(SellerRole::from("SELLER"), SellerRole::Seller);
        assert_eq!(SellerRole::from("unknown"), SellerRole::Seller);
        assert_eq!(SellerRole::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_actor_scope() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let seller = Actor {
            seller_id: own,
            role: SellerRole::Seller,
        };
        let admin = Actor {
            seller_id: Uuid::new_v4(),
            role: SellerRole::Admin,
        };

        assert!(seller.can_access(own));
        assert!(!seller.can_access(other));
        assert!(admin.can_access(other));

        assert_eq!(seller.scope(Some(other)), Some(own));
        assert_eq!(seller.scope(None), Some(own));
        assert_eq!(admin.scope(Some(other)), Some(other));
        assert_eq!(admin.scope(None), None);
    }
}
