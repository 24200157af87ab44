//! Customer registry entity.
//!
//! `order_count`, `total_spent_amount` and `last_order_at` are maintained by
//! the order engine and are approximate: updates are best effort.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "Chị Hoa")]
    pub name: String,
    #[schema(example = "0912345678")]
    pub phone: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub order_count: i64,
    #[schema(value_type = String, example = "260000")]
    pub total_spent_amount: Decimal,
    pub last_order_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl NewCustomer {
    /// Trim fields and reject blank required values.
    pub fn normalized(self) -> DomainResult<Self> {
        Ok(Self {
            name: required("Customer name", &self.name)?,
            phone: required("Phone", &self.phone)?,
            email: optional(self.email),
            notes: optional(self.notes),
        })
    }
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl CustomerChanges {
    pub fn normalized(self) -> DomainResult<Self> {
        Ok(Self {
            name: self.name.map(|n| required("Customer name", &n)).transpose()?,
            phone: self.phone.map(|p| required("Phone", &p)).transpose()?,
            email: self.email.map(|e| e.trim().to_string()),
            notes: self.notes.map(|n| n.trim().to_string()),
        })
    }
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
