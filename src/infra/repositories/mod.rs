//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod customer_repository;
pub(crate) mod entities;
mod order_repository;
mod price_profile_repository;
mod product_repository;
mod seller_repository;
mod session_repository;

use sea_orm::{DbErr, SqlErr};

use crate::errors::AppError;

pub use customer_repository::{CustomerFilter, CustomerRepository, CustomerStore};
pub use order_repository::{OrderFilter, OrderRepository, OrderStatusWrite, OrderStore};
pub use price_profile_repository::{PriceProfileRepository, PriceProfileStore, ProfileFilter};
pub use product_repository::{ProductRepository, ProductStore};
pub use seller_repository::{SellerRepository, SellerStore};
pub use session_repository::{SessionRepository, SessionStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use customer_repository::MockCustomerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use price_profile_repository::MockPriceProfileRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use seller_repository::MockSellerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use session_repository::MockSessionRepository;

/// Turn a unique-constraint violation into a conflict on `entity`.
pub(crate) fn unique_violation_as(entity: &'static str) -> impl Fn(DbErr) -> AppError {
    move |e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(entity),
        _ => AppError::from(e),
    }
}
