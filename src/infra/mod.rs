//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Redis (request rate limiting)
//! - Unit of Work for repository access

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    CustomerFilter, CustomerRepository, CustomerStore, OrderFilter, OrderRepository, OrderStatusWrite, OrderStore,
    PriceProfileRepository, PriceProfileStore, ProductRepository, ProductStore, ProfileFilter,
    SellerRepository, SellerStore, SessionRepository, SessionStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockCustomerRepository, MockOrderRepository, MockPriceProfileRepository,
    MockProductRepository, MockSellerRepository, MockSessionRepository,
};
