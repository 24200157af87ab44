//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories so services depend on one
//! injectable handle instead of six. Multi-row atomic work (price profile
//! activation) runs inside the owning repository's transaction.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    CustomerRepository, CustomerStore, OrderRepository, OrderStore, PriceProfileRepository,
    PriceProfileStore, ProductRepository, ProductStore, SellerRepository, SellerStore,
    SessionRepository, SessionStore,
};

/// Unit of Work trait for dependency injection.
///
/// Tests implement it over mock repositories.
pub trait UnitOfWork: Send + Sync {
    fn sellers(&self) -> Arc<dyn SellerRepository>;

    fn sessions(&self) -> Arc<dyn SessionRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn price_profiles(&self) -> Arc<dyn PriceProfileRepository>;

    fn customers(&self) -> Arc<dyn CustomerRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;
}

/// Concrete implementation of UnitOfWork over one connection pool
pub struct Persistence {
    sellers: Arc<SellerStore>,
    sessions: Arc<SessionStore>,
    products: Arc<ProductStore>,
    price_profiles: Arc<PriceProfileStore>,
    customers: Arc<CustomerStore>,
    orders: Arc<OrderStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            sellers: Arc::new(SellerStore::new(db.clone())),
            sessions: Arc::new(SessionStore::new(db.clone())),
            products: Arc::new(ProductStore::new(db.clone())),
            price_profiles: Arc::new(PriceProfileStore::new(db.clone())),
            customers: Arc::new(CustomerStore::new(db.clone())),
            orders: Arc::new(OrderStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn sellers(&self) -> Arc<dyn SellerRepository> {
        self.sellers.clone()
    }

    fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.sessions.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn price_profiles(&self) -> Arc<dyn PriceProfileRepository> {
        self.price_profiles.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerRepository> {
        self.customers.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }
}
