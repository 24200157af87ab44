//! Service Container - Centralized service access.
//!
//! SOLID (SRP): Manages service lifecycle and access.
//! SOLID (DIP): Depends on service traits, not implementations.

use std::sync::Arc;

use super::{
    AuthService, CatalogService, CustomerService, OrderService, ReportService, SellerService,
    SessionManager,
};
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn sessions(&self) -> Arc<dyn SessionManager>;

    fn sellers(&self) -> Arc<dyn SellerService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn customers(&self) -> Arc<dyn CustomerService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn reports(&self) -> Arc<dyn ReportService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    sessions: Arc<dyn SessionManager>,
    sellers: Arc<dyn SellerService>,
    catalog: Arc<dyn CatalogService>,
    customers: Arc<dyn CustomerService>,
    orders: Arc<dyn OrderService>,
    reports: Arc<dyn ReportService>,
}

impl Services {
    /// Wire every service over one database connection pool
    pub fn from_connection(db: sea_orm::DatabaseConnection) -> Self {
        use super::{
            Authenticator, Catalog, CustomerRegistry, OrderEngine, Reporter, SellerManager,
            SessionRegistry,
        };

        let uow = Arc::new(Persistence::new(db));
        let sessions: Arc<dyn SessionManager> = Arc::new(SessionRegistry::new(uow.clone()));
        let catalog: Arc<dyn CatalogService> = Arc::new(Catalog::new(uow.clone()));

        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), sessions.clone())),
            sellers: Arc::new(SellerManager::new(uow.clone(), sessions.clone())),
            customers: Arc::new(CustomerRegistry::new(uow.clone())),
            orders: Arc::new(OrderEngine::new(uow.clone(), catalog.clone())),
            reports: Arc::new(Reporter::new(uow)),
            sessions,
            catalog,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn sessions(&self) -> Arc<dyn SessionManager> {
        self.sessions.clone()
    }

    fn sellers(&self) -> Arc<dyn SellerService> {
        self.sellers.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerService> {
        self.customers.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.orders.clone()
    }

    fn reports(&self) -> Arc<dyn ReportService> {
        self.reports.clone()
    }
}
