//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::{Cache, Database};
use crate::services::{
    AuthService, CatalogService, CustomerService, OrderService, ReportService, SellerService,
    ServiceContainer, SessionManager,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub session_manager: Arc<dyn SessionManager>,
    pub seller_service: Arc<dyn SellerService>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub customer_service: Arc<dyn CustomerService>,
    pub order_service: Arc<dyn OrderService>,
    pub report_service: Arc<dyn ReportService>,
    /// Redis cache (rate limiting)
    pub cache: Arc<Cache>,
    /// Database connection
    pub database: Arc<Database>,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl AppState {
    /// Create application state over any service container.
    pub fn with_services(
        services: &dyn ServiceContainer,
        database: Arc<Database>,
        cache: Arc<Cache>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            session_manager: services.sessions(),
            seller_service: services.sellers(),
            catalog_service: services.catalog(),
            customer_service: services.customers(),
            order_service: services.orders(),
            report_service: services.reports(),
            cache,
            database,
            secure_cookies,
        }
    }
}
