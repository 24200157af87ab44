//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services reach storage through the Unit of Work.

mod auth_service;
mod catalog_service;
pub mod container;
mod customer_service;
mod order_service;
mod report_service;
mod seller_service;
mod session_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, LoginOutcome, LoginResponse};
pub use catalog_service::{CatalogService, Catalog, ItemPrice, ProfileDraft, ProfileUpdate};
pub use customer_service::{CustomerRegistry, CustomerService};
pub use order_service::{OrderDraft, OrderEngine, OrderService, StatusUpdate};
pub use report_service::{ReportService, Reporter, SellerTrend};
pub use seller_service::{SellerDraft, SellerManager, SellerService};
pub use session_service::{IssuedSession, SessionManager, SessionRegistry};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
