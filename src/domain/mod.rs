//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//!
//! Pricing, status transitions and report aggregation live here as plain
//! functions over domain types so they can be tested without storage.

pub mod customer;
pub mod error;
pub mod order;
pub mod password;
pub mod price_profile;
pub mod product;
pub mod report;
pub mod seller;
pub mod session;

pub use customer::{Customer, CustomerChanges, NewCustomer};
pub use error::{DomainError, DomainResult};
pub use order::{
    ApprovalDecision, ApprovalStatus, CollectionStatus, DiscountDecision, DiscountStatus,
    FulfillmentStatus, LineRequest, NewOrder, Order, OrderLine, OrderTotals,
    SupplierPaymentStatus,
};
pub use password::Password;
pub use price_profile::{
    NewPriceProfile, PriceItem, PriceProfile, PriceProfileChanges, PriceProfileKind,
    ProfileScope, ProfileSnapshot,
};
pub use product::Product;
pub use report::{DashboardStats, OrderFigures, TrendBucket, TrendGranularity, TrendWindow};
pub use seller::{Actor, NewSeller, Seller, SellerResponse, SellerRole};
pub use session::{AuthSession, ClientContext, NewSession, Session, SessionGate, SessionToken};
