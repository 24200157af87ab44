//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, customer_handler, order_handler, price_profile_handler, product_handler,
    report_handler, seller_handler,
};
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::order::{Approval, DiscountRequest};
use crate::domain::report::StatusCount;
use crate::domain::{
    ApprovalDecision, ApprovalStatus, CollectionStatus, Customer, DashboardStats,
    DiscountDecision, DiscountStatus, FulfillmentStatus, LineRequest, Order, OrderLine,
    OrderTotals, PriceItem, PriceProfile, PriceProfileKind, Product, ProfileSnapshot,
    SellerResponse, SellerRole, SupplierPaymentStatus, TrendBucket, TrendGranularity,
};
use crate::services::{LoginResponse, SellerTrend};
use crate::types::{MessageResponse, PaginationMeta};

/// OpenAPI documentation for the ChaFlow API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ChaFlow API",
        version = "0.1.0",
        description = "Back-office API for sellers: catalog, price profiles, customers, orders and reports"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        auth_handler::change_password,
        seller_handler::list_sellers,
        seller_handler::create_seller,
        seller_handler::get_seller,
        seller_handler::enable_seller,
        seller_handler::disable_seller,
        seller_handler::reset_password,
        product_handler::list_products,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::rename_product,
        product_handler::activate_product,
        product_handler::deactivate_product,
        price_profile_handler::list_profiles,
        price_profile_handler::current_profiles,
        price_profile_handler::get_profile,
        price_profile_handler::create_profile,
        price_profile_handler::update_profile,
        price_profile_handler::activate_profile,
        price_profile_handler::deactivate_profile,
        customer_handler::list_customers,
        customer_handler::get_customer,
        customer_handler::create_customer,
        customer_handler::update_customer,
        customer_handler::deactivate_customer,
        order_handler::list_orders,
        order_handler::create_order,
        order_handler::get_order,
        order_handler::update_status,
        order_handler::decide_approval,
        order_handler::request_discount,
        order_handler::decide_discount,
        report_handler::dashboard,
        report_handler::seller_trend,
    ),
    components(
        schemas(
            // Domain types
            SellerRole,
            SellerResponse,
            Product,
            PriceProfileKind,
            PriceItem,
            PriceProfile,
            ProfileSnapshot,
            Customer,
            LineRequest,
            OrderLine,
            OrderTotals,
            Approval,
            DiscountRequest,
            Order,
            FulfillmentStatus,
            SupplierPaymentStatus,
            CollectionStatus,
            ApprovalStatus,
            DiscountStatus,
            ApprovalDecision,
            DiscountDecision,
            DashboardStats,
            StatusCount,
            TrendGranularity,
            TrendBucket,
            SellerTrend,
            LoginResponse,
            MessageResponse,
            PaginationMeta,
            // Request bodies
            auth_handler::LoginRequest,
            auth_handler::ChangePasswordRequest,
            seller_handler::CreateSellerRequest,
            seller_handler::ResetPasswordRequest,
            product_handler::ProductRequest,
            price_profile_handler::ItemPriceRequest,
            price_profile_handler::CreatePriceProfileRequest,
            price_profile_handler::UpdatePriceProfileRequest,
            price_profile_handler::CurrentProfilesResponse,
            customer_handler::CreateCustomerRequest,
            customer_handler::UpdateCustomerRequest,
            order_handler::CreateOrderRequest,
            order_handler::UpdateStatusRequest,
            order_handler::ApprovalRequest,
            order_handler::DiscountRequestBody,
            order_handler::DiscountDecisionRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Session login, logout and password change"),
        (name = "Sellers", description = "Seller accounts (admin only)"),
        (name = "Catalog", description = "Products"),
        (name = "Price Profiles", description = "Cost and sale price profiles"),
        (name = "Customers", description = "Customer registry"),
        (name = "Orders", description = "Order lifecycle, approval and discounts"),
        (name = "Reports", description = "Dashboard and trends")
    )
)]
pub struct ApiDoc;

/// Session cookie security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Opaque session token set by /auth/login",
                ))),
            );
        }
    }
}
