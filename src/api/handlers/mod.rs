//! HTTP request handlers.

pub mod auth_handler;
pub mod customer_handler;
pub mod order_handler;
pub mod price_profile_handler;
pub mod product_handler;
pub mod report_handler;
pub mod seller_handler;

pub use auth_handler::{account_routes, auth_routes};
pub use customer_handler::customer_routes;
pub use order_handler::order_routes;
pub use price_profile_handler::price_profile_routes;
pub use product_handler::product_routes;
pub use report_handler::report_routes;
pub use seller_handler::seller_routes;
