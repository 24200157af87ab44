//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{admin_middleware, require_admin, session_middleware, unauthenticated_response};
pub use rate_limit::{client_ip, rate_limit_auth_middleware, rate_limit_middleware};
