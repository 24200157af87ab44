//! HTTP surface of ChaFlow.
//!
//! Public routes are login, logout, health and the Swagger UI. Everything
//! else sits behind the session cookie, with seller management and catalog
//! writes further restricted to admins. Handlers translate JSON to service
//! calls and never touch repositories directly.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
