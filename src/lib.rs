//! ChaFlow - back-office service for sellers
//!
//! Sellers sign in with a cookie session, keep a catalog with cost and sale
//! price profiles, register customers and take orders that an admin approves
//! before they move through fulfillment and collection.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities, pricing and status rules
//! - **services**: Application use cases
//! - **infra**: Database, migrations, repositories and Redis
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create the configured admin account
//! cargo run -- admin bootstrap
//!
//! # Delete expired sessions
//! cargo run -- sessions sweep
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Seller, SellerRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
