//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::commands::{admin::bootstrap_admin, sessions::spawn_sweeper};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::services::{ServiceContainer, Services};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Pool is created once here and shared through AppState
    let db = Arc::new(Database::connect(&config).await?);
    let cache = Arc::new(Cache::connect(&config).await?);

    let services = Services::from_connection(db.get_connection());

    if let Some(bootstrap) = &config.admin_bootstrap {
        bootstrap_admin(services.sellers().as_ref(), bootstrap).await?;
    }

    spawn_sweeper(
        services.sessions(),
        Duration::from_secs(config.session_sweep_interval_seconds),
    );

    let app_state = AppState::with_services(&services, db, cache, config.is_production());
    let app = create_router(app_state);

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
