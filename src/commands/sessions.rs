//! Sessions command - Expired session cleanup.

use std::sync::Arc;
use std::time::Duration;

use crate::cli::args::{SessionsAction, SessionsArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{ServiceContainer, Services, SessionManager};

/// Execute the sessions command
pub async fn execute(args: SessionsArgs, config: Config) -> AppResult<()> {
    match args.action {
        SessionsAction::Sweep => {
            let db = Database::connect(&config).await?;
            let services = Services::from_connection(db.get_connection());
            let removed = services.sessions().sweep_expired().await?;
            println!("Removed {} expired session(s)", removed);
            Ok(())
        }
    }
}

/// Periodically delete expired sessions until the runtime shuts down.
pub fn spawn_sweeper(sessions: Arc<dyn SessionManager>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match sessions.sweep_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Swept expired sessions"),
                Err(e) => tracing::warn!("Session sweep failed: {}", e),
            }
        }
    });
}
