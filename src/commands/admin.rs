//! Admin command - Account bootstrap.

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::{AdminBootstrap, Config};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{SellerService, ServiceContainer, Services};

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    match args.action {
        AdminAction::Bootstrap => {
            let bootstrap = config.admin_bootstrap.clone().ok_or_else(|| {
                AppError::validation("ADMIN_USERNAME and ADMIN_PASSWORD must be set")
            })?;

            let db = Database::connect(&config).await?;
            let services = Services::from_connection(db.get_connection());
            bootstrap_admin(services.sellers().as_ref(), &bootstrap).await
        }
    }
}

/// Create the configured admin unless it already exists.
pub async fn bootstrap_admin(
    sellers: &dyn SellerService,
    bootstrap: &AdminBootstrap,
) -> AppResult<()> {
    match sellers
        .bootstrap_admin(
            bootstrap.username.clone(),
            bootstrap.password().to_string(),
            bootstrap.display_name.clone(),
        )
        .await?
    {
        Some(seller) => println!("Created admin '{}'", seller.username),
        None => println!("Admin '{}' already exists", bootstrap.username),
    }
    Ok(())
}
