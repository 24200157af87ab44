//! Migrate command - schema management for the ChaFlow database.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Connect without auto-running migrations; this command decides what runs
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let to_internal = |e: sea_orm::DbErr| AppError::internal(e.to_string());

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(to_internal)?;
            tracing::info!(env = %config.app_env, "Schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(to_internal)?;
            tracing::info!(env = %config.app_env, "Rolled back the newest migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(to_internal)?;
            print!("{}", status_report(&status));
        }
        MigrateAction::Fresh => {
            ensure_fresh_allowed(config.is_production())?;
            tracing::warn!(
                env = %config.app_env,
                "Dropping sellers, sessions, catalog, customers and orders"
            );
            db.fresh_migrations().await.map_err(to_internal)?;
            tracing::info!("Schema rebuilt from scratch");
        }
    }

    Ok(())
}

/// Rebuilding the schema wipes every order, so production refuses it.
fn ensure_fresh_allowed(is_production: bool) -> AppResult<()> {
    if is_production {
        return Err(AppError::validation(
            "migrate fresh is disabled in production",
        ));
    }
    Ok(())
}

/// One `name: applied|pending` line per migration and a pending count.
fn status_report(status: &[(String, bool)]) -> String {
    let mut report = String::new();
    for (name, applied) in status {
        let state = if *applied { "applied" } else { "pending" };
        report.push_str(&format!("{}: {}\n", name, state));
    }
    let pending = status.iter().filter(|(_, applied)| !applied).count();
    report.push_str(&format!("{} of {} pending\n", pending, status.len()));
    report
}
