//! `migrate` command: apply, revert, inspect or rebuild the schema.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(migration_error)?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(migration_error)?;
            tracing::info!("Reverted the latest migration");
        }
        MigrateAction::Status => {
            let states = db.migration_status().await.map_err(migration_error)?;
            let pending = states.iter().filter(|m| !m.applied).count();

            for state in &states {
                let mark = if state.applied { "applied" } else { "pending" };
                println!("{:<8} {}", mark, state.name);
            }
            println!("{} of {} migrations pending", pending, states.len());
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all posyandu tables and rebuilding the schema");
            db.fresh_migrations().await.map_err(migration_error)?;
            tracing::info!("Schema rebuilt from scratch");
        }
    }

    Ok(())
}

fn migration_error(e: sea_orm::DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", e))
}
