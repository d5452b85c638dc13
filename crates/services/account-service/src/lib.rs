//! Account Service Library
//!
//! Identity management for the rental platform: the role and status
//! registries and the account directory, over an injected storage layer.
//! The SeaORM stores back production use; the in-memory store backs tests
//! and embedding.

pub mod config;
pub mod infra;
pub mod repository;
pub mod seed;
pub mod service;

use tracing::info;

use common::{AppError, AppResult};

use crate::config::AccountServiceConfig;
use crate::infra::Database;
use crate::seed::{seed_master_data, SeedReport};
use crate::service::Services;

pub use crate::repository::InMemoryStore;
pub use crate::service::{AccountDirectory, RoleRegistry, StatusRegistry};

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run migrations (for CLI commands).
///
/// Returns each known migration with its applied flag for `Status`,
/// an empty list otherwise.
pub async fn run_migrations(
    action: MigrateAction,
    config: &AccountServiceConfig,
) -> AppResult<Vec<(String, bool)>> {
    let db = Database::connect(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
            if config.seed_on_startup {
                seed(&db).await?;
            }
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            return db.migration_status().await.map_err(AppError::from);
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(Vec::new())
}

/// Populate roles and statuses when their tables are empty.
pub async fn run_seed(config: &AccountServiceConfig) -> AppResult<SeedReport> {
    let db = Database::connect(&config.database).await?;
    seed(&db).await
}

async fn seed(db: &Database) -> AppResult<SeedReport> {
    let services = Services::from_connection(db.get_connection());
    seed_master_data(services.roles().as_ref(), services.statuses().as_ref()).await
}
