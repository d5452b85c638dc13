//! Master data seeding.
//!
//! Populates the role and status registries, each only when empty, so ids
//! follow `SEED_ROLES` and `SEED_STATUSES` order on a fresh database.

use tracing::info;

use common::AppResult;
use domain::{SEED_ROLES, SEED_STATUSES};

use crate::service::{RoleRegistry, StatusRegistry};

/// Records created by a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: usize,
    pub statuses_created: usize,
}

/// Seed roles and statuses into empty registries.
pub async fn seed_master_data(
    roles: &dyn RoleRegistry,
    statuses: &dyn StatusRegistry,
) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    let existing = roles.list_all().await?;
    if existing.is_empty() {
        for name in SEED_ROLES {
            roles.create(name.to_string()).await?;
            report.roles_created += 1;
        }
        info!(count = report.roles_created, "Roles seeded");
    } else {
        info!(count = existing.len(), "Roles already present, skipping");
    }

    let existing = statuses.list_all().await?;
    if existing.is_empty() {
        for name in SEED_STATUSES {
            statuses.create(name.to_string()).await?;
            report.statuses_created += 1;
        }
        info!(count = report.statuses_created, "Statuses seeded");
    } else {
        info!(count = existing.len(), "Statuses already present, skipping");
    }

    Ok(report)
}
