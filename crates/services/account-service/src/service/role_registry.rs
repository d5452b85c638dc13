//! Role registry - the finite set of roles a user may hold.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use common::{AppResult, OptionExt};
use domain::{NewRole, Role, RoleId};

use crate::repository::RoleRepository;

/// Role registry trait for dependency injection.
#[async_trait]
pub trait RoleRegistry: Send + Sync {
    /// Register a role. Duplicate names are accepted.
    async fn create(&self, name: String) -> AppResult<Role>;

    /// List all roles in insertion order
    async fn list_all(&self) -> AppResult<Vec<Role>>;

    /// Get role by ID
    async fn get_by_id(&self, id: RoleId) -> AppResult<Role>;

    /// Get the first-created role with this exact name
    async fn get_by_name(&self, name: &str) -> AppResult<Role>;
}

/// Concrete implementation of RoleRegistry using repository.
pub struct RoleManager {
    repo: Arc<dyn RoleRepository>,
}

impl RoleManager {
    pub fn new(repo: Arc<dyn RoleRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl RoleRegistry for RoleManager {
    async fn create(&self, name: String) -> AppResult<Role> {
        let role = NewRole::new(name);
        role.check()?;

        let role = self.repo.insert(role).await?;
        info!(role_id = role.id, name = %role.name, "Role created");
        Ok(role)
    }

    async fn list_all(&self) -> AppResult<Vec<Role>> {
        debug!("Listing roles");
        self.repo.list().await
    }

    async fn get_by_id(&self, id: RoleId) -> AppResult<Role> {
        debug!(role_id = id, "Fetching role");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_not_found(|| format!("Role {}", id))
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Role> {
        debug!(name = %name, "Fetching role by name");
        self.repo
            .find_by_name(name)
            .await?
            .ok_or_not_found(|| format!("Role {}", name))
    }
}
