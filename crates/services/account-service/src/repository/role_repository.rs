//! Role repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use super::entities::role::{self, ActiveModel, Entity as RoleEntity};
use common::{AppError, AppResult};
use domain::{NewRole, Role, RoleId};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Role repository trait for dependency injection.
///
/// Roles are append-only; duplicate names are accepted.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Store a role and return it with its assigned id
    async fn insert(&self, role: NewRole) -> AppResult<Role>;

    /// Find role by ID
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Find the first-created role with exactly this name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// List all roles in insertion order
    async fn list(&self) -> AppResult<Vec<Role>>;
}

/// SeaORM implementation of RoleRepository
pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn insert(&self, role: NewRole) -> AppResult<Role> {
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(role.name),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Role::from(model))
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        let result = RoleEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Role::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let result = RoleEntity::find()
            .filter(role::Column::Name.eq(name))
            .order_by_asc(role::Column::Id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Role::from))
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        let models = RoleEntity::find()
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Role::from).collect())
    }
}
