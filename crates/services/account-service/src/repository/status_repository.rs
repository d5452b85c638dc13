//! Status repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use super::entities::status::{self, ActiveModel, Entity as StatusEntity};
use common::{AppError, AppResult};
use domain::{NewStatus, Status, StatusId};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Status repository trait for dependency injection.
///
/// Status names are unique; `insert` fails with `DuplicateStatus` otherwise.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Store a status if no status has the same name
    async fn insert(&self, status: NewStatus) -> AppResult<Status>;

    /// Find status by ID
    async fn find_by_id(&self, id: StatusId) -> AppResult<Option<Status>>;

    /// Find status by exact, case-sensitive name (lowest id wins)
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Status>>;

    /// List all statuses in insertion order
    async fn list(&self) -> AppResult<Vec<Status>>;
}

/// SeaORM implementation of StatusRepository
pub struct StatusStore {
    db: DatabaseConnection,
}

impl StatusStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_insert_error(err: DbErr, name: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateStatus(name.to_string()),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl StatusRepository for StatusStore {
    async fn insert(&self, status: NewStatus) -> AppResult<Status> {
        if self.find_by_name(&status.name).await?.is_some() {
            return Err(AppError::DuplicateStatus(status.name));
        }

        let name = status.name.clone();
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(status.name),
        };

        // The unique index settles a race with a concurrent insert
        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_insert_error(e, &name))?;
        Ok(Status::from(model))
    }

    async fn find_by_id(&self, id: StatusId) -> AppResult<Option<Status>> {
        let result = StatusEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Status::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Status>> {
        let result = StatusEntity::find()
            .filter(status::Column::Name.eq(name))
            .order_by_asc(status::Column::Id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Status::from))
    }

    async fn list(&self) -> AppResult<Vec<Status>> {
        let models = StatusEntity::find()
            .order_by_asc(status::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Status::from).collect())
    }
}
