//! Status registry - the named account statuses.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use common::{AppResult, OptionExt};
use domain::{NewStatus, Status, StatusId};

use crate::repository::StatusRepository;

/// Status registry trait for dependency injection.
#[async_trait]
pub trait StatusRegistry: Send + Sync {
    /// Register a status. Fails with `DuplicateStatus` if the name is taken.
    async fn create(&self, name: String) -> AppResult<Status>;

    /// List all statuses in insertion order
    async fn list_all(&self) -> AppResult<Vec<Status>>;

    /// Get status by ID
    async fn get_by_id(&self, id: StatusId) -> AppResult<Status>;

    /// Get status by exact, case-sensitive name
    async fn get_by_name(&self, name: &str) -> AppResult<Status>;
}

/// Concrete implementation of StatusRegistry using repository.
pub struct StatusManager {
    repo: Arc<dyn StatusRepository>,
}

impl StatusManager {
    pub fn new(repo: Arc<dyn StatusRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl StatusRegistry for StatusManager {
    async fn create(&self, name: String) -> AppResult<Status> {
        let status = NewStatus::new(name);
        status.check()?;

        let status = self.repo.insert(status).await?;
        info!(status_id = status.id, name = %status.name, "Status created");
        Ok(status)
    }

    async fn list_all(&self) -> AppResult<Vec<Status>> {
        debug!("Listing statuses");
        self.repo.list().await
    }

    async fn get_by_id(&self, id: StatusId) -> AppResult<Status> {
        debug!(status_id = id, "Fetching status");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_not_found(|| format!("Status {}", id))
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Status> {
        debug!(name = %name, "Fetching status by name");
        self.repo
            .find_by_name(name)
            .await?
            .ok_or_not_found(|| format!("Status {}", name))
    }
}
