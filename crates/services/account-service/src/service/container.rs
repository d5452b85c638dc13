//! Service container - wires repositories into the account services.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AccountDirectory, AccountManager, RoleManager, RoleRegistry, StatusManager, StatusRegistry,
};
use crate::repository::{
    InMemoryStore, RoleRepository, RoleStore, StatusRepository, StatusStore, UserRepository,
    UserStore,
};

/// Centralized access to the registries and the account directory.
#[derive(Clone)]
pub struct Services {
    roles: Arc<dyn RoleRegistry>,
    statuses: Arc<dyn StatusRegistry>,
    accounts: Arc<dyn AccountDirectory>,
}

impl Services {
    /// Build services over explicit repositories
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        statuses: Arc<dyn StatusRepository>,
    ) -> Self {
        Self {
            roles: Arc::new(RoleManager::new(roles.clone())),
            statuses: Arc::new(StatusManager::new(statuses.clone())),
            accounts: Arc::new(AccountManager::new(users, roles, statuses)),
        }
    }

    /// Build services over the SeaORM stores
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self::new(
            Arc::new(UserStore::new(db.clone())),
            Arc::new(RoleStore::new(db.clone())),
            Arc::new(StatusStore::new(db)),
        )
    }

    /// Build services over one shared in-memory store
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store)
    }

    pub fn roles(&self) -> Arc<dyn RoleRegistry> {
        self.roles.clone()
    }

    pub fn statuses(&self) -> Arc<dyn StatusRegistry> {
        self.statuses.clone()
    }

    pub fn accounts(&self) -> Arc<dyn AccountDirectory> {
        self.accounts.clone()
    }
}
