//! In-memory implementation of the repositories.
//!
//! All tables sit behind one `RwLock`; every write performs its uniqueness
//! checks and its insert under the same write guard, which gives the same
//! insert-if-unique guarantee the database provides through unique indexes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::{
    AccountStatus, NewRole, NewStatus, NewUser, PointsChange, ReferralCredit, Role, RoleId,
    Status, StatusId, User, UserId, UserUpdate,
};

use super::{RoleRepository, StatusRepository, UserRepository};

#[derive(Default)]
struct Tables {
    roles: Vec<Role>,
    statuses: Vec<Status>,
    users: Vec<User>,
    next_role_id: RoleId,
    next_status_id: StatusId,
    next_user_id: UserId,
}

impl Tables {
    fn user_index(&self, id: UserId) -> AppResult<usize> {
        self.users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::not_found(format!("User {}", id)))
    }

    fn check_unique(&self, user: &NewUser) -> AppResult<()> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail(user.email.clone()));
        }
        if self.users.iter().any(|u| u.national_id == user.national_id) {
            return Err(AppError::DuplicateNationalId(user.national_id.clone()));
        }
        if self
            .users
            .iter()
            .any(|u| u.referral_code == user.referral_code)
        {
            return Err(AppError::DuplicateReferralCode(user.referral_code.clone()));
        }
        Ok(())
    }
}

/// Thread-safe in-memory store backing all three repositories.
///
/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn insert(&self, role: NewRole) -> AppResult<Role> {
        let mut tables = self.tables.write().await;
        tables.next_role_id += 1;
        let role = Role {
            id: tables.next_role_id,
            name: role.name,
        };
        tables.roles.push(role.clone());
        Ok(role)
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        Ok(self.tables.read().await.roles.clone())
    }
}

#[async_trait]
impl StatusRepository for InMemoryStore {
    async fn insert(&self, status: NewStatus) -> AppResult<Status> {
        let mut tables = self.tables.write().await;
        if tables.statuses.iter().any(|s| s.name == status.name) {
            return Err(AppError::DuplicateStatus(status.name));
        }
        tables.next_status_id += 1;
        let status = Status {
            id: tables.next_status_id,
            name: status.name,
        };
        tables.statuses.push(status.clone());
        Ok(status)
    }

    async fn find_by_id(&self, id: StatusId) -> AppResult<Option<Status>> {
        let tables = self.tables.read().await;
        Ok(tables.statuses.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Status>> {
        let tables = self.tables.read().await;
        Ok(tables.statuses.iter().find(|s| s.name == name).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Status>> {
        Ok(self.tables.read().await.statuses.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_national_id(&self, national_id: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.national_id == national_id)
            .cloned())
    }

    async fn find_by_referral_code(&self, code: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.referral_code == code)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.role_id == Some(role_id))
            .cloned()
            .collect())
    }

    async fn list_loyalty_members(&self) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.loyalty_flag)
            .cloned()
            .collect())
    }

    async fn insert(&self, user: NewUser, referral: Option<ReferralCredit>) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        tables.check_unique(&user)?;

        // Compute the referrer's new state before touching anything
        let credited = match referral {
            Some(credit) => {
                let idx = tables.user_index(credit.referrer_id)?;
                let mut referrer = tables.users[idx].clone();
                referrer.apply_points(PointsChange::Credit(credit.points))?;
                Some((idx, referrer))
            }
            None => None,
        };

        tables.next_user_id += 1;
        let user = user.with_id(tables.next_user_id);
        tables.users.push(user.clone());

        if let Some((idx, referrer)) = credited {
            tables.users[idx] = referrer;
        }

        Ok(user)
    }

    async fn update_profile(&self, id: UserId, update: UserUpdate) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let idx = tables.user_index(id)?;

        let mut user = tables.users[idx].clone();
        if user.apply_update(update)
            && tables
                .users
                .iter()
                .any(|u| u.id != id && u.email == user.email)
        {
            return Err(AppError::DuplicateEmail(user.email));
        }

        tables.users[idx] = user.clone();
        Ok(user)
    }

    async fn set_role(&self, id: UserId, role_id: RoleId) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let idx = tables.user_index(id)?;
        let stored = &mut tables.users[idx];
        stored.assign_role(role_id);
        Ok(stored.clone())
    }

    async fn change_status(&self, id: UserId, target: AccountStatus) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let idx = tables.user_index(id)?;
        let stored = &mut tables.users[idx];
        stored.change_status(target)?;
        Ok(stored.clone())
    }

    async fn adjust_points(&self, id: UserId, change: PointsChange) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let idx = tables.user_index(id)?;
        let stored = &mut tables.users[idx];
        stored.apply_points(change)?;
        Ok(stored.clone())
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.id == id))
    }
}
