//! Account directory - registration, lookup and account lifecycle.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use common::{AppError, AppResult, OptionExt};
use domain::{
    generate_referral_code, Account, AccountStatus, PointsChange, ReferralCredit, RoleId, User,
    UserDraft, UserId, UserUpdate, DEFAULT_ROLE_NAME, MAX_REFERRAL_CODE_ATTEMPTS,
};

use crate::repository::{RoleRepository, StatusRepository, UserRepository};

/// Account directory trait for dependency injection.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Validate and store a new account.
    ///
    /// Fails with `Validation`, `DuplicateEmail`, `DuplicateNationalId`,
    /// `DuplicateReferralCode`, `UnknownRole` or `UnknownReferralCode`;
    /// nothing is stored on failure.
    async fn register(&self, draft: UserDraft) -> AppResult<User>;

    /// List every account
    async fn list_all(&self) -> AppResult<Vec<User>>;

    async fn get_by_id(&self, id: UserId) -> AppResult<User>;

    async fn get_by_email(&self, email: &str) -> AppResult<User>;

    async fn get_by_national_id(&self, national_id: &str) -> AppResult<User>;

    async fn get_by_referral_code(&self, code: &str) -> AppResult<User>;

    /// User with its role and status records resolved
    async fn get_account(&self, id: UserId) -> AppResult<Account>;

    /// Accounts holding a role; the role must exist
    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<User>>;

    /// Accounts carrying the institutional loyalty flag
    async fn list_loyalty_members(&self) -> AppResult<Vec<User>>;

    async fn exists(&self, id: UserId) -> AppResult<bool>;

    /// Update names, phone and email
    async fn update_profile(&self, id: UserId, update: UserUpdate) -> AppResult<User>;

    async fn change_role(&self, id: UserId, role_id: RoleId) -> AppResult<User>;

    /// Move the account through its lifecycle
    async fn change_status(&self, id: UserId, status: AccountStatus) -> AppResult<User>;

    async fn credit_points(&self, id: UserId, points: u32) -> AppResult<User>;

    /// Fails with `InsufficientPoints` if the balance would go negative
    async fn redeem_points(&self, id: UserId, points: u32) -> AppResult<User>;
}

/// Concrete implementation of AccountDirectory using repositories.
pub struct AccountManager {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    statuses: Arc<dyn StatusRepository>,
}

impl AccountManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        statuses: Arc<dyn StatusRepository>,
    ) -> Self {
        Self {
            users,
            roles,
            statuses,
        }
    }

    async fn load(&self, id: UserId) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_not_found(|| format!("User {}", id))
    }

    /// Resolve the requested role, or the default role when none is given
    async fn resolve_role(&self, role_id: Option<RoleId>) -> AppResult<Option<RoleId>> {
        match role_id {
            Some(id) => {
                let role = self
                    .roles
                    .find_by_id(id)
                    .await?
                    .ok_or(AppError::UnknownRole(id))?;
                Ok(Some(role.id))
            }
            None => Ok(self
                .roles
                .find_by_name(DEFAULT_ROLE_NAME)
                .await?
                .map(|role| role.id)),
        }
    }

    async fn resolve_referrer(&self, code: Option<&str>) -> AppResult<Option<ReferralCredit>> {
        let Some(code) = code else {
            return Ok(None);
        };

        let referrer = self
            .users
            .find_by_referral_code(code)
            .await?
            .ok_or_else(|| AppError::UnknownReferralCode(code.to_string()))?;
        Ok(Some(ReferralCredit::reward(referrer.id)))
    }

    async fn claim_referral_code(&self, requested: Option<String>) -> AppResult<String> {
        if let Some(code) = requested {
            if self.users.find_by_referral_code(&code).await?.is_some() {
                return Err(AppError::DuplicateReferralCode(code));
            }
            return Ok(code);
        }

        for _ in 0..MAX_REFERRAL_CODE_ATTEMPTS {
            let code = {
                let mut rng = rand::thread_rng();
                generate_referral_code(&mut rng)
            };
            if self.users.find_by_referral_code(&code).await?.is_none() {
                return Ok(code);
            }
        }

        Err(AppError::internal(format!(
            "No unused referral code after {} attempts",
            MAX_REFERRAL_CODE_ATTEMPTS
        )))
    }
}

#[async_trait]
impl AccountDirectory for AccountManager {
    async fn register(&self, mut draft: UserDraft) -> AppResult<User> {
        info!(email = %draft.email, "Registering account");

        draft.check(Utc::now().date_naive())?;

        if self.users.find_by_email(&draft.email).await?.is_some() {
            warn!(email = %draft.email, "Registration rejected: email taken");
            return Err(AppError::DuplicateEmail(draft.email));
        }
        if self
            .users
            .find_by_national_id(&draft.national_id)
            .await?
            .is_some()
        {
            warn!(email = %draft.email, "Registration rejected: national id taken");
            return Err(AppError::DuplicateNationalId(draft.national_id));
        }

        let role_id = self.resolve_role(draft.role_id).await?;
        let referral = self.resolve_referrer(draft.referred_by.as_deref()).await?;
        let referral_code = self.claim_referral_code(draft.referral_code.take()).await?;

        // The store re-checks uniqueness atomically with the insert
        let new_user = draft.into_new_user(referral_code, role_id, Utc::now());
        let user = self.users.insert(new_user, referral).await?;

        info!(
            user_id = user.id,
            loyalty_flag = user.loyalty_flag,
            referred = referral.is_some(),
            "Account registered"
        );
        Ok(user)
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        debug!("Listing accounts");
        self.users.list().await
    }

    async fn get_by_id(&self, id: UserId) -> AppResult<User> {
        debug!(user_id = id, "Fetching account");
        self.load(id).await
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        debug!(email, "Fetching account by email");
        self.users
            .find_by_email(email)
            .await?
            .ok_or_not_found(|| format!("User with email {}", email))
    }

    async fn get_by_national_id(&self, national_id: &str) -> AppResult<User> {
        debug!(national_id, "Fetching account by national id");
        self.users
            .find_by_national_id(national_id)
            .await?
            .ok_or_not_found(|| format!("User with national id {}", national_id))
    }

    async fn get_by_referral_code(&self, code: &str) -> AppResult<User> {
        debug!(code, "Fetching account by referral code");
        self.users
            .find_by_referral_code(code)
            .await?
            .ok_or_not_found(|| format!("User with referral code {}", code))
    }

    async fn get_account(&self, id: UserId) -> AppResult<Account> {
        let user = self.load(id).await?;

        let role = match user.role_id {
            Some(role_id) => {
                let role = self.roles.find_by_id(role_id).await?;
                if role.is_none() {
                    warn!(user_id = id, role_id, "Account references a missing role");
                }
                role
            }
            None => None,
        };

        let status = self.statuses.find_by_name(user.status.name()).await?;
        if status.is_none() {
            warn!(user_id = id, status = %user.status, "Account status missing from registry");
        }

        Ok(Account { user, role, status })
    }

    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<User>> {
        debug!(role_id, "Listing accounts by role");
        if self.roles.find_by_id(role_id).await?.is_none() {
            return Err(AppError::UnknownRole(role_id));
        }
        self.users.list_by_role(role_id).await
    }

    async fn list_loyalty_members(&self) -> AppResult<Vec<User>> {
        debug!("Listing loyalty members");
        self.users.list_loyalty_members().await
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        self.users.exists(id).await
    }

    async fn update_profile(&self, id: UserId, update: UserUpdate) -> AppResult<User> {
        info!(user_id = id, "Updating account profile");
        update.check()?;

        let user = self.users.update_profile(id, update).await?;
        info!(user_id = id, "Account profile updated");
        Ok(user)
    }

    async fn change_role(&self, id: UserId, role_id: RoleId) -> AppResult<User> {
        info!(user_id = id, role_id, "Changing account role");

        if self.roles.find_by_id(role_id).await?.is_none() {
            return Err(AppError::UnknownRole(role_id));
        }
        self.users.set_role(id, role_id).await
    }

    async fn change_status(&self, id: UserId, status: AccountStatus) -> AppResult<User> {
        info!(user_id = id, status = %status, "Changing account status");

        let user = self.users.change_status(id, status).await?;
        info!(user_id = id, status = %user.status, "Account status changed");
        Ok(user)
    }

    async fn credit_points(&self, id: UserId, points: u32) -> AppResult<User> {
        info!(user_id = id, points, "Crediting loyalty points");
        let user = self
            .users
            .adjust_points(id, PointsChange::Credit(points))
            .await?;
        info!(user_id = id, balance = user.loyalty_points, "Points credited");
        Ok(user)
    }

    async fn redeem_points(&self, id: UserId, points: u32) -> AppResult<User> {
        info!(user_id = id, points, "Redeeming loyalty points");
        let user = self
            .users
            .adjust_points(id, PointsChange::Redeem(points))
            .await?;
        info!(user_id = id, balance = user.loyalty_points, "Points redeemed");
        Ok(user)
    }
}
