//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use super::entities::user::{
    self, new_active_model, points_column, ActiveModel, Entity as UserEntity,
};
use super::transaction::in_transaction;
use common::{AppError, AppResult};
use domain::{
    AccountStatus, NewUser, PointsChange, ReferralCredit, RoleId, User, UserId, UserUpdate,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unique index on `users.email`
pub const EMAIL_UNIQUE_INDEX: &str = "uq_users_email";
/// Unique index on `users.national_id`
pub const NATIONAL_ID_UNIQUE_INDEX: &str = "uq_users_national_id";
/// Unique index on `users.referral_code`
pub const REFERRAL_CODE_UNIQUE_INDEX: &str = "uq_users_referral_code";

/// User repository trait for dependency injection.
///
/// Writes are atomic with their uniqueness checks: two concurrent inserts
/// sharing an email, national id or referral code cannot both succeed.
/// Mutations act on the stored row and write only their own columns.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find user by email address (exact match)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by national id (exact match)
    async fn find_by_national_id(&self, national_id: &str) -> AppResult<Option<User>>;

    /// Find user by referral code (exact match)
    async fn find_by_referral_code(&self, code: &str) -> AppResult<Option<User>>;

    /// List all users in insertion order
    async fn list(&self) -> AppResult<Vec<User>>;

    /// List users holding a role
    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<User>>;

    /// List users carrying the loyalty flag
    async fn list_loyalty_members(&self) -> AppResult<Vec<User>>;

    /// Insert a user if email, national id and referral code are all unused.
    ///
    /// A referral credit, if any, is applied to the referrer in the same
    /// unit of work; either both writes land or neither does.
    async fn insert(&self, user: NewUser, referral: Option<ReferralCredit>) -> AppResult<User>;

    /// Apply a profile update to the stored row.
    ///
    /// A changed email is re-checked for uniqueness against every other
    /// user and the loyalty flag is recomputed.
    async fn update_profile(&self, id: UserId, update: UserUpdate) -> AppResult<User>;

    /// Set the role of a user (existence of the role is the caller's concern)
    async fn set_role(&self, id: UserId, role_id: RoleId) -> AppResult<User>;

    /// Move a user to `target`, checked against the stored status
    async fn change_status(&self, id: UserId, target: AccountStatus) -> AppResult<User>;

    /// Apply a points change atomically with reading the current balance
    async fn adjust_points(&self, id: UserId, change: PointsChange) -> AppResult<User>;

    /// Check whether a user exists
    async fn exists(&self, id: UserId) -> AppResult<bool>;
}

/// SeaORM implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(models: Vec<user::Model>) -> AppResult<Vec<User>> {
    models
        .into_iter()
        .map(|m| User::try_from(m).map_err(AppError::from))
        .collect()
}

fn to_domain_one(model: Option<user::Model>) -> AppResult<Option<User>> {
    model.map(User::try_from).transpose().map_err(AppError::from)
}

/// Translate a unique-index violation into the matching duplicate error
fn map_write_error(err: DbErr, email: &str, national_id: &str, referral_code: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            if msg.contains(EMAIL_UNIQUE_INDEX) {
                AppError::DuplicateEmail(email.to_string())
            } else if msg.contains(NATIONAL_ID_UNIQUE_INDEX) {
                AppError::DuplicateNationalId(national_id.to_string())
            } else if msg.contains(REFERRAL_CODE_UNIQUE_INDEX) {
                AppError::DuplicateReferralCode(referral_code.to_string())
            } else {
                AppError::from(err)
            }
        }
        _ => AppError::from(err),
    }
}

/// Report the first natural key of the candidate already taken by another user
async fn find_conflict<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    national_id: &str,
    referral_code: &str,
) -> AppResult<Option<AppError>> {
    let taken = UserEntity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(email))
                .add(user::Column::NationalId.eq(national_id))
                .add(user::Column::ReferralCode.eq(referral_code)),
        )
        .all(conn)
        .await
        .map_err(AppError::from)?;

    let conflict = if taken.iter().any(|m| m.email == email) {
        Some(AppError::DuplicateEmail(email.to_string()))
    } else if taken.iter().any(|m| m.national_id == national_id) {
        Some(AppError::DuplicateNationalId(national_id.to_string()))
    } else if taken.iter().any(|m| m.referral_code == referral_code) {
        Some(AppError::DuplicateReferralCode(referral_code.to_string()))
    } else {
        None
    };

    Ok(conflict)
}

/// Load a user row under an exclusive row lock
async fn lock_user(txn: &DatabaseTransaction, id: UserId) -> AppResult<user::Model> {
    UserEntity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("User {}", id)))
}

async fn write_points(
    txn: &DatabaseTransaction,
    model: user::Model,
    change: PointsChange,
) -> AppResult<User> {
    let mut user = User::try_from(model.clone())?;
    user.apply_points(change)?;

    let mut active: ActiveModel = model.into();
    active.loyalty_points = Set(points_column(user.loyalty_points)?);
    active.updated_at = Set(user.updated_at);

    let model = active.update(txn).await.map_err(AppError::from)?;
    Ok(User::try_from(model)?)
}

async fn insert_user(
    txn: &DatabaseTransaction,
    user: NewUser,
    referral: Option<ReferralCredit>,
) -> AppResult<User> {
    if let Some(conflict) =
        find_conflict(txn, &user.email, &user.national_id, &user.referral_code).await?
    {
        return Err(conflict);
    }

    if let Some(credit) = referral {
        let referrer = lock_user(txn, credit.referrer_id).await?;
        write_points(txn, referrer, PointsChange::Credit(credit.points)).await?;
    }

    let email = user.email.clone();
    let national_id = user.national_id.clone();
    let referral_code = user.referral_code.clone();

    let model = new_active_model(user)?
        .insert(txn)
        .await
        .map_err(|e| map_write_error(e, &email, &national_id, &referral_code))?;

    Ok(User::try_from(model)?)
}

async fn update_profile_row(
    txn: &DatabaseTransaction,
    id: UserId,
    update: UserUpdate,
) -> AppResult<User> {
    let existing = lock_user(txn, id).await?;
    let national_id = existing.national_id.clone();
    let referral_code = existing.referral_code.clone();

    let mut user = User::try_from(existing.clone())?;
    if user.apply_update(update) {
        let clash = UserEntity::find()
            .filter(user::Column::Email.eq(user.email.as_str()))
            .filter(user::Column::Id.ne(id))
            .one(txn)
            .await
            .map_err(AppError::from)?;
        if clash.is_some() {
            return Err(AppError::DuplicateEmail(user.email));
        }
    }

    let mut active: ActiveModel = existing.into();
    active.first_name = Set(user.first_name);
    active.middle_name = Set(user.middle_name);
    active.last_name = Set(user.last_name);
    active.email = Set(user.email.clone());
    active.phone = Set(user.phone);
    active.loyalty_flag = Set(user.loyalty_flag);
    active.updated_at = Set(user.updated_at);

    let model = active
        .update(txn)
        .await
        .map_err(|e| map_write_error(e, &user.email, &national_id, &referral_code))?;
    Ok(User::try_from(model)?)
}

async fn set_role_row(txn: &DatabaseTransaction, id: UserId, role_id: RoleId) -> AppResult<User> {
    let existing = lock_user(txn, id).await?;
    let mut user = User::try_from(existing.clone())?;
    user.assign_role(role_id);

    let mut active: ActiveModel = existing.into();
    active.role_id = Set(user.role_id);
    active.updated_at = Set(user.updated_at);

    let model = active.update(txn).await.map_err(AppError::from)?;
    Ok(User::try_from(model)?)
}

async fn change_status_row(
    txn: &DatabaseTransaction,
    id: UserId,
    target: AccountStatus,
) -> AppResult<User> {
    let existing = lock_user(txn, id).await?;
    let mut user = User::try_from(existing.clone())?;
    user.change_status(target)?;

    let mut active: ActiveModel = existing.into();
    active.status = Set(user.status.to_string());
    active.updated_at = Set(user.updated_at);

    let model = active.update(txn).await.map_err(AppError::from)?;
    Ok(User::try_from(model)?)
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain_one(result)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain_one(result)
    }

    async fn find_by_national_id(&self, national_id: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::NationalId.eq(national_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain_one(result)
    }

    async fn find_by_referral_code(&self, code: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::ReferralCode.eq(code))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain_one(result)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain(models)
    }

    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::RoleId.eq(role_id))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain(models)
    }

    async fn list_loyalty_members(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::LoyaltyFlag.eq(true))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        to_domain(models)
    }

    async fn insert(&self, user: NewUser, referral: Option<ReferralCredit>) -> AppResult<User> {
        in_transaction(&self.db, move |txn| {
            Box::pin(insert_user(txn, user, referral))
        })
        .await
    }

    async fn update_profile(&self, id: UserId, update: UserUpdate) -> AppResult<User> {
        in_transaction(&self.db, move |txn| {
            Box::pin(update_profile_row(txn, id, update))
        })
        .await
    }

    async fn set_role(&self, id: UserId, role_id: RoleId) -> AppResult<User> {
        in_transaction(&self.db, move |txn| Box::pin(set_role_row(txn, id, role_id))).await
    }

    async fn change_status(&self, id: UserId, target: AccountStatus) -> AppResult<User> {
        in_transaction(&self.db, move |txn| {
            Box::pin(change_status_row(txn, id, target))
        })
        .await
    }

    async fn adjust_points(&self, id: UserId, change: PointsChange) -> AppResult<User> {
        in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let model = lock_user(txn, id).await?;
                write_points(txn, model, change).await
            })
        })
        .await
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}
