//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use domain::{DomainError, NewUser, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub birth_date: Date,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub national_id: String,
    pub phone: String,
    pub loyalty_flag: bool,
    pub password_hash: String,
    /// CHECK (loyalty_points >= 0)
    pub loyalty_points: i32,
    #[sea_orm(unique)]
    pub referral_code: String,
    pub role_id: Option<i64>,
    /// Account status name, one of the status registry names
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for User {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let loyalty_points = u32::try_from(model.loyalty_points).map_err(|_| {
            DomainError::internal(format!(
                "User {} has a negative points balance",
                model.id
            ))
        })?;

        Ok(User {
            id: model.id,
            first_name: model.first_name,
            middle_name: model.middle_name,
            last_name: model.last_name,
            birth_date: model.birth_date,
            email: model.email,
            national_id: model.national_id,
            phone: model.phone,
            loyalty_flag: model.loyalty_flag,
            password_hash: model.password_hash,
            loyalty_points,
            referral_code: model.referral_code,
            role_id: model.role_id,
            status: model.status.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Points balance as stored in the database column
pub fn points_column(points: u32) -> Result<i32, DomainError> {
    i32::try_from(points)
        .map_err(|_| DomainError::validation("Loyalty points balance exceeds storage range"))
}

/// Build an insertable model; the id is assigned by the database
pub fn new_active_model(user: NewUser) -> Result<ActiveModel, DomainError> {
    Ok(ActiveModel {
        id: NotSet,
        first_name: Set(user.first_name),
        middle_name: Set(user.middle_name),
        last_name: Set(user.last_name),
        birth_date: Set(user.birth_date),
        email: Set(user.email),
        national_id: Set(user.national_id),
        phone: Set(user.phone),
        loyalty_flag: Set(user.loyalty_flag),
        password_hash: Set(user.password_hash),
        loyalty_points: Set(points_column(user.loyalty_points)?),
        referral_code: Set(user.referral_code),
        role_id: Set(user.role_id),
        status: Set(user.status.to_string()),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    })
}
