//! Migration: Create users table.

use sea_orm_migration::prelude::*;

use crate::repository::{EMAIL_UNIQUE_INDEX, NATIONAL_ID_UNIQUE_INDEX, REFERRAL_CODE_UNIQUE_INDEX};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string_len(60).not_null())
                    .col(ColumnDef::new(Users::MiddleName).string_len(60).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(60).not_null())
                    .col(ColumnDef::new(Users::BirthDate).date().not_null())
                    .col(ColumnDef::new(Users::Email).string_len(200).not_null())
                    .col(ColumnDef::new(Users::NationalId).string_len(10).not_null())
                    .col(ColumnDef::new(Users::Phone).string_len(12).not_null())
                    .col(
                        ColumnDef::new(Users::LoyaltyFlag)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Users::LoyaltyPoints)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::ReferralCode).string_len(20).not_null())
                    .col(ColumnDef::new(Users::RoleId).big_integer().null())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVO"),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::col(Users::LoyaltyPoints).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_role_id")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural keys
        for (name, column) in [
            (EMAIL_UNIQUE_INDEX, Users::Email),
            (NATIONAL_ID_UNIQUE_INDEX, Users::NationalId),
            (REFERRAL_CODE_UNIQUE_INDEX, Users::ReferralCode),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Users::Table)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role_id")
                    .table(Users::Table)
                    .col(Users::RoleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    FirstName,
    MiddleName,
    LastName,
    BirthDate,
    Email,
    NationalId,
    Phone,
    LoyaltyFlag,
    PasswordHash,
    LoyaltyPoints,
    ReferralCode,
    RoleId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
}
