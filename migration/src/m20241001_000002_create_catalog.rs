use sea_orm_migration::prelude::*;

use super::m20241001_000001_create_users_and_gyms::{Gyms, Users};

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    GymId,
    AdminId,
    Name,
    ProductType,
    Description,
    Reviews,
    Stock,
    PriceCents,
    StripeProductId,
    StripePriceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SubscriptionPlans {
    Table,
    Id,
    GymId,
    AdminId,
    PlanName,
    Description,
    PriceCents,
    Interval,
    IntervalCount,
    StripeProductId,
    StripePriceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Mentors {
    Table,
    Id,
    GymId,
    AdminId,
    Username,
    FirstName,
    LastName,
    Expertise,
    Email,
    PhoneNumber,
    PasswordHash,
    IsLoggedIn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    GymId,
    Name,
    Date,
    Timing,
    Location,
    Description,
    GuestName,
    CreatedAt,
    UpdatedAt,
}

fn gym_fk(name: &str, table: impl IntoIden + 'static, col: impl IntoIden + 'static) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Gyms::Table, Gyms::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn admin_fk(name: &str, table: impl IntoIden + 'static, col: impl IntoIden + 'static) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::GymId).uuid().not_null())
                    .col(ColumnDef::new(Products::AdminId).uuid().not_null())
                    .col(ColumnDef::new(Products::Name).string_len(30).not_null())
                    .col(ColumnDef::new(Products::ProductType).string_len(50).not_null())
                    .col(ColumnDef::new(Products::Description).string_len(100).not_null())
                    .col(ColumnDef::new(Products::Reviews).string_len(100).null())
                    .col(ColumnDef::new(Products::Stock).integer().not_null().default(0))
                    .col(ColumnDef::new(Products::PriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Products::StripeProductId).string_len(50).null())
                    .col(ColumnDef::new(Products::StripePriceId).string_len(50).null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut gym_fk("fk_products_gym_id", Products::Table, Products::GymId))
                    .foreign_key(&mut admin_fk(
                        "fk_products_admin_id",
                        Products::Table,
                        Products::AdminId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlans::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubscriptionPlans::GymId).uuid().not_null())
                    .col(ColumnDef::new(SubscriptionPlans::AdminId).uuid().not_null())
                    .col(
                        ColumnDef::new(SubscriptionPlans::PlanName)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Description)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::PriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Interval)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::IntervalCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::StripeProductId)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::StripePriceId)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut gym_fk(
                        "fk_subscription_plans_gym_id",
                        SubscriptionPlans::Table,
                        SubscriptionPlans::GymId,
                    ))
                    .foreign_key(&mut admin_fk(
                        "fk_subscription_plans_admin_id",
                        SubscriptionPlans::Table,
                        SubscriptionPlans::AdminId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Mentors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Mentors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Mentors::GymId).uuid().not_null())
                    .col(ColumnDef::new(Mentors::AdminId).uuid().not_null())
                    .col(
                        ColumnDef::new(Mentors::Username)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Mentors::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Mentors::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Mentors::Expertise).string_len(50).not_null())
                    .col(ColumnDef::new(Mentors::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Mentors::PhoneNumber).string_len(20).not_null())
                    .col(ColumnDef::new(Mentors::PasswordHash).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Mentors::IsLoggedIn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Mentors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Mentors::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut gym_fk("fk_mentors_gym_id", Mentors::Table, Mentors::GymId))
                    .foreign_key(&mut admin_fk(
                        "fk_mentors_admin_id",
                        Mentors::Table,
                        Mentors::AdminId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::GymId).uuid().not_null())
                    .col(ColumnDef::new(Events::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Events::Date).date().not_null())
                    .col(ColumnDef::new(Events::Timing).string_len(50).not_null())
                    .col(ColumnDef::new(Events::Location).string_len(255).not_null())
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(ColumnDef::new(Events::GuestName).string_len(255).null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut gym_fk("fk_events_gym_id", Events::Table, Events::GymId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_gym_id")
                    .table(Products::Table)
                    .col(Products::GymId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_plans_gym_id")
                    .table(SubscriptionPlans::Table)
                    .col(SubscriptionPlans::GymId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Mentors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubscriptionPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        Ok(())
    }
}
