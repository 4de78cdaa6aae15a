use sea_orm_migration::prelude::*;

use super::m20241001_000001_create_users_and_gyms::{Gyms, Users};

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    UserId,
    GymId,
    Username,
    FirstName,
    LastName,
    PlanName,
    PlanStatus,
    PlanStartDate,
    PlanEndDate,
    StripeSubscriptionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    UserId,
    GymId,
    Username,
    FirstName,
    LastName,
    PlanName,
    AmountCents,
    Currency,
    Status,
    StripePaymentId,
    StripeSessionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    GymId,
    ProductId,
    PlanName,
    Username,
    FirstName,
    LastName,
    Address,
    PhoneNumber,
    Country,
    PinCode,
    PaymentType,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::UserId).uuid().null())
                    .col(ColumnDef::new(Customers::GymId).uuid().not_null())
                    .col(ColumnDef::new(Customers::Username).string_len(50).not_null())
                    .col(ColumnDef::new(Customers::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Customers::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Customers::PlanName).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Customers::PlanStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Customers::PlanStartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Customers::PlanEndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Customers::StripeSubscriptionId)
                            .string_len(255)
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_user_id")
                            .from(Customers::Table, Customers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_gym_id")
                            .from(Customers::Table, Customers::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payments::UserId).uuid().null())
                    .col(ColumnDef::new(Payments::GymId).uuid().not_null())
                    .col(ColumnDef::new(Payments::Username).string_len(50).not_null())
                    .col(ColumnDef::new(Payments::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Payments::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Payments::PlanName).string_len(50).not_null())
                    .col(ColumnDef::new(Payments::AmountCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::Currency)
                            .string_len(3)
                            .not_null()
                            .default("usd"),
                    )
                    .col(ColumnDef::new(Payments::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Payments::StripePaymentId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payments::StripeSessionId).string_len(255).null())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Payments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_user_id")
                            .from(Payments::Table, Payments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_gym_id")
                            .from(Payments::Table, Payments::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Orders::UserId).uuid().null())
                    .col(ColumnDef::new(Orders::GymId).uuid().not_null())
                    .col(ColumnDef::new(Orders::ProductId).uuid().null())
                    .col(ColumnDef::new(Orders::PlanName).string_len(50).null())
                    .col(ColumnDef::new(Orders::Username).string_len(50).not_null())
                    .col(ColumnDef::new(Orders::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Orders::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Orders::Address).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::PhoneNumber).string_len(20).not_null())
                    .col(ColumnDef::new(Orders::Country).string_len(50).not_null())
                    .col(ColumnDef::new(Orders::PinCode).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Orders::PaymentType)
                            .string_len(20)
                            .not_null()
                            .default("cod"),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user_id")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_gym_id")
                            .from(Orders::Table, Orders::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_gym_id_created_at")
                    .table(Payments::Table)
                    .col(Payments::GymId)
                    .col(Payments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customers_gym_id")
                    .table(Customers::Table)
                    .col(Customers::GymId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        Ok(())
    }
}
