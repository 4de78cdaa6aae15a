use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    PhoneNumber,
    Country,
    IsStaff,
    IsSuperuser,
    IsLoggedIn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Gyms {
    Table,
    Id,
    AdminId,
    GymName,
    OwnerFirstName,
    OwnerLastName,
    Address,
    PhoneNumber,
    Email,
    PromoCodeOffers,
    PromoCode,
    StripeAccountId,
    CreatedAt,
    UpdatedAt,
}

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
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Users::PhoneNumber).string_len(20).null())
                    .col(ColumnDef::new(Users::Country).string_len(50).null())
                    .col(
                        ColumnDef::new(Users::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsSuperuser)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsLoggedIn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个管理员只能拥有一个健身房 (admin_id 唯一)
        manager
            .create_table(
                Table::create()
                    .table(Gyms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Gyms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Gyms::AdminId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Gyms::GymName).string_len(50).not_null())
                    .col(ColumnDef::new(Gyms::OwnerFirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Gyms::OwnerLastName).string_len(50).not_null())
                    .col(ColumnDef::new(Gyms::Address).string_len(200).not_null())
                    .col(ColumnDef::new(Gyms::PhoneNumber).string_len(20).not_null())
                    .col(ColumnDef::new(Gyms::Email).string_len(254).not_null())
                    .col(
                        ColumnDef::new(Gyms::PromoCodeOffers)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Gyms::PromoCode).string_len(30).null())
                    .col(ColumnDef::new(Gyms::StripeAccountId).string_len(100).null())
                    .col(
                        ColumnDef::new(Gyms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Gyms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gyms_admin_id")
                            .from(Gyms::Table, Gyms::AdminId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Gyms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
