use sea_orm_migration::prelude::*;

use super::m20241001_000001_create_users_and_gyms::{Gyms, Users};

#[derive(DeriveIden)]
enum Attendance {
    Table,
    Id,
    UserId,
    GymId,
    CheckInTime,
    CheckOutTime,
    CheckedIn,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Attendance::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Attendance::UserId).uuid().not_null())
                    .col(ColumnDef::new(Attendance::GymId).uuid().not_null())
                    .col(
                        ColumnDef::new(Attendance::CheckInTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Attendance::CheckOutTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Attendance::CheckedIn)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_user_id")
                            .from(Attendance::Table, Attendance::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_gym_id")
                            .from(Attendance::Table, Attendance::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个 (user, gym) 最多一条未签退记录
        // Postgres 和 SQLite 都支持 partial index
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_open \
             ON attendance (user_id, gym_id) WHERE checked_in = true",
        )
        .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_gym_id_check_in_time")
                    .table(Attendance::Table)
                    .col(Attendance::GymId)
                    .col(Attendance::CheckInTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attendance::Table).to_owned())
            .await?;
        Ok(())
    }
}
