pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_users_and_gyms;
mod m20241001_000002_create_catalog;
mod m20241001_000003_create_billing;
mod m20241001_000004_create_attendance;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_users_and_gyms::Migration),
            Box::new(m20241001_000002_create_catalog::Migration),
            Box::new(m20241001_000003_create_billing::Migration),
            Box::new(m20241001_000004_create_attendance::Migration),
        ]
    }
}
