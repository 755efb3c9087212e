use sea_orm_migration::prelude::*;

mod m20260901_000001_create_users;
mod m20260901_000002_create_properties;
mod m20260901_000003_create_bookings;
mod m20260901_000004_create_transactions;
mod m20260901_000005_create_favorites;
mod m20260901_000006_create_feedbacks;
mod m20260901_000007_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_create_users::Migration),
            Box::new(m20260901_000002_create_properties::Migration),
            Box::new(m20260901_000003_create_bookings::Migration),
            Box::new(m20260901_000004_create_transactions::Migration),
            Box::new(m20260901_000005_create_favorites::Migration),
            Box::new(m20260901_000006_create_feedbacks::Migration),
            Box::new(m20260901_000007_create_outbox_events::Migration),
        ]
    }
}
