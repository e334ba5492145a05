//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_enrollments;
mod m20240101_000002_create_tuition_billings;
mod m20240101_000003_create_teacher_rates;
mod m20240101_000004_create_tutor_payments;
mod m20240101_000005_create_session_records;
mod m20240101_000006_create_expenses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_enrollments::Migration),
            Box::new(m20240101_000002_create_tuition_billings::Migration),
            Box::new(m20240101_000003_create_teacher_rates::Migration),
            Box::new(m20240101_000004_create_tutor_payments::Migration),
            Box::new(m20240101_000005_create_session_records::Migration),
            Box::new(m20240101_000006_create_expenses::Migration),
        ]
    }
}
