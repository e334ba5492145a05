//! Create tutor_payments table
//!
//! One payout per (teacher_id, payment_month), enforced by a unique index.

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_teacher_rates::TeacherRates;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TutorPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TutorPayments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TutorPayments::TeacherId).integer().not_null())
                    .col(
                        ColumnDef::new(TutorPayments::PaymentMonth)
                            .string_len(7)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TutorPayments::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(TutorPayments::SessionsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TutorPayments::StudentsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TutorPayments::MinutesTaught)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TutorPayments::RateId).integer().not_null())
                    .col(ColumnDef::new(TutorPayments::RateType).string().not_null())
                    .col(
                        ColumnDef::new(TutorPayments::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TutorPayments::PaymentMethod).string())
                    .col(ColumnDef::new(TutorPayments::PaidAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(TutorPayments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tutor_payments_rate")
                            .from(TutorPayments::Table, TutorPayments::RateId)
                            .to(TeacherRates::Table, TeacherRates::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_tutor_payments_teacher_month")
                    .table(TutorPayments::Table)
                    .col(TutorPayments::TeacherId)
                    .col(TutorPayments::PaymentMonth)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tutor_payments_rate")
                    .table(TutorPayments::Table)
                    .col(TutorPayments::RateId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TutorPayments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum TutorPayments {
    Table,
    Id,
    TeacherId,
    PaymentMonth,
    Amount,
    SessionsCount,
    StudentsCount,
    MinutesTaught,
    RateId,
    RateType,
    Status,
    PaymentMethod,
    PaidAt,
    CreatedAt,
}
