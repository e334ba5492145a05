//! Create tuition_billings and invoice_sequences tables
//!
//! The unique index on (student_id, class_id, billing_month) is what makes
//! concurrent generation runs safe.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TuitionBillings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TuitionBillings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TuitionBillings::StudentId).integer().not_null())
                    .col(ColumnDef::new(TuitionBillings::ClassId).integer().not_null())
                    .col(
                        ColumnDef::new(TuitionBillings::BillingMonth)
                            .string_len(7)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TuitionBillings::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(TuitionBillings::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TuitionBillings::DueDate).date().not_null())
                    .col(ColumnDef::new(TuitionBillings::PaidAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TuitionBillings::PaymentMethod).string())
                    .col(
                        ColumnDef::new(TuitionBillings::InvoiceNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TuitionBillings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_tuition_billings_student_class_month")
                    .table(TuitionBillings::Table)
                    .col(TuitionBillings::StudentId)
                    .col(TuitionBillings::ClassId)
                    .col(TuitionBillings::BillingMonth)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tuition_billings_month")
                    .table(TuitionBillings::Table)
                    .col(TuitionBillings::BillingMonth)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tuition_billings_status_due")
                    .table(TuitionBillings::Table)
                    .col(TuitionBillings::Status)
                    .col(TuitionBillings::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvoiceSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvoiceSequences::Period)
                            .string_len(7)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InvoiceSequences::LastValue)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InvoiceSequences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TuitionBillings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum TuitionBillings {
    Table,
    Id,
    StudentId,
    ClassId,
    BillingMonth,
    Amount,
    Status,
    DueDate,
    PaidAt,
    PaymentMethod,
    InvoiceNumber,
    CreatedAt,
}

#[derive(Iden)]
pub enum InvoiceSequences {
    Table,
    Period,
    LastValue,
}
