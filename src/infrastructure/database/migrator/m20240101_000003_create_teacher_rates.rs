//! Create teacher_rates table
//!
//! Append-only, effective-dated rate history.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeacherRates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeacherRates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeacherRates::TeacherId).integer().not_null())
                    .col(ColumnDef::new(TeacherRates::RateType).string().not_null())
                    .col(ColumnDef::new(TeacherRates::Amount).big_integer().not_null())
                    .col(ColumnDef::new(TeacherRates::EffectiveDate).date().not_null())
                    .col(
                        ColumnDef::new(TeacherRates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TeacherRates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teacher_rates_teacher_effective")
                    .table(TeacherRates::Table)
                    .col(TeacherRates::TeacherId)
                    .col(TeacherRates::EffectiveDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeacherRates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum TeacherRates {
    Table,
    Id,
    TeacherId,
    RateType,
    Amount,
    EffectiveDate,
    IsActive,
    CreatedAt,
}
