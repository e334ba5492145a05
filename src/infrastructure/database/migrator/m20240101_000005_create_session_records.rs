//! Create session_records table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SessionRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SessionRecords::TeacherId).integer().not_null())
                    .col(ColumnDef::new(SessionRecords::ClassId).integer().not_null())
                    .col(ColumnDef::new(SessionRecords::SessionDate).date().not_null())
                    .col(ColumnDef::new(SessionRecords::StartTime).time().not_null())
                    .col(ColumnDef::new(SessionRecords::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(SessionRecords::IsValid)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SessionRecords::StudentCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_session_records_teacher_date")
                    .table(SessionRecords::Table)
                    .col(SessionRecords::TeacherId)
                    .col(SessionRecords::SessionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SessionRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SessionRecords {
    Table,
    Id,
    TeacherId,
    ClassId,
    SessionDate,
    StartTime,
    EndTime,
    IsValid,
    StudentCount,
}
