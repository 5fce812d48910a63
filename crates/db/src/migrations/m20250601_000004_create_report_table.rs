//! Create report table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Report::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Report::TargetKind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Report::TargetId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Report::ReporterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Report::Reason).string_len(32).not_null())
                    .col(ColumnDef::new(Report::Description).text().not_null())
                    .col(ColumnDef::new(Report::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Report::ResolvedBy).string_len(32))
                    .col(ColumnDef::new(Report::ResolvedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Report::Notes).text())
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (target_kind, target_id, reporter_id, status) (for the
        // one-open-report-per-reporter check)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_target_reporter_status")
                    .table(Report::Table)
                    .col(Report::TargetKind)
                    .col(Report::TargetId)
                    .col(Report::ReporterId)
                    .col(Report::Status)
                    .to_owned(),
            )
            .await?;

        // Index: status (for the pending queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_status")
                    .table(Report::Table)
                    .col(Report::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    TargetKind,
    TargetId,
    ReporterId,
    Reason,
    Description,
    Status,
    ResolvedBy,
    ResolvedAt,
    Notes,
    CreatedAt,
}
