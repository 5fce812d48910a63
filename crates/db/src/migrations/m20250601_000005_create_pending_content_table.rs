//! Create pending content table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingContent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingContent::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingContent::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingContent::Payload)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingContent::SubmittedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingContent::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PendingContent::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingContent::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(PendingContent::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(PendingContent::ReviewNotes).text())
                    .to_owned(),
            )
            .await?;

        // Index: status (for the review queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_pending_content_status")
                    .table(PendingContent::Table)
                    .col(PendingContent::Status)
                    .to_owned(),
            )
            .await?;

        // Index: submitted_by (for per-user listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_pending_content_submitted_by")
                    .table(PendingContent::Table)
                    .col(PendingContent::SubmittedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingContent::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PendingContent {
    Table,
    Id,
    Kind,
    Payload,
    SubmittedBy,
    SubmittedAt,
    Status,
    ReviewedBy,
    ReviewedAt,
    ReviewNotes,
}
