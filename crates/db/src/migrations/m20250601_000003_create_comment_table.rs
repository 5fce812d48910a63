//! Create comment table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comment::MangaId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::ChapterId).string_len(32))
                    .col(ColumnDef::new(Comment::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::Content).text().not_null())
                    .col(
                        ColumnDef::new(Comment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Comment::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Comment::IsEdited)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Comment::ParentId).string_len(32))
                    .col(ColumnDef::new(Comment::Likes).json_binary().not_null())
                    .col(ColumnDef::new(Comment::Dislikes).json_binary().not_null())
                    .col(ColumnDef::new(Comment::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Comment::ModeratedBy).string_len(32))
                    .col(ColumnDef::new(Comment::ModeratedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Comment::ModerationReason).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_user")
                            .from(Comment::Table, Comment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (manga_id, chapter_id, status) (for target listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_target")
                    .table(Comment::Table)
                    .col(Comment::MangaId)
                    .col(Comment::ChapterId)
                    .col(Comment::Status)
                    .to_owned(),
            )
            .await?;

        // Index: parent_id (for reply listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_parent_id")
                    .table(Comment::Table)
                    .col(Comment::ParentId)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for per-user listings and cascade cleanup)
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_user_id")
                    .table(Comment::Table)
                    .col(Comment::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    MangaId,
    ChapterId,
    UserId,
    Content,
    CreatedAt,
    UpdatedAt,
    IsEdited,
    ParentId,
    Likes,
    Dislikes,
    Status,
    ModeratedBy,
    ModeratedAt,
    ModerationReason,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
