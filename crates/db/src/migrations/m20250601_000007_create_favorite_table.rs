//! Create favorite table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Favorite::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Favorite::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Favorite::MangaId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Favorite::AddedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Favorite::LastRead).timestamp_with_time_zone())
                    .primary_key(
                        Index::create()
                            .col(Favorite::UserId)
                            .col(Favorite::MangaId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_user")
                            .from(Favorite::Table, Favorite::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: manga_id (for new-chapter fan-out)
        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_manga_id")
                    .table(Favorite::Table)
                    .col(Favorite::MangaId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Favorite::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Favorite {
    Table,
    UserId,
    MangaId,
    AddedAt,
    LastRead,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
