//! Comment repository.

use std::sync::Arc;

use crate::entities::{
    Comment,
    comment::{self, CommentStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use yomu_common::{AppError, AppResult};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active top-level comments for a target, newest first.
    ///
    /// `chapter_id = None` selects manga-level comments only; chapter
    /// comments live under their chapter.
    pub async fn find_top_level(
        &self,
        manga_id: &str,
        chapter_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        let mut query = Comment::find()
            .filter(comment::Column::MangaId.eq(manga_id))
            .filter(comment::Column::Status.eq(CommentStatus::Active))
            .filter(comment::Column::ParentId.is_null());

        query = match chapter_id {
            Some(chapter_id) => query.filter(comment::Column::ChapterId.eq(chapter_id)),
            None => query.filter(comment::Column::ChapterId.is_null()),
        };

        query
            .order_by_desc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active replies to a comment, oldest first.
    pub async fn find_replies(&self, parent_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ParentId.eq(parent_id))
            .filter(comment::Column::Status.eq(CommentStatus::Active))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All comments by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::UserId.eq(user_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Hidden and deleted comments, most recently touched first.
    pub async fn find_moderated(&self, limit: u64, offset: u64) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(
                comment::Column::Status
                    .eq(CommentStatus::Hidden)
                    .or(comment::Column::Status.eq(CommentStatus::Deleted)),
            )
            .order_by_desc(comment::Column::UpdatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments with the given status.
    pub async fn count_by_status(&self, status: CommentStatus) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all comments.
    pub async fn count(&self) -> AppResult<u64> {
        Comment::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all comments authored by a user. Returns the number removed.
    pub async fn delete_by_author(&self, user_id: &str) -> AppResult<u64> {
        let result = Comment::delete_many()
            .filter(comment::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
