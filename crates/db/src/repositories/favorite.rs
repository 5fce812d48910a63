//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use yomu_common::{AppError, AppResult};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a favorite by user and manga.
    pub async fn find(&self, user_id: &str, manga_id: &str) -> AppResult<Option<favorite::Model>> {
        Favorite::find_by_id((user_id.to_string(), manga_id.to_string()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a favorite unless it already exists. Returns whether a row was
    /// inserted.
    pub async fn insert_if_absent(&self, model: favorite::ActiveModel) -> AppResult<bool> {
        let (user_id, manga_id) = match (&model.user_id, &model.manga_id) {
            (ActiveValue::Set(user_id), ActiveValue::Set(manga_id)) => {
                (user_id.clone(), manga_id.clone())
            }
            _ => {
                return Err(AppError::Internal(
                    "favorite without user or manga".to_string(),
                ));
            }
        };

        if self.find(&user_id, &manga_id).await?.is_some() {
            return Ok(false);
        }

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// Remove a favorite. Returns whether a row was removed.
    pub async fn remove(&self, user_id: &str, manga_id: &str) -> AppResult<bool> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::MangaId.eq(manga_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// A user's favorites, most recently added first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::AddedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Everyone who favorited a manga.
    pub async fn find_by_manga(&self, manga_id: &str) -> AppResult<Vec<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::MangaId.eq(manga_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's favorites.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stamp the last-read time on a favorite, if present.
    pub async fn set_last_read(&self, user_id: &str, manga_id: &str) -> AppResult<()> {
        if let Some(favorite) = self.find(user_id, manga_id).await? {
            let mut active: favorite::ActiveModel = favorite.into();
            active.last_read = Set(Some(chrono::Utc::now().into()));
            active
                .update(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Delete all favorites for a user. Returns the number removed.
    pub async fn delete_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
