//! Favorite service.

use sea_orm::Set;
use yomu_common::AppResult;
use yomu_db::{
    entities::favorite,
    repositories::{FavoriteRepository, UserRepository},
};

use crate::services::permission::Capabilities;

/// Favorite service for business logic.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    user_repo: UserRepository,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, user_repo: UserRepository) -> Self {
        Self {
            favorite_repo,
            user_repo,
        }
    }

    /// Add a manga to a user's favorites.
    ///
    /// Returns `false` when the user is unknown, cannot favorite, or the
    /// manga is already favorited.
    pub async fn add(&self, user_id: &str, manga_id: &str) -> AppResult<bool> {
        let Some(user) = self.user_repo.find_by_id(user_id).await? else {
            return Ok(false);
        };
        if !Capabilities::of(user.role).can_favorite {
            return Ok(false);
        }

        let model = favorite::ActiveModel {
            user_id: Set(user_id.to_string()),
            manga_id: Set(manga_id.to_string()),
            added_at: Set(chrono::Utc::now().into()),
            last_read: Set(None),
        };

        self.favorite_repo.insert_if_absent(model).await
    }

    /// Remove a manga from a user's favorites.
    pub async fn remove(&self, user_id: &str, manga_id: &str) -> AppResult<bool> {
        self.favorite_repo.remove(user_id, manga_id).await
    }

    /// Whether a manga is in a user's favorites.
    pub async fn is_favorited(&self, user_id: &str, manga_id: &str) -> AppResult<bool> {
        Ok(self.favorite_repo.find(user_id, manga_id).await?.is_some())
    }

    /// A user's favorites, most recently added first.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<favorite::Model>> {
        self.favorite_repo.find_by_user(user_id).await
    }

    /// Count a user's favorites.
    pub async fn count(&self, user_id: &str) -> AppResult<u64> {
        self.favorite_repo.count_by_user(user_id).await
    }

    /// Stamp the last-read time after the user reads a chapter.
    pub async fn touch_last_read(&self, user_id: &str, manga_id: &str) -> AppResult<()> {
        self.favorite_repo.set_last_read(user_id, manga_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use yomu_db::entities::user::{self, Role};

    fn create_test_user(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: format!("user {id}"),
            email: format!("{id}@example.com"),
            role,
            unread_count: 0,
            created_at: Utc::now().into(),
            last_login: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = FavoriteService::new(
            FavoriteRepository::new(db.clone()),
            UserRepository::new(db),
        );

        let added = service.add("missing", "manga1").await.unwrap();
        assert!(!added);
    }

    #[tokio::test]
    async fn test_add_rejects_existing_favorite() {
        let user = create_test_user("u1", Role::Member);
        let existing = favorite::Model {
            user_id: "u1".to_string(),
            manga_id: "manga1".to_string(),
            added_at: Utc::now().into(),
            last_read: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user]])
                .append_query_results([vec![existing]])
                .into_connection(),
        );

        let service = FavoriteService::new(
            FavoriteRepository::new(db.clone()),
            UserRepository::new(db),
        );

        let added = service.add("u1", "manga1").await.unwrap();
        assert!(!added);
    }
}
