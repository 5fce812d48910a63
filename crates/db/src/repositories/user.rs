//! User repository.

use std::sync::Arc;

use crate::entities::{
    User,
    user::{self, Role},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use yomu_common::{AppError, AppResult};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, failing if missing.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stamp a user's last login time.
    pub async fn set_last_login(&self, id: &str) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        User::update_many()
            .filter(user::Column::Id.eq(id))
            .col_expr(user::Column::LastLogin, Expr::value(chrono::Utc::now()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite a user's denormalized unread-notification counter.
    pub async fn set_unread_count(&self, id: &str, count: i32) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        User::update_many()
            .filter(user::Column::Id.eq(id))
            .col_expr(user::Column::UnreadCount, Expr::value(count))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All users holding an administrator-capable role.
    pub async fn find_administrators(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Role.is_in([Role::Moderator, Role::Owner]))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users with the given role.
    pub async fn find_by_role(&self, role: Role) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Role.eq(role))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search users by name or email substring.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let pattern = format!("%{query}%");
        User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Name.like(&pattern))
                    .add(user::Column::Email.like(&pattern)),
            )
            .order_by_asc(user::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List users (paginated, newest first).
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        User::find()
            .order_by_desc(user::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user row.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        user.delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }
}
