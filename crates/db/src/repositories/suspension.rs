//! Suspension repository.

use std::sync::Arc;

use crate::entities::{
    Suspension,
    suspension::{self, SuspensionKind},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use yomu_common::{AppError, AppResult};

/// Suspension repository for database operations.
#[derive(Clone)]
pub struct SuspensionRepository {
    db: Arc<DatabaseConnection>,
}

impl SuspensionRepository {
    /// Create a new suspension repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a suspension unless the user already has an active one of the
    /// same kind.
    ///
    /// The check and the insert run in one transaction so the at-most-one-
    /// active invariant holds under concurrent issuers. A still-flagged but
    /// expired suspension is deactivated (actor `"system"`) before the new
    /// one is inserted.
    pub async fn insert_if_no_active(&self, model: suspension::ActiveModel) -> AppResult<bool> {
        let user_id = match &model.user_id {
            ActiveValue::Set(id) => id.clone(),
            _ => return Err(AppError::Internal("suspension without user id".to_string())),
        };
        let kind = match &model.kind {
            ActiveValue::Set(kind) => *kind,
            _ => return Err(AppError::Internal("suspension without kind".to_string())),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = Suspension::find()
            .filter(suspension::Column::UserId.eq(&user_id))
            .filter(suspension::Column::Kind.eq(kind))
            .filter(suspension::Column::IsActive.eq(true))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(existing) = existing {
            if !existing.is_expired_at(chrono::Utc::now()) {
                txn.rollback()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                return Ok(false);
            }

            // Lazy expiry: clear the stale slot before filling it again.
            let mut stale: suspension::ActiveModel = existing.into();
            stale.is_active = Set(false);
            stale.lifted_at = Set(Some(chrono::Utc::now().into()));
            stale.lifted_by = Set(Some("system".to_string()));
            stale
                .update(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// Find the suspension flagged active for a user and kind, expired or
    /// not. Expiry is the caller's concern (lazy evaluation).
    pub async fn find_active_flagged(
        &self,
        user_id: &str,
        kind: SuspensionKind,
    ) -> AppResult<Option<suspension::Model>> {
        Suspension::find()
            .filter(suspension::Column::UserId.eq(user_id))
            .filter(suspension::Column::Kind.eq(kind))
            .filter(suspension::Column::IsActive.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip a suspension inactive, recording who lifted it.
    pub async fn deactivate(
        &self,
        model: suspension::Model,
        lifted_by: &str,
    ) -> AppResult<suspension::Model> {
        let mut active: suspension::ActiveModel = model.into();
        active.is_active = Set(false);
        active.lifted_at = Set(Some(chrono::Utc::now().into()));
        active.lifted_by = Set(Some(lifted_by.to_string()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All suspensions for a user, newest first.
    pub async fn find_for_user(&self, user_id: &str) -> AppResult<Vec<suspension::Model>> {
        Suspension::find()
            .filter(suspension::Column::UserId.eq(user_id))
            .order_by_desc(suspension::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All unexpired active suspensions of a kind, newest first.
    pub async fn find_active(
        &self,
        kind: SuspensionKind,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<suspension::Model>> {
        let now = chrono::Utc::now();

        Suspension::find()
            .filter(suspension::Column::Kind.eq(kind))
            .filter(suspension::Column::IsActive.eq(true))
            .filter(
                suspension::Column::ExpiresAt
                    .is_null()
                    .or(suspension::Column::ExpiresAt.gt(now)),
            )
            .order_by_desc(suspension::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all suspensions for a user. Returns the number removed.
    pub async fn delete_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = Suspension::delete_many()
            .filter(suspension::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::suspension::SuspensionDuration;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_suspension(id: &str, user_id: &str, kind: SuspensionKind) -> suspension::Model {
        suspension::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            moderator_id: "mod1".to_string(),
            kind,
            reason: "Repeated violations".to_string(),
            duration: SuspensionDuration::Permanent,
            created_at: Utc::now().into(),
            expires_at: None,
            is_active: true,
            lifted_at: None,
            lifted_by: None,
        }
    }

    #[tokio::test]
    async fn test_find_active_flagged() {
        let ban = create_test_suspension("s1", "user1", SuspensionKind::Site);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ban.clone()]])
                .into_connection(),
        );

        let repo = SuspensionRepository::new(db);
        let result = repo
            .find_active_flagged("user1", SuspensionKind::Site)
            .await
            .unwrap();

        assert_eq!(result, Some(ban));
    }

    #[tokio::test]
    async fn test_insert_if_no_active_rejects_duplicate() {
        // An unexpired active suspension of the same kind blocks the insert.
        let existing = create_test_suspension("s1", "user1", SuspensionKind::Site);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let repo = SuspensionRepository::new(db);
        let model = suspension::ActiveModel {
            id: Set("s2".to_string()),
            user_id: Set("user1".to_string()),
            moderator_id: Set("mod1".to_string()),
            kind: Set(SuspensionKind::Site),
            reason: Set("Again".to_string()),
            duration: Set(SuspensionDuration::Permanent),
            created_at: Set(Utc::now().into()),
            expires_at: Set(None),
            is_active: Set(true),
            lifted_at: Set(None),
            lifted_by: Set(None),
        };

        let inserted = repo.insert_if_no_active(model).await.unwrap();
        assert!(!inserted);
    }

    #[tokio::test]
    async fn test_insert_rejects_missing_user_id() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = SuspensionRepository::new(db);

        let result = repo
            .insert_if_no_active(<suspension::ActiveModel as Default>::default())
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
