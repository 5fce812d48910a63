//! Pending content repository.

use std::sync::Arc;

use crate::entities::{
    PendingContent,
    pending_content::{self, SubmissionStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use yomu_common::{AppError, AppResult};

/// Pending content repository for database operations.
#[derive(Clone)]
pub struct PendingContentRepository {
    db: Arc<DatabaseConnection>,
}

impl PendingContentRepository {
    /// Create a new pending content repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new pending content record.
    pub async fn create(
        &self,
        model: pending_content::ActiveModel,
    ) -> AppResult<pending_content::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a pending content record by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<pending_content::Model>> {
        PendingContent::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a pending content record.
    pub async fn update(
        &self,
        model: pending_content::ActiveModel,
    ) -> AppResult<pending_content::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List submissions with optional status filter, newest first.
    pub async fn list(
        &self,
        status: Option<SubmissionStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<pending_content::Model>> {
        let mut query =
            PendingContent::find().order_by_desc(pending_content::Column::SubmittedAt);

        if let Some(status) = status {
            query = query.filter(pending_content::Column::Status.eq(status));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count submissions awaiting review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        PendingContent::find()
            .filter(pending_content::Column::Status.eq(SubmissionStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All submissions by a user, newest first.
    pub async fn find_by_submitter(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<pending_content::Model>> {
        PendingContent::find()
            .filter(pending_content::Column::SubmittedBy.eq(user_id))
            .order_by_desc(pending_content::Column::SubmittedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all submissions by a user. Returns the number removed.
    pub async fn delete_by_submitter(&self, user_id: &str) -> AppResult<u64> {
        let result = PendingContent::delete_many()
            .filter(pending_content::Column::SubmittedBy.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::pending_content::ContentKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn create_test_pending(id: &str, submitted_by: &str) -> pending_content::Model {
        pending_content::Model {
            id: id.to_string(),
            kind: ContentKind::Title,
            payload: json!({"title": "Solo Climber"}),
            submitted_by: submitted_by.to_string(),
            submitted_at: Utc::now().into(),
            status: SubmissionStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
        }
    }

    #[tokio::test]
    async fn test_list_pending() {
        let p1 = create_test_pending("p1", "user1");
        let p2 = create_test_pending("p2", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = PendingContentRepository::new(db);
        let result = repo
            .list(Some(SubmissionStatus::Pending), 10, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }
}
