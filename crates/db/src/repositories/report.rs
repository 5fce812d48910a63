//! Report repository.

use std::sync::Arc;

use crate::entities::{
    Report,
    report::{self, ReportStatus, ReportTargetKind},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use yomu_common::{AppError, AppResult};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a report unless the reporter already has an open one on the
    /// same target.
    ///
    /// Check and insert run in one transaction so the one-open-report-per-
    /// reporter invariant holds under concurrent writers.
    pub async fn insert_if_no_open(&self, model: report::ActiveModel) -> AppResult<bool> {
        let (reporter_id, target_id) = match (&model.reporter_id, &model.target_id) {
            (ActiveValue::Set(reporter_id), ActiveValue::Set(target_id)) => {
                (reporter_id.clone(), target_id.clone())
            }
            _ => {
                return Err(AppError::Internal(
                    "report without reporter or target".to_string(),
                ));
            }
        };
        let target_kind = match &model.target_kind {
            ActiveValue::Set(kind) => *kind,
            _ => return Err(AppError::Internal("report without target kind".to_string())),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = Report::find()
            .filter(report::Column::TargetKind.eq(target_kind))
            .filter(report::Column::TargetId.eq(&target_id))
            .filter(report::Column::ReporterId.eq(&reporter_id))
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if existing.is_some() {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
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

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a report.
    pub async fn update(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending reports, optionally restricted to one target kind, newest
    /// first.
    pub async fn find_pending(
        &self,
        target_kind: Option<ReportTargetKind>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        let mut query = Report::find()
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .order_by_desc(report::Column::CreatedAt);

        if let Some(kind) = target_kind {
            query = query.filter(report::Column::TargetKind.eq(kind));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending reports.
    pub async fn count_pending(&self) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All reports filed against a target, newest first.
    pub async fn find_for_target(
        &self,
        target_kind: ReportTargetKind,
        target_id: &str,
    ) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::TargetKind.eq(target_kind))
            .filter(report::Column::TargetId.eq(target_id))
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all reports filed against comments.
    pub async fn count_for_kind(&self, target_kind: ReportTargetKind) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::TargetKind.eq(target_kind))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all reports filed by a user. Returns the number removed.
    pub async fn delete_by_reporter(&self, user_id: &str) -> AppResult<u64> {
        let result = Report::delete_many()
            .filter(report::Column::ReporterId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::report::ReportReason;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Set};

    fn create_test_report(id: &str, reporter_id: &str, target_id: &str) -> report::Model {
        report::Model {
            id: id.to_string(),
            target_kind: ReportTargetKind::Comment,
            target_id: target_id.to_string(),
            reporter_id: reporter_id.to_string(),
            reason: ReportReason::Spam,
            description: "Advertising links".to_string(),
            status: ReportStatus::Pending,
            resolved_by: None,
            resolved_at: None,
            notes: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_insert_if_no_open_rejects_duplicate() {
        // One open report per reporter and target.
        let existing = create_test_report("r1", "user1", "c1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let model = report::ActiveModel {
            id: Set("r2".to_string()),
            target_kind: Set(ReportTargetKind::Comment),
            target_id: Set("c1".to_string()),
            reporter_id: Set("user1".to_string()),
            reason: Set(ReportReason::Spam),
            description: Set("Again".to_string()),
            status: Set(ReportStatus::Pending),
            resolved_by: Set(None),
            resolved_at: Set(None),
            notes: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let inserted = repo.insert_if_no_open(model).await.unwrap();
        assert!(!inserted);
    }

    #[tokio::test]
    async fn test_find_pending() {
        let r1 = create_test_report("r1", "user1", "c1");
        let r2 = create_test_report("r2", "user2", "c2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.find_pending(None, 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_find_for_target() {
        let r1 = create_test_report("r1", "user1", "c1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo
            .find_for_target(ReportTargetKind::Comment, "c1")
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].target_id, "c1");
    }
}
