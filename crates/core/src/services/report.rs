//! Report service - filing and resolving complaints.

use sea_orm::Set;
use yomu_common::{AppResult, IdGenerator};
use yomu_db::{
    entities::{
        notification::NotificationPayload,
        report::{self, ReportReason, ReportStatus, ReportTargetKind},
    },
    repositories::{CommentRepository, ReportRepository, UserRepository},
};

use crate::services::notification::NotificationService;
use crate::services::permission::Capabilities;

/// How a moderator closed a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved,
    Dismissed,
}

impl Resolution {
    const fn status(self) -> ReportStatus {
        match self {
            Self::Resolved => ReportStatus::Resolved,
            Self::Dismissed => ReportStatus::Dismissed,
        }
    }
}

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            report_repo,
            comment_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a report against a comment.
    ///
    /// Returns `false` when the reporter or comment is unknown, the comment
    /// is the reporter's own, or the reporter already has an open report on
    /// it.
    pub async fn report_comment(
        &self,
        comment_id: &str,
        reporter_id: &str,
        reason: ReportReason,
        description: &str,
    ) -> AppResult<bool> {
        if self.user_repo.find_by_id(reporter_id).await?.is_none() {
            return Ok(false);
        }
        let Some(comment) = self.comment_repo.find_by_id(comment_id).await? else {
            return Ok(false);
        };
        if comment.user_id == reporter_id {
            return Ok(false);
        }

        let report_id = self.id_gen.generate();
        let model = self.new_report(
            &report_id,
            ReportTargetKind::Comment,
            comment_id,
            reporter_id,
            reason,
            description,
        );

        if !self.report_repo.insert_if_no_open(model).await? {
            return Ok(false);
        }

        let payload = NotificationPayload::CommentReported {
            comment_id: comment_id.to_string(),
            report_id,
            reason,
        };
        if let Err(e) = self
            .notifications
            .notify_administrators(
                &payload,
                "New comment report",
                &format!("A comment was reported for: {}", reason.label()),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to notify administrators of comment report");
        }

        Ok(true)
    }

    /// File a report against a user, same invariants as
    /// [`Self::report_comment`].
    pub async fn report_user(
        &self,
        target_user_id: &str,
        reporter_id: &str,
        reason: ReportReason,
        description: &str,
    ) -> AppResult<bool> {
        if self.user_repo.find_by_id(reporter_id).await?.is_none() {
            return Ok(false);
        }
        if target_user_id == reporter_id {
            return Ok(false);
        }
        if self.user_repo.find_by_id(target_user_id).await?.is_none() {
            return Ok(false);
        }

        let report_id = self.id_gen.generate();
        let model = self.new_report(
            &report_id,
            ReportTargetKind::User,
            target_user_id,
            reporter_id,
            reason,
            description,
        );

        if !self.report_repo.insert_if_no_open(model).await? {
            return Ok(false);
        }

        let payload = NotificationPayload::UserReported {
            user_id: target_user_id.to_string(),
            report_id,
            reason,
        };
        if let Err(e) = self
            .notifications
            .notify_administrators(
                &payload,
                "New user report",
                &format!("A user was reported for: {}", reason.label()),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to notify administrators of user report");
        }

        Ok(true)
    }

    /// Close a pending report as resolved or dismissed.
    ///
    /// One-shot: a report that is no longer pending cannot be closed again.
    /// Comment reports need `can_moderate_comments`; user reports need
    /// `can_administer`.
    pub async fn resolve(
        &self,
        report_id: &str,
        resolver_id: &str,
        resolution: Resolution,
        notes: Option<&str>,
    ) -> AppResult<bool> {
        let Some(resolver) = self.user_repo.find_by_id(resolver_id).await? else {
            return Ok(false);
        };

        let Some(report) = self.report_repo.find_by_id(report_id).await? else {
            return Ok(false);
        };

        let capabilities = Capabilities::of(resolver.role);
        let allowed = match report.target_kind {
            ReportTargetKind::Comment => capabilities.can_moderate_comments,
            ReportTargetKind::User => capabilities.can_administer,
        };
        if !allowed {
            return Ok(false);
        }

        if report.status != ReportStatus::Pending {
            return Ok(false);
        }

        let mut model: report::ActiveModel = report.into();
        model.status = Set(resolution.status());
        model.resolved_by = Set(Some(resolver_id.to_string()));
        model.resolved_at = Set(Some(chrono::Utc::now().into()));
        model.notes = Set(notes.map(String::from));
        self.report_repo.update(model).await?;

        Ok(true)
    }

    /// Pending reports, optionally restricted to one target kind.
    pub async fn pending(
        &self,
        target_kind: Option<ReportTargetKind>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        self.report_repo.find_pending(target_kind, limit, offset).await
    }

    /// Count pending reports.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.report_repo.count_pending().await
    }

    /// A comment's report list.
    pub async fn reports_for_comment(&self, comment_id: &str) -> AppResult<Vec<report::Model>> {
        self.report_repo
            .find_for_target(ReportTargetKind::Comment, comment_id)
            .await
    }

    /// Count all reports ever filed against comments.
    pub async fn count_comment_reports(&self) -> AppResult<u64> {
        self.report_repo
            .count_for_kind(ReportTargetKind::Comment)
            .await
    }

    fn new_report(
        &self,
        id: &str,
        target_kind: ReportTargetKind,
        target_id: &str,
        reporter_id: &str,
        reason: ReportReason,
        description: &str,
    ) -> report::ActiveModel {
        report::ActiveModel {
            id: Set(id.to_string()),
            target_kind: Set(target_kind),
            target_id: Set(target_id.to_string()),
            reporter_id: Set(reporter_id.to_string()),
            reason: Set(reason),
            description: Set(description.to_string()),
            status: Set(ReportStatus::Pending),
            resolved_by: Set(None),
            resolved_at: Set(None),
            notes: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use std::sync::Arc;
    use yomu_common::config::ModerationConfig;
    use yomu_db::entities::comment::{self, CommentStatus};
    use yomu_db::entities::user::{self, Role};
    use yomu_db::repositories::NotificationRepository;

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

    fn create_test_comment(id: &str, user_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            manga_id: "manga1".to_string(),
            chapter_id: None,
            user_id: user_id.to_string(),
            content: "Great chapter".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            is_edited: false,
            parent_id: None,
            likes: json!([]),
            dislikes: json!([]),
            status: CommentStatus::Active,
            moderated_by: None,
            moderated_at: None,
            moderation_reason: None,
        }
    }

    fn create_test_report(id: &str, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            target_kind: ReportTargetKind::Comment,
            target_id: "c1".to_string(),
            reporter_id: "u1".to_string(),
            reason: ReportReason::Spam,
            description: "Advertising links".to_string(),
            status,
            resolved_by: None,
            resolved_at: None,
            notes: None,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> ReportService {
        let notifications = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            &ModerationConfig::default(),
        );
        ReportService::new(
            ReportRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            UserRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_report_own_comment_rejected() {
        let reporter = create_test_user("u1", Role::Member);
        let comment = create_test_comment("c1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![reporter]])
                .append_query_results([vec![comment]])
                .into_connection(),
        );

        let service = service_with(db);
        let filed = service
            .report_comment("c1", "u1", ReportReason::Spam, "self-report")
            .await
            .unwrap();

        assert!(!filed);
    }

    #[tokio::test]
    async fn test_report_missing_comment_rejected() {
        let reporter = create_test_user("u1", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![reporter]])
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let filed = service
            .report_comment("missing", "u1", ReportReason::Spam, "gone")
            .await
            .unwrap();

        assert!(!filed);
    }

    #[tokio::test]
    async fn test_report_user_rejects_self() {
        let reporter = create_test_user("u1", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reporter]])
                .into_connection(),
        );

        let service = service_with(db);
        let filed = service
            .report_user("u1", "u1", ReportReason::Harassment, "self")
            .await
            .unwrap();

        assert!(!filed);
    }

    #[tokio::test]
    async fn test_resolve_is_one_shot() {
        let moderator = create_test_user("m1", Role::SeniorContributor);
        let resolved = create_test_report("r1", ReportStatus::Resolved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![moderator]])
                .append_query_results([vec![resolved]])
                .into_connection(),
        );

        let service = service_with(db);
        let closed = service
            .resolve("r1", "m1", Resolution::Dismissed, None)
            .await
            .unwrap();

        assert!(!closed);
    }

    #[tokio::test]
    async fn test_resolve_user_report_needs_administer() {
        // Senior contributors moderate comments but cannot close user
        // reports.
        let moderator = create_test_user("m1", Role::SeniorContributor);
        let mut report = create_test_report("r1", ReportStatus::Pending);
        report.target_kind = ReportTargetKind::User;
        report.target_id = "u9".to_string();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![moderator]])
                .append_query_results([vec![report]])
                .into_connection(),
        );

        let service = service_with(db);
        let closed = service
            .resolve("r1", "m1", Resolution::Resolved, None)
            .await
            .unwrap();

        assert!(!closed);
    }

    #[tokio::test]
    async fn test_resolve_pending_comment_report() {
        let moderator = create_test_user("m1", Role::SeniorContributor);
        let pending = create_test_report("r1", ReportStatus::Pending);
        let mut closed = pending.clone();
        closed.status = ReportStatus::Resolved;
        closed.resolved_by = Some("m1".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![moderator]])
                .append_query_results([vec![pending]])
                .append_query_results([vec![closed]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .resolve("r1", "m1", Resolution::Resolved, Some("hidden it"))
            .await
            .unwrap();

        assert!(result);
    }
}
