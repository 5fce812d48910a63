//! Content submission and review pipeline.

use std::sync::Arc;

use sea_orm::Set;
use yomu_common::{AppResult, IdGenerator};
use yomu_db::{
    entities::{
        notification::NotificationPayload,
        pending_content::{self, ContentKind, SubmissionStatus},
    },
    repositories::{FavoriteRepository, PendingContentRepository, UserRepository},
};

use crate::services::catalog::Catalog;
use crate::services::notification::NotificationService;
use crate::services::permission::{Capabilities, upload_requires_approval};

/// What happened to a submission.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// Published straight into the catalog (group leaders and above).
    Published {
        /// Live catalog id of the new content.
        content_id: String,
    },
    /// Queued for review (lower upload-capable ranks).
    Queued(pending_content::Model),
}

/// Submission service for the content moderation pipeline.
#[derive(Clone)]
pub struct SubmissionService {
    pending_repo: PendingContentRepository,
    user_repo: UserRepository,
    favorite_repo: FavoriteRepository,
    catalog: Arc<dyn Catalog>,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl SubmissionService {
    /// Create a new submission service.
    #[must_use]
    pub fn new(
        pending_repo: PendingContentRepository,
        user_repo: UserRepository,
        favorite_repo: FavoriteRepository,
        catalog: Arc<dyn Catalog>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            pending_repo,
            user_repo,
            favorite_repo,
            catalog,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit content, routing by the submitter's rank.
    ///
    /// Returns `None` when the submitter is unknown or cannot upload.
    pub async fn submit(
        &self,
        kind: ContentKind,
        payload: serde_json::Value,
        submitter_id: &str,
    ) -> AppResult<Option<SubmissionOutcome>> {
        let Some(submitter) = self.user_repo.find_by_id(submitter_id).await? else {
            return Ok(None);
        };
        if !Capabilities::of(submitter.role).can_upload {
            return Ok(None);
        }

        if !upload_requires_approval(submitter.role) {
            let content_id = self
                .catalog
                .materialize(kind, payload.clone(), submitter_id)
                .await?;
            self.fan_out_new_chapter(kind, &payload, &content_id).await;
            return Ok(Some(SubmissionOutcome::Published { content_id }));
        }

        let model = pending_content::ActiveModel {
            id: Set(self.id_gen.generate()),
            kind: Set(kind),
            payload: Set(payload),
            submitted_by: Set(submitter_id.to_string()),
            submitted_at: Set(chrono::Utc::now().into()),
            status: Set(SubmissionStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            review_notes: Set(None),
        };

        let pending = self.pending_repo.create(model).await?;

        let admin_payload = NotificationPayload::ContentPending {
            content_id: pending.id.clone(),
            kind,
            submitted_by: submitter_id.to_string(),
        };
        if let Err(e) = self
            .notifications
            .notify_administrators(
                &admin_payload,
                "New content awaiting review",
                &format!(
                    "{} submitted a {} for review",
                    submitter.name,
                    kind.label()
                ),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to notify administrators of pending content");
        }

        let ack = NotificationPayload::ContentPending {
            content_id: pending.id.clone(),
            kind,
            submitted_by: submitter_id.to_string(),
        };
        if let Err(e) = self
            .notifications
            .notify(
                submitter_id,
                ack,
                "Submission received",
                &format!("Your {} was submitted and is awaiting review", kind.label()),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to write submission acknowledgement");
        }

        Ok(Some(SubmissionOutcome::Queued(pending)))
    }

    /// Approve a pending submission.
    ///
    /// One-shot: returns `false` when the reviewer lacks the capability or
    /// the submission is not pending anymore.
    pub async fn approve(
        &self,
        content_id: &str,
        reviewer_id: &str,
        notes: Option<&str>,
    ) -> AppResult<bool> {
        let Some(pending) = self.reviewable(content_id, reviewer_id).await? else {
            return Ok(false);
        };

        let kind = pending.kind;
        let payload = pending.payload.clone();
        let submitted_by = pending.submitted_by.clone();

        let mut model: pending_content::ActiveModel = pending.into();
        model.status = Set(SubmissionStatus::Approved);
        model.reviewed_by = Set(Some(reviewer_id.to_string()));
        model.reviewed_at = Set(Some(chrono::Utc::now().into()));
        model.review_notes = Set(notes.map(String::from));
        self.pending_repo.update(model).await?;

        let live_id = self
            .catalog
            .materialize(kind, payload.clone(), &submitted_by)
            .await?;

        let title = content_title(&payload);
        let payload_out = NotificationPayload::ContentApproved {
            content_id: content_id.to_string(),
            kind,
        };
        if let Err(e) = self
            .notifications
            .notify(
                &submitted_by,
                payload_out,
                "Your submission was approved",
                &format!("The {} \"{title}\" you uploaded was approved", kind.label()),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to write approval notification");
        }

        self.fan_out_new_chapter(kind, &payload, &live_id).await;

        Ok(true)
    }

    /// Reject a pending submission.
    ///
    /// One-shot, symmetric to [`Self::approve`]; the rejection notes reach
    /// the submitter (default message when omitted).
    pub async fn reject(
        &self,
        content_id: &str,
        reviewer_id: &str,
        notes: Option<&str>,
    ) -> AppResult<bool> {
        let Some(pending) = self.reviewable(content_id, reviewer_id).await? else {
            return Ok(false);
        };

        let kind = pending.kind;
        let payload = pending.payload.clone();
        let submitted_by = pending.submitted_by.clone();

        let mut model: pending_content::ActiveModel = pending.into();
        model.status = Set(SubmissionStatus::Rejected);
        model.reviewed_by = Set(Some(reviewer_id.to_string()));
        model.reviewed_at = Set(Some(chrono::Utc::now().into()));
        model.review_notes = Set(notes.map(String::from));
        self.pending_repo.update(model).await?;

        let reason = notes.map_or_else(|| "No reason given".to_string(), str::to_string);
        let title = content_title(&payload);
        let payload_out = NotificationPayload::ContentRejected {
            content_id: content_id.to_string(),
            kind,
            notes: reason.clone(),
        };
        if let Err(e) = self
            .notifications
            .notify(
                &submitted_by,
                payload_out,
                "Your submission was rejected",
                &format!(
                    "The {} \"{title}\" you uploaded was rejected. Reason: {reason}",
                    kind.label()
                ),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to write rejection notification");
        }

        Ok(true)
    }

    /// List submissions with optional status filter, newest first.
    pub async fn list(
        &self,
        status: Option<SubmissionStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<pending_content::Model>> {
        self.pending_repo.list(status, limit, offset).await
    }

    /// Count submissions awaiting review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.pending_repo.count_pending().await
    }

    /// A user's own submissions, newest first.
    pub async fn list_by_submitter(&self, user_id: &str) -> AppResult<Vec<pending_content::Model>> {
        self.pending_repo.find_by_submitter(user_id).await
    }

    /// Fetch a submission if the reviewer may review it and it is still
    /// pending.
    async fn reviewable(
        &self,
        content_id: &str,
        reviewer_id: &str,
    ) -> AppResult<Option<pending_content::Model>> {
        let Some(reviewer) = self.user_repo.find_by_id(reviewer_id).await? else {
            return Ok(None);
        };
        if !Capabilities::of(reviewer.role).can_administer {
            return Ok(None);
        }

        let Some(pending) = self.pending_repo.find_by_id(content_id).await? else {
            return Ok(None);
        };
        if pending.status != SubmissionStatus::Pending {
            return Ok(None);
        }

        Ok(Some(pending))
    }

    /// Tell everyone who favorited the manga about a newly published
    /// chapter. Best-effort.
    async fn fan_out_new_chapter(
        &self,
        kind: ContentKind,
        payload: &serde_json::Value,
        content_id: &str,
    ) {
        if kind != ContentKind::Chapter {
            return;
        }
        let Some(manga_id) = payload.get("manga_id").and_then(serde_json::Value::as_str) else {
            return;
        };

        let favorites = match self.favorite_repo.find_by_manga(manga_id).await {
            Ok(favorites) => favorites,
            Err(e) => {
                tracing::warn!(error = %e, manga_id = %manga_id, "Failed to load favoriters for fan-out");
                return;
            }
        };

        for favorite in favorites {
            let payload = NotificationPayload::NewChapter {
                manga_id: manga_id.to_string(),
                content_id: content_id.to_string(),
            };
            if let Err(e) = self
                .notifications
                .notify(
                    &favorite.user_id,
                    payload,
                    "New chapter available",
                    "A manga in your favorites has a new chapter",
                )
                .await
            {
                tracing::warn!(error = %e, user_id = %favorite.user_id, "Failed to write new-chapter notification");
            }
        }
    }
}

/// Best-effort human-readable name from a payload snapshot.
fn content_title(payload: &serde_json::Value) -> String {
    payload
        .get("title")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("untitled")
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Mutex;
    use yomu_common::config::ModerationConfig;
    use yomu_db::entities::user::{self, Role};
    use yomu_db::repositories::NotificationRepository;

    /// Catalog fake that records materialize calls.
    struct RecordingCatalog {
        materialized: Mutex<Vec<(ContentKind, String)>>,
    }

    impl RecordingCatalog {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                materialized: Mutex::new(Vec::new()),
            })
        }

        fn count(&self) -> usize {
            self.materialized.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Catalog for RecordingCatalog {
        async fn materialize(
            &self,
            kind: ContentKind,
            _payload: serde_json::Value,
            created_by: &str,
        ) -> AppResult<String> {
            self.materialized
                .lock()
                .unwrap()
                .push((kind, created_by.to_string()));
            Ok("content-1".to_string())
        }
    }

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

    fn create_test_pending(id: &str, submitted_by: &str, status: SubmissionStatus) -> pending_content::Model {
        pending_content::Model {
            id: id.to_string(),
            kind: ContentKind::Title,
            payload: json!({"title": "Solo Climber"}),
            submitted_by: submitted_by.to_string(),
            submitted_at: Utc::now().into(),
            status,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
        }
    }

    fn service_with(
        db: Arc<sea_orm::DatabaseConnection>,
        catalog: Arc<dyn Catalog>,
    ) -> SubmissionService {
        let notifications = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            &ModerationConfig::default(),
        );
        SubmissionService::new(
            PendingContentRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            FavoriteRepository::new(db),
            catalog,
            notifications,
        )
    }

    #[tokio::test]
    async fn test_submit_rejects_non_uploader() {
        let member = create_test_user("u1", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[member]])
                .into_connection(),
        );

        let catalog = RecordingCatalog::new();
        let service = service_with(db, catalog.clone());

        let outcome = service
            .submit(ContentKind::Title, json!({"title": "X"}), "u1")
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(catalog.count(), 0);
    }

    #[tokio::test]
    async fn test_submit_publishes_directly_for_group_leader() {
        let leader = create_test_user("u1", Role::GroupLeader);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[leader]])
                .into_connection(),
        );

        let catalog = RecordingCatalog::new();
        let service = service_with(db, catalog.clone());

        let outcome = service
            .submit(ContentKind::Title, json!({"title": "X"}), "u1")
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            Some(SubmissionOutcome::Published { content_id }) if content_id == "content-1"
        ));
        assert_eq!(catalog.count(), 1);
    }

    #[tokio::test]
    async fn test_approve_rejects_non_admin_reviewer() {
        let leader = create_test_user("u1", Role::GroupLeader);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[leader]])
                .into_connection(),
        );

        let catalog = RecordingCatalog::new();
        let service = service_with(db, catalog.clone());

        let approved = service.approve("p1", "u1", None).await.unwrap();

        assert!(!approved);
        assert_eq!(catalog.count(), 0);
    }

    #[tokio::test]
    async fn test_approve_is_one_shot() {
        // A second approve on an already-approved submission fails and does
        // not materialize again.
        let admin = create_test_user("a1", Role::Moderator);
        let approved = create_test_pending("p1", "u1", SubmissionStatus::Approved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![admin]])
                .append_query_results([vec![approved]])
                .into_connection(),
        );

        let catalog = RecordingCatalog::new();
        let service = service_with(db, catalog.clone());

        let result = service.approve("p1", "a1", None).await.unwrap();

        assert!(!result);
        assert_eq!(catalog.count(), 0);
    }

    #[tokio::test]
    async fn test_reject_missing_submission() {
        let admin = create_test_user("a1", Role::Moderator);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![admin]])
                .append_query_results([Vec::<pending_content::Model>::new()])
                .into_connection(),
        );

        let catalog = RecordingCatalog::new();
        let service = service_with(db, catalog);

        let result = service.reject("missing", "a1", Some("duplicate")).await.unwrap();

        assert!(!result);
    }

    #[test]
    fn test_content_title_fallback() {
        assert_eq!(content_title(&json!({"title": "Solo Climber"})), "Solo Climber");
        assert_eq!(content_title(&json!({})), "untitled");
    }
}
