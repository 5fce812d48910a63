//! Comment service - CRUD, reactions and moderation actions.

use sea_orm::Set;
use yomu_common::{AppResult, IdGenerator};
use yomu_db::{
    entities::{
        comment::{self, CommentStatus},
        notification::NotificationPayload,
    },
    repositories::{CommentRepository, UserRepository},
};

use crate::services::notification::NotificationService;
use crate::services::permission::Capabilities;
use crate::services::suspension::SuspensionService;

/// Aggregate comment counts for the moderation dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentCounts {
    pub total: u64,
    pub active: u64,
    pub hidden: u64,
    pub deleted: u64,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    suspensions: SuspensionService,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        user_repo: UserRepository,
        suspensions: SuspensionService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            user_repo,
            suspensions,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment or reply.
    ///
    /// Returns `None` when the author is unknown, cannot comment, is banned
    /// from commenting, the body is empty, or the parent is not an active
    /// top-level comment.
    pub async fn add(
        &self,
        manga_id: &str,
        chapter_id: Option<&str>,
        author_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> AppResult<Option<comment::Model>> {
        let Some(author) = self.user_repo.find_by_id(author_id).await? else {
            return Ok(None);
        };
        if !Capabilities::of(author.role).can_comment {
            return Ok(None);
        }
        if self.suspensions.is_banned_from_commenting(author_id).await? {
            return Ok(None);
        }

        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        if let Some(parent_id) = parent_id {
            let Some(parent) = self.comment_repo.find_by_id(parent_id).await? else {
                return Ok(None);
            };
            // Replies stay one level deep: no replying to a reply.
            if parent.status != CommentStatus::Active || parent.parent_id.is_some() {
                return Ok(None);
            }
        }

        let now = chrono::Utc::now();
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            manga_id: Set(manga_id.to_string()),
            chapter_id: Set(chapter_id.map(str::to_string)),
            user_id: Set(author_id.to_string()),
            content: Set(content.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            is_edited: Set(false),
            parent_id: Set(parent_id.map(str::to_string)),
            likes: Set(serde_json::json!([])),
            dislikes: Set(serde_json::json!([])),
            status: Set(CommentStatus::Active),
            moderated_by: Set(None),
            moderated_at: Set(None),
            moderation_reason: Set(None),
        };

        Ok(Some(self.comment_repo.create(model).await?))
    }

    /// Edit a comment body.
    ///
    /// A comment may be edited at most once, by its author: the
    /// authorization check is ownership and not-yet-edited.
    pub async fn edit(&self, comment_id: &str, editor_id: &str, new_content: &str) -> AppResult<bool> {
        let Some(comment) = self.comment_repo.find_by_id(comment_id).await? else {
            return Ok(false);
        };
        if comment.user_id != editor_id || comment.is_edited {
            return Ok(false);
        }
        if comment.status == CommentStatus::Deleted {
            return Ok(false);
        }

        let new_content = new_content.trim();
        if new_content.is_empty() {
            return Ok(false);
        }

        let mut model: comment::ActiveModel = comment.into();
        model.content = Set(new_content.to_string());
        model.updated_at = Set(chrono::Utc::now().into());
        model.is_edited = Set(true);
        self.comment_repo.update(model).await?;

        Ok(true)
    }

    /// Soft-delete a comment. Terminal.
    ///
    /// Authors delete their own comments; comment moderators may delete any.
    pub async fn delete(&self, comment_id: &str, actor_id: &str) -> AppResult<bool> {
        let Some(comment) = self.comment_repo.find_by_id(comment_id).await? else {
            return Ok(false);
        };
        if comment.status == CommentStatus::Deleted {
            return Ok(false);
        }

        let Some(actor) = self.user_repo.find_by_id(actor_id).await? else {
            return Ok(false);
        };
        let is_owner = comment.user_id == actor_id;
        let is_moderation = !is_owner && Capabilities::of(actor.role).can_moderate_comments;
        if !is_owner && !is_moderation {
            return Ok(false);
        }

        let mut model: comment::ActiveModel = comment.into();
        model.status = Set(CommentStatus::Deleted);
        model.updated_at = Set(chrono::Utc::now().into());
        if is_moderation {
            model.moderated_by = Set(Some(actor_id.to_string()));
            model.moderated_at = Set(Some(chrono::Utc::now().into()));
        }
        self.comment_repo.update(model).await?;

        Ok(true)
    }

    /// Hide an active comment, notifying its author with the reason.
    pub async fn hide(&self, comment_id: &str, moderator_id: &str, reason: &str) -> AppResult<bool> {
        let Some(moderator) = self.user_repo.find_by_id(moderator_id).await? else {
            return Ok(false);
        };
        if !Capabilities::of(moderator.role).can_moderate_comments {
            return Ok(false);
        }

        let Some(comment) = self.comment_repo.find_by_id(comment_id).await? else {
            return Ok(false);
        };
        if comment.status != CommentStatus::Active {
            return Ok(false);
        }

        let author_id = comment.user_id.clone();
        let mut model: comment::ActiveModel = comment.into();
        model.status = Set(CommentStatus::Hidden);
        model.updated_at = Set(chrono::Utc::now().into());
        model.moderated_by = Set(Some(moderator_id.to_string()));
        model.moderated_at = Set(Some(chrono::Utc::now().into()));
        model.moderation_reason = Set(Some(reason.to_string()));
        self.comment_repo.update(model).await?;

        let payload = NotificationPayload::CommentHidden {
            comment_id: comment_id.to_string(),
            reason: reason.to_string(),
        };
        if let Err(e) = self
            .notifications
            .notify(
                &author_id,
                payload,
                "Your comment was hidden",
                &format!("Your comment was hidden because of: {reason}"),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to write comment-hidden notification");
        }

        Ok(true)
    }

    /// Restore a hidden comment, notifying its author.
    pub async fn restore(&self, comment_id: &str, moderator_id: &str) -> AppResult<bool> {
        let Some(moderator) = self.user_repo.find_by_id(moderator_id).await? else {
            return Ok(false);
        };
        if !Capabilities::of(moderator.role).can_moderate_comments {
            return Ok(false);
        }

        let Some(comment) = self.comment_repo.find_by_id(comment_id).await? else {
            return Ok(false);
        };
        if comment.status != CommentStatus::Hidden {
            return Ok(false);
        }

        let author_id = comment.user_id.clone();
        let mut model: comment::ActiveModel = comment.into();
        model.status = Set(CommentStatus::Active);
        model.updated_at = Set(chrono::Utc::now().into());
        model.moderated_by = Set(Some(moderator_id.to_string()));
        model.moderated_at = Set(Some(chrono::Utc::now().into()));
        model.moderation_reason = Set(None);
        self.comment_repo.update(model).await?;

        let payload = NotificationPayload::CommentRestored {
            comment_id: comment_id.to_string(),
        };
        if let Err(e) = self
            .notifications
            .notify(
                &author_id,
                payload,
                "Your comment was restored",
                "Your comment was restored and is visible to everyone again",
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to write comment-restored notification");
        }

        Ok(true)
    }

    /// Toggle the user's like on a comment.
    ///
    /// Clears any dislike by the same user first; a user is never in both
    /// sets.
    pub async fn toggle_like(&self, comment_id: &str, user_id: &str) -> AppResult<bool> {
        self.toggle_reaction(comment_id, user_id, true).await
    }

    /// Toggle the user's dislike on a comment, symmetric to
    /// [`Self::toggle_like`].
    pub async fn toggle_dislike(&self, comment_id: &str, user_id: &str) -> AppResult<bool> {
        self.toggle_reaction(comment_id, user_id, false).await
    }

    async fn toggle_reaction(&self, comment_id: &str, user_id: &str, like: bool) -> AppResult<bool> {
        let Some(comment) = self.comment_repo.find_by_id(comment_id).await? else {
            return Ok(false);
        };
        if comment.status == CommentStatus::Deleted {
            return Ok(false);
        }

        let mut likes = comment.like_ids();
        let mut dislikes = comment.dislike_ids();

        let (toggled, cleared) = if like {
            (&mut likes, &mut dislikes)
        } else {
            (&mut dislikes, &mut likes)
        };

        cleared.retain(|id| id != user_id);
        if toggled.iter().any(|id| id == user_id) {
            toggled.retain(|id| id != user_id);
        } else {
            toggled.push(user_id.to_string());
        }

        let mut model: comment::ActiveModel = comment.into();
        model.likes = Set(serde_json::json!(likes));
        model.dislikes = Set(serde_json::json!(dislikes));
        self.comment_repo.update(model).await?;

        Ok(true)
    }

    /// Active top-level comments for a target, newest first.
    pub async fn list_for_target(
        &self,
        manga_id: &str,
        chapter_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_top_level(manga_id, chapter_id).await
    }

    /// Active replies to a comment, oldest first.
    pub async fn replies_of(&self, parent_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_replies(parent_id).await
    }

    /// Hidden and deleted comments for the moderation queue.
    pub async fn list_moderated(&self, limit: u64, offset: u64) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_moderated(limit, offset).await
    }

    /// All comments by one user, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_user(user_id).await
    }

    /// Aggregate comment counts.
    pub async fn counts(&self) -> AppResult<CommentCounts> {
        Ok(CommentCounts {
            total: self.comment_repo.count().await?,
            active: self.comment_repo.count_by_status(CommentStatus::Active).await?,
            hidden: self.comment_repo.count_by_status(CommentStatus::Hidden).await?,
            deleted: self.comment_repo.count_by_status(CommentStatus::Deleted).await?,
        })
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
    use yomu_db::entities::user::{self, Role};
    use yomu_db::repositories::{NotificationRepository, SuspensionRepository};

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

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> CommentService {
        let notifications = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            &ModerationConfig::default(),
        );
        let suspensions = SuspensionService::new(
            SuspensionRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            notifications.clone(),
        );
        CommentService::new(
            CommentRepository::new(db.clone()),
            UserRepository::new(db),
            suspensions,
            notifications,
        )
    }

    #[tokio::test]
    async fn test_edit_rejects_non_author() {
        let comment = create_test_comment("c1", "author1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );

        let service = service_with(db);
        let edited = service.edit("c1", "someone-else", "New body").await.unwrap();

        assert!(!edited);
    }

    #[tokio::test]
    async fn test_edit_rejects_second_edit() {
        // Single-edit policy: once is_edited is set, further edits fail even
        // for the author.
        let mut comment = create_test_comment("c1", "author1");
        comment.is_edited = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );

        let service = service_with(db);
        let edited = service.edit("c1", "author1", "New body").await.unwrap();

        assert!(!edited);
    }

    #[tokio::test]
    async fn test_edit_rejects_empty_body() {
        let comment = create_test_comment("c1", "author1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );

        let service = service_with(db);
        let edited = service.edit("c1", "author1", "   ").await.unwrap();

        assert!(!edited);
    }

    #[tokio::test]
    async fn test_edit_succeeds_for_author() {
        let comment = create_test_comment("c1", "author1");
        let mut updated = comment.clone();
        updated.content = "New body".to_string();
        updated.is_edited = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![comment], vec![updated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        let edited = service.edit("c1", "author1", "New body").await.unwrap();

        assert!(edited);
    }

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let mut comment = create_test_comment("c1", "author1");
        comment.status = CommentStatus::Deleted;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );

        let service = service_with(db);
        let deleted = service.delete("c1", "author1").await.unwrap();

        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_delete_rejects_stranger() {
        let comment = create_test_comment("c1", "author1");
        let stranger = create_test_user("u2", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![comment]])
                .append_query_results([vec![stranger]])
                .into_connection(),
        );

        let service = service_with(db);
        let deleted = service.delete("c1", "u2").await.unwrap();

        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_hide_rejects_non_moderator() {
        let member = create_test_user("u1", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[member]])
                .into_connection(),
        );

        let service = service_with(db);
        let hidden = service.hide("c1", "u1", "spam").await.unwrap();

        assert!(!hidden);
    }

    #[tokio::test]
    async fn test_restore_requires_hidden_state() {
        // Restoring an active comment is a no-op failure.
        let moderator = create_test_user("m1", Role::SeniorContributor);
        let comment = create_test_comment("c1", "author1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![moderator]])
                .append_query_results([vec![comment]])
                .into_connection(),
        );

        let service = service_with(db);
        let restored = service.restore("c1", "m1").await.unwrap();

        assert!(!restored);
    }

    #[tokio::test]
    async fn test_toggle_like_adds_and_clears_dislike() {
        let mut comment = create_test_comment("c1", "author1");
        comment.dislikes = json!(["u1"]);
        let mut updated = comment.clone();
        updated.likes = json!(["u1"]);
        updated.dislikes = json!([]);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![comment], vec![updated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        let toggled = service.toggle_like("c1", "u1").await.unwrap();

        assert!(toggled);
    }

    #[tokio::test]
    async fn test_toggle_like_on_missing_comment() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let toggled = service.toggle_like("missing", "u1").await.unwrap();

        assert!(!toggled);
    }

    #[tokio::test]
    async fn test_toggle_like_twice_round_trips() {
        // Like then unlike returns the like set to its original state.
        let comment = create_test_comment("c1", "author1");
        let mut liked = comment.clone();
        liked.likes = json!(["u1"]);
        let unliked = comment.clone();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![comment],
                    vec![liked.clone()],
                    vec![liked],
                    vec![unliked],
                ])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = service_with(db);
        assert!(service.toggle_like("c1", "u1").await.unwrap());
        assert!(service.toggle_like("c1", "u1").await.unwrap());
    }
}
