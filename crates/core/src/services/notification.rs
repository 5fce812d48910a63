//! Notification fan-out service.
//!
//! Pure sink: the other services are the only producers. Writes here are
//! advisory - callers log and continue when a notification cannot be
//! written.

use yomu_common::config::ModerationConfig;
use yomu_common::{AppError, AppResult, IdGenerator};
use yomu_db::{
    entities::notification::{self, NotificationPayload},
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::Set;

/// Notification service for per-user inboxes.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    inbox_cap: u64,
    fallback_recipient: Option<String>,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub fn new(
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        moderation: &ModerationConfig,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            inbox_cap: moderation.notification_inbox_cap,
            fallback_recipient: moderation.fallback_recipient.clone(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Append a notification to a user's inbox.
    ///
    /// Evicts the oldest entries once the inbox exceeds its cap and keeps
    /// the recipient's denormalized unread counter in step.
    pub async fn notify(
        &self,
        recipient_id: &str,
        payload: NotificationPayload,
        title: &str,
        message: &str,
    ) -> AppResult<notification::Model> {
        let encoded =
            serde_json::to_value(&payload).map_err(|e| AppError::Internal(e.to_string()))?;

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            notification_type: Set(payload.notification_type()),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            payload: Set(encoded),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.notification_repo.create(model).await?;

        let evicted = self
            .notification_repo
            .trim_to_cap(recipient_id, self.inbox_cap)
            .await?;
        if evicted > 0 {
            tracing::debug!(recipient_id = %recipient_id, evicted = evicted, "Evicted old notifications");
        }

        self.sync_unread_counter(recipient_id).await?;

        Ok(created)
    }

    /// Notify every user holding an administrator-capable role.
    ///
    /// Falls back to the configured recipient only when no administrator
    /// account exists (fresh database).
    pub async fn notify_administrators(
        &self,
        payload: &NotificationPayload,
        title: &str,
        message: &str,
    ) -> AppResult<()> {
        let administrators = self.user_repo.find_administrators().await?;

        if administrators.is_empty() {
            if let Some(ref fallback) = self.fallback_recipient {
                self.notify(fallback, payload.clone(), title, message)
                    .await?;
            } else {
                tracing::warn!("No administrator to notify and no fallback recipient configured");
            }
            return Ok(());
        }

        for admin in administrators {
            self.notify(&admin.id, payload.clone(), title, message)
                .await?;
        }

        Ok(())
    }

    /// Get notifications for a user, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_user(user_id, limit, until_id, unread_only)
            .await
    }

    /// Mark a notification as read. Returns `false` when the notification
    /// does not exist or belongs to someone else.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> AppResult<bool> {
        let Some(notification) = self.notification_repo.find_by_id(notification_id).await? else {
            return Ok(false);
        };
        if notification.recipient_id != user_id {
            return Ok(false);
        }

        if !notification.is_read {
            self.notification_repo.mark_as_read(notification_id).await?;
            self.sync_unread_counter(user_id).await?;
        }
        Ok(true)
    }

    /// Mark all notifications as read for a user. Returns how many flipped.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        let flipped = self.notification_repo.mark_all_as_read(user_id).await?;
        if flipped > 0 {
            self.sync_unread_counter(user_id).await?;
        }
        Ok(flipped)
    }

    /// Count unread notifications for a user.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Remove a user's whole inbox (account deletion cleanup).
    pub async fn purge_user(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.delete_all_for_user(user_id).await
    }

    async fn sync_unread_counter(&self, user_id: &str) -> AppResult<()> {
        let unread = self.notification_repo.count_unread(user_id).await?;
        self.user_repo
            .set_unread_count(user_id, i32::try_from(unread).unwrap_or(i32::MAX))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;
    use yomu_db::entities::notification::NotificationType;

    fn moderation_config() -> ModerationConfig {
        ModerationConfig {
            notification_inbox_cap: 50,
            fallback_recipient: Some("system-admin".to_string()),
        }
    }

    fn create_test_notification(id: &str, recipient_id: &str, is_read: bool) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            notification_type: NotificationType::CommentHidden,
            title: "Your comment was hidden".to_string(),
            message: "Your comment was hidden because of: spam".to_string(),
            payload: json!({"type": "comment_hidden", "comment_id": "c1", "reason": "spam"}),
            is_read,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_mark_read_rejects_foreign_notification() {
        let theirs = create_test_notification("n1", "someone-else", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[theirs]])
                .into_connection(),
        );

        let service = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db),
            &moderation_config(),
        );

        let result = service.mark_read("user1", "n1").await.unwrap();
        assert!(!result);
    }

    #[tokio::test]
    async fn test_mark_read_missing_notification() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );

        let service = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db),
            &moderation_config(),
        );

        let result = service.mark_read("user1", "missing").await.unwrap();
        assert!(!result);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent_on_read_notification() {
        // Already-read notification: ownership holds, nothing to flip.
        let read = create_test_notification("n1", "user1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[read]])
                .into_connection(),
        );

        let service = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db),
            &moderation_config(),
        );

        let result = service.mark_read("user1", "n1").await.unwrap();
        assert!(result);
    }

    #[tokio::test]
    async fn test_unread_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Into::<sea_orm::Value>::into(3i64),
                }]])
                .into_connection(),
        );

        let service = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db),
            &moderation_config(),
        );

        let count = service.unread_count("user1").await.unwrap();
        assert_eq!(count, 3);
    }
}
