//! Suspension service - site-wide and comment-only bans.

use sea_orm::Set;
use yomu_common::{AppResult, IdGenerator};
use yomu_db::{
    entities::{
        notification::NotificationPayload,
        suspension::{self, SuspensionDuration, SuspensionKind},
    },
    repositories::{SuspensionRepository, UserRepository},
};

use crate::services::notification::NotificationService;
use crate::services::permission::Capabilities;

/// Actor recorded when lazy expiry clears a suspension.
const SYSTEM_ACTOR: &str = "system";

/// Suspension service for issuing, lifting and checking bans.
#[derive(Clone)]
pub struct SuspensionService {
    suspension_repo: SuspensionRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl SuspensionService {
    /// Create a new suspension service.
    #[must_use]
    pub const fn new(
        suspension_repo: SuspensionRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            suspension_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Issue a suspension.
    ///
    /// Returns `false` when the issuer lacks the capability, the target is
    /// unknown, the reason is empty, a temporary ban has no day count, or an
    /// active suspension of the same kind already exists.
    pub async fn issue(
        &self,
        user_id: &str,
        moderator_id: &str,
        kind: SuspensionKind,
        reason: &str,
        duration: SuspensionDuration,
        days: Option<i64>,
    ) -> AppResult<bool> {
        let Some(moderator) = self.user_repo.find_by_id(moderator_id).await? else {
            return Ok(false);
        };
        if !Self::may_moderate(kind, Capabilities::of(moderator.role)) {
            return Ok(false);
        }

        // Moderators cannot ban themselves.
        if moderator_id == user_id {
            return Ok(false);
        }

        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Ok(false);
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Ok(false);
        }

        let expires_at = match (duration, days) {
            (SuspensionDuration::Temporary, Some(days)) if days > 0 => {
                Some(chrono::Utc::now() + chrono::Duration::days(days))
            }
            (SuspensionDuration::Temporary, _) => return Ok(false),
            (SuspensionDuration::Permanent, _) => None,
        };

        let model = suspension::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            moderator_id: Set(moderator_id.to_string()),
            kind: Set(kind),
            reason: Set(reason.to_string()),
            duration: Set(duration),
            created_at: Set(chrono::Utc::now().into()),
            expires_at: Set(expires_at.map(Into::into)),
            is_active: Set(true),
            lifted_at: Set(None),
            lifted_by: Set(None),
        };

        if !self.suspension_repo.insert_if_no_active(model).await? {
            return Ok(false);
        }

        let (title, message) = ban_notice(kind, duration, days, reason);
        let payload = NotificationPayload::Banned {
            kind,
            duration,
            days,
            reason: reason.to_string(),
            banned_by: moderator_id.to_string(),
        };
        if let Err(e) = self.notifications.notify(user_id, payload, &title, &message).await {
            tracing::warn!(error = %e, user_id = %user_id, "Failed to write ban notification");
        }

        Ok(true)
    }

    /// Lift an active suspension.
    ///
    /// Returns `false` when the actor lacks the capability or no active
    /// suspension of the kind exists (an expired one counts as none).
    pub async fn lift(&self, user_id: &str, actor_id: &str, kind: SuspensionKind) -> AppResult<bool> {
        let Some(actor) = self.user_repo.find_by_id(actor_id).await? else {
            return Ok(false);
        };
        if !Self::may_moderate(kind, Capabilities::of(actor.role)) {
            return Ok(false);
        }

        let Some(active) = self.check(user_id, kind).await? else {
            return Ok(false);
        };

        self.suspension_repo.deactivate(active, actor_id).await?;

        let (title, message) = match kind {
            SuspensionKind::Site => (
                "Your ban was lifted",
                "The ban on your account was lifted. You can use the site normally again.",
            ),
            SuspensionKind::Comment => (
                "Your comment ban was lifted",
                "The ban on your commenting was lifted. You can write comments again.",
            ),
        };
        let payload = NotificationPayload::Unbanned {
            kind,
            lifted_by: actor_id.to_string(),
        };
        if let Err(e) = self.notifications.notify(user_id, payload, title, message).await {
            tracing::warn!(error = %e, user_id = %user_id, "Failed to write unban notification");
        }

        Ok(true)
    }

    /// The active suspension of a kind for a user, if any.
    ///
    /// Lazy expiry: the first read observing a passed expiry flips the
    /// suspension inactive (actor "system") and reports no suspension. No
    /// notification is written on auto-expiry.
    pub async fn check(
        &self,
        user_id: &str,
        kind: SuspensionKind,
    ) -> AppResult<Option<suspension::Model>> {
        let Some(active) = self.suspension_repo.find_active_flagged(user_id, kind).await? else {
            return Ok(None);
        };

        if active.is_expired_at(chrono::Utc::now()) {
            self.suspension_repo.deactivate(active, SYSTEM_ACTOR).await?;
            return Ok(None);
        }

        Ok(Some(active))
    }

    /// Whether a user is currently banned from the site.
    pub async fn is_suspended(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.check(user_id, SuspensionKind::Site).await?.is_some())
    }

    /// Whether a user is currently banned from commenting.
    pub async fn is_banned_from_commenting(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.check(user_id, SuspensionKind::Comment).await?.is_some())
    }

    /// All unexpired active suspensions of a kind.
    pub async fn list_active(
        &self,
        kind: SuspensionKind,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<suspension::Model>> {
        self.suspension_repo.find_active(kind, limit, offset).await
    }

    /// Full suspension history for a user, newest first.
    pub async fn history(&self, user_id: &str) -> AppResult<Vec<suspension::Model>> {
        self.suspension_repo.find_for_user(user_id).await
    }

    const fn may_moderate(kind: SuspensionKind, capabilities: Capabilities) -> bool {
        match kind {
            SuspensionKind::Site => capabilities.can_administer,
            SuspensionKind::Comment => capabilities.can_moderate_comments,
        }
    }
}

fn ban_notice(
    kind: SuspensionKind,
    duration: SuspensionDuration,
    days: Option<i64>,
    reason: &str,
) -> (String, String) {
    let title = match kind {
        SuspensionKind::Site => "You have been banned from the site",
        SuspensionKind::Comment => "You have been banned from commenting",
    };

    let span = match (duration, days) {
        (SuspensionDuration::Permanent, _) => "permanently".to_string(),
        (SuspensionDuration::Temporary, Some(days)) => format!("for {days} days"),
        (SuspensionDuration::Temporary, None) => "temporarily".to_string(),
    };

    let message = match kind {
        SuspensionKind::Site => format!("You have been banned {span}. Reason: {reason}"),
        SuspensionKind::Comment => {
            format!("You have been banned from writing comments {span}. Reason: {reason}")
        }
    };

    (title.to_string(), message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use yomu_common::config::ModerationConfig;
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

    fn create_test_suspension(
        user_id: &str,
        kind: SuspensionKind,
        duration: SuspensionDuration,
        expires_at: Option<chrono::DateTime<Utc>>,
    ) -> suspension::Model {
        suspension::Model {
            id: "s1".to_string(),
            user_id: user_id.to_string(),
            moderator_id: "mod1".to_string(),
            kind,
            reason: "Repeated spam".to_string(),
            duration,
            created_at: Utc::now().into(),
            expires_at: expires_at.map(Into::into),
            is_active: true,
            lifted_at: None,
            lifted_by: None,
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> SuspensionService {
        let notifications = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            &ModerationConfig::default(),
        );
        SuspensionService::new(
            SuspensionRepository::new(db.clone()),
            UserRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_issue_rejects_non_moderator() {
        // Members cannot issue site bans.
        let member = create_test_user("u1", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[member]])
                .into_connection(),
        );

        let service = service_with(db);
        let issued = service
            .issue(
                "u2",
                "u1",
                SuspensionKind::Site,
                "Spam",
                SuspensionDuration::Permanent,
                None,
            )
            .await
            .unwrap();

        assert!(!issued);
    }

    #[tokio::test]
    async fn test_issue_rejects_senior_contributor_for_site_ban() {
        // Comment moderators cannot issue site-wide bans.
        let senior = create_test_user("u1", Role::SeniorContributor);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[senior]])
                .into_connection(),
        );

        let service = service_with(db);
        let issued = service
            .issue(
                "u2",
                "u1",
                SuspensionKind::Site,
                "Spam",
                SuspensionDuration::Permanent,
                None,
            )
            .await
            .unwrap();

        assert!(!issued);
    }

    #[tokio::test]
    async fn test_issue_rejects_self_ban() {
        let admin = create_test_user("a1", Role::Moderator);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );

        let service = service_with(db);
        let issued = service
            .issue(
                "a1",
                "a1",
                SuspensionKind::Site,
                "Spam",
                SuspensionDuration::Permanent,
                None,
            )
            .await
            .unwrap();

        assert!(!issued);
    }

    #[tokio::test]
    async fn test_issue_rejects_empty_reason() {
        let admin = create_test_user("a1", Role::Moderator);
        let target = create_test_user("u2", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![admin], vec![target]])
                .into_connection(),
        );

        let service = service_with(db);
        let issued = service
            .issue(
                "u2",
                "a1",
                SuspensionKind::Site,
                "   ",
                SuspensionDuration::Permanent,
                None,
            )
            .await
            .unwrap();

        assert!(!issued);
    }

    #[tokio::test]
    async fn test_issue_rejects_temporary_without_days() {
        let admin = create_test_user("a1", Role::Moderator);
        let target = create_test_user("u2", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![admin], vec![target]])
                .into_connection(),
        );

        let service = service_with(db);
        let issued = service
            .issue(
                "u2",
                "a1",
                SuspensionKind::Site,
                "Spam",
                SuspensionDuration::Temporary,
                None,
            )
            .await
            .unwrap();

        assert!(!issued);
    }

    #[tokio::test]
    async fn test_check_reports_active_suspension() {
        let ban = create_test_suspension(
            "u1",
            SuspensionKind::Site,
            SuspensionDuration::Permanent,
            None,
        );

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ban.clone()]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.check("u1", SuspensionKind::Site).await.unwrap();

        assert_eq!(result, Some(ban));
    }

    #[tokio::test]
    async fn test_check_clears_expired_suspension() {
        let expired = create_test_suspension(
            "u1",
            SuspensionKind::Site,
            SuspensionDuration::Temporary,
            Some(Utc::now() - Duration::days(1)),
        );
        let mut lifted = expired.clone();
        lifted.is_active = false;
        lifted.lifted_by = Some(SYSTEM_ACTOR.to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![expired], vec![lifted]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.check("u1", SuspensionKind::Site).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_not_suspended_without_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<suspension::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        assert!(!service.is_suspended("u1").await.unwrap());
    }

    #[test]
    fn test_ban_notice_wording() {
        let (title, message) = ban_notice(
            SuspensionKind::Site,
            SuspensionDuration::Temporary,
            Some(7),
            "Spam",
        );
        assert_eq!(title, "You have been banned from the site");
        assert!(message.contains("for 7 days"));
        assert!(message.contains("Spam"));

        let (title, message) = ban_notice(
            SuspensionKind::Comment,
            SuspensionDuration::Permanent,
            None,
            "Harassment",
        );
        assert_eq!(title, "You have been banned from commenting");
        assert!(message.contains("permanently"));
        assert!(message.contains("Harassment"));
    }
}
