//! User service - registration, roles and account lifecycle.

use sea_orm::Set;
use yomu_common::{AppResult, IdGenerator};
use yomu_db::{
    entities::{
        notification::NotificationPayload,
        user::{self, Role},
    },
    repositories::{
        CommentRepository, FavoriteRepository, PendingContentRepository, ReportRepository,
        SuspensionRepository, UserRepository,
    },
};

use crate::services::notification::NotificationService;
use crate::services::permission::Capabilities;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    suspension_repo: SuspensionRepository,
    comment_repo: CommentRepository,
    report_repo: ReportRepository,
    pending_repo: PendingContentRepository,
    favorite_repo: FavoriteRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        suspension_repo: SuspensionRepository,
        comment_repo: CommentRepository,
        report_repo: ReportRepository,
        pending_repo: PendingContentRepository,
        favorite_repo: FavoriteRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            user_repo,
            suspension_repo,
            comment_repo,
            report_repo,
            pending_repo,
            favorite_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new member.
    ///
    /// No credential handling here: identity is established upstream.
    /// Returns `None` when the email is taken or the fields are empty.
    pub async fn register(&self, name: &str, email: &str) -> AppResult<Option<user::Model>> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || !email.contains('@') {
            return Ok(None);
        }

        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let now = chrono::Utc::now();
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            role: Set(Role::Member),
            unread_count: Set(0),
            created_at: Set(now.into()),
            last_login: Set(now.into()),
        };

        let created = self.user_repo.create(model).await?;

        let payload = NotificationPayload::NewUserRegistration {
            user_id: created.id.clone(),
        };
        if let Err(e) = self
            .notifications
            .notify_administrators(
                &payload,
                "New user",
                &format!("A new user joined: {} ({})", created.name, created.email),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to notify administrators of registration");
        }

        Ok(Some(created))
    }

    /// Change a user's role.
    ///
    /// Requires `can_administer`; any administrator may assign any role,
    /// including the top rank. The target learns about it through a
    /// role-change notification naming both labels.
    pub async fn change_role(
        &self,
        target_id: &str,
        new_role: Role,
        actor_id: &str,
    ) -> AppResult<bool> {
        let Some(actor) = self.user_repo.find_by_id(actor_id).await? else {
            return Ok(false);
        };
        if !Capabilities::of(actor.role).can_administer {
            return Ok(false);
        }

        let Some(target) = self.user_repo.find_by_id(target_id).await? else {
            return Ok(false);
        };

        let old_role = target.role;
        let mut model: user::ActiveModel = target.into();
        model.role = Set(new_role);
        self.user_repo.update(model).await?;

        let payload = NotificationPayload::RoleChanged {
            old_role,
            new_role,
            changed_by: actor_id.to_string(),
        };
        if let Err(e) = self
            .notifications
            .notify(
                target_id,
                payload,
                "Your rank was changed",
                &format!(
                    "Your rank was changed from {} to {}",
                    old_role.label(),
                    new_role.label()
                ),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to write role-change notification");
        }

        Ok(true)
    }

    /// Delete a user account and everything that references it.
    ///
    /// Admin-only. The cascade is explicit: suspensions, authored comments,
    /// filed reports, submissions, favorites and the inbox all go.
    pub async fn delete_user(&self, target_id: &str, actor_id: &str) -> AppResult<bool> {
        let Some(actor) = self.user_repo.find_by_id(actor_id).await? else {
            return Ok(false);
        };
        if !Capabilities::of(actor.role).can_administer {
            return Ok(false);
        }
        if actor_id == target_id {
            return Ok(false);
        }
        if self.user_repo.find_by_id(target_id).await?.is_none() {
            return Ok(false);
        }

        self.suspension_repo.delete_for_user(target_id).await?;
        self.comment_repo.delete_by_author(target_id).await?;
        self.report_repo.delete_by_reporter(target_id).await?;
        self.pending_repo.delete_by_submitter(target_id).await?;
        self.favorite_repo.delete_for_user(target_id).await?;
        self.notifications.purge_user(target_id).await?;

        self.user_repo.delete(target_id).await
    }

    /// Stamp a login. Returns whether the user exists.
    pub async fn record_login(&self, user_id: &str) -> AppResult<bool> {
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Ok(false);
        }
        self.user_repo.set_last_login(user_id).await?;
        Ok(true)
    }

    /// Find a user by id.
    pub async fn get(&self, user_id: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(user_id).await
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_email(email).await
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        self.user_repo.count().await
    }

    /// Search users by name or email substring.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.search(query, limit).await
    }

    /// Users holding a specific role.
    pub async fn list_by_role(&self, role: Role) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_by_role(role).await
    }

    /// List users, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(limit, offset).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use yomu_common::config::ModerationConfig;
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

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> UserService {
        let notifications = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            &ModerationConfig::default(),
        );
        UserService::new(
            UserRepository::new(db.clone()),
            SuspensionRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            ReportRepository::new(db.clone()),
            PendingContentRepository::new(db.clone()),
            FavoriteRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let existing = create_test_user("u1", Role::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.register("someone", "u1@example.com").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(db);
        let result = service.register("someone", "not-an-email").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_change_role_requires_administer() {
        let leader = create_test_user("u1", Role::GroupLeader);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[leader]])
                .into_connection(),
        );

        let service = service_with(db);
        let changed = service.change_role("u2", Role::Owner, "u1").await.unwrap();

        assert!(!changed);
    }

    #[tokio::test]
    async fn test_change_role_missing_target() {
        let admin = create_test_user("a1", Role::Owner);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![admin]])
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let changed = service.change_role("missing", Role::Moderator, "a1").await.unwrap();

        assert!(!changed);
    }

    #[tokio::test]
    async fn test_delete_user_rejects_self() {
        let admin = create_test_user("a1", Role::Moderator);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );

        let service = service_with(db);
        let deleted = service.delete_user("a1", "a1").await.unwrap();

        assert!(!deleted);
    }
}
