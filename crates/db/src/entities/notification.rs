//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::pending_content::ContentKind;
use super::report::ReportReason;
use super::suspension::{SuspensionDuration, SuspensionKind};
use super::user::Role;

/// Notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "role_changed")]
    RoleChanged,
    #[sea_orm(string_value = "banned")]
    Banned,
    #[sea_orm(string_value = "unbanned")]
    Unbanned,
    #[sea_orm(string_value = "content_pending")]
    ContentPending,
    #[sea_orm(string_value = "content_approved")]
    ContentApproved,
    #[sea_orm(string_value = "content_rejected")]
    ContentRejected,
    #[sea_orm(string_value = "comment_hidden")]
    CommentHidden,
    #[sea_orm(string_value = "comment_restored")]
    CommentRestored,
    #[sea_orm(string_value = "comment_reported")]
    CommentReported,
    #[sea_orm(string_value = "user_reported")]
    UserReported,
    #[sea_orm(string_value = "new_user_registration")]
    NewUserRegistration,
    #[sea_orm(string_value = "new_chapter")]
    NewChapter,
}

/// Structured notification payload, one variant per notification type.
///
/// Serialized into the `payload` JSON column; the column's type tag is
/// derived from the variant, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationPayload {
    RoleChanged {
        old_role: Role,
        new_role: Role,
        changed_by: String,
    },
    Banned {
        kind: SuspensionKind,
        duration: SuspensionDuration,
        days: Option<i64>,
        reason: String,
        banned_by: String,
    },
    Unbanned {
        kind: SuspensionKind,
        lifted_by: String,
    },
    ContentPending {
        content_id: String,
        kind: ContentKind,
        submitted_by: String,
    },
    ContentApproved {
        content_id: String,
        kind: ContentKind,
    },
    ContentRejected {
        content_id: String,
        kind: ContentKind,
        notes: String,
    },
    CommentHidden {
        comment_id: String,
        reason: String,
    },
    CommentRestored {
        comment_id: String,
    },
    CommentReported {
        comment_id: String,
        report_id: String,
        reason: ReportReason,
    },
    UserReported {
        user_id: String,
        report_id: String,
        reason: ReportReason,
    },
    NewUserRegistration {
        user_id: String,
    },
    NewChapter {
        manga_id: String,
        content_id: String,
    },
}

impl NotificationPayload {
    /// The type tag this payload belongs to.
    #[must_use]
    pub const fn notification_type(&self) -> NotificationType {
        match self {
            Self::RoleChanged { .. } => NotificationType::RoleChanged,
            Self::Banned { .. } => NotificationType::Banned,
            Self::Unbanned { .. } => NotificationType::Unbanned,
            Self::ContentPending { .. } => NotificationType::ContentPending,
            Self::ContentApproved { .. } => NotificationType::ContentApproved,
            Self::ContentRejected { .. } => NotificationType::ContentRejected,
            Self::CommentHidden { .. } => NotificationType::CommentHidden,
            Self::CommentRestored { .. } => NotificationType::CommentRestored,
            Self::CommentReported { .. } => NotificationType::CommentReported,
            Self::UserReported { .. } => NotificationType::UserReported,
            Self::NewUserRegistration { .. } => NotificationType::NewUserRegistration,
            Self::NewChapter { .. } => NotificationType::NewChapter,
        }
    }
}

/// Notification model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification.
    pub recipient_id: String,

    pub notification_type: NotificationType,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Serialized [`NotificationPayload`].
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Decode the structured payload.
    pub fn decode_payload(&self) -> Result<NotificationPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_type_tags() {
        let payload = NotificationPayload::CommentHidden {
            comment_id: "c1".to_string(),
            reason: "spam".to_string(),
        };
        assert_eq!(
            payload.notification_type(),
            NotificationType::CommentHidden
        );
    }

    #[test]
    fn test_payload_round_trip() {
        let payload = NotificationPayload::RoleChanged {
            old_role: Role::Member,
            new_role: Role::GroupLeader,
            changed_by: "admin".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "role_changed");
        let decoded: NotificationPayload = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, payload);
    }
}
