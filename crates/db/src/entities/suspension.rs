//! Suspension entity - site-wide and comment-only bans.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What the suspension blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SuspensionKind {
    /// Blocks the whole site.
    #[sea_orm(string_value = "site")]
    Site,
    /// Blocks writing comments only; reading is never blocked.
    #[sea_orm(string_value = "comment")]
    Comment,
}

/// Whether a suspension expires on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SuspensionDuration {
    #[sea_orm(string_value = "temporary")]
    Temporary,
    #[sea_orm(string_value = "permanent")]
    Permanent,
}

/// Suspension model.
///
/// At most one active suspension of a given kind per user; expiry of
/// temporary suspensions is evaluated lazily at read time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "suspension")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The suspended user.
    pub user_id: String,
    /// The moderator who issued the suspension.
    pub moderator_id: String,
    /// Site-wide or comment-only.
    pub kind: SuspensionKind,
    /// Reason for the suspension (non-empty).
    pub reason: String,
    pub duration: SuspensionDuration,
    /// When the suspension was issued.
    pub created_at: DateTimeWithTimeZone,
    /// When the suspension expires; set iff temporary.
    pub expires_at: Option<DateTimeWithTimeZone>,
    /// Flipped off by `lift` or by the first read observing expiry.
    pub is_active: bool,
    /// When the suspension was lifted.
    pub lifted_at: Option<DateTimeWithTimeZone>,
    /// Who lifted it ("system" for lazy expiry).
    pub lifted_by: Option<String>,
}

impl Model {
    /// Whether a temporary suspension's expiry has passed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        match (self.duration, self.expires_at) {
            (SuspensionDuration::Temporary, Some(expires_at)) => {
                now >= expires_at.with_timezone(&chrono::Utc)
            }
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn suspension(duration: SuspensionDuration, expires_at: Option<DateTimeWithTimeZone>) -> Model {
        Model {
            id: "s1".to_string(),
            user_id: "u1".to_string(),
            moderator_id: "m1".to_string(),
            kind: SuspensionKind::Site,
            reason: "Spam".to_string(),
            duration,
            created_at: Utc::now().into(),
            expires_at,
            is_active: true,
            lifted_at: None,
            lifted_by: None,
        }
    }

    #[test]
    fn test_permanent_never_expires() {
        let s = suspension(SuspensionDuration::Permanent, None);
        assert!(!s.is_expired_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_temporary_expiry() {
        let now = Utc::now();
        let s = suspension(
            SuspensionDuration::Temporary,
            Some((now + Duration::days(3)).into()),
        );
        assert!(!s.is_expired_at(now));
        assert!(s.is_expired_at(now + Duration::days(3)));
        assert!(s.is_expired_at(now + Duration::days(4)));
    }
}
