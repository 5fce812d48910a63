//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User roles, ordered from the lowest rank to the highest.
///
/// The declaration order is the rank order: `Ord` on this enum drives the
/// "contributors below group leader need approval" routing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "member")]
    Member,
    #[sea_orm(string_value = "apprentice_contributor")]
    ApprenticeContributor,
    #[sea_orm(string_value = "senior_contributor")]
    SeniorContributor,
    #[sea_orm(string_value = "group_leader")]
    GroupLeader,
    #[sea_orm(string_value = "moderator")]
    Moderator,
    #[sea_orm(string_value = "owner")]
    Owner,
}

impl Role {
    /// Human-readable role label, used in role-change notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::ApprenticeContributor => "Apprentice Contributor",
            Self::SeniorContributor => "Senior Contributor",
            Self::GroupLeader => "Group Leader",
            Self::Moderator => "Moderator",
            Self::Owner => "Owner",
        }
    }
}

/// User model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name.
    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Assigned role; exactly one per user at a time.
    pub role: Role,

    /// Unread-notification counter (denormalized).
    #[sea_orm(default_value = 0)]
    pub unread_count: i32,

    pub created_at: DateTimeWithTimeZone,

    pub last_login: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Member < Role::ApprenticeContributor);
        assert!(Role::ApprenticeContributor < Role::SeniorContributor);
        assert!(Role::SeniorContributor < Role::GroupLeader);
        assert!(Role::GroupLeader < Role::Moderator);
        assert!(Role::Moderator < Role::Owner);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Member.label(), "Member");
        assert_eq!(Role::Owner.label(), "Owner");
    }
}
