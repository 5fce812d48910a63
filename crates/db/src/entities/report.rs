//! Report entity - complaints against comments and users.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What the report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReportTargetKind {
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "user")]
    User,
}

/// Report reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    #[sea_orm(string_value = "spam")]
    Spam,
    #[sea_orm(string_value = "inappropriate")]
    Inappropriate,
    #[sea_orm(string_value = "offensive")]
    Offensive,
    #[sea_orm(string_value = "harassment")]
    Harassment,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ReportReason {
    /// Human-readable reason label, used in report notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Inappropriate => "inappropriate content",
            Self::Offensive => "offensive content",
            Self::Harassment => "harassment",
            Self::Other => "other",
        }
    }
}

/// Report status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "dismissed")]
    Dismissed,
}

/// Report model.
///
/// A given reporter may have at most one open report per target.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub target_kind: ReportTargetKind,
    /// Comment id or user id, depending on `target_kind`.
    pub target_id: String,
    /// The user who filed the report.
    pub reporter_id: String,
    pub reason: ReportReason,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: ReportStatus,
    /// Moderator who resolved or dismissed the report.
    #[sea_orm(nullable)]
    pub resolved_by: Option<String>,
    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeWithTimeZone>,
    /// Resolution notes by the moderator.
    #[sea_orm(nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
