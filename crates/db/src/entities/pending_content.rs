//! Pending content entity - submissions awaiting moderator review.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of submitted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A manga/manhwa/manhua title.
    #[sea_orm(string_value = "title")]
    Title,
    #[sea_orm(string_value = "chapter")]
    Chapter,
}

impl ContentKind {
    /// Human-readable kind label, used in notification messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Chapter => "chapter",
        }
    }
}

/// Review status; terminal once approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum SubmissionStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Pending content model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_content")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: ContentKind,
    /// Snapshot of the submitted payload, materialized on approval.
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,
    pub submitted_by: String,
    pub submitted_at: DateTimeWithTimeZone,
    pub status: SubmissionStatus,
    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,
    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(nullable)]
    pub review_notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
