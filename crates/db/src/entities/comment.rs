//! Comment entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Comment visibility states.
///
/// `Active ↔ Hidden` via moderation; `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "hidden")]
    Hidden,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

/// Comment model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The manga the comment is attached to.
    pub manga_id: String,

    /// Set for chapter-level comments.
    #[sea_orm(nullable)]
    pub chapter_id: Option<String>,

    /// Comment author.
    pub user_id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    /// Comments may be edited at most once.
    #[sea_orm(default_value = false)]
    pub is_edited: bool,

    /// Parent comment for replies. Replies are one level deep: a reply's
    /// parent is never itself a reply.
    #[sea_orm(nullable)]
    pub parent_id: Option<String>,

    /// User ids who liked the comment.
    #[sea_orm(column_type = "JsonBinary")]
    pub likes: Json,

    /// User ids who disliked the comment; disjoint from `likes`.
    #[sea_orm(column_type = "JsonBinary")]
    pub dislikes: Json,

    pub status: CommentStatus,

    /// Moderator annotation, set when the comment is not active.
    #[sea_orm(nullable)]
    pub moderated_by: Option<String>,

    #[sea_orm(nullable)]
    pub moderated_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub moderation_reason: Option<String>,
}

impl Model {
    /// Decode the like set.
    #[must_use]
    pub fn like_ids(&self) -> Vec<String> {
        serde_json::from_value(self.likes.clone()).unwrap_or_default()
    }

    /// Decode the dislike set.
    #[must_use]
    pub fn dislike_ids(&self) -> Vec<String> {
        serde_json::from_value(self.dislikes.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
