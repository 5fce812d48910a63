//! Catalog entry entity - the live catalog approved content materializes into.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::pending_content::ContentKind;

/// Catalog entry model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_entry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: ContentKind,
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,
    /// The contributor the entry is attributed to.
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
