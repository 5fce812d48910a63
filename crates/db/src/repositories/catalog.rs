//! Catalog repository.

use std::sync::Arc;

use crate::entities::catalog_entry;
use sea_orm::{ActiveModelTrait, DatabaseConnection};
use yomu_common::{AppError, AppResult};

/// Catalog repository for database operations.
///
/// The catalog is an external collaborator of the moderation pipeline; only
/// materialization writes go through here.
#[derive(Clone)]
pub struct CatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new catalog entry.
    pub async fn create(
        &self,
        model: catalog_entry::ActiveModel,
    ) -> AppResult<catalog_entry::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
