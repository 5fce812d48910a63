//! Catalog collaborator - where approved content materializes.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::Set;
use yomu_common::{AppResult, IdGenerator};
use yomu_db::{
    entities::{catalog_entry, pending_content::ContentKind},
    repositories::CatalogRepository,
};

/// The live catalog the moderation pipeline publishes into.
///
/// Kept behind a trait so the pipeline can be exercised against a fake in
/// tests and so a different catalog backend can be swapped in.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Turn an accepted payload into live content, returning its id.
    async fn materialize(
        &self,
        kind: ContentKind,
        payload: serde_json::Value,
        created_by: &str,
    ) -> AppResult<String>;
}

/// Database-backed catalog.
#[derive(Clone)]
pub struct DbCatalog {
    catalog_repo: CatalogRepository,
    id_gen: IdGenerator,
}

impl DbCatalog {
    /// Create a new database-backed catalog.
    #[must_use]
    pub const fn new(catalog_repo: CatalogRepository) -> Self {
        Self {
            catalog_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Wrap into the trait object the submission pipeline expects.
    #[must_use]
    pub fn into_shared(self) -> Arc<dyn Catalog> {
        Arc::new(self)
    }
}

#[async_trait]
impl Catalog for DbCatalog {
    async fn materialize(
        &self,
        kind: ContentKind,
        payload: serde_json::Value,
        created_by: &str,
    ) -> AppResult<String> {
        let model = catalog_entry::ActiveModel {
            id: Set(self.id_gen.generate()),
            kind: Set(kind),
            payload: Set(payload),
            created_by: Set(created_by.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let entry = self.catalog_repo.create(model).await?;
        tracing::debug!(entry_id = %entry.id, kind = ?kind, "Materialized catalog entry");
        Ok(entry.id)
    }
}
