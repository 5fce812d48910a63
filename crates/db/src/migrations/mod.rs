//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_suspension_table;
mod m20250601_000003_create_comment_table;
mod m20250601_000004_create_report_table;
mod m20250601_000005_create_pending_content_table;
mod m20250601_000006_create_notification_table;
mod m20250601_000007_create_favorite_table;
mod m20250601_000008_create_catalog_entry_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_suspension_table::Migration),
            Box::new(m20250601_000003_create_comment_table::Migration),
            Box::new(m20250601_000004_create_report_table::Migration),
            Box::new(m20250601_000005_create_pending_content_table::Migration),
            Box::new(m20250601_000006_create_notification_table::Migration),
            Box::new(m20250601_000007_create_favorite_table::Migration),
            Box::new(m20250601_000008_create_catalog_entry_table::Migration),
        ]
    }
}
