//! Core services.

pub mod catalog;
pub mod comment;
pub mod favorite;
pub mod notification;
pub mod permission;
pub mod report;
pub mod submission;
pub mod suspension;
pub mod user;

pub use catalog::{Catalog, DbCatalog};
pub use comment::{CommentCounts, CommentService};
pub use favorite::FavoriteService;
pub use notification::NotificationService;
pub use permission::Capabilities;
pub use report::{ReportService, Resolution};
pub use submission::{SubmissionOutcome, SubmissionService};
pub use suspension::SuspensionService;
pub use user::UserService;
