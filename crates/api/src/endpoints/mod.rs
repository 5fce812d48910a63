//! API endpoints.

pub mod admin;
pub mod comments;
pub mod favorites;
pub mod notifications;
pub mod submissions;
pub mod users;

use axum::Router;

use crate::middleware::AppState;

/// Assemble the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/users", users::router())
        .nest("/api/admin", admin::router())
        .nest("/api/comments", comments::router())
        .nest("/api/notifications", notifications::router())
        .nest("/api/submissions", submissions::router())
        .nest("/api/favorites", favorites::router())
}
