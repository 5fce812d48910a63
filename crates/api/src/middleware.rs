//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use yomu_core::{
    CommentService, FavoriteService, NotificationService, ReportService, SubmissionService,
    SuspensionService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub suspension_service: SuspensionService,
    pub submission_service: SubmissionService,
    pub comment_service: CommentService,
    pub report_service: ReportService,
    pub notification_service: NotificationService,
    pub favorite_service: FavoriteService,
}

/// Actor resolution middleware.
///
/// Identity is established upstream (login/session); this trusts the
/// `x-user-id` header and resolves it to a user row for the extractors.
/// Site-banned actors stay unauthenticated, which blocks every mutating
/// route while reads remain open.
pub async fn actor_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(header) = req.headers().get("x-user-id")
        && let Ok(user_id) = header.to_str()
    {
        match state.user_service.get(user_id).await {
            Ok(Some(user)) => {
                let banned = state
                    .suspension_service
                    .is_suspended(&user.id)
                    .await
                    .unwrap_or(false);
                if banned {
                    tracing::debug!(user_id = %user.id, "Suspended user kept unauthenticated");
                } else {
                    req.extensions_mut().insert(user);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve actor");
            }
        }
    }

    next.run(req).await
}
