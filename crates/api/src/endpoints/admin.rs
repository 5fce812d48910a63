//! Administration and moderation endpoints.
//!
//! Commands follow the boolean convention (`{ "success": false }` on
//! business-rule failure); privileged query endpoints return 403 outright,
//! since there is no no-op to fall back to.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use validator::Validate;
use yomu_common::{AppError, AppResult};
use yomu_core::{Capabilities, Resolution};
use yomu_db::entities::{
    report::{Model as ReportModel, ReportReason, ReportStatus, ReportTargetKind},
    suspension::{Model as SuspensionModel, SuspensionDuration, SuspensionKind},
    user::Role,
};

use crate::{
    endpoints::comments::CommentResponse,
    endpoints::users::UserResponse,
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, CommandResponse},
};

fn require(granted: bool) -> AppResult<()> {
    if granted {
        Ok(())
    } else {
        Err(AppError::Forbidden("Missing capability".to_string()))
    }
}

/// Role change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    pub user_id: String,
    pub role: Role,
}

/// Change a user's role.
async fn change_role(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangeRoleRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let changed = state
        .user_service
        .change_role(&req.user_id, req.role, &user.id)
        .await?;
    Ok(CommandResponse::of(changed))
}

/// Ban request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BanRequest {
    pub user_id: String,
    pub kind: SuspensionKind,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    pub duration: SuspensionDuration,
    /// Day count, required for temporary bans.
    pub days: Option<i64>,
}

/// Issue a suspension.
async fn ban(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BanRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    req.validate()?;
    let issued = state
        .suspension_service
        .issue(
            &req.user_id,
            &user.id,
            req.kind,
            &req.reason,
            req.duration,
            req.days,
        )
        .await?;
    Ok(CommandResponse::of(issued))
}

/// Unban request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbanRequest {
    pub user_id: String,
    pub kind: SuspensionKind,
}

/// Lift an active suspension.
async fn unban(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UnbanRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let lifted = state
        .suspension_service
        .lift(&req.user_id, &user.id, req.kind)
        .await?;
    Ok(CommandResponse::of(lifted))
}

/// Suspension response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionResponse {
    pub id: String,
    pub user_id: String,
    pub moderator_id: String,
    pub kind: SuspensionKind,
    pub reason: String,
    pub duration: SuspensionDuration,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub is_active: bool,
}

impl From<SuspensionModel> for SuspensionResponse {
    fn from(s: SuspensionModel) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            moderator_id: s.moderator_id,
            kind: s.kind,
            reason: s.reason,
            duration: s.duration,
            created_at: s.created_at.to_rfc3339(),
            expires_at: s.expires_at.map(|t| t.to_rfc3339()),
            is_active: s.is_active,
        }
    }
}

/// List bans request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBansRequest {
    pub kind: SuspensionKind,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// List active suspensions.
async fn bans(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListBansRequest>,
) -> AppResult<ApiResponse<Vec<SuspensionResponse>>> {
    require(Capabilities::of(user.role).can_administer)?;
    let suspensions = state
        .suspension_service
        .list_active(req.kind, req.limit.min(100), req.offset)
        .await?;
    Ok(ApiResponse::ok(
        suspensions.into_iter().map(Into::into).collect(),
    ))
}

/// Per-user suspension history request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSuspensionsRequest {
    pub user_id: String,
}

/// Full suspension history for one user.
async fn user_suspensions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserSuspensionsRequest>,
) -> AppResult<ApiResponse<Vec<SuspensionResponse>>> {
    require(Capabilities::of(user.role).can_administer)?;
    let suspensions = state.suspension_service.history(&req.user_id).await?;
    Ok(ApiResponse::ok(
        suspensions.into_iter().map(Into::into).collect(),
    ))
}

/// Report response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub target_kind: ReportTargetKind,
    pub target_id: String,
    pub reporter_id: String,
    pub reason: ReportReason,
    pub description: String,
    pub status: ReportStatus,
    pub created_at: String,
}

impl From<ReportModel> for ReportResponse {
    fn from(r: ReportModel) -> Self {
        Self {
            id: r.id,
            target_kind: r.target_kind,
            target_id: r.target_id,
            reporter_id: r.reporter_id,
            reason: r.reason,
            description: r.description,
            status: r.status,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// List reports request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsRequest {
    pub target_kind: Option<ReportTargetKind>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// List pending reports.
async fn reports(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListReportsRequest>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    require(Capabilities::of(user.role).can_moderate_comments)?;
    let reports = state
        .report_service
        .pending(req.target_kind, req.limit.min(100), req.offset)
        .await?;
    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// Comment report list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReportsRequest {
    pub comment_id: String,
}

/// Every report attached to one comment.
async fn comment_reports(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentReportsRequest>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    require(Capabilities::of(user.role).can_moderate_comments)?;
    let reports = state
        .report_service
        .reports_for_comment(&req.comment_id)
        .await?;
    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// Resolve report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReportRequest {
    pub report_id: String,
    pub dismiss: bool,
    pub notes: Option<String>,
}

/// Close a pending report.
async fn resolve_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ResolveReportRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let resolution = if req.dismiss {
        Resolution::Dismissed
    } else {
        Resolution::Resolved
    };
    let closed = state
        .report_service
        .resolve(&req.report_id, &user.id, resolution, req.notes.as_deref())
        .await?;
    Ok(CommandResponse::of(closed))
}

/// Moderated comments request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratedCommentsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Hidden and deleted comments for the moderation queue.
async fn moderated_comments(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ModeratedCommentsRequest>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    require(Capabilities::of(user.role).can_moderate_comments)?;
    let comments = state
        .comment_service
        .list_moderated(req.limit.min(100), req.offset)
        .await?;
    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

/// List users request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    /// Restrict to a single role.
    pub role: Option<Role>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// List users, optionally restricted to one role.
async fn users(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListUsersRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    require(Capabilities::of(user.role).can_administer)?;
    let users = match req.role {
        Some(role) => state.user_service.list_by_role(role).await?,
        None => state.user_service.list(req.limit.min(100), req.offset).await?,
    };
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Delete user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub user_id: String,
}

/// Delete a user account with its cascading cleanup.
async fn delete_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteUserRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let deleted = state
        .user_service
        .delete_user(&req.user_id, &user.id)
        .await?;
    Ok(CommandResponse::of(deleted))
}

/// Per-user statistics request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsRequest {
    pub user_id: String,
}

/// Per-user statistics.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub favorites_count: u64,
    pub comments_written: u64,
}

/// Activity statistics for one user.
async fn user_stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserStatsRequest>,
) -> AppResult<ApiResponse<UserStatsResponse>> {
    require(Capabilities::of(user.role).can_administer)?;
    let favorites_count = state.favorite_service.count(&req.user_id).await?;
    let comments_written = state.comment_service.list_by_user(&req.user_id).await?.len() as u64;
    Ok(ApiResponse::ok(UserStatsResponse {
        favorites_count,
        comments_written,
    }))
}

/// Moderation dashboard statistics.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_comments: u64,
    pub active_comments: u64,
    pub hidden_comments: u64,
    pub deleted_comments: u64,
    pub pending_reports: u64,
    pub total_comment_reports: u64,
    pub pending_submissions: u64,
}

/// Aggregate moderation statistics.
async fn stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<StatsResponse>> {
    require(Capabilities::of(user.role).can_moderate_comments)?;
    let counts = state.comment_service.counts().await?;
    Ok(ApiResponse::ok(StatsResponse {
        total_users: state.user_service.count().await?,
        total_comments: counts.total,
        active_comments: counts.active,
        hidden_comments: counts.hidden,
        deleted_comments: counts.deleted,
        pending_reports: state.report_service.count_pending().await?,
        total_comment_reports: state.report_service.count_comment_reports().await?,
        pending_submissions: state.submission_service.count_pending().await?,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/change-role", post(change_role))
        .route("/ban", post(ban))
        .route("/unban", post(unban))
        .route("/bans", post(bans))
        .route("/user-suspensions", post(user_suspensions))
        .route("/reports", post(reports))
        .route("/comment-reports", post(comment_reports))
        .route("/resolve-report", post(resolve_report))
        .route("/moderated-comments", post(moderated_comments))
        .route("/users", post(users))
        .route("/delete-user", post(delete_user))
        .route("/user-stats", post(user_stats))
        .route("/stats", post(stats))
}
