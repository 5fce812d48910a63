//! Comment endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use validator::Validate;
use yomu_common::{AppError, AppResult};
use yomu_core::Capabilities;
use yomu_db::entities::{
    comment::{CommentStatus, Model as CommentModel},
    report::ReportReason,
};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, CommandResponse},
};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub manga_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_edited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub status: CommentStatus,
}

impl From<CommentModel> for CommentResponse {
    fn from(c: CommentModel) -> Self {
        let likes = c.like_ids();
        let dislikes = c.dislike_ids();
        Self {
            id: c.id,
            manga_id: c.manga_id,
            chapter_id: c.chapter_id,
            user_id: c.user_id,
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
            is_edited: c.is_edited,
            parent_id: c.parent_id,
            likes,
            dislikes,
            status: c.status,
        }
    }
}

/// List comments request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub manga_id: String,
    pub chapter_id: Option<String>,
}

/// Active top-level comments for a target, newest first.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state
        .comment_service
        .list_for_target(&req.manga_id, req.chapter_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

/// List replies request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRepliesRequest {
    pub comment_id: String,
}

/// Active replies to a comment, oldest first.
async fn replies(
    State(state): State<AppState>,
    Json(req): Json<ListRepliesRequest>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.replies_of(&req.comment_id).await?;
    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

/// Add comment request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub manga_id: String,
    pub chapter_id: Option<String>,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
    pub parent_id: Option<String>,
}

/// Add a comment or reply.
async fn add(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddCommentRequest>,
) -> AppResult<ApiResponse<Option<CommentResponse>>> {
    req.validate()?;
    let created = state
        .comment_service
        .add(
            &req.manga_id,
            req.chapter_id.as_deref(),
            &user.id,
            &req.content,
            req.parent_id.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(created.map(Into::into)))
}

/// Edit comment request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditCommentRequest {
    pub comment_id: String,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

/// Edit a comment (author-only, once).
async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EditCommentRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    req.validate()?;
    let edited = state
        .comment_service
        .edit(&req.comment_id, &user.id, &req.content)
        .await?;
    Ok(CommandResponse::of(edited))
}

/// Comment id request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentIdRequest {
    pub comment_id: String,
}

/// Delete a comment (author or comment moderator).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let deleted = state
        .comment_service
        .delete(&req.comment_id, &user.id)
        .await?;
    Ok(CommandResponse::of(deleted))
}

/// Hide comment request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HideCommentRequest {
    pub comment_id: String,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Hide a comment (moderator-only).
async fn hide(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<HideCommentRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    req.validate()?;
    let hidden = state
        .comment_service
        .hide(&req.comment_id, &user.id, &req.reason)
        .await?;
    Ok(CommandResponse::of(hidden))
}

/// Restore a hidden comment (moderator-only).
async fn restore(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let restored = state
        .comment_service
        .restore(&req.comment_id, &user.id)
        .await?;
    Ok(CommandResponse::of(restored))
}

/// Toggle a like on a comment.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let toggled = state
        .comment_service
        .toggle_like(&req.comment_id, &user.id)
        .await?;
    Ok(CommandResponse::of(toggled))
}

/// Toggle a dislike on a comment.
async fn dislike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let toggled = state
        .comment_service
        .toggle_dislike(&req.comment_id, &user.id)
        .await?;
    Ok(CommandResponse::of(toggled))
}

/// List-by-user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListByUserRequest {
    /// Defaults to the authenticated user.
    pub user_id: Option<String>,
}

/// Comments written by a user; seeing someone else's full history needs
/// comment moderation.
async fn by_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListByUserRequest>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let target = req.user_id.unwrap_or_else(|| user.id.clone());
    if target != user.id && !Capabilities::of(user.role).can_moderate_comments {
        return Err(AppError::Forbidden("Missing capability".to_string()));
    }

    let comments = state.comment_service.list_by_user(&target).await?;
    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

/// Comment report request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportCommentRequest {
    pub comment_id: String,
    pub reason: ReportReason,
    #[validate(length(max = 2000))]
    pub description: String,
}

/// File a report against a comment.
async fn report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReportCommentRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    req.validate()?;
    let filed = state
        .report_service
        .report_comment(&req.comment_id, &user.id, req.reason, &req.description)
        .await?;
    Ok(CommandResponse::of(filed))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/replies", post(replies))
        .route("/by-user", post(by_user))
        .route("/add", post(add))
        .route("/edit", post(edit))
        .route("/delete", post(delete))
        .route("/hide", post(hide))
        .route("/restore", post(restore))
        .route("/like", post(like))
        .route("/dislike", post(dislike))
        .route("/report", post(report))
}
