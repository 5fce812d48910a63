//! Content submission endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use yomu_common::{AppError, AppResult};
use yomu_core::{Capabilities, SubmissionOutcome};
use yomu_db::entities::pending_content::{ContentKind, Model as PendingModel, SubmissionStatus};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, CommandResponse},
};

/// Submit content request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub kind: ContentKind,
    pub payload: serde_json::Value,
}

/// Submission response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "outcome")]
pub enum SubmitResponse {
    /// Published straight into the catalog.
    Published { content_id: String },
    /// Queued for review.
    Queued { pending_id: String },
    /// The submitter cannot upload.
    Rejected,
}

/// Submit content; routing depends on the submitter's rank.
async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> AppResult<ApiResponse<SubmitResponse>> {
    let outcome = state
        .submission_service
        .submit(req.kind, req.payload, &user.id)
        .await?;

    let response = match outcome {
        Some(SubmissionOutcome::Published { content_id }) => {
            SubmitResponse::Published { content_id }
        }
        Some(SubmissionOutcome::Queued(pending)) => SubmitResponse::Queued {
            pending_id: pending.id,
        },
        None => SubmitResponse::Rejected,
    };

    Ok(ApiResponse::ok(response))
}

/// Pending content response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingContentResponse {
    pub id: String,
    pub kind: ContentKind,
    pub payload: serde_json::Value,
    pub submitted_by: String,
    pub submitted_at: String,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl From<PendingModel> for PendingContentResponse {
    fn from(p: PendingModel) -> Self {
        Self {
            id: p.id,
            kind: p.kind,
            payload: p.payload,
            submitted_by: p.submitted_by,
            submitted_at: p.submitted_at.to_rfc3339(),
            status: p.status,
            reviewed_by: p.reviewed_by,
            review_notes: p.review_notes,
        }
    }
}

/// List submissions request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubmissionsRequest {
    pub status: Option<SubmissionStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// List submissions (review queue).
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListSubmissionsRequest>,
) -> AppResult<ApiResponse<Vec<PendingContentResponse>>> {
    if !Capabilities::of(user.role).can_administer {
        return Err(AppError::Forbidden("Missing capability".to_string()));
    }
    let submissions = state
        .submission_service
        .list(req.status, req.limit.min(100), req.offset)
        .await?;
    Ok(ApiResponse::ok(
        submissions.into_iter().map(Into::into).collect(),
    ))
}

/// The authenticated user's own submissions.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PendingContentResponse>>> {
    let submissions = state.submission_service.list_by_submitter(&user.id).await?;
    Ok(ApiResponse::ok(
        submissions.into_iter().map(Into::into).collect(),
    ))
}

/// Review request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub content_id: String,
    pub notes: Option<String>,
}

/// Approve a pending submission.
async fn approve(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let approved = state
        .submission_service
        .approve(&req.content_id, &user.id, req.notes.as_deref())
        .await?;
    Ok(CommandResponse::of(approved))
}

/// Reject a pending submission.
async fn reject(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let rejected = state
        .submission_service
        .reject(&req.content_id, &user.id, req.notes.as_deref())
        .await?;
    Ok(CommandResponse::of(rejected))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit))
        .route("/list", post(list))
        .route("/mine", post(mine))
        .route("/approve", post(approve))
        .route("/reject", post(reject))
}
