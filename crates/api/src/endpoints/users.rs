//! User endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use validator::Validate;
use yomu_common::AppResult;
use yomu_db::entities::{
    report::ReportReason,
    user::{Model as UserModel, Role},
};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, CommandResponse},
};

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// User response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub unread_count: i32,
    pub created_at: String,
    pub last_login: String,
}

impl From<UserModel> for UserResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            unread_count: u.unread_count,
            created_at: u.created_at.to_rfc3339(),
            last_login: u.last_login.to_rfc3339(),
        }
    }
}

/// Register a new member.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<ApiResponse<Option<UserResponse>>> {
    req.validate()?;
    let created = state.user_service.register(&req.name, &req.email).await?;
    Ok(ApiResponse::ok(created.map(Into::into)))
}

/// The authenticated user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

/// Login request.
///
/// No credential check here: the session layer upstream owns that. This
/// resolves the account and stamps the login time.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
}

/// Resolve an account by email and record the login.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<Option<UserResponse>>> {
    req.validate()?;
    let Some(user) = state.user_service.find_by_email(&req.email).await? else {
        return Ok(ApiResponse::ok(None));
    };
    state.user_service.record_login(&user.id).await?;
    Ok(ApiResponse::ok(Some(user.into())))
}

/// Search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Search users by name or email.
async fn search(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .user_service
        .search(&req.query, req.limit.min(100))
        .await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// User report request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportUserRequest {
    pub user_id: String,
    pub reason: ReportReason,
    #[validate(length(max = 2000))]
    pub description: String,
}

/// File a report against another user.
async fn report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReportUserRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    req.validate()?;
    let filed = state
        .report_service
        .report_user(&req.user_id, &user.id, req.reason, &req.description)
        .await?;
    Ok(CommandResponse::of(filed))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", post(me))
        .route("/search", post(search))
        .route("/report", post(report))
}
