//! Favorite endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use yomu_common::AppResult;
use yomu_db::entities::favorite::Model as FavoriteModel;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, CommandResponse},
};

/// Favorite request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub manga_id: String,
}

/// Favorite response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub manga_id: String,
    pub added_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_read: Option<String>,
}

impl From<FavoriteModel> for FavoriteResponse {
    fn from(f: FavoriteModel) -> Self {
        Self {
            manga_id: f.manga_id,
            added_at: f.added_at.to_rfc3339(),
            last_read: f.last_read.map(|t| t.to_rfc3339()),
        }
    }
}

/// Add a manga to the user's favorites.
async fn add(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let added = state.favorite_service.add(&user.id, &req.manga_id).await?;
    Ok(CommandResponse::of(added))
}

/// Remove a manga from the user's favorites.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let removed = state
        .favorite_service
        .remove(&user.id, &req.manga_id)
        .await?;
    Ok(CommandResponse::of(removed))
}

/// The user's favorites, newest first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FavoriteResponse>>> {
    let favorites = state.favorite_service.list(&user.id).await?;
    Ok(ApiResponse::ok(
        favorites.into_iter().map(Into::into).collect(),
    ))
}

/// Is-favorited response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsFavoritedResponse {
    pub favorited: bool,
}

/// Whether a manga is in the user's favorites.
async fn check(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<ApiResponse<IsFavoritedResponse>> {
    let favorited = state
        .favorite_service
        .is_favorited(&user.id, &req.manga_id)
        .await?;
    Ok(ApiResponse::ok(IsFavoritedResponse { favorited }))
}

/// Stamp the last-read time after reading a chapter of a favorited manga.
async fn touch(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    state
        .favorite_service
        .touch_last_read(&user.id, &req.manga_id)
        .await?;
    Ok(CommandResponse::of(true))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add))
        .route("/remove", post(remove))
        .route("/list", post(list))
        .route("/check", post(check))
        .route("/touch", post(touch))
}
