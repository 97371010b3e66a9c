//! Album endpoints
//!
//! The create input shape is unlike every read shape: it takes a
//! free-text `artist_name` (resolved or created, then linked) and
//! requires `year` even though the stored column is nullable.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, ListResponse, PAGE_SIZE};
use crate::views::{self, AlbumDetail, AlbumSummary};
use crate::AppState;
use lyrica_common::db::albums;

/// Query parameters for album listing
#[derive(Debug, Deserialize)]
pub struct AlbumListQuery {
    /// Column to sort by: "name" or "year"
    pub sort: Option<String>,

    /// Sort order: "asc" or "desc"
    #[serde(default = "default_order")]
    pub order: String,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_order() -> String {
    "asc".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateAlbumRequest {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub artist_name: Option<String>,
}

/// GET /api/album
pub async fn list_albums(
    State(state): State<AppState>,
    Query(query): Query<AlbumListQuery>,
) -> ApiResult<Json<ListResponse<AlbumSummary>>> {
    let count = albums::count_albums(&state.db).await?;
    let pagination = calculate_pagination(count, query.page);

    let items = albums::list_albums(
        &state.db,
        query.sort.as_deref(),
        &query.order,
        PAGE_SIZE,
        pagination.offset,
    )
    .await?;

    let mut results = Vec::with_capacity(items.len());
    for album in &items {
        results.push(views::album_summary(&state.db, album).await?);
    }

    Ok(Json(ListResponse {
        count,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        results,
    }))
}

/// POST /api/album
///
/// `year` is mandatory here; the storage shape stays nullable.
pub async fn create_album(
    State(state): State<AppState>,
    Json(req): Json<CreateAlbumRequest>,
) -> ApiResult<(StatusCode, Json<AlbumSummary>)> {
    let name = req
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let year = req
        .year
        .ok_or_else(|| ApiError::BadRequest("year is required".to_string()))?;
    let artist_name = req
        .artist_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("artist_name is required".to_string()))?;

    let album = albums::insert_album(&state.db, name, year, artist_name).await?;

    Ok((
        StatusCode::CREATED,
        Json(views::album_summary(&state.db, &album).await?),
    ))
}

/// GET /api/album/:id
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AlbumDetail>> {
    let album = albums::get_album(&state.db, id).await?;
    Ok(Json(views::album_detail(&state.db, album).await?))
}

/// DELETE /api/album/:id
///
/// Cascades through the album's songs and their lyrics.
pub async fn delete_album(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    albums::delete_album(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
