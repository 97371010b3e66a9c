//! Song endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, ListResponse, PAGE_SIZE};
use crate::views::{self, SongDetail, SongSummary};
use crate::AppState;
use lyrica_common::db::songs;

/// Query parameters for song listing
#[derive(Debug, Deserialize)]
pub struct SongListQuery {
    /// Column to sort by: "name"
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
pub struct CreateSongRequest {
    pub name: Option<String>,
    pub album_id: Option<String>,
}

/// GET /api/song
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<SongListQuery>,
) -> ApiResult<Json<ListResponse<SongSummary>>> {
    let count = songs::count_songs(&state.db).await?;
    let pagination = calculate_pagination(count, query.page);

    let items = songs::list_songs(
        &state.db,
        query.sort.as_deref(),
        &query.order,
        PAGE_SIZE,
        pagination.offset,
    )
    .await?;

    let mut results = Vec::with_capacity(items.len());
    for song in &items {
        results.push(views::song_summary(&state.db, song).await?);
    }

    Ok(Json(ListResponse {
        count,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        results,
    }))
}

/// POST /api/song
pub async fn create_song(
    State(state): State<AppState>,
    Json(req): Json<CreateSongRequest>,
) -> ApiResult<(StatusCode, Json<SongSummary>)> {
    let name = req
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;

    let album_id = match req.album_id.as_deref() {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::BadRequest(format!("Invalid album id: {}", raw)))?,
        ),
        None => None,
    };

    let song = songs::insert_song(&state.db, name, album_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(views::song_summary(&state.db, &song).await?),
    ))
}

/// GET /api/song/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SongDetail>> {
    let song = songs::get_song(&state.db, id).await?;
    Ok(Json(views::song_detail(&state.db, song).await?))
}

/// DELETE /api/song/:id
///
/// Cascades through the song's lyrics.
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    songs::delete_song(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
