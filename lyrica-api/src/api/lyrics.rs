//! Lyric endpoints
//!
//! Creation resolves the song reference through the supplied album
//! (see `lyrica_common::db::lyrics::create_lyric`); voting upserts the
//! caller's ledger row and returns the refreshed detail shape.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, ListResponse, PAGE_SIZE};
use crate::views::{self, LyricDetail};
use crate::AppState;
use lyrica_common::db::{lyrics, votes};

/// Query parameters for lyric listing
#[derive(Debug, Deserialize)]
pub struct LyricListQuery {
    /// Free-text search over lyric text, song name, and album name
    pub search: Option<String>,

    /// Column to sort by: "text", "song_name", or "album_name"
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

/// Song reference in the create payload: by id or by name
#[derive(Debug, Default, Deserialize)]
pub struct SongRefPayload {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Album reference in the create payload: id only, no create-by-name path
#[derive(Debug, Default, Deserialize)]
pub struct AlbumRefPayload {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLyricRequest {
    pub text: Option<String>,
    #[serde(default)]
    pub song: Option<SongRefPayload>,
    #[serde(default)]
    pub album: Option<AlbumRefPayload>,
}

/// GET /api/lyric
pub async fn list_lyrics(
    State(state): State<AppState>,
    Query(query): Query<LyricListQuery>,
) -> ApiResult<Json<ListResponse<LyricDetail>>> {
    let count = lyrics::count_lyrics(&state.db, query.search.as_deref()).await?;
    let pagination = calculate_pagination(count, query.page);

    let items = lyrics::list_lyrics(
        &state.db,
        query.search.as_deref(),
        query.sort.as_deref(),
        &query.order,
        PAGE_SIZE,
        pagination.offset,
    )
    .await?;

    let mut results = Vec::with_capacity(items.len());
    for lyric in items {
        results.push(views::lyric_detail(&state.db, lyric).await?);
    }

    Ok(Json(ListResponse {
        count,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        results,
    }))
}

/// POST /api/lyric
///
/// Payload: `{text, song: {id? | name?}, album: {id}}`. The album id is
/// mandatory; the song may be referenced by id (must exist) or by name
/// (found or created under the album), or omitted entirely.
pub async fn create_lyric(
    State(state): State<AppState>,
    Json(req): Json<CreateLyricRequest>,
) -> ApiResult<(StatusCode, Json<LyricDetail>)> {
    let text = req
        .text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("text is required".to_string()))?;

    let album_raw = req
        .album
        .as_ref()
        .and_then(|album| album.id.as_deref())
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("album.id is required".to_string()))?;

    // An unparseable id cannot reference any album; same failure as a
    // well-formed id that matches nothing.
    let album_id = Uuid::parse_str(album_raw).map_err(|_| {
        ApiError::BadRequest(format!(
            "There is no album with the id={}. Try another one.",
            album_raw
        ))
    })?;

    let song_id = match req.song.as_ref().and_then(|song| song.id.as_deref()) {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::NotFound(format!("song {} not found", raw)))?,
        ),
        None => None,
    };
    let song_name = req.song.as_ref().and_then(|song| song.name.as_deref());

    let lyric = lyrics::create_lyric(&state.db, text, album_id, song_id, song_name).await?;

    Ok((
        StatusCode::CREATED,
        Json(views::lyric_detail(&state.db, lyric).await?),
    ))
}

/// GET /api/lyric/:id
pub async fn get_lyric(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LyricDetail>> {
    let lyric = lyrics::get_lyric(&state.db, id).await?;
    Ok(Json(views::lyric_detail(&state.db, lyric).await?))
}

/// DELETE /api/lyric/:id
pub async fn delete_lyric(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    lyrics::delete_lyric(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Caller identity for vote endpoints
///
/// TODO: replace with an authenticated caller check; until then the
/// identity is whatever the X-Voter header claims, and absent callers
/// all collapse into "anonymous".
fn voter_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-voter")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

/// POST /api/lyric/:id/vote_up
pub async fn vote_up(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<LyricDetail>> {
    let voter = voter_identity(&headers);
    let lyric = votes::vote(&state.db, id, &voter, 1).await?;
    Ok(Json(views::lyric_detail(&state.db, lyric).await?))
}

/// POST /api/lyric/:id/vote_down
pub async fn vote_down(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<LyricDetail>> {
    let voter = voter_identity(&headers);
    let lyric = votes::vote(&state.db, id, &voter, -1).await?;
    Ok(Json(views::lyric_detail(&state.db, lyric).await?))
}
