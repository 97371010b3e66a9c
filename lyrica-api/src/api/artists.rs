//! Artist endpoints
//!
//! Listing returns summary shapes only; retrieval returns the detail
//! shape with owned albums embedded. Artists are the one entity family
//! with range filters (`min_year`/`max_year` over `first_year_active`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, ListResponse, PAGE_SIZE};
use crate::views::{self, ArtistDetail, ArtistSummary};
use crate::AppState;
use lyrica_common::db::artists::{self, ArtistFilter};

/// Query parameters for artist listing
#[derive(Debug, Deserialize)]
pub struct ArtistListQuery {
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,

    /// Column to sort by: "name" or "first_year_active"
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
pub struct CreateArtistRequest {
    pub name: Option<String>,
    pub first_year_active: Option<i64>,
}

/// GET /api/artist
pub async fn list_artists(
    State(state): State<AppState>,
    Query(query): Query<ArtistListQuery>,
) -> ApiResult<Json<ListResponse<ArtistSummary>>> {
    let filter = ArtistFilter {
        min_year: query.min_year,
        max_year: query.max_year,
    };

    let count = artists::count_artists(&state.db, &filter).await?;
    let pagination = calculate_pagination(count, query.page);

    let items = artists::list_artists(
        &state.db,
        &filter,
        query.sort.as_deref(),
        &query.order,
        PAGE_SIZE,
        pagination.offset,
    )
    .await?;

    Ok(Json(ListResponse {
        count,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        results: items.iter().map(views::artist_summary).collect(),
    }))
}

/// POST /api/artist
pub async fn create_artist(
    State(state): State<AppState>,
    Json(req): Json<CreateArtistRequest>,
) -> ApiResult<(StatusCode, Json<ArtistSummary>)> {
    let name = req
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;

    let artist = artists::insert_artist(&state.db, name, req.first_year_active).await?;

    Ok((StatusCode::CREATED, Json(views::artist_summary(&artist))))
}

/// GET /api/artist/:id
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ArtistDetail>> {
    let artist = artists::get_artist(&state.db, id).await?;
    Ok(Json(views::artist_detail(&state.db, artist).await?))
}

/// DELETE /api/artist/:id
///
/// Cascades through the artist's albums, their songs, and those songs'
/// lyrics.
pub async fn delete_artist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    artists::delete_artist(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
