//! lyrica-api library - lyrics catalog REST service
//!
//! Four entity families (artists, albums, songs, lyrics) with cascading
//! ownership, plus per-lyric vote scores. Routing mirrors the entity
//! families; all state lives in the SQLite pool.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod error;
pub mod pagination;
pub mod views;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route(
            "/api/artist",
            get(api::artists::list_artists).post(api::artists::create_artist),
        )
        .route(
            "/api/artist/:id",
            get(api::artists::get_artist).delete(api::artists::delete_artist),
        )
        .route(
            "/api/album",
            get(api::albums::list_albums).post(api::albums::create_album),
        )
        .route(
            "/api/album/:id",
            get(api::albums::get_album).delete(api::albums::delete_album),
        )
        .route(
            "/api/song",
            get(api::songs::list_songs).post(api::songs::create_song),
        )
        .route(
            "/api/song/:id",
            get(api::songs::get_song).delete(api::songs::delete_song),
        )
        .route(
            "/api/lyric",
            get(api::lyrics::list_lyrics).post(api::lyrics::create_lyric),
        )
        .route(
            "/api/lyric/:id",
            get(api::lyrics::get_lyric).delete(api::lyrics::delete_lyric),
        )
        .route(
            "/api/lyric/:id/vote_up",
            axum::routing::post(api::lyrics::vote_up),
        )
        .route(
            "/api/lyric/:id/vote_down",
            axum::routing::post(api::lyrics::vote_down),
        )
        .merge(api::health_routes())
        .with_state(state)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
