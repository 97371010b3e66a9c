//! Integration tests for lyrica-api endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Album create contract (year required, artist get-or-create)
//! - Artist listing/detail shapes and year-range filters
//! - Lyric creation with song resolution
//! - Vote up/down with per-voter upsert semantics
//! - Cascading deletes across the ownership chain

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use lyrica_api::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: In-memory database with the full schema
///
/// A single connection keeps every request on the same in-memory database.
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should create in-memory database");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("Should enable foreign keys");

    lyrica_common::db::init::initialize_schema(&pool)
        .await
        .expect("Schema initialization failed");

    pool
}

/// Test helper: Create app with test state
async fn setup_app() -> axum::Router {
    let db = setup_test_db().await;
    build_router(AppState::new(db))
}

/// Test helper: Create bodyless request
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Create JSON request
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: Create an album, returning its JSON record
async fn create_album(app: &axum::Router, name: &str, year: i64, artist_name: &str) -> Value {
    let request = json_request(
        "POST",
        "/api/album",
        json!({"name": name, "year": year, "artist_name": artist_name}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await
}

/// Test helper: Create a lyric under an album, optionally naming a song
async fn create_lyric(app: &axum::Router, text: &str, album_id: &str, song_name: &str) -> Value {
    let request = json_request(
        "POST",
        "/api/lyric",
        json!({"text": text, "album": {"id": album_id}, "song": {"name": song_name}}),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "lyrica-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Album Tests
// =============================================================================

#[tokio::test]
async fn test_create_album_without_year_fails() {
    let app = setup_app().await;

    let request = json_request(
        "POST",
        "/api/album",
        json!({"name": "Thriller", "artist_name": "Michael Jackson"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("year is required"));
}

#[tokio::test]
async fn test_create_album_resolves_artist_by_name() {
    let app = setup_app().await;

    let album = create_album(&app, "Thriller", 1982, "Michael Jackson").await;

    assert_eq!(album["name"], "Thriller");
    assert_eq!(album["year"], 1982);
    assert_eq!(album["artist"]["name"], "Michael Jackson");
}

#[tokio::test]
async fn test_create_two_albums_reuses_artist() {
    let app = setup_app().await;

    let first = create_album(&app, "Thriller", 1982, "Michael Jackson").await;
    let second = create_album(&app, "Bad", 1987, "Michael Jackson").await;

    assert_eq!(first["artist"]["id"], second["artist"]["id"]);
}

#[tokio::test]
async fn test_create_album_duplicate_name_fails() {
    let app = setup_app().await;

    create_album(&app, "Thriller", 1982, "Michael Jackson").await;

    let request = json_request(
        "POST",
        "/api/album",
        json!({"name": "Thriller", "year": 2003, "artist_name": "Somebody Else"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_album_detail_embeds_songs() {
    let app = setup_app().await;

    let album = create_album(&app, "1989", 2014, "Taylor Swift").await;
    let album_id = album["id"].as_str().unwrap();
    create_lyric(&app, "I stay out too late", album_id, "Shake It Off").await;

    let response = app
        .clone()
        .oneshot(test_request("GET", &format!("/api/album/{}", album_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let songs = body["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["name"], "Shake It Off");
    // Narrow song shape: id and name only
    assert!(songs[0].get("album").is_none());
}

#[tokio::test]
async fn test_get_unknown_album_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/album/00000000-0000-0000-0000-000000000099",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Artist Tests
// =============================================================================

#[tokio::test]
async fn test_artist_list_entries_have_no_albums_key() {
    let app = setup_app().await;

    create_album(&app, "Thriller", 1982, "Michael Jackson").await;

    let response = app.oneshot(test_request("GET", "/api/artist")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty());
    for entry in results {
        assert!(entry.get("id").is_some());
        assert!(entry.get("name").is_some());
        // first_year_active is present even when null
        assert!(entry.as_object().unwrap().contains_key("first_year_active"));
        assert!(entry.get("albums").is_none());
    }
}

#[tokio::test]
async fn test_artist_detail_includes_albums() {
    let app = setup_app().await;

    let album = create_album(&app, "Thriller", 1982, "Michael Jackson").await;
    let artist_id = album["artist"]["id"].as_str().unwrap();

    let response = app
        .oneshot(test_request("GET", &format!("/api/artist/{}", artist_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Michael Jackson");
    let albums = body["albums"].as_array().unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0]["name"], "Thriller");
    // Narrow album shape inside artist detail: no year, no artist
    assert!(albums[0].get("year").is_none());
}

#[tokio::test]
async fn test_artist_year_range_filter() {
    let app = setup_app().await;

    for (name, year) in [("Old Band", 1965), ("Mid Band", 1990), ("New Band", 2015)] {
        let request = json_request(
            "POST",
            "/api/artist",
            json!({"name": name, "first_year_active": year}),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/artist?min_year=1980&max_year=2000",
        ))
        .await
        .unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Mid Band");
}

#[tokio::test]
async fn test_create_artist_without_name_fails() {
    let app = setup_app().await;

    let request = json_request("POST", "/api/artist", json!({"first_year_active": 1990}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_artist_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/artist/00000000-0000-0000-0000-000000000099",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Lyric Tests
// =============================================================================

#[tokio::test]
async fn test_lyric_list_count_matches_total() {
    let app = setup_app().await;

    let album = create_album(&app, "Folklore", 2020, "Taylor Swift").await;
    let album_id = album["id"].as_str().unwrap();
    create_lyric(&app, "And when I felt like I was an old cardigan", album_id, "Cardigan").await;
    create_lyric(&app, "I knew you'd linger like a tattoo kiss", album_id, "Cardigan").await;
    create_lyric(&app, "But I knew you", album_id, "Betty").await;

    let response = app.oneshot(test_request("GET", "/api/lyric")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_lyric_create_reuses_song_by_name() {
    let app = setup_app().await;

    let album = create_album(&app, "Folklore", 2020, "Taylor Swift").await;
    let album_id = album["id"].as_str().unwrap();

    let first = create_lyric(&app, "First line", album_id, "Cardigan").await;
    let second = create_lyric(&app, "Second line", album_id, "Cardigan").await;

    assert_eq!(first["song"]["id"], second["song"]["id"]);

    // Exactly one song exists
    let response = app.oneshot(test_request("GET", "/api/song")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_lyric_detail_embeds_song_and_album() {
    let app = setup_app().await;

    let album = create_album(&app, "Folklore", 2020, "Taylor Swift").await;
    let album_id = album["id"].as_str().unwrap();
    let lyric = create_lyric(&app, "First line", album_id, "Cardigan").await;
    let lyric_id = lyric["id"].as_str().unwrap();

    let response = app
        .oneshot(test_request("GET", &format!("/api/lyric/{}", lyric_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["song"]["name"], "Cardigan");
    // Album is reached through the song, not stored on the lyric
    assert_eq!(body["album"]["id"].as_str().unwrap(), album_id);
    assert_eq!(body["album"]["artist"]["name"], "Taylor Swift");
}

#[tokio::test]
async fn test_lyric_create_without_album_id_fails() {
    let app = setup_app().await;

    let request = json_request(
        "POST",
        "/api/lyric",
        json!({"text": "Orphan line", "song": {"name": "Nowhere"}}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "album.id is required");
}

#[tokio::test]
async fn test_lyric_create_with_unknown_album_names_the_id() {
    let app = setup_app().await;

    let missing = "00000000-0000-0000-0000-000000000042";
    let request = json_request(
        "POST",
        "/api/lyric",
        json!({"text": "Orphan line", "album": {"id": missing}, "song": {"name": "Nowhere"}}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains(missing));
}

#[tokio::test]
async fn test_lyric_search_over_text_song_and_album() {
    let app = setup_app().await;

    let album = create_album(&app, "Evermore", 2020, "Taylor Swift").await;
    let album_id = album["id"].as_str().unwrap();
    create_lyric(&app, "Long story short", album_id, "Willow").await;

    let other = create_album(&app, "Unrelated", 1999, "Someone").await;
    let other_id = other["id"].as_str().unwrap();
    create_lyric(&app, "Different words", other_id, "Filler").await;

    for query in ["search=story", "search=Willow", "search=Evermore"] {
        let response = app
            .clone()
            .oneshot(test_request("GET", &format!("/api/lyric?{}", query)))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["count"], 1, "query {} should match one lyric", query);
    }
}

// =============================================================================
// Vote Tests
// =============================================================================

#[tokio::test]
async fn test_vote_up_increments_by_one() {
    let app = setup_app().await;

    let album = create_album(&app, "Fearless", 2008, "Taylor Swift").await;
    let lyric = create_lyric(&app, "You take a deep breath", album["id"].as_str().unwrap(), "Fifteen").await;
    let lyric_id = lyric["id"].as_str().unwrap();
    let baseline = lyric["votes"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(test_request(
            "POST",
            &format!("/api/lyric/{}/vote_up", lyric_id),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["votes"].as_i64().unwrap(), baseline + 1);
}

#[tokio::test]
async fn test_vote_down_decrements_by_one() {
    let app = setup_app().await;

    let album = create_album(&app, "Fearless", 2008, "Taylor Swift").await;
    let lyric = create_lyric(&app, "You take a deep breath", album["id"].as_str().unwrap(), "Fifteen").await;
    let lyric_id = lyric["id"].as_str().unwrap();
    let baseline = lyric["votes"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(test_request(
            "POST",
            &format!("/api/lyric/{}/vote_down", lyric_id),
        ))
        .await
        .unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["votes"].as_i64().unwrap(), baseline - 1);
}

#[tokio::test]
async fn test_repeat_vote_from_same_voter_does_not_accumulate() {
    let app = setup_app().await;

    let album = create_album(&app, "Fearless", 2008, "Taylor Swift").await;
    let lyric = create_lyric(&app, "You take a deep breath", album["id"].as_str().unwrap(), "Fifteen").await;
    let lyric_id = lyric["id"].as_str().unwrap();
    let baseline = lyric["votes"].as_i64().unwrap();

    let vote_up = || {
        Request::builder()
            .method("POST")
            .uri(format!("/api/lyric/{}/vote_up", lyric_id))
            .header("x-voter", "alice")
            .body(Body::empty())
            .unwrap()
    };

    app.clone().oneshot(vote_up()).await.unwrap();
    let response = app.clone().oneshot(vote_up()).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["votes"].as_i64().unwrap(), baseline + 1);
}

#[tokio::test]
async fn test_votes_from_distinct_voters_accumulate() {
    let app = setup_app().await;

    let album = create_album(&app, "Fearless", 2008, "Taylor Swift").await;
    let lyric = create_lyric(&app, "You take a deep breath", album["id"].as_str().unwrap(), "Fifteen").await;
    let lyric_id = lyric["id"].as_str().unwrap();

    for voter in ["alice", "bob"] {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/lyric/{}/vote_up", lyric_id))
            .header("x-voter", voter)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap();
    }

    let response = app
        .oneshot(test_request("GET", &format!("/api/lyric/{}", lyric_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["votes"].as_i64().unwrap(), 2);
}

#[tokio::test]
async fn test_vote_on_unknown_lyric_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request(
            "POST",
            "/api/lyric/00000000-0000-0000-0000-000000000099/vote_up",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Cascade Delete Tests
// =============================================================================

#[tokio::test]
async fn test_delete_artist_cascades_to_all_descendants() {
    let app = setup_app().await;

    let album = create_album(&app, "1989", 2014, "Taylor Swift").await;
    let album_id = album["id"].as_str().unwrap();
    let artist_id = album["artist"]["id"].as_str().unwrap();
    let lyric = create_lyric(&app, "I stay out too late", album_id, "Shake It Off").await;
    let lyric_id = lyric["id"].as_str().unwrap();
    let song_id = lyric["song"]["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/artist/{}", artist_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for uri in [
        format!("/api/album/{}", album_id),
        format!("/api/song/{}", song_id),
        format!("/api/lyric/{}", lyric_id),
    ] {
        let response = app.clone().oneshot(test_request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} should be gone", uri);
    }
}

#[tokio::test]
async fn test_delete_song_cascades_to_lyrics() {
    let app = setup_app().await;

    let album = create_album(&app, "Red", 2012, "Taylor Swift").await;
    let lyric = create_lyric(&app, "We are never ever", album["id"].as_str().unwrap(), "WANEGBT").await;
    let song_id = lyric["song"]["id"].as_str().unwrap();
    let lyric_id = lyric["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/song/{}", song_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(test_request("GET", &format!("/api/lyric/{}", lyric_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The album survives; cascade flows downward only
    let response = app
        .oneshot(test_request(
            "GET",
            &format!("/api/album/{}", album["id"].as_str().unwrap()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_unknown_artist_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request(
            "DELETE",
            "/api/artist/00000000-0000-0000-0000-000000000099",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Song Tests
// =============================================================================

#[tokio::test]
async fn test_create_song_with_unknown_album_fails() {
    let app = setup_app().await;

    let missing = "00000000-0000-0000-0000-000000000042";
    let request = json_request(
        "POST",
        "/api/song",
        json!({"name": "Orphan Song", "album_id": missing}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains(missing));
}

#[tokio::test]
async fn test_song_summary_embeds_album_with_artist() {
    let app = setup_app().await;

    let album = create_album(&app, "Red", 2012, "Taylor Swift").await;
    create_lyric(&app, "Loving him is like", album["id"].as_str().unwrap(), "State of Grace").await;

    let response = app.oneshot(test_request("GET", "/api/song")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    let song = &body["results"][0];
    assert_eq!(song["name"], "State of Grace");
    assert_eq!(song["album"]["name"], "Red");
    assert_eq!(song["album"]["artist"]["name"], "Taylor Swift");
}
