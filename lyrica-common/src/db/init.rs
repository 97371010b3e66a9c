//! Database schema initialization
//!
//! All statements are `CREATE ... IF NOT EXISTS`, safe to run on every
//! startup. Ownership chains (artist -> album -> song -> lyric -> vote)
//! carry `ON DELETE CASCADE` so deleting a parent removes its descendants
//! transitively.

use crate::Result;
use sqlx::SqlitePool;

/// Create all tables if needed (idempotent)
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    create_artists_table(pool).await?;
    create_albums_table(pool).await?;
    create_songs_table(pool).await?;
    create_lyrics_table(pool).await?;
    create_votes_table(pool).await?;
    Ok(())
}

async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            first_year_active INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            year INTEGER,
            artist_id TEXT REFERENCES artists(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_albums_artist ON albums(artist_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            album_id TEXT REFERENCES albums(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_album ON songs(album_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_lyrics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lyrics (
            guid TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            song_id TEXT REFERENCES songs(guid) ON DELETE CASCADE,
            votes INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_lyrics_text ON lyrics(text)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_lyrics_song ON lyrics(song_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// One ledger row per (lyric, voter) pair; a repeat vote replaces the
/// prior score via upsert, never accumulates.
async fn create_votes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS votes (
            lyric_id TEXT NOT NULL REFERENCES lyrics(guid) ON DELETE CASCADE,
            voter TEXT NOT NULL,
            score INTEGER NOT NULL CHECK (score IN (-1, 1)),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (lyric_id, voter)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
