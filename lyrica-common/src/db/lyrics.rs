//! Lyric database operations
//!
//! Lyric creation is the one write path with resolution logic: the caller
//! must name an existing album, and may reference a song by id (must
//! exist) or by name (found or created under that album). Resolution and
//! the insert run in a single transaction.

use crate::db::models::Lyric;
use crate::db::{order_clause, parse_guid, songs};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("text", "l.text"),
    ("song_name", "s.name"),
    ("album_name", "a.name"),
];

fn lyric_from_row(row: &SqliteRow) -> Result<Lyric> {
    let guid: String = row.get("guid");
    let song_id: Option<String> = row.get("song_id");
    Ok(Lyric {
        id: parse_guid(&guid)?,
        text: row.get("text"),
        song_id: song_id.as_deref().map(parse_guid).transpose()?,
        votes: row.get("votes"),
    })
}

/// Create a lyric, resolving its song reference
///
/// The album is only used to anchor song creation; it is never stored on
/// the lyric row. With neither `song_id` nor `song_name` supplied the
/// lyric is created unattached.
pub async fn create_lyric(
    pool: &SqlitePool,
    text: &str,
    album_id: Uuid,
    song_id: Option<Uuid>,
    song_name: Option<&str>,
) -> Result<Lyric> {
    if text.trim().is_empty() {
        return Err(Error::Validation("text is required".to_string()));
    }

    let mut tx = pool.begin().await?;

    let album_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM albums WHERE guid = ?)")
            .bind(album_id.to_string())
            .fetch_one(&mut *tx)
            .await?;
    if !album_exists {
        return Err(Error::Validation(format!(
            "There is no album with the id={}. Try another one.",
            album_id
        )));
    }

    let resolved_song_id = match (song_id, song_name) {
        (Some(id), _) => {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM songs WHERE guid = ?)")
                    .bind(id.to_string())
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(Error::NotFound(format!("song {} not found", id)));
            }
            Some(id)
        }
        (None, Some(name)) if !name.trim().is_empty() => {
            Some(songs::get_or_create_song(&mut tx, name, album_id).await?.id)
        }
        _ => None,
    };

    let lyric = Lyric {
        id: Uuid::new_v4(),
        text: text.to_string(),
        song_id: resolved_song_id,
        votes: 0,
    };

    sqlx::query(
        r#"
        INSERT INTO lyrics (guid, text, song_id, votes)
        VALUES (?, ?, ?, 0)
        "#,
    )
    .bind(lyric.id.to_string())
    .bind(&lyric.text)
    .bind(lyric.song_id.map(|id| id.to_string()))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(lyric)
}

/// Load lyric by id
pub async fn get_lyric(pool: &SqlitePool, id: Uuid) -> Result<Lyric> {
    let row = sqlx::query(
        r#"
        SELECT guid, text, song_id, votes
        FROM lyrics
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => lyric_from_row(&row),
        None => Err(Error::NotFound(format!("lyric {} not found", id))),
    }
}

fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("%{}%", s))
}

/// Count lyrics matching the free-text search
pub async fn count_lyrics(pool: &SqlitePool, search: Option<&str>) -> Result<i64> {
    let pattern = search_pattern(search);

    let count = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM lyrics l
        LEFT JOIN songs s ON l.song_id = s.guid
        LEFT JOIN albums a ON s.album_id = a.guid
        WHERE (? IS NULL OR l.text LIKE ? OR s.name LIKE ? OR a.name LIKE ?)
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// List lyrics, searched over lyric text, song name, and album name
pub async fn list_lyrics(
    pool: &SqlitePool,
    search: Option<&str>,
    sort: Option<&str>,
    order: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Lyric>> {
    let order_by = order_clause(sort, order, SORT_COLUMNS, "l.created_at")?;
    let pattern = search_pattern(search);

    let sql = format!(
        r#"
        SELECT l.guid, l.text, l.song_id, l.votes
        FROM lyrics l
        LEFT JOIN songs s ON l.song_id = s.guid
        LEFT JOIN albums a ON s.album_id = a.guid
        WHERE (? IS NULL OR l.text LIKE ? OR s.name LIKE ? OR a.name LIKE ?)
        {}
        LIMIT ? OFFSET ?
        "#,
        order_by
    );

    let rows = sqlx::query(&sql)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    rows.iter().map(lyric_from_row).collect()
}

/// Lyrics attached to a song
pub async fn lyrics_for_song(pool: &SqlitePool, song_id: Uuid) -> Result<Vec<Lyric>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, text, song_id, votes
        FROM lyrics
        WHERE song_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(song_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(lyric_from_row).collect()
}

/// Delete lyric by id (its ledger rows go with it)
pub async fn delete_lyric(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM lyrics WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("lyric {} not found", id)));
    }

    Ok(())
}
