//! Song database operations
//!
//! Includes the lookup-or-create path used while creating lyrics: a song
//! referenced by name is matched globally by exact name, and created
//! under the supplied album only when no match exists.

use crate::db::models::Song;
use crate::db::{order_clause, parse_guid};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

const SORT_COLUMNS: &[(&str, &str)] = &[("name", "name")];

fn song_from_row(row: &SqliteRow) -> Result<Song> {
    let guid: String = row.get("guid");
    let album_id: Option<String> = row.get("album_id");
    Ok(Song {
        id: parse_guid(&guid)?,
        name: row.get("name"),
        album_id: album_id.as_deref().map(parse_guid).transpose()?,
    })
}

/// Insert a new song, optionally linked to an existing album
pub async fn insert_song(pool: &SqlitePool, name: &str, album_id: Option<Uuid>) -> Result<Song> {
    if name.trim().is_empty() {
        return Err(Error::Validation("name is required".to_string()));
    }

    if let Some(album_id) = album_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM albums WHERE guid = ?)")
            .bind(album_id.to_string())
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(Error::Validation(format!(
                "There is no album with the id={}. Try another one.",
                album_id
            )));
        }
    }

    let song = Song {
        id: Uuid::new_v4(),
        name: name.to_string(),
        album_id,
    };

    sqlx::query(
        r#"
        INSERT INTO songs (guid, name, album_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(song.id.to_string())
    .bind(&song.name)
    .bind(song.album_id.map(|id| id.to_string()))
    .execute(pool)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Validation(format!("song with name '{}' already exists", name))
        } else {
            Error::Database(e)
        }
    })?;

    Ok(song)
}

/// Load song by id
pub async fn get_song(pool: &SqlitePool, id: Uuid) -> Result<Song> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, album_id
        FROM songs
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => song_from_row(&row),
        None => Err(Error::NotFound(format!("song {} not found", id))),
    }
}

/// Total song count
pub async fn count_songs(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// List songs, sorted and paged
pub async fn list_songs(
    pool: &SqlitePool,
    sort: Option<&str>,
    order: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Song>> {
    let order_by = order_clause(sort, order, SORT_COLUMNS, "created_at")?;

    let sql = format!(
        r#"
        SELECT guid, name, album_id
        FROM songs
        {}
        LIMIT ? OFFSET ?
        "#,
        order_by
    );

    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    rows.iter().map(song_from_row).collect()
}

/// Songs on an album
pub async fn songs_for_album(pool: &SqlitePool, album_id: Uuid) -> Result<Vec<Song>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, name, album_id
        FROM songs
        WHERE album_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(album_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(song_from_row).collect()
}

/// Delete song by id, cascading through its lyrics
pub async fn delete_song(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM songs WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("song {} not found", id)));
    }

    Ok(())
}

/// Find a song by exact name
pub async fn find_song_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<Song>> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, album_id
        FROM songs
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(song_from_row).transpose()
}

/// Find a song by exact name, creating one under `album_id` if absent
///
/// Conflict-tolerant like `get_or_create_artist`: the insert ignores a
/// concurrent winner and the re-select returns whichever row exists.
pub async fn get_or_create_song(
    conn: &mut SqliteConnection,
    name: &str,
    album_id: Uuid,
) -> Result<Song> {
    if let Some(song) = find_song_by_name(conn, name).await? {
        return Ok(song);
    }

    sqlx::query(
        r#"
        INSERT INTO songs (guid, name, album_id)
        VALUES (?, ?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .bind(album_id.to_string())
    .execute(&mut *conn)
    .await?;

    match find_song_by_name(conn, name).await? {
        Some(song) => Ok(song),
        None => Err(Error::Internal(format!(
            "song '{}' missing after get-or-create",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::albums;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn test_insert_and_get_song() {
        let pool = memory_pool().await;

        let album = albums::insert_album(&pool, "Lover", 2019, "Taylor Swift")
            .await
            .unwrap();
        let song = insert_song(&pool, "Cruel Summer", Some(album.id))
            .await
            .expect("Failed to insert song");

        let loaded = get_song(&pool, song.id).await.unwrap();
        assert_eq!(loaded.name, "Cruel Summer");
        assert_eq!(loaded.album_id, Some(album.id));
    }

    #[tokio::test]
    async fn test_insert_with_unknown_album_rejected() {
        let pool = memory_pool().await;

        let missing = Uuid::new_v4();
        let result = insert_song(&pool, "Orphan Song", Some(missing)).await;

        match result {
            Err(Error::Validation(msg)) => assert!(msg.contains(&missing.to_string())),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_song_name_is_validation_error() {
        let pool = memory_pool().await;

        insert_song(&pool, "Style", None).await.unwrap();
        let result = insert_song(&pool, "Style", None).await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_existing_song() {
        let pool = memory_pool().await;

        let album = albums::insert_album(&pool, "Folklore", 2020, "Taylor Swift")
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let first = get_or_create_song(&mut conn, "Cardigan", album.id)
            .await
            .unwrap();
        let second = get_or_create_song(&mut conn, "Cardigan", album.id)
            .await
            .unwrap();
        drop(conn);

        assert_eq!(first.id, second.id);
        assert_eq!(count_songs(&pool).await.unwrap(), 1);
    }
}
