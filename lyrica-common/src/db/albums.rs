//! Album database operations

use crate::db::models::Album;
use crate::db::{artists, order_clause, parse_guid};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const SORT_COLUMNS: &[(&str, &str)] = &[("name", "name"), ("year", "year")];

fn album_from_row(row: &SqliteRow) -> Result<Album> {
    let guid: String = row.get("guid");
    let artist_id: Option<String> = row.get("artist_id");
    Ok(Album {
        id: parse_guid(&guid)?,
        name: row.get("name"),
        year: row.get("year"),
        artist_id: artist_id.as_deref().map(parse_guid).transpose()?,
    })
}

/// Insert a new album, resolving or creating its artist by name
///
/// `year` is mandatory here even though the column is nullable; the
/// create contract is stricter than the storage shape. Artist resolution
/// and the insert run in one transaction.
pub async fn insert_album(
    pool: &SqlitePool,
    name: &str,
    year: i64,
    artist_name: &str,
) -> Result<Album> {
    if name.trim().is_empty() {
        return Err(Error::Validation("name is required".to_string()));
    }
    if year < 0 {
        return Err(Error::Validation("year must be non-negative".to_string()));
    }

    let mut tx = pool.begin().await?;

    let artist = artists::get_or_create_artist(&mut tx, artist_name).await?;

    let album = Album {
        id: Uuid::new_v4(),
        name: name.to_string(),
        year: Some(year),
        artist_id: Some(artist.id),
    };

    sqlx::query(
        r#"
        INSERT INTO albums (guid, name, year, artist_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(album.id.to_string())
    .bind(&album.name)
    .bind(album.year)
    .bind(artist.id.to_string())
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Validation(format!("album with name '{}' already exists", name))
        } else {
            Error::Database(e)
        }
    })?;

    tx.commit().await?;

    Ok(album)
}

/// Load album by id
pub async fn get_album(pool: &SqlitePool, id: Uuid) -> Result<Album> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, year, artist_id
        FROM albums
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => album_from_row(&row),
        None => Err(Error::NotFound(format!("album {} not found", id))),
    }
}

/// Total album count
pub async fn count_albums(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM albums")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// List albums, sorted and paged
pub async fn list_albums(
    pool: &SqlitePool,
    sort: Option<&str>,
    order: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Album>> {
    let order_by = order_clause(sort, order, SORT_COLUMNS, "created_at")?;

    let sql = format!(
        r#"
        SELECT guid, name, year, artist_id
        FROM albums
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

    rows.iter().map(album_from_row).collect()
}

/// Albums owned by an artist
pub async fn albums_for_artist(pool: &SqlitePool, artist_id: Uuid) -> Result<Vec<Album>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, name, year, artist_id
        FROM albums
        WHERE artist_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(artist_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(album_from_row).collect()
}

/// Delete album by id, cascading through songs and lyrics
pub async fn delete_album(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM albums WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("album {} not found", id)));
    }

    Ok(())
}
