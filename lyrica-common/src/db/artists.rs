//! Artist database operations

use crate::db::models::Artist;
use crate::db::{order_clause, parse_guid};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Accepted sort columns for artist listings
const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "name"),
    ("first_year_active", "first_year_active"),
];

/// Range filter over `first_year_active`
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtistFilter {
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
}

fn artist_from_row(row: &SqliteRow) -> Result<Artist> {
    let guid: String = row.get("guid");
    Ok(Artist {
        id: parse_guid(&guid)?,
        name: row.get("name"),
        first_year_active: row.get("first_year_active"),
    })
}

/// Insert a new artist
///
/// Duplicate names surface as a validation error, not a database fault.
pub async fn insert_artist(
    pool: &SqlitePool,
    name: &str,
    first_year_active: Option<i64>,
) -> Result<Artist> {
    if name.trim().is_empty() {
        return Err(Error::Validation("name is required".to_string()));
    }
    if first_year_active.is_some_and(|year| year < 0) {
        return Err(Error::Validation(
            "first_year_active must be non-negative".to_string(),
        ));
    }

    let artist = Artist {
        id: Uuid::new_v4(),
        name: name.to_string(),
        first_year_active,
    };

    sqlx::query(
        r#"
        INSERT INTO artists (guid, name, first_year_active)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(artist.id.to_string())
    .bind(&artist.name)
    .bind(artist.first_year_active)
    .execute(pool)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Validation(format!("artist with name '{}' already exists", name))
        } else {
            Error::Database(e)
        }
    })?;

    Ok(artist)
}

/// Load artist by id
pub async fn get_artist(pool: &SqlitePool, id: Uuid) -> Result<Artist> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, first_year_active
        FROM artists
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => artist_from_row(&row),
        None => Err(Error::NotFound(format!("artist {} not found", id))),
    }
}

/// Count artists matching the filter
pub async fn count_artists(pool: &SqlitePool, filter: &ArtistFilter) -> Result<i64> {
    let count = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM artists
        WHERE (? IS NULL OR first_year_active >= ?)
          AND (? IS NULL OR first_year_active <= ?)
        "#,
    )
    .bind(filter.min_year)
    .bind(filter.min_year)
    .bind(filter.max_year)
    .bind(filter.max_year)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// List artists matching the filter, sorted and paged
pub async fn list_artists(
    pool: &SqlitePool,
    filter: &ArtistFilter,
    sort: Option<&str>,
    order: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Artist>> {
    let order_by = order_clause(sort, order, SORT_COLUMNS, "created_at")?;

    let sql = format!(
        r#"
        SELECT guid, name, first_year_active
        FROM artists
        WHERE (? IS NULL OR first_year_active >= ?)
          AND (? IS NULL OR first_year_active <= ?)
        {}
        LIMIT ? OFFSET ?
        "#,
        order_by
    );

    let rows = sqlx::query(&sql)
        .bind(filter.min_year)
        .bind(filter.min_year)
        .bind(filter.max_year)
        .bind(filter.max_year)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    rows.iter().map(artist_from_row).collect()
}

/// Delete artist by id
///
/// Cascades through albums, their songs, and those songs' lyrics.
pub async fn delete_artist(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM artists WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("artist {} not found", id)));
    }

    Ok(())
}

/// Find an artist by exact name, creating one if absent
///
/// `INSERT ... ON CONFLICT DO NOTHING` followed by a re-select, so two
/// concurrent callers converge on the same row. Runs on the caller's
/// connection so it can participate in a transaction.
pub async fn get_or_create_artist(conn: &mut SqliteConnection, name: &str) -> Result<Artist> {
    if name.trim().is_empty() {
        return Err(Error::Validation("artist_name is required".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO artists (guid, name)
        VALUES (?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query(
        r#"
        SELECT guid, name, first_year_active
        FROM artists
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    artist_from_row(&row)
}
