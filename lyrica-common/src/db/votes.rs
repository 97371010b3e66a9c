//! Vote ledger operations
//!
//! One ledger row per (lyric, voter); a repeat vote from the same voter
//! replaces the prior score. `lyrics.votes` is a derived cache of the
//! ledger sum and is rewritten, never incremented, so a voter flipping
//! their vote stays correct.

use crate::db::models::Lyric;
use crate::db::parse_guid;
use crate::{Error, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Upsert the ledger row for (lyric, voter)
pub async fn record_vote(
    conn: &mut SqliteConnection,
    lyric_id: Uuid,
    voter: &str,
    score: i64,
) -> Result<()> {
    if score != 1 && score != -1 {
        return Err(Error::Validation(format!(
            "vote score must be +1 or -1, got {}",
            score
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO votes (lyric_id, voter, score)
        VALUES (?, ?, ?)
        ON CONFLICT(lyric_id, voter) DO UPDATE SET
            score = excluded.score,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(lyric_id.to_string())
    .bind(voter)
    .bind(score)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Sum of current ledger scores for a lyric (0 when nobody has voted)
pub async fn score_of(conn: &mut SqliteConnection, lyric_id: Uuid) -> Result<i64> {
    let score = sqlx::query_scalar("SELECT COALESCE(SUM(score), 0) FROM votes WHERE lyric_id = ?")
        .bind(lyric_id.to_string())
        .fetch_one(&mut *conn)
        .await?;

    Ok(score)
}

/// Record a vote and refresh the lyric's cached score, atomically
///
/// Returns the updated lyric.
pub async fn vote(pool: &SqlitePool, lyric_id: Uuid, voter: &str, score: i64) -> Result<Lyric> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        r#"
        SELECT guid, text, song_id
        FROM lyrics
        WHERE guid = ?
        "#,
    )
    .bind(lyric_id.to_string())
    .fetch_optional(&mut *tx)
    .await?;

    let row = row.ok_or_else(|| Error::NotFound(format!("lyric {} not found", lyric_id)))?;

    record_vote(&mut tx, lyric_id, voter, score).await?;
    let total = score_of(&mut tx, lyric_id).await?;

    sqlx::query(
        r#"
        UPDATE lyrics
        SET votes = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(total)
    .bind(lyric_id.to_string())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let song_id: Option<String> = row.get("song_id");
    Ok(Lyric {
        id: parse_guid(&row.get::<String, _>("guid"))?,
        text: row.get("text"),
        song_id: song_id.as_deref().map(parse_guid).transpose()?,
        votes: total,
    })
}
