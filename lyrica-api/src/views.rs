//! View projection layer
//!
//! Explicit named output shapes per (entity, view mode) pair. Summary
//! shapes carry scalar fields only; detail shapes additionally embed one
//! layer of related-entity summaries. The view mode is chosen at the call
//! site, never inferred from request state, and building a projection
//! never mutates the store.

use lyrica_common::db::models::{Album, Artist, Lyric, Song};
use lyrica_common::db::{albums, artists, lyrics, songs};
use lyrica_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Narrow album reference embedded in artist detail
#[derive(Debug, Serialize)]
pub struct AlbumRef {
    pub id: Uuid,
    pub name: String,
}

/// Narrow song reference embedded in album detail and lyric detail
#[derive(Debug, Serialize)]
pub struct SongRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistSummary {
    pub id: Uuid,
    pub name: String,
    pub first_year_active: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    pub id: Uuid,
    pub name: String,
    pub first_year_active: Option<i64>,
    pub albums: Vec<AlbumRef>,
}

#[derive(Debug, Serialize)]
pub struct AlbumSummary {
    pub id: Uuid,
    pub name: String,
    pub year: Option<i64>,
    pub artist: Option<ArtistSummary>,
}

#[derive(Debug, Serialize)]
pub struct AlbumDetail {
    pub id: Uuid,
    pub name: String,
    pub year: Option<i64>,
    pub artist: Option<ArtistSummary>,
    pub songs: Vec<SongRef>,
}

#[derive(Debug, Serialize)]
pub struct SongSummary {
    pub id: Uuid,
    pub name: String,
    pub album: Option<AlbumSummary>,
}

#[derive(Debug, Serialize)]
pub struct SongDetail {
    pub id: Uuid,
    pub name: String,
    pub album: Option<AlbumSummary>,
    pub lyrics: Vec<LyricSummary>,
}

#[derive(Debug, Serialize)]
pub struct LyricSummary {
    pub id: Uuid,
    pub text: String,
    pub votes: i64,
}

/// Lyric detail reaches its album through the song; the lyric row itself
/// never stores an album reference.
#[derive(Debug, Serialize)]
pub struct LyricDetail {
    pub id: Uuid,
    pub text: String,
    pub votes: i64,
    pub song: Option<SongRef>,
    pub album: Option<AlbumSummary>,
}

pub fn artist_summary(artist: &Artist) -> ArtistSummary {
    ArtistSummary {
        id: artist.id,
        name: artist.name.clone(),
        first_year_active: artist.first_year_active,
    }
}

pub async fn artist_detail(pool: &SqlitePool, artist: Artist) -> Result<ArtistDetail> {
    let owned = albums::albums_for_artist(pool, artist.id).await?;

    Ok(ArtistDetail {
        id: artist.id,
        name: artist.name,
        first_year_active: artist.first_year_active,
        albums: owned
            .into_iter()
            .map(|album| AlbumRef {
                id: album.id,
                name: album.name,
            })
            .collect(),
    })
}

pub async fn album_summary(pool: &SqlitePool, album: &Album) -> Result<AlbumSummary> {
    let artist = match album.artist_id {
        Some(artist_id) => Some(artist_summary(&artists::get_artist(pool, artist_id).await?)),
        None => None,
    };

    Ok(AlbumSummary {
        id: album.id,
        name: album.name.clone(),
        year: album.year,
        artist,
    })
}

pub async fn album_detail(pool: &SqlitePool, album: Album) -> Result<AlbumDetail> {
    let summary = album_summary(pool, &album).await?;
    let tracks = songs::songs_for_album(pool, album.id).await?;

    Ok(AlbumDetail {
        id: summary.id,
        name: summary.name,
        year: summary.year,
        artist: summary.artist,
        songs: tracks
            .into_iter()
            .map(|song| SongRef {
                id: song.id,
                name: song.name,
            })
            .collect(),
    })
}

pub async fn song_summary(pool: &SqlitePool, song: &Song) -> Result<SongSummary> {
    let album = match song.album_id {
        Some(album_id) => Some(album_summary(pool, &albums::get_album(pool, album_id).await?).await?),
        None => None,
    };

    Ok(SongSummary {
        id: song.id,
        name: song.name.clone(),
        album,
    })
}

pub async fn song_detail(pool: &SqlitePool, song: Song) -> Result<SongDetail> {
    let summary = song_summary(pool, &song).await?;
    let attached = lyrics::lyrics_for_song(pool, song.id).await?;

    Ok(SongDetail {
        id: summary.id,
        name: summary.name,
        album: summary.album,
        lyrics: attached.iter().map(lyric_summary).collect(),
    })
}

pub fn lyric_summary(lyric: &Lyric) -> LyricSummary {
    LyricSummary {
        id: lyric.id,
        text: lyric.text.clone(),
        votes: lyric.votes,
    }
}

pub async fn lyric_detail(pool: &SqlitePool, lyric: Lyric) -> Result<LyricDetail> {
    let (song, album) = match lyric.song_id {
        Some(song_id) => {
            let song = songs::get_song(pool, song_id).await?;
            let album = match song.album_id {
                Some(album_id) => {
                    Some(album_summary(pool, &albums::get_album(pool, album_id).await?).await?)
                }
                None => None,
            };
            (
                Some(SongRef {
                    id: song.id,
                    name: song.name,
                }),
                album,
            )
        }
        None => (None, None),
    };

    Ok(LyricDetail {
        id: lyric.id,
        text: lyric.text,
        votes: lyric.votes,
        song,
        album,
    })
}
