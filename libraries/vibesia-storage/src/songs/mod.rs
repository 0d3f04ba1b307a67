//! Song lookups (the catalog is read-only here)

use sqlx::{Row, SqliteConnection, SqlitePool};
use vibesia_core::{error::Result, types::*};

/// Get song by ID with album title and artist name
pub async fn get_by_id(pool: &SqlitePool, id: SongId) -> Result<Option<Song>> {
    let row = sqlx::query(
        r#"
        SELECT
            s.song_id, s.album_id, s.title, s.duration, s.track_number,
            s.composer, s.explicit_content,
            al.title AS album_title,
            ar.name AS artist_name
        FROM songs s
        LEFT JOIN albums al ON al.album_id = s.album_id
        LEFT JOIN artists ar ON ar.artist_id = al.artist_id
        WHERE s.song_id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Song {
        id: row.get("song_id"),
        album_id: row.get("album_id"),
        title: row.get("title"),
        duration: row.get("duration"),
        track_number: row.get("track_number"),
        composer: row.get("composer"),
        explicit_content: row.get::<i64, _>("explicit_content") != 0,
        album_title: row.get("album_title"),
        artist_name: row.get("artist_name"),
    }))
}

/// Whether a song exists
pub async fn exists(conn: &mut SqliteConnection, id: SongId) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM songs WHERE song_id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(found.is_some())
}
