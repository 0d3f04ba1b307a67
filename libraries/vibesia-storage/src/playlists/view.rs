//! Playlist aggregate builder

use super::authorize;
use sqlx::{Row, SqliteConnection};
use vibesia_core::{error::Result, types::*};

/// Owner-checked playlist with its songs in position order and aggregates
///
/// Running this on the connection of an open transaction sees that
/// transaction's own writes.
pub async fn materialize(
    conn: &mut SqliteConnection,
    id: PlaylistId,
    owner: UserId,
) -> Result<PlaylistView> {
    let playlist = authorize(conn, id, owner).await?;
    let songs = songs_of(conn, id).await?;
    let (song_count, total_duration) = summarize(&songs);

    Ok(PlaylistView {
        playlist,
        songs,
        song_count,
        total_duration,
    })
}

/// Songs of a playlist in position order, ties broken by insertion time
pub async fn songs_of(conn: &mut SqliteConnection, id: PlaylistId) -> Result<Vec<PlaylistSong>> {
    let rows = sqlx::query(
        r#"
        SELECT
            ps.song_id, ps.position, ps.date_added,
            s.title, s.duration, s.track_number, s.album_id,
            al.title AS album_title,
            ar.name AS artist_name
        FROM playlist_songs ps
        INNER JOIN songs s ON s.song_id = ps.song_id
        LEFT JOIN albums al ON al.album_id = s.album_id
        LEFT JOIN artists ar ON ar.artist_id = al.artist_id
        WHERE ps.playlist_id = ?
        ORDER BY ps.position ASC, ps.date_added ASC
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| PlaylistSong {
            song_id: row.get("song_id"),
            position: row.get("position"),
            date_added: row.get("date_added"),
            title: row.get("title"),
            duration: row.get("duration"),
            track_number: row.get("track_number"),
            album_id: row.get("album_id"),
            album_title: row.get("album_title"),
            artist_name: row.get("artist_name"),
        })
        .collect())
}

/// `(song_count, total_duration)`, zero for an empty playlist
pub(crate) fn summarize(songs: &[PlaylistSong]) -> (i64, i64) {
    (songs.len() as i64, songs.iter().map(|s| s.duration).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: i64, position: i64, duration: i64) -> PlaylistSong {
        PlaylistSong {
            song_id: SongId::new(id),
            position,
            date_added: chrono::Utc::now(),
            title: format!("Song {id}"),
            duration,
            track_number: None,
            album_id: 1,
            album_title: None,
            artist_name: None,
        }
    }

    #[test]
    fn empty_playlist_has_zero_aggregates() {
        assert_eq!(summarize(&[]), (0, 0));
    }

    #[test]
    fn aggregates_sum_durations() {
        let songs = vec![song(1, 1, 180), song(2, 2, 200)];
        assert_eq!(summarize(&songs), (2, 380));
    }
}
