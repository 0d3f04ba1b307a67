//! Playlist position ledger
//!
//! Positions are 1-based and unique per playlist. Shifting a block of
//! entries is done in two statements: the block is first parked at its
//! negated positions, then moved to the final positions. The unique index
//! on `(playlist_id, position)` stays satisfied after every statement.
//!
//! Every function expects to run inside an [`AuditedTransaction`], which
//! holds the write lock for the whole read-compute-write sequence.
//!
//! [`AuditedTransaction`]: crate::AuditedTransaction

use crate::songs;
use sqlx::{Row, SqliteConnection};
use std::collections::HashMap;
use vibesia_core::{error::Result, types::*, VibesiaError};

/// A position change computed for one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Move {
    pub song_id: SongId,
    pub from: i64,
    pub to: i64,
}

/// Where an insertion lands given the requested position and the next
/// free position. Out-of-range requests clamp to the ends.
pub(crate) fn resolve_insert_position(requested: Option<i64>, next: i64) -> i64 {
    requested.map_or(next, |p| p.clamp(1, next))
}

/// Moves needed to put `song_id` at `new_position` and renumber `1..=n`
///
/// `current` must be in position order. Returns `None` when the song is not
/// part of the playlist. Entries whose position does not change are left
/// out of the plan.
pub(crate) fn plan_reorder(
    current: &[(SongId, i64)],
    song_id: SongId,
    new_position: i64,
) -> Option<Vec<Move>> {
    let index = current.iter().position(|(id, _)| *id == song_id)?;

    let mut order: Vec<SongId> = current.iter().map(|(id, _)| *id).collect();
    let moved = order.remove(index);
    let target = (new_position.clamp(1, current.len() as i64) - 1) as usize;
    order.insert(target, moved);

    let old: HashMap<SongId, i64> = current.iter().copied().collect();
    let moves = order
        .into_iter()
        .zip(1_i64..)
        .filter_map(|(id, to)| {
            let from = old[&id];
            (from != to).then_some(Move {
                song_id: id,
                from,
                to,
            })
        })
        .collect();

    Some(moves)
}

/// `(song_id, position)` pairs in position order
pub async fn positions(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
) -> Result<Vec<(SongId, i64)>> {
    let rows = sqlx::query(
        "SELECT song_id, position FROM playlist_songs
         WHERE playlist_id = ?
         ORDER BY position ASC, date_added ASC",
    )
    .bind(playlist_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.get("song_id"), row.get("position")))
        .collect())
}

/// Next free position, `1` for an empty playlist
pub async fn next_position(conn: &mut SqliteConnection, playlist_id: PlaylistId) -> Result<i64> {
    let max: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), 0) FROM playlist_songs WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(max + 1)
}

/// Whether `song_id` is already in the playlist
pub async fn contains(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    song_id: SongId,
) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM playlist_songs WHERE playlist_id = ? AND song_id = ?",
    )
    .bind(playlist_id)
    .bind(song_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(found.is_some())
}

/// Add a song, appending or inserting at the requested position
pub async fn add(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    song: AddSong,
) -> Result<PlaylistEntry> {
    if !songs::exists(conn, song.song_id).await? {
        return Err(VibesiaError::not_found("Song", song.song_id));
    }
    if contains(conn, playlist_id, song.song_id).await? {
        return Err(duplicate_entry(playlist_id, song.song_id));
    }

    let next = next_position(conn, playlist_id).await?;
    let position = resolve_insert_position(song.position, next);
    if position < next {
        shift_down_from(conn, playlist_id, position).await?;
    }

    sqlx::query("INSERT INTO playlist_songs (playlist_id, song_id, position) VALUES (?, ?, ?)")
        .bind(playlist_id)
        .bind(song.song_id)
        .bind(position)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                duplicate_entry(playlist_id, song.song_id)
            } else {
                e.into()
            }
        })?;

    tracing::debug!(
        playlist_id = %playlist_id,
        song_id = %song.song_id,
        position,
        "Song added to playlist"
    );

    let row = sqlx::query(
        "SELECT playlist_id, song_id, position, date_added FROM playlist_songs
         WHERE playlist_id = ? AND song_id = ?",
    )
    .bind(playlist_id)
    .bind(song.song_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(PlaylistEntry {
        playlist_id: row.get("playlist_id"),
        song_id: row.get("song_id"),
        position: row.get("position"),
        date_added: row.get("date_added"),
    })
}

/// Append songs in order; the first failure aborts the caller's transaction
pub async fn seed(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    song_ids: &[SongId],
) -> Result<()> {
    for song_id in song_ids {
        add(conn, playlist_id, AddSong::append(*song_id)).await?;
    }
    Ok(())
}

/// Remove a song; remaining positions are left untouched
pub async fn remove(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    song_id: SongId,
) -> Result<()> {
    let result = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
        .bind(playlist_id)
        .bind(song_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(VibesiaError::not_found(
            "PlaylistEntry",
            format!("song {song_id} in playlist {playlist_id}"),
        ));
    }

    Ok(())
}

/// Move a song to `new_position` and renumber the playlist `1..=n`
pub async fn reorder(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    reorder: SongReorder,
) -> Result<()> {
    let current = positions(conn, playlist_id).await?;
    let moves = plan_reorder(&current, reorder.song_id, reorder.new_position).ok_or_else(|| {
        VibesiaError::not_found(
            "PlaylistEntry",
            format!("song {} in playlist {playlist_id}", reorder.song_id),
        )
    })?;

    for m in &moves {
        sqlx::query(
            "UPDATE playlist_songs SET position = -position
             WHERE playlist_id = ? AND song_id = ?",
        )
        .bind(playlist_id)
        .bind(m.song_id)
        .execute(&mut *conn)
        .await?;
    }

    for m in &moves {
        sqlx::query("UPDATE playlist_songs SET position = ? WHERE playlist_id = ? AND song_id = ?")
            .bind(m.to)
            .bind(playlist_id)
            .bind(m.song_id)
            .execute(&mut *conn)
            .await?;
    }

    tracing::debug!(
        playlist_id = %playlist_id,
        song_id = %reorder.song_id,
        moved = moves.len(),
        "Playlist reordered"
    );

    Ok(())
}

/// Shift every entry at or after `from` one position later
async fn shift_down_from(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    from: i64,
) -> Result<()> {
    sqlx::query(
        "UPDATE playlist_songs SET position = -position
         WHERE playlist_id = ? AND position >= ?",
    )
    .bind(playlist_id)
    .bind(from)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "UPDATE playlist_songs SET position = 1 - position
         WHERE playlist_id = ? AND position < 0",
    )
    .bind(playlist_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn duplicate_entry(playlist_id: PlaylistId, song_id: SongId) -> VibesiaError {
    VibesiaError::duplicate(
        "PlaylistEntry",
        format!("song {song_id} already in playlist {playlist_id}"),
    )
}
