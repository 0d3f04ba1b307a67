//! Playlists: ownership guard, CRUD and song list operations
//!
//! Every lookup is scoped to the owner. A playlist that exists but belongs
//! to someone else is reported exactly like one that does not exist.

pub mod ledger;
pub mod view;

use crate::AuditedTransaction;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use validator::Validate;
use vibesia_core::{error::Result, types::*, FailureCode, VibesiaError};

#[derive(FromRow)]
struct PlaylistRow {
    playlist_id: PlaylistId,
    user_id: UserId,
    name: String,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlaylistRow> for Playlist {
    type Error = VibesiaError;

    fn try_from(row: PlaylistRow) -> Result<Self> {
        let status = row.status.parse::<PlaylistStatus>().map_err(|_| {
            VibesiaError::transaction(
                FailureCode::StorageFailure,
                format!("Playlist {} has an unknown status", row.playlist_id),
            )
        })?;

        Ok(Self {
            id: row.playlist_id,
            owner_id: row.user_id,
            name: row.name,
            description: row.description,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    playlist: PlaylistRow,
    song_count: i64,
    total_duration: i64,
}

// ============================================================================
// Ownership guard
// ============================================================================

/// The playlist, if `owner` owns it; `NotFound` otherwise
pub async fn authorize(
    conn: &mut SqliteConnection,
    id: PlaylistId,
    owner: UserId,
) -> Result<Playlist> {
    let row = sqlx::query_as::<_, PlaylistRow>(
        r#"
        SELECT playlist_id, user_id, name, description, status, created_at, updated_at
        FROM playlists
        WHERE playlist_id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => row.try_into(),
        None => Err(VibesiaError::not_found("Playlist", id)),
    }
}

// ============================================================================
// Reads
// ============================================================================

/// Owner's playlists with aggregates, oldest first
pub async fn list(
    pool: &SqlitePool,
    owner: UserId,
    page: Pagination,
) -> Result<Vec<PlaylistSummary>> {
    page.validate()?;

    let rows = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT
            p.playlist_id, p.user_id, p.name, p.description, p.status,
            p.created_at, p.updated_at,
            COUNT(ps.song_id) AS song_count,
            COALESCE(SUM(s.duration), 0) AS total_duration
        FROM playlists p
        LEFT JOIN playlist_songs ps ON ps.playlist_id = p.playlist_id
        LEFT JOIN songs s ON s.song_id = ps.song_id
        WHERE p.user_id = ?
        GROUP BY p.playlist_id
        ORDER BY p.playlist_id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(owner)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<PlaylistSummary> {
            Ok(PlaylistSummary {
                playlist: row.playlist.try_into()?,
                song_count: row.song_count,
                total_duration: row.total_duration,
            })
        })
        .collect()
}

/// Number of playlists owned by `owner`
pub async fn count(pool: &SqlitePool, owner: UserId) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM playlists WHERE user_id = ?")
        .bind(owner)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Materialized playlist for its owner
///
/// The playlist row and its entries are read from one snapshot.
pub async fn get(pool: &SqlitePool, id: PlaylistId, owner: UserId) -> Result<PlaylistView> {
    let mut tx = pool.begin().await?;
    let view = view::materialize(&mut tx, id, owner).await?;
    tx.commit().await?;
    Ok(view)
}

// ============================================================================
// Mutations
// ============================================================================

/// Create a playlist and append the seed songs in order
///
/// A missing seed song aborts the whole creation.
pub async fn create(
    pool: &SqlitePool,
    audit: &AuditContext,
    owner: UserId,
    playlist: CreatePlaylist,
) -> Result<PlaylistView> {
    playlist.validate()?;

    let mut tx = AuditedTransaction::begin(pool, audit).await?;
    let outcome = create_in(tx.conn(), owner, &playlist).await;
    let view = tx.finish(outcome).await?;

    tracing::info!(
        playlist_id = %view.playlist.id,
        owner_id = %owner,
        songs = view.song_count,
        "Playlist created"
    );

    Ok(view)
}

async fn create_in(
    conn: &mut SqliteConnection,
    owner: UserId,
    playlist: &CreatePlaylist,
) -> Result<PlaylistView> {
    ensure_name_available(conn, owner, &playlist.name, None).await?;

    let result = sqlx::query(
        "INSERT INTO playlists (user_id, name, description, status) VALUES (?, ?, ?, ?)",
    )
    .bind(owner)
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(playlist.status.as_str())
    .execute(&mut *conn)
    .await?;

    let id = PlaylistId::new(result.last_insert_rowid());
    ledger::seed(conn, id, &playlist.song_ids).await?;

    view::materialize(conn, id, owner).await
}

/// Apply metadata changes, then additions, removals and reorders
pub async fn update(
    pool: &SqlitePool,
    audit: &AuditContext,
    id: PlaylistId,
    owner: UserId,
    update: UpdatePlaylist,
) -> Result<PlaylistView> {
    update.validate()?;

    let mut tx = AuditedTransaction::begin(pool, audit).await?;
    let outcome = update_in(tx.conn(), id, owner, &update).await;
    tx.finish(outcome).await
}

async fn update_in(
    conn: &mut SqliteConnection,
    id: PlaylistId,
    owner: UserId,
    update: &UpdatePlaylist,
) -> Result<PlaylistView> {
    let current = authorize(conn, id, owner).await?;

    if update.touches_metadata() {
        if let Some(name) = update.name.as_deref().filter(|n| *n != current.name) {
            ensure_name_available(conn, owner, name, Some(id)).await?;
        }

        sqlx::query(
            r#"
            UPDATE playlists
            SET name = ?, description = ?, status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE playlist_id = ?
            "#,
        )
        .bind(update.name.as_deref().unwrap_or(&current.name))
        .bind(update.description.as_deref().or(current.description.as_deref()))
        .bind(update.status.unwrap_or(current.status).as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    }

    for song in &update.add_songs {
        ledger::add(conn, id, *song).await?;
    }
    for song_id in &update.remove_songs {
        ledger::remove(conn, id, *song_id).await?;
    }
    for reorder in &update.reorder_songs {
        ledger::reorder(conn, id, *reorder).await?;
    }

    let songs_changed = !(update.add_songs.is_empty()
        && update.remove_songs.is_empty()
        && update.reorder_songs.is_empty());
    if songs_changed && !update.touches_metadata() {
        touch(conn, id).await?;
    }

    view::materialize(conn, id, owner).await
}

/// Delete a playlist; its entries go with it
pub async fn delete(
    pool: &SqlitePool,
    audit: &AuditContext,
    id: PlaylistId,
    owner: UserId,
) -> Result<Playlist> {
    let mut tx = AuditedTransaction::begin(pool, audit).await?;
    let outcome = delete_in(tx.conn(), id, owner).await;
    let deleted = tx.finish(outcome).await?;

    tracing::info!(playlist_id = %id, owner_id = %owner, "Playlist deleted");
    Ok(deleted)
}

async fn delete_in(conn: &mut SqliteConnection, id: PlaylistId, owner: UserId) -> Result<Playlist> {
    let playlist = authorize(conn, id, owner).await?;

    sqlx::query("DELETE FROM playlists WHERE playlist_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(playlist)
}

/// Add one song to an owned playlist
pub async fn add_song(
    pool: &SqlitePool,
    audit: &AuditContext,
    id: PlaylistId,
    owner: UserId,
    song: AddSong,
) -> Result<PlaylistEntry> {
    song.validate()?;

    let mut tx = AuditedTransaction::begin(pool, audit).await?;
    let outcome: Result<PlaylistEntry> = async {
        authorize(tx.conn(), id, owner).await?;
        let entry = ledger::add(tx.conn(), id, song).await?;
        touch(tx.conn(), id).await?;
        Ok(entry)
    }
    .await;
    tx.finish(outcome).await
}

/// Remove one song from an owned playlist
pub async fn remove_song(
    pool: &SqlitePool,
    audit: &AuditContext,
    id: PlaylistId,
    owner: UserId,
    song_id: SongId,
) -> Result<()> {
    let mut tx = AuditedTransaction::begin(pool, audit).await?;
    let outcome: Result<()> = async {
        authorize(tx.conn(), id, owner).await?;
        ledger::remove(tx.conn(), id, song_id).await?;
        touch(tx.conn(), id).await
    }
    .await;
    tx.finish(outcome).await
}

/// Move one song within an owned playlist
pub async fn reorder_song(
    pool: &SqlitePool,
    audit: &AuditContext,
    id: PlaylistId,
    owner: UserId,
    reorder: SongReorder,
) -> Result<PlaylistView> {
    reorder.validate()?;

    let mut tx = AuditedTransaction::begin(pool, audit).await?;
    let outcome: Result<PlaylistView> = async {
        authorize(tx.conn(), id, owner).await?;
        ledger::reorder(tx.conn(), id, reorder).await?;
        touch(tx.conn(), id).await?;
        view::materialize(tx.conn(), id, owner).await
    }
    .await;
    tx.finish(outcome).await
}

// ============================================================================
// Helpers
// ============================================================================

async fn ensure_name_available(
    conn: &mut SqliteConnection,
    owner: UserId,
    name: &str,
    except: Option<PlaylistId>,
) -> Result<()> {
    let existing: Option<PlaylistId> = sqlx::query_scalar(
        "SELECT playlist_id FROM playlists WHERE user_id = ? AND name = ?",
    )
    .bind(owner)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    match existing {
        Some(found) if Some(found) != except => Err(VibesiaError::duplicate("Playlist", name)),
        _ => Ok(()),
    }
}

async fn touch(conn: &mut SqliteConnection, id: PlaylistId) -> Result<()> {
    sqlx::query(
        "UPDATE playlists SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE playlist_id = ?",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
