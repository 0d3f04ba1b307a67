//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! so that migrations, constraints, triggers and indexes behave as in production.

#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;
use vibesia_core::types::*;
use vibesia_storage::{PoolSettings, SqliteCatalog};

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = vibesia_storage::create_pool(&db_url, &PoolSettings::default())
            .await
            .expect("Failed to create pool");

        vibesia_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Storage over this database
    pub fn catalog(&self) -> SqliteCatalog {
        SqliteCatalog::new(self.pool.clone())
    }
}

/// Test fixture: Create a test user
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> UserId {
    let result = sqlx::query(
        "INSERT INTO users (username, email, hashed_password) VALUES (?, ?, 'not-a-hash')",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
    .execute(pool)
    .await
    .expect("Failed to create test user");

    UserId::new(result.last_insert_rowid())
}

/// Test fixture: Create an artist with one album, returning the album id
pub async fn create_test_album(pool: &SqlitePool, artist: &str, title: &str) -> i64 {
    let artist_id = sqlx::query("INSERT INTO artists (name) VALUES (?)")
        .bind(artist)
        .execute(pool)
        .await
        .expect("Failed to create test artist")
        .last_insert_rowid();

    sqlx::query("INSERT INTO albums (artist_id, title) VALUES (?, ?)")
        .bind(artist_id)
        .bind(title)
        .execute(pool)
        .await
        .expect("Failed to create test album")
        .last_insert_rowid()
}

/// Test fixture: Create a song
pub async fn create_test_song(pool: &SqlitePool, album_id: i64, title: &str, duration: i64) -> SongId {
    let result = sqlx::query(
        "INSERT INTO songs (album_id, title, duration, audio_path) VALUES (?, ?, ?, ?)",
    )
    .bind(album_id)
    .bind(title)
    .bind(duration)
    .bind(format!("/music/{title}.mp3"))
    .execute(pool)
    .await
    .expect("Failed to create test song");

    SongId::new(result.last_insert_rowid())
}

/// Test fixture: `count` songs of 180s, 200s, 220s, ... on a fresh album
pub async fn create_test_songs(pool: &SqlitePool, count: usize) -> Vec<SongId> {
    let album_id = create_test_album(pool, "Test Artist", "Test Album").await;
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = create_test_song(pool, album_id, &format!("Track {}", i + 1), 180 + 20 * i as i64)
            .await;
        ids.push(id);
    }
    ids
}

/// Audit context for a regular user
pub fn user_context(user_id: UserId, email: &str) -> AuditContext {
    AuditContext::anonymous()
        .with_actor(Actor {
            user_id,
            email: email.to_string(),
            role: Role::User,
            is_active: true,
        })
        .with_request("test-agent/1.0", "/api/v1/playlists", "req-test")
}

/// Test fixture: Create an empty playlist
pub async fn create_test_playlist(catalog: &SqliteCatalog, owner: UserId, name: &str) -> PlaylistId {
    use vibesia_core::CatalogStorage;

    catalog
        .create_playlist(
            &user_context(owner, "owner@example.com"),
            owner,
            CreatePlaylist {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create test playlist")
        .playlist
        .id
}

/// Number of rows in a table
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}
