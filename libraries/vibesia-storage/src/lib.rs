//! Vibesia Storage
//!
//! `SQLite` persistence for the music catalog, user playlists and the audit
//! trail.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature owns its own queries and logic
//! - **Owner Scoping**: Playlists are only ever visible to their owner
//! - **Audited Writes**: Every mutation runs inside an [`AuditedTransaction`]
//!   that carries the acting user down to the audit triggers
//!
//! # Example
//!
//! ```rust,no_run
//! use vibesia_storage::{create_pool, run_migrations, PoolSettings, SqliteCatalog};
//! use vibesia_core::{AuditContext, CatalogStorage, CreatePlaylist, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://vibesia.db", &PoolSettings::default()).await?;
//! run_migrations(&pool).await?;
//!
//! let storage = SqliteCatalog::new(pool);
//! let playlist = storage
//!     .create_playlist(
//!         &AuditContext::system("example"),
//!         UserId::new(1),
//!         CreatePlaylist {
//!             name: "Morning".to_string(),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! assert_eq!(playlist.song_count, 0);
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod transaction;

// Vertical slices
pub mod audit;
pub mod playlists;
pub mod songs;
pub mod users;

pub use context::SqliteCatalog;
pub use error::StorageError;
pub use transaction::AuditedTransaction;

/// Storage handle used by the server
pub type Database = SqliteCatalog;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use std::time::Duration;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connection pool tuning
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a writer waits for the database lock before giving up
    pub busy_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    tracing::debug!("Database migrations applied");
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://vibesia.db`)
/// * `settings` - pool size and lock wait
pub async fn create_pool(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(settings.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        "SQLite pool ready"
    );

    Ok(pool)
}
