/// Storage setup errors
use thiserror::Error;

/// Errors raised while opening or migrating the database
///
/// Query failures inside feature slices are reported as
/// [`vibesia_core::VibesiaError`] directly.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for vibesia_core::VibesiaError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Connection(e) => e.into(),
            StorageError::Migration(e) => vibesia_core::VibesiaError::TransactionFailure {
                code: vibesia_core::FailureCode::StorageFailure,
                message: "Database migration failed".to_string(),
                source: Some(Box::new(e)),
            },
        }
    }
}
