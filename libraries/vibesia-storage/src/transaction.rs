//! Transactional mutation executor
//!
//! Opens a transaction, writes the request's audit context into it as the
//! very first statement, and either commits (clearing the context) or rolls
//! everything back. The context write also takes the database write lock, so
//! concurrent mutations queue up behind each other instead of interleaving
//! their position reads and writes.

use crate::audit;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use vibesia_core::{AuditContext, Result};

/// A transaction that carries an [`AuditContext`]
///
/// Dropping it without calling [`commit`](Self::commit) rolls back every
/// statement, including the context write.
pub struct AuditedTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl AuditedTransaction {
    /// Begin a transaction and set the audit context before anything else
    pub async fn begin(pool: &SqlitePool, context: &AuditContext) -> Result<Self> {
        let mut tx = pool.begin().await?;
        audit::apply_context(&mut tx, context).await?;

        tracing::trace!(
            user_id = %context.app_user_id(),
            endpoint = %context.endpoint,
            request_id = %context.request_id,
            "Audited transaction started"
        );

        Ok(Self { tx })
    }

    /// Connection for the statements that make up the mutation
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Clear the audit context and commit
    pub async fn commit(mut self) -> Result<()> {
        audit::clear_context(&mut self.tx).await?;
        self.tx.commit().await?;
        Ok(())
    }

    /// Roll back explicitly
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Commit on `Ok`, roll back on `Err`
    ///
    /// A failed rollback is logged and the original error is returned.
    pub async fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, code = err.code(), "Rolling back mutation");
                if let Err(rollback_err) = self.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}
