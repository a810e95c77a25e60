//! # Write Units
//!
//! One [`WriteUnit`] is one SQLite transaction opened with
//! `BEGIN IMMEDIATE`.
//!
//! ## Why IMMEDIATE
//! ```text
//!  DEFERRED (sqlx default)              IMMEDIATE (this module)
//!  ───────────────────────              ───────────────────────
//!  A: BEGIN   B: BEGIN                  A: BEGIN IMMEDIATE  ← write lock
//!  A: read stock=1                      B: BEGIN IMMEDIATE  ← waits (busy_timeout)
//!  B: read stock=1                      A: read 1, write 0, COMMIT
//!  A: write → upgrade lock              B: ← lock granted
//!  B: write → SQLITE_BUSY / deadlock    B: read 0 → InsufficientStock
//! ```
//! Taking the write lock before the first read serializes every
//! read-then-write on stock and credit. It is the only concurrency
//! primitive the engine relies on.

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use tracing::warn;

use crate::error::{DbError, DbResult};

/// An open `BEGIN IMMEDIATE` transaction on a pooled connection.
///
/// Always end it with [`WriteUnit::finish`], [`WriteUnit::commit`] or
/// [`WriteUnit::rollback`]. A unit dropped while open closes its
/// connection instead of returning it to the pool, which makes SQLite
/// discard the transaction.
pub struct WriteUnit {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteUnit {
    /// Acquires a connection and takes the database write lock.
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let mut conn = pool.acquire().await?;

        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(|e| DbError::TransactionFailed(format!("begin: {}", e)))?;

        Ok(WriteUnit { conn: Some(conn) })
    }

    /// The connection every statement of the unit must run on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        match self.conn.as_mut() {
            Some(conn) => conn,
            // `conn` is only taken by `commit`/`rollback`, which consume self.
            None => unreachable!("write unit used after it was closed"),
        }
    }

    /// Commits on `Ok`, rolls back on `Err`, and passes the result through.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let mut unit = WriteUnit::begin(&pool).await?;
    /// let result = do_work(unit.conn()).await;
    /// let value = unit.finish(result).await?;
    /// ```
    pub async fn finish<T>(self, result: DbResult<T>) -> DbResult<T> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    pub async fn commit(mut self) -> DbResult<()> {
        self.end("COMMIT").await
    }

    pub async fn rollback(mut self) -> DbResult<()> {
        self.end("ROLLBACK").await
    }

    /// Runs the closing statement. A connection whose COMMIT or ROLLBACK
    /// failed may still hold the transaction, so it is closed rather than
    /// handed back to the pool.
    async fn end(&mut self, statement: &'static str) -> DbResult<()> {
        let mut conn = self.take();

        match sqlx::query(statement).execute(&mut *conn).await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(statement, error = %e, "Closing write unit failed; discarding its connection");
                drop(conn.detach());
                Err(DbError::TransactionFailed(format!(
                    "{}: {}",
                    statement.to_lowercase(),
                    e
                )))
            }
        }
    }

    fn take(&mut self) -> PoolConnection<Sqlite> {
        match self.conn.take() {
            Some(conn) => conn,
            None => unreachable!("write unit closed twice"),
        }
    }
}

impl Drop for WriteUnit {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            warn!("Write unit dropped while open; closing its connection");
            // Detached connections are closed on drop, never reused mid-transaction.
            drop(conn.detach());
        }
    }
}
