//! Transaction helper utilities for database operations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diesel_async::scoped_futures::ScopedFutureExt;
//! use stayline_db::db::transaction::with_transaction;
//!
//! with_transaction(&mut conn, |tx| async move {
//!     blocked_date::delete_for_calendar(tx, property_id, calendar_id).await?;
//!     blocked_date::upsert_batch(tx, &rows).await?;
//!     Ok(())
//! }.scope_boxed()).await?;
//! ```

use diesel_async::{AsyncConnection, scoped_futures::ScopedBoxFuture};

use crate::db::connection::DbConnection;

/// ## Summary
/// Runs a database transaction and returns the closure result.
///
/// ## Errors
/// Returns any error produced by the closure, or errors raised while starting
/// or committing the transaction.
pub async fn with_transaction<'conn, 'pool, T, F>(
    conn: &'conn mut DbConnection<'pool>,
    callback: F,
) -> anyhow::Result<T>
where
    F: for<'r> FnOnce(&'r mut DbConnection<'pool>) -> ScopedBoxFuture<'conn, 'r, anyhow::Result<T>>
        + Send
        + 'conn,
    T: Send + 'conn,
{
    conn.transaction::<_, anyhow::Error, _>(callback).await
}
