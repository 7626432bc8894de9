//! Server-side cursors with batched fetches.
//!
//! A [`Cursor`] declares a Postgres cursor for a rendered fragment and
//! streams decoded records out of it, one `FETCH FORWARD` round-trip
//! per batch (256 rows by default). Reads between refills are served
//! from the local buffer.
//!
//! The fragment must be fully rendered before declaration: cursor
//! control statements carry no bound parameters, so predicates with
//! values belong in [`Fragment::restrict_values`] form. Cursors live
//! inside the caller's transaction scope; this module does not open or
//! manage transactions.

use std::collections::VecDeque;

use graft_sql::{Fragment, Result as SqlResult, quote_ident};
use tracing::trace;

use crate::Result;
use crate::exec::Db;
use crate::table::Table;

/// Rows fetched per round-trip when not overridden.
pub const DEFAULT_BATCH_SIZE: u32 = 256;

/// A declared server-side cursor streaming records of type `T`.
pub struct Cursor<'a, T> {
    db: &'a Db<'a>,
    table: &'a Table<T>,
    name: String,
    batch_size: u32,
    buffer: VecDeque<T>,
    exhausted: bool,
}

/// `DECLARE` statement for a cursor over a rendered fragment.
pub(crate) fn declare_sql(name: &str, fragment: &Fragment) -> SqlResult<String> {
    Ok(format!(
        "DECLARE {} NO SCROLL CURSOR FOR {}",
        quote_ident(name)?,
        fragment.render()
    ))
}

/// `FETCH FORWARD` statement pulling the next batch.
pub(crate) fn fetch_sql(name: &str, batch_size: u32) -> SqlResult<String> {
    Ok(format!(
        "FETCH FORWARD {} FROM {}",
        batch_size,
        quote_ident(name)?
    ))
}

/// `CLOSE` statement releasing the cursor.
pub(crate) fn close_sql(name: &str) -> SqlResult<String> {
    Ok(format!("CLOSE {}", quote_ident(name)?))
}

impl<'a, T> Cursor<'a, T> {
    /// Declare a cursor named `name` over `fragment`, decoding rows
    /// through `table`.
    pub async fn declare(
        db: &'a Db<'a>,
        name: &str,
        fragment: &Fragment,
        table: &'a Table<T>,
    ) -> Result<Cursor<'a, T>> {
        db.execute_verbatim(&declare_sql(name, fragment)?).await?;
        Ok(Cursor {
            db,
            table,
            name: name.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }

    /// Override the fetch batch size.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The next record, or `None` once the cursor is exhausted.
    /// Refills the buffer with one blocking fetch when it runs dry.
    pub async fn next(&mut self) -> Result<Option<T>> {
        if self.buffer.is_empty() && !self.exhausted {
            self.refill().await?;
        }
        Ok(self.buffer.pop_front())
    }

    /// Drain the rest of the cursor into a vector.
    pub async fn collect_remaining(mut self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while let Some(record) = self.next().await? {
            out.push(record);
        }
        self.close().await?;
        Ok(out)
    }

    async fn refill(&mut self) -> Result<()> {
        let rows = self
            .db
            .query_verbatim(&fetch_sql(&self.name, self.batch_size)?)
            .await?;
        trace!(cursor = %self.name, rows = rows.len(), "fetched batch");
        // A short batch means the server has no more rows; remember it
        // so exhaustion does not cost an extra round-trip.
        if (rows.len() as u32) < self.batch_size {
            self.exhausted = true;
        }
        for row in &rows {
            self.buffer.push_back(self.table.decode_row(row)?);
        }
        Ok(())
    }

    /// Close the cursor on the server.
    pub async fn close(self) -> Result<()> {
        self.db.execute_verbatim(&close_sql(&self.name)?).await?;
        Ok(())
    }
}
