//! Query execution against Postgres.
//!
//! The adapter is deliberately thin: it rewrites `?` placeholders to
//! the `$1..$n` form tokio-postgres expects (checking arity before any
//! I/O), sends the statement, and decodes rows through a [`Table`]
//! descriptor. Errors from the server propagate untouched; there are
//! no retries and no timeouts here, that responsibility belongs to the
//! connection layer.
//!
//! A single connection is used sequentially; nothing in this module
//! shares a connection across concurrent callers.

use graft_sql::{Fragment, bind_placeholders};
use tokio_postgres::Client;
use tracing::debug;

use crate::Result;
use crate::table::Table;
use crate::value::{SqlParam, Value};

/// A database connection that can execute fragments and raw SQL.
pub struct Db<'a> {
    client: &'a Client,
}

impl<'a> Db<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &Client {
        self.client
    }

    /// Execute a statement with `?` placeholders, returning the
    /// affected row count.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let bound = bind_placeholders(sql, params.len())?;
        debug!(sql = %bound, "execute");
        let params: Vec<SqlParam> = params.iter().map(SqlParam).collect();
        let params_ref: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = params
            .iter()
            .map(|p| p as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect();
        Ok(self.client.execute(&bound, &params_ref).await?)
    }

    /// Run a query with `?` placeholders, returning raw rows.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<tokio_postgres::Row>> {
        let bound = bind_placeholders(sql, params.len())?;
        debug!(sql = %bound, "query");
        let params: Vec<SqlParam> = params.iter().map(SqlParam).collect();
        let params_ref: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = params
            .iter()
            .map(|p| p as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect();
        Ok(self.client.query(&bound, &params_ref).await?)
    }

    /// Render a fragment, run it, and decode every row through the
    /// descriptor.
    pub async fn query_as<T>(
        &self,
        fragment: &Fragment,
        params: &[Value],
        table: &Table<T>,
    ) -> Result<Vec<T>> {
        let rows = self.query(&fragment.render(), params).await?;
        rows.iter().map(|row| table.decode_row(row)).collect()
    }

    /// Like [`query_as`], returning only the first row if any.
    ///
    /// [`query_as`]: Db::query_as
    pub async fn query_one_as<T>(
        &self,
        fragment: &Fragment,
        params: &[Value],
        table: &Table<T>,
    ) -> Result<Option<T>> {
        let rows = self.query(&fragment.render(), params).await?;
        rows.first().map(|row| table.decode_row(row)).transpose()
    }

    /// Execute a statement verbatim, with no placeholder rewriting.
    /// Used for cursor control statements whose SQL is already fully
    /// rendered.
    pub(crate) async fn execute_verbatim(&self, sql: &str) -> Result<u64> {
        debug!(sql = %sql, "execute");
        Ok(self.client.execute(sql, &[]).await?)
    }

    pub(crate) async fn query_verbatim(&self, sql: &str) -> Result<Vec<tokio_postgres::Row>> {
        debug!(sql = %sql, "query");
        Ok(self.client.query(sql, &[]).await?)
    }
}
