//! Model descriptors and Postgres execution for graft-sql fragments.
//!
//! This crate provides:
//! - Explicit per-record-type [`Table`] descriptors: table name,
//!   ordered columns, primary-key position, row decode/encode
//! - Descriptor-derived full-row fragments and projections
//! - The execution adapter: `?` placeholder binding, query execution
//!   and row decoding over tokio-postgres
//! - Server-side cursors with batched fetches
//! - Descriptor-driven single-row CRUD
//!
//! The fragment algebra itself lives in [`graft_sql`]; everything here
//! is a consumer of rendered fragments.
//!
//! # Example
//!
//! ```ignore
//! let users = user_table();
//! let orders = order_table();
//!
//! let pair = Fragment::join(
//!     users.select_fragment(),
//!     JoinOp::Join,
//!     orders.select_fragment(),
//!     "ON \"users\".\"id\" = \"orders\".\"user_id\"",
//! );
//!
//! let db = Db::new(&client);
//! let rows = db.query(&pair.render(), &[]).await?;
//! ```

mod crud;
mod cursor;
mod error;
mod exec;
mod table;
mod value;

pub use cursor::{Cursor, DEFAULT_BATCH_SIZE};
pub use error::Error;
pub use exec::Db;
pub use table::{DecodeFn, EncodeFn, Table, TableBuilder};
pub use value::{SqlParam, Value};

// Re-export the algebra for convenience.
pub use graft_sql::{Fragment, FromTree, JoinOp, Literal, SelectKeyword, quote_ident};

/// Result type for graft operations.
pub type Result<T> = std::result::Result<T, Error>;
