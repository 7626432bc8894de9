//! Composable SELECT fragment algebra.
//!
//! Build complex `SELECT` statements out of smaller, independently
//! valid fragments: single-table selects, joins, projections. The
//! `FROM` tree, `WHERE` predicate and selected-column list stay in sync
//! as fragments are combined, and structural errors (a merge target
//! missing from a join tree, or matching more than once) are reported
//! instead of silently resolved.
//!
//! The whole crate is pure string and tree manipulation: no I/O, no
//! shared mutable state. Every combinator allocates a fresh fragment,
//! so fragments can be built concurrently from any number of threads.

mod error;
mod fragment;
mod from_tree;
mod literal;
mod params;

pub use error::Error;
pub use fragment::{Fragment, SelectKeyword};
pub use from_tree::{FromTree, JoinOp};
pub use literal::{Literal, escape_text};
pub use params::{bind_placeholders, count_placeholders, fill_placeholders};

/// Result of fragment-algebra operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Quote a SQL identifier (table or column name).
///
/// Always quotes to avoid issues with reserved keywords like `user`,
/// `order`, `group`. Doubles any embedded quotes. Identifiers with
/// embedded NUL bytes are rejected: they cannot be represented in a
/// query at all.
pub fn quote_ident(name: &str) -> Result<String> {
    if name.contains('\0') {
        return Err(Error::NulInIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}
