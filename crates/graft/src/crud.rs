//! Descriptor-driven single-row operations.
//!
//! Direct, non-structural uses of a [`Table`] descriptor: look a row up
//! by key, insert, update, delete. The statements are plain quoted SQL
//! with `?` placeholders; only `find` goes through the fragment
//! algebra, since a full-row select is exactly the descriptor's select
//! fragment plus a key predicate.

use graft_sql::{Result as SqlResult, quote_ident};

use crate::Result;
use crate::exec::Db;
use crate::table::Table;
use crate::value::Value;

fn insert_sql<T>(table: &Table<T>) -> SqlResult<String> {
    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    for (i, col) in table.columns().iter().enumerate() {
        if i == table.key_index() {
            continue;
        }
        columns.push(quote_ident(col)?);
        placeholders.push("?");
    }
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table.name())?,
        columns.join(", "),
        placeholders.join(", ")
    ))
}

fn update_sql<T>(table: &Table<T>) -> SqlResult<String> {
    let mut assignments = Vec::new();
    for (i, col) in table.columns().iter().enumerate() {
        if i == table.key_index() {
            continue;
        }
        assignments.push(format!("{} = ?", quote_ident(col)?));
    }
    Ok(format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote_ident(table.name())?,
        assignments.join(", "),
        quote_ident(table.key_column())?
    ))
}

fn delete_sql<T>(table: &Table<T>) -> SqlResult<String> {
    Ok(format!(
        "DELETE FROM {} WHERE {} = ?",
        quote_ident(table.name())?,
        quote_ident(table.key_column())?
    ))
}

impl<'a> Db<'a> {
    /// Look up a single record by primary key.
    pub async fn find<T>(&self, table: &Table<T>, key: Value) -> Result<Option<T>> {
        let fragment = table
            .select_fragment()
            .restrict(&format!("{} = ?", table.qualified_key()));
        self.query_one_as(&fragment, &[key], table).await
    }

    /// Insert a record, letting the database assign the key column.
    /// Returns the affected row count.
    pub async fn insert<T>(&self, table: &Table<T>, record: &T) -> Result<u64> {
        let values = table.encode_row(record)?;
        self.execute(&insert_sql(table)?, &values).await
    }

    /// Update the non-key columns of the record identified by `key`.
    pub async fn update<T>(&self, table: &Table<T>, record: &T, key: Value) -> Result<u64> {
        let mut values = table.encode_row(record)?;
        values.push(key);
        self.execute(&update_sql(table)?, &values).await
    }

    /// Delete the record identified by `key`.
    pub async fn delete<T>(&self, table: &Table<T>, key: Value) -> Result<u64> {
        self.execute(&delete_sql(table)?, &[key]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order;

    fn order_table() -> Table<Order> {
        Table::builder(
            "orders",
            |_| Ok(Order),
            |_| vec![Value::Null, Value::Null],
        )
        .key_column("id")
        .column("user_id")
        .column("total")
        .build()
        .unwrap()
    }

    #[test]
    fn test_insert_sql_excludes_key() {
        assert_eq!(
            insert_sql(&order_table()).unwrap(),
            "INSERT INTO \"orders\" (\"user_id\", \"total\") VALUES (?, ?)"
        );
    }

    #[test]
    fn test_update_sql() {
        assert_eq!(
            update_sql(&order_table()).unwrap(),
            "UPDATE \"orders\" SET \"user_id\" = ?, \"total\" = ? WHERE \"id\" = ?"
        );
    }

    #[test]
    fn test_delete_sql() {
        assert_eq!(
            delete_sql(&order_table()).unwrap(),
            "DELETE FROM \"orders\" WHERE \"id\" = ?"
        );
    }

    #[test]
    fn test_find_fragment_shape() {
        let table = order_table();
        let fragment = table
            .select_fragment()
            .restrict(&format!("{} = ?", table.qualified_key()));
        assert_eq!(
            fragment.render(),
            "SELECT \"orders\".\"id\", \"orders\".\"user_id\", \"orders\".\"total\" \
             FROM \"orders\" WHERE (\"orders\".\"id\" = ?)"
        );
    }
}
