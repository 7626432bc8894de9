//! Model descriptors.
//!
//! A [`Table`] maps a record type to its table, ordered columns,
//! primary-key position, and row decode/encode functions. Descriptors
//! are built explicitly, once per record type, through
//! [`TableBuilder`]; the builder validates the invariants (unique
//! columns, a declared key column, quotable identifiers) so a
//! constructed descriptor is always internally consistent.
//!
//! ```ignore
//! struct User { id: i64, name: String }
//!
//! fn user_table() -> graft::Result<Table<User>> {
//!     Table::builder(
//!         "users",
//!         |row| Ok(User { id: row.try_get(0)?, name: row.try_get(1)? }),
//!         |u| vec![Value::from(u.name.clone())],
//!     )
//!     .key_column("id")
//!     .column("name")
//!     .build()
//! }
//! ```

use graft_sql::{Fragment, FromTree, quote_ident};

use crate::{Error, Result, Value};

/// Decodes one result row into a record. Column order matches the
/// descriptor's declared column order.
pub type DecodeFn<T> = fn(&tokio_postgres::Row) -> Result<T>;

/// Encodes a record into column values, excluding the key column, in
/// declared column order.
pub type EncodeFn<T> = fn(&T) -> Vec<Value>;

/// Static metadata mapping a record type to its table.
pub struct Table<T> {
    name: String,
    /// Quoted table reference as it appears in a FROM leaf, including
    /// the alias when one is set: `"users"` or `"users" "u2"`.
    leaf_sql: String,
    /// Quoted qualifier for column references: the alias if set,
    /// otherwise the table name. Doubles as the canonical name.
    qualifier: String,
    columns: Vec<String>,
    qualified_columns: Vec<String>,
    key_index: usize,
    decode: DecodeFn<T>,
    encode: EncodeFn<T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Table {
            name: self.name.clone(),
            leaf_sql: self.leaf_sql.clone(),
            qualifier: self.qualifier.clone(),
            columns: self.columns.clone(),
            qualified_columns: self.qualified_columns.clone(),
            key_index: self.key_index,
            decode: self.decode,
            encode: self.encode,
        }
    }
}

impl<T> std::fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("qualifier", &self.qualifier)
            .field("columns", &self.columns)
            .field("key_index", &self.key_index)
            .finish()
    }
}

impl<T> Table<T> {
    /// Start building a descriptor for `name`.
    pub fn builder(name: impl Into<String>, decode: DecodeFn<T>, encode: EncodeFn<T>) -> TableBuilder<T> {
        TableBuilder {
            name: name.into(),
            alias: None,
            columns: Vec::new(),
            key_index: None,
            key_declarations: 0,
            decode,
            encode,
        }
    }

    /// The unquoted table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical name identifying this relation in a FROM tree:
    /// the quoted alias if one is set, otherwise the quoted table name.
    pub fn canonical(&self) -> &str {
        &self.qualifier
    }

    /// Unquoted column names in declared order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fully-qualified quoted column references, `"tbl"."col"`.
    pub fn qualified_columns(&self) -> &[String] {
        &self.qualified_columns
    }

    /// Index of the primary-key column.
    pub fn key_index(&self) -> usize {
        self.key_index
    }

    /// Unquoted name of the primary-key column.
    pub fn key_column(&self) -> &str {
        &self.columns[self.key_index]
    }

    /// Qualified quoted reference to the primary-key column.
    pub fn qualified_key(&self) -> &str {
        &self.qualified_columns[self.key_index]
    }

    /// The FROM tree leaf for this relation.
    pub fn leaf(&self) -> FromTree {
        FromTree::leaf(self.leaf_sql.clone(), self.qualifier.clone())
    }

    /// A full-row fragment: all columns, qualified, from this relation
    /// alone.
    pub fn select_fragment(&self) -> Fragment {
        Fragment::from_relation(
            self.leaf_sql.clone(),
            self.qualifier.clone(),
            self.qualified_columns.clone(),
        )
    }

    /// Replace `fragment`'s column list with this relation's columns.
    /// The caller is responsible for the relation actually being
    /// present in the fragment's FROM tree; a violation surfaces as a
    /// query-time error from the server.
    pub fn project(&self, fragment: Fragment) -> Fragment {
        fragment.project(self.qualified_columns.clone())
    }

    /// Wrap `fragment` as a subquery aliased to this relation,
    /// selecting this relation's columns. See
    /// [`Fragment::project_subquery`].
    pub fn project_subquery(&self, fragment: Fragment) -> Result<Fragment> {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<graft_sql::Result<_>>()?;
        Ok(fragment.project_subquery(&self.qualifier, &columns))
    }

    /// Decode one result row into a record.
    pub fn decode_row(&self, row: &tokio_postgres::Row) -> Result<T> {
        (self.decode)(row)
    }

    /// Encode a record into values for its non-key columns, checking
    /// that the value count matches the descriptor.
    pub fn encode_row(&self, record: &T) -> Result<Vec<Value>> {
        let values = (self.encode)(record);
        let expected = self.columns.len() - 1;
        if values.len() != expected {
            return Err(Error::EncodeArity {
                table: self.name.clone(),
                expected,
                found: values.len(),
            });
        }
        Ok(values)
    }

    /// A copy of this descriptor under a distinct alias. Aliased
    /// descriptors have distinct canonical names, which is how repeated
    /// uses of the same relation type (self-joins) stay unambiguous
    /// when trees are merged.
    pub fn aliased(&self, alias: &str) -> Result<Table<T>> {
        let quoted_name = quote_ident(&self.name)?;
        let quoted_alias = quote_ident(alias)?;
        let qualified_columns = self
            .columns
            .iter()
            .map(|c| Ok(format!("{}.{}", quoted_alias, quote_ident(c)?)))
            .collect::<graft_sql::Result<Vec<_>>>()?;
        Ok(Table {
            name: self.name.clone(),
            leaf_sql: format!("{} {}", quoted_name, quoted_alias),
            qualifier: quoted_alias,
            columns: self.columns.clone(),
            qualified_columns,
            key_index: self.key_index,
            decode: self.decode,
            encode: self.encode,
        })
    }
}

/// Builder for [`Table`] descriptors.
pub struct TableBuilder<T> {
    name: String,
    alias: Option<String>,
    columns: Vec<String>,
    key_index: Option<usize>,
    key_declarations: usize,
    decode: DecodeFn<T>,
    encode: EncodeFn<T>,
}

impl<T> TableBuilder<T> {
    /// Declare the primary-key column at the current position.
    pub fn key_column(mut self, name: impl Into<String>) -> Self {
        self.key_index = Some(self.columns.len());
        self.key_declarations += 1;
        self.columns.push(name.into());
        self
    }

    /// Declare a non-key column.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Declare several non-key columns.
    pub fn columns(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns.extend(names.into_iter().map(Into::into));
        self
    }

    /// Use a distinct alias for this descriptor.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Validate and build the descriptor.
    pub fn build(self) -> Result<Table<T>> {
        let invalid = |reason: String| Error::Descriptor {
            table: self.name.clone(),
            reason,
        };

        if self.columns.is_empty() {
            return Err(invalid("no columns declared".into()));
        }
        if self.key_declarations == 0 {
            return Err(invalid("no key column declared".into()));
        }
        if self.key_declarations > 1 {
            return Err(invalid(format!(
                "{} key columns declared",
                self.key_declarations
            )));
        }
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].contains(col) {
                return Err(invalid(format!("duplicate column {}", col)));
            }
        }

        let quoted_name = quote_ident(&self.name)?;
        let (leaf_sql, qualifier) = match &self.alias {
            Some(alias) => {
                let quoted_alias = quote_ident(alias)?;
                (
                    format!("{} {}", quoted_name, quoted_alias),
                    quoted_alias,
                )
            }
            None => (quoted_name.clone(), quoted_name),
        };
        let qualified_columns = self
            .columns
            .iter()
            .map(|c| Ok(format!("{}.{}", qualifier, quote_ident(c)?)))
            .collect::<graft_sql::Result<Vec<_>>>()?;

        Ok(Table {
            name: self.name,
            leaf_sql,
            qualifier,
            columns: self.columns,
            qualified_columns,
            // key_declarations == 1, so the index is set.
            key_index: self.key_index.unwrap_or(0),
            decode: self.decode,
            encode: self.encode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    struct User {
        id: i64,
        name: String,
    }

    fn user_table() -> Table<User> {
        Table::builder(
            "users",
            |row| {
                Ok(User {
                    id: row.try_get(0)?,
                    name: row.try_get(1)?,
                })
            },
            |u| vec![Value::from(u.name.clone())],
        )
        .key_column("id")
        .column("name")
        .build()
        .unwrap()
    }

    #[test]
    fn test_builder_produces_quoted_metadata() {
        let t = user_table();
        assert_eq!(t.name(), "users");
        assert_eq!(t.canonical(), "\"users\"");
        assert_eq!(t.key_column(), "id");
        assert_eq!(t.qualified_key(), "\"users\".\"id\"");
        assert_eq!(
            t.qualified_columns(),
            ["\"users\".\"id\"", "\"users\".\"name\""]
        );
    }

    #[test]
    fn test_select_fragment() {
        assert_eq!(
            user_table().select_fragment().render(),
            "SELECT \"users\".\"id\", \"users\".\"name\" FROM \"users\""
        );
    }

    #[test]
    fn test_builder_rejects_missing_key() {
        let err = Table::<User>::builder("users", |_| unreachable!(), |_| vec![])
            .column("name")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Descriptor { .. }));
    }

    #[test]
    fn test_builder_rejects_duplicate_columns() {
        let err = Table::<User>::builder("users", |_| unreachable!(), |_| vec![])
            .key_column("id")
            .column("name")
            .column("name")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Descriptor { .. }));
    }

    #[test]
    fn test_builder_rejects_double_key() {
        let err = Table::<User>::builder("users", |_| unreachable!(), |_| vec![])
            .key_column("id")
            .key_column("other_id")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Descriptor { .. }));
    }

    #[test]
    fn test_builder_rejects_nul_identifier() {
        let err = Table::<User>::builder("bad\0", |_| unreachable!(), |_| vec![])
            .key_column("id")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Sql(graft_sql::Error::NulInIdentifier(_))));
    }

    #[test]
    fn test_encode_arity_checked() {
        let t = user_table();
        let u = User {
            id: 1,
            name: "ann".into(),
        };
        assert_eq!(t.encode_row(&u).unwrap(), vec![Value::from("ann")]);

        let bad: Table<User> = Table::builder(
            "users",
            |_| unreachable!(),
            |_| vec![Value::Null, Value::Null],
        )
        .key_column("id")
        .column("name")
        .build()
        .unwrap();
        assert!(matches!(
            bad.encode_row(&u).unwrap_err(),
            Error::EncodeArity {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_aliased_descriptor_gets_distinct_canonical() {
        let t = user_table().aliased("managers").unwrap();
        assert_eq!(t.canonical(), "\"managers\"");
        assert_eq!(
            t.select_fragment().render(),
            "SELECT \"managers\".\"id\", \"managers\".\"name\" FROM \"users\" \"managers\""
        );
    }
}
