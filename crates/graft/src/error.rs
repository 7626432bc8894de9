use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error(transparent)]
    Sql(#[from] graft_sql::Error),

    #[error("descriptor for table {table} is invalid: {reason}")]
    Descriptor { table: String, reason: String },

    #[error("table {table}: encode produced {found} values, expected {expected}")]
    EncodeArity {
        table: String,
        expected: usize,
        found: usize,
    },
}
