use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no relation named {0} in FROM tree")]
    RelationNotFound(String),

    #[error("relation {name} matches {count} nodes in FROM tree")]
    RelationAmbiguous { name: String, count: usize },

    #[error("predicate has {expected} placeholders but {found} values were supplied")]
    ArityMismatch { expected: usize, found: usize },

    #[error("identifier {0:?} contains a NUL byte")]
    NulInIdentifier(String),

    #[error("string literal contains a NUL byte")]
    NulInLiteral,
}
