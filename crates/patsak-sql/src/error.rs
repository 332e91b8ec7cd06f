use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Translator-local failure modes. A thin slice of the closed `ErrorKind`
/// set from the runtime crate above — this crate only ever produces
/// `QUERY` or `VALUE`-shaped failures, so it doesn't need the full set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Query(String),

    #[error("{0}")]
    Value(String),

    #[error(transparent)]
    Type(#[from] patsak_types::Error),

    #[error(transparent)]
    Parse(#[from] patsak_parser::Error),
}

impl Error {
    pub fn query(msg: impl Into<String>) -> Self {
        Error::Query(msg.into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        Error::Value(msg.into())
    }
}
