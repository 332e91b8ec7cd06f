use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Parser-local failure modes. Both map to the `QUERY` error kind one layer
/// up, but are kept distinct here since the messages differ in shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Wrong syntax: {0:?}")]
    Syntax(String),

    #[error("{0}")]
    Query(String),
}
