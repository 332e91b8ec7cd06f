//! Errors raised while resolving, casting, or rendering QL types and values.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors local to the type/value model.
///
/// These get folded into `patsak_db::Error` (as `ErrorKind::Type` /
/// `ErrorKind::Value`) by the crates that sit above this one; this crate
/// itself has no notion of the full closed error-kind set those crates own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown backend type: {0}")]
    UnknownBackendType(String),

    #[error("Cannot coerce {from} to {to}")]
    Uncoercible { from: &'static str, to: &'static str },
}
