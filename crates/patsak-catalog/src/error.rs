//! The closed error-kind set surfaced by catalog and (later) transaction
//! operations. Kept here rather than split per crate since most kinds
//! originate in RelVar/Meta mutation; `patsak-db` reuses this type directly
//! rather than redeclaring it.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Range(String),
    #[error("{0}")]
    Value(String),
    #[error("{0}")]
    NotImplemented(String),
    #[error("{0}")]
    Quota(String),
    #[error("{0}")]
    Db(String),
    #[error("RelVar \"{0}\" already exists")]
    RelVarExists(String),
    #[error("No such RelVar: \"{0}\"")]
    NoSuchRelVar(String),
    #[error("Attribute \"{0}\" already exists")]
    AttrExists(String),
    #[error("Attribute \"{0}\" does not exist")]
    NoSuchAttr(String),
    #[error("{0}")]
    Constraint(String),
    #[error("{0}")]
    Query(String),
    #[error("{0}")]
    Dependency(String),

    // The following four kinds belong to the filesystem-quota subsystem,
    // which this crate never implements (out of scope) — declared to keep
    // the closed set complete for callers that pattern-match it exhaustively.
    #[error("{0}")]
    Fs(String),
    #[error("Entry already exists: {0}")]
    EntryExists(String),
    #[error("No such entry: {0}")]
    NoSuchEntry(String),
    #[error("Entry is a folder: {0}")]
    EntryIsFolder(String),
    #[error("Entry is a file: {0}")]
    EntryIsFile(String),
    #[error("{0}")]
    Conversion(String),
    // Belongs to the out-of-scope worker-supervisor socket protocol.
    #[error("{0}")]
    Socket(String),
}

impl Error {
    pub fn value(msg: impl Into<String>) -> Self {
        Error::Value(msg.into())
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Error::NotImplemented(msg.into())
    }
    pub fn quota(msg: impl Into<String>) -> Self {
        Error::Quota(msg.into())
    }
    pub fn db(msg: impl std::fmt::Display) -> Self {
        Error::Db(msg.to_string())
    }
    pub fn rel_var_exists(name: impl Into<String>) -> Self {
        Error::RelVarExists(name.into())
    }
    pub fn no_such_rel_var(name: impl Into<String>) -> Self {
        Error::NoSuchRelVar(name.into())
    }
    pub fn attr_exists(name: impl Into<String>) -> Self {
        Error::AttrExists(name.into())
    }
    pub fn no_such_attr(name: impl Into<String>) -> Self {
        Error::NoSuchAttr(name.into())
    }
    pub fn constraint(msg: impl Into<String>) -> Self {
        Error::Constraint(msg.into())
    }
    pub fn dependency(msg: impl Into<String>) -> Self {
        Error::Dependency(msg.into())
    }
    pub fn query(msg: impl Into<String>) -> Self {
        Error::Query(msg.into())
    }
}

impl From<patsak_types::Error> for Error {
    fn from(e: patsak_types::Error) -> Self {
        Error::Type(e.to_string())
    }
}

impl From<patsak_sql::Error> for Error {
    fn from(e: patsak_sql::Error) -> Self {
        match e {
            patsak_sql::Error::Query(msg) => Error::Query(msg),
            patsak_sql::Error::Value(msg) => Error::Value(msg),
            patsak_sql::Error::Type(inner) => Error::Type(inner.to_string()),
            patsak_sql::Error::Parse(inner) => Error::Query(inner.to_string()),
        }
    }
}
