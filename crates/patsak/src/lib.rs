//! Top-level crate: wires the parser, translator, catalog and transaction
//! façade into a single `Runtime` entry point, plus the `Config` that
//! parameterizes it.

mod config;
mod error;
mod runtime;

pub use config::Config;
pub use error::{Error, Result};
pub use runtime::Runtime;

pub mod prelude {
    pub use crate::{Config, Error, Result, Runtime};
    pub use patsak_ast::{Expr, Proto, Rel};
    pub use patsak_db::{CancelToken, Catalog, DbAccess};
    pub use patsak_parser::{parse_expr, parse_rel};
    pub use patsak_sql::Translator;
    pub use patsak_types::{Attr, Header, Type, Value};
}
