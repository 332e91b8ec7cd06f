//! Type and value model for the QL relational runtime: the closed set of
//! first-class types, coercion/cast rules, runtime values and their
//! rendering to backend SQL literals, ordered attribute headers, and the
//! binary/unary operator type algebra.

mod error;
mod header;
mod ops;
mod ty;
mod value;

pub use error::{Error, Result};
pub use header::{Attr, DefAttr, DefHeader, Header, Named, NameSet, OrderedSet, ValAttr, ValHeader};
pub use ops::{BinaryOp, UnaryOp};
pub use ty::{cast_function, read_backend_type, read_type, Type};
pub use value::{DateParts, Value};

/// Re-exports the names most call sites outside this crate want.
pub mod prelude {
    pub use crate::{
        cast_function, read_backend_type, read_type, Attr, BinaryOp, DateParts, DefAttr,
        DefHeader, Error, Header, Named, NameSet, OrderedSet, Result, Type, UnaryOp, ValAttr,
        ValHeader, Value,
    };
}
