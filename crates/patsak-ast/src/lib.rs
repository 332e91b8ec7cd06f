//! Tagged-variant AST for the QL relational query language.
//!
//! Polymorphism is represented as closed enums (`Rel`, `Proto`, `Expr`)
//! rather than trait objects: traversal is a match on the tag, which keeps
//! the translator exhaustive and avoids an unneeded runtime-dispatch layer.

mod expr;
mod range_var;
mod rel;

pub use expr::{Expr, MultiField};
pub use range_var::RangeVar;
pub use rel::{Proto, Rel};

pub mod prelude {
    pub use crate::{Expr, MultiField, Proto, RangeVar, Rel};
}
