//! Relational expressions (`Rel`) and header protos (`Proto`).

use crate::expr::{Expr, MultiField};
use crate::range_var::RangeVar;

#[derive(Clone, Debug, PartialEq)]
pub enum Rel {
    /// A RelVar referenced by name.
    Base(String),
    Union(Box<Rel>, Box<Rel>),
    Select(Vec<Proto>, Option<Box<Expr>>),
}

impl Rel {
    pub fn union(l: Rel, r: Rel) -> Self {
        Rel::Union(Box::new(l), Box::new(r))
    }

    pub fn select(protos: Vec<Proto>, where_: Option<Expr>) -> Self {
        Rel::Select(protos, where_.map(Box::new))
    }
}

/// One entry of a `Select`'s output header.
#[derive(Clone, Debug, PartialEq)]
pub enum Proto {
    RangeVar(RangeVar),
    MultiField(MultiField),
    NamedExpr(String, Box<Expr>),
}

impl Proto {
    pub fn named(name: impl Into<String>, expr: Expr) -> Self {
        Proto::NamedExpr(name.into(), Box::new(expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_rel_holds_its_name() {
        let rel = Rel::Base("User".into());
        assert_eq!(rel, Rel::Base("User".into()));
    }

    #[test]
    fn union_wraps_both_sides() {
        let rel = Rel::union(Rel::Base("A".into()), Rel::Base("B".into()));
        match rel {
            Rel::Union(l, r) => {
                assert_eq!(*l, Rel::Base("A".into()));
                assert_eq!(*r, Rel::Base("B".into()));
            }
            _ => panic!("expected Union"),
        }
    }
}
