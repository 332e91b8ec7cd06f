//! Scalar expressions.

use patsak_types::{BinaryOp, UnaryOp, Value};

use crate::range_var::RangeVar;

/// `rv.a.b->c` style access: a rangevar followed by a sequence of
/// non-empty name-sets. `path.last()` having more than one name makes this
/// a *multi*-field (`[a,b]` fans out into several output columns); a path
/// longer than one segment makes it a *foreign* traversal (`->`).
#[derive(Clone, Debug, PartialEq)]
pub struct MultiField {
    pub rv: RangeVar,
    pub path: Vec<Vec<String>>,
}

impl MultiField {
    pub fn new(rv: RangeVar, path: Vec<Vec<String>>) -> Self {
        debug_assert!(!path.is_empty(), "MultiField path must have at least one segment");
        debug_assert!(
            path.iter().all(|seg| !seg.is_empty()),
            "MultiField path segments must be non-empty name-sets"
        );
        Self { rv, path }
    }

    pub fn is_multi(&self) -> bool {
        self.path.last().map(|seg| seg.len() > 1).unwrap_or(false)
    }

    pub fn is_foreign(&self) -> bool {
        self.path.len() > 1
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    MultiField(MultiField),
    /// A positional parameter reference; `index == 0` is the "next" marker
    /// used by the `$` (no digits) form, resolved by the translator.
    PosArg(usize),
    Quant {
        universal: bool,
        rvs: Vec<RangeVar>,
        pred: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        l: Box<Expr>,
        r: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        x: Box<Expr>,
    },
    Cond {
        t: Box<Expr>,
        yes: Box<Expr>,
        no: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, l: Expr, r: Expr) -> Self {
        Expr::Binary { op, l: Box::new(l), r: Box::new(r) }
    }

    pub fn unary(op: UnaryOp, x: Expr) -> Self {
        Expr::Unary { op, x: Box::new(x) }
    }

    pub fn cond(t: Expr, yes: Expr, no: Expr) -> Self {
        Expr::Cond { t: Box::new(t), yes: Box::new(yes), no: Box::new(no) }
    }

    pub fn quant(universal: bool, rvs: Vec<RangeVar>, pred: Expr) -> Self {
        Expr::Quant { universal, rvs, pred: Box::new(pred) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rel::Rel;

    #[test]
    fn multi_field_is_multi_on_last_segment_only() {
        let rv = RangeVar::new("r", Rel::Base("r".into()));
        let single = MultiField::new(rv.clone(), vec![vec!["a".into()]]);
        assert!(!single.is_multi());
        let multi = MultiField::new(rv, vec![vec!["a".into(), "b".into()]]);
        assert!(multi.is_multi());
    }

    #[test]
    fn multi_field_is_foreign_on_path_length() {
        let rv = RangeVar::new("r", Rel::Base("r".into()));
        let local = MultiField::new(rv.clone(), vec![vec!["a".into()]]);
        assert!(!local.is_foreign());
        let foreign = MultiField::new(rv, vec![vec!["a".into()], vec!["b".into()]]);
        assert!(foreign.is_foreign());
    }
}
