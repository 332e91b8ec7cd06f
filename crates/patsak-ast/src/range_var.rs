//! Rangevars: named bindings to a `Rel`, shared by identity rather than
//! structure — two occurrences of the same name inside one scope must
//! compare equal by pointer, not by deep equality of the `Rel` they bind.

use std::fmt;
use std::rc::Rc;

use crate::rel::Rel;

struct RangeVarInner {
    name: String,
    rel: Rel,
}

/// A cheap, `Rc`-backed handle. Cloning a `RangeVar` never deep-copies the
/// underlying `Rel`; it shares it, which is what makes pointer equality the
/// right notion of "same rangevar" across a scope.
#[derive(Clone)]
pub struct RangeVar(Rc<RangeVarInner>);

impl RangeVar {
    pub fn new(name: impl Into<String>, rel: Rel) -> Self {
        RangeVar(Rc::new(RangeVarInner { name: name.into(), rel }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn rel(&self) -> &Rel {
        &self.0.rel
    }
}

impl PartialEq for RangeVar {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for RangeVar {}

impl fmt::Debug for RangeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeVar")
            .field("name", &self.0.name)
            .field("ptr", &Rc::as_ptr(&self.0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_are_identity_equal() {
        let rv = RangeVar::new("r", Rel::Base("r".into()));
        let cloned = rv.clone();
        assert_eq!(rv, cloned);
    }

    #[test]
    fn distinct_rangevars_of_same_name_are_not_equal() {
        let a = RangeVar::new("r", Rel::Base("r".into()));
        let b = RangeVar::new("r", Rel::Base("r".into()));
        assert_ne!(a, b);
    }
}
