//! The rangevar scope stack: innermost-first name resolution, with an
//! implicit top-level cache for names never explicitly bound.

use indexmap::IndexMap;
use patsak_ast::{RangeVar, Rel};

use crate::error::{Error, Result};

pub struct ScopeStack {
    scopes: Vec<IndexMap<String, RangeVar>>,
    implicit_top_level: IndexMap<String, RangeVar>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            implicit_top_level: IndexMap::new(),
        }
    }

    /// Push one scope binding every `(name, rel)` pair to its own
    /// `RangeVar`. Fails `QUERY` if `bindings` repeats a name.
    pub fn enter_scope(&mut self, bindings: Vec<(String, Rel)>) -> Result<Vec<RangeVar>> {
        let mut frame = IndexMap::new();
        let mut rvs = Vec::with_capacity(bindings.len());
        for (name, rel) in bindings {
            if frame.contains_key(&name) {
                return Err(Error::Query("Duplicating items in a list".to_string()));
            }
            let rv = RangeVar::new(name.clone(), rel);
            frame.insert(name, rv.clone());
            rvs.push(rv);
        }
        self.scopes.push(frame);
        Ok(rvs)
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Resolve a name to its `RangeVar`, innermost scope first. The empty
    /// name always yields a fresh "this" placeholder — the translator
    /// decides what "this" is bound to in context; identity here doesn't
    /// matter since lookups on "" never go through the scope stack.
    pub fn resolve(&mut self, name: &str) -> RangeVar {
        if name.is_empty() {
            return RangeVar::new(String::new(), Rel::Base(String::new()));
        }
        for frame in self.scopes.iter().rev() {
            if let Some(rv) = frame.get(name) {
                return rv.clone();
            }
        }
        self.implicit_top_level
            .entry(name.to_string())
            .or_insert_with(|| RangeVar::new(name.to_string(), Rel::Base(name.to_string())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_binding_names_fail_query() {
        let mut s = ScopeStack::new();
        let err = s
            .enter_scope(vec![
                ("x".into(), Rel::Base("r".into())),
                ("x".into(), Rel::Base("r".into())),
            ])
            .unwrap_err();
        assert_eq!(err, Error::Query("Duplicating items in a list".to_string()));
    }

    #[test]
    fn unbound_name_resolves_to_cached_implicit_base() {
        let mut s = ScopeStack::new();
        let a = s.resolve("User");
        let b = s.resolve("User");
        assert_eq!(a, b);
        assert_eq!(a.rel(), &Rel::Base("User".to_string()));
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut s = ScopeStack::new();
        let outer = s.enter_scope(vec![("x".into(), Rel::Base("A".into()))]).unwrap();
        let inner = s.enter_scope(vec![("x".into(), Rel::Base("B".into()))]).unwrap();
        assert_eq!(s.resolve("x"), inner[0]);
        s.exit_scope();
        assert_eq!(s.resolve("x"), outer[0]);
    }
}
