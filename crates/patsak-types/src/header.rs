//! Ordered, name-unique attribute sets: `Header`, `DefHeader`, `ValHeader`.
//!
//! Backed by `IndexMap`, which gives exactly the "ordered set" semantics
//! needed here: iteration in first-insertion order, O(1) name lookup, and a
//! no-op `insert` on an existing key when we want `add` rather than
//! `add_or_fail` semantics.

use crate::ty::Type;
use crate::value::Value;
use indexmap::IndexMap;

/// A single (name, type) attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    pub name: String,
    pub ty: Type,
}

impl Attr {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

/// An attribute with an optional default value (used while defining or
/// altering a RelVar).
#[derive(Clone, Debug, PartialEq)]
pub struct DefAttr {
    pub name: String,
    pub ty: Type,
    pub default: Option<Value>,
}

impl DefAttr {
    pub fn new(name: impl Into<String>, ty: Type, default: Option<Value>) -> Self {
        Self { name: name.into(), ty, default }
    }

    pub fn as_attr(&self) -> Attr {
        Attr::new(self.name.clone(), self.ty)
    }
}

/// An attribute with a current value (used when adding an attribute to a
/// populated RelVar: every existing row needs a value for the new column).
#[derive(Clone, Debug, PartialEq)]
pub struct ValAttr {
    pub name: String,
    pub ty: Type,
    pub value: Value,
}

impl ValAttr {
    pub fn new(name: impl Into<String>, ty: Type, value: Value) -> Self {
        Self { name: name.into(), ty, value }
    }

    pub fn as_attr(&self) -> Attr {
        Attr::new(self.name.clone(), self.ty)
    }
}

/// An ordered, name-keyed collection of `T`, where `T: Named`.
#[derive(Clone, Debug)]
pub struct OrderedSet<T> {
    items: IndexMap<String, T>,
}

pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Attr {
    fn name(&self) -> &str {
        &self.name
    }
}
impl Named for DefAttr {
    fn name(&self) -> &str {
        &self.name
    }
}
impl Named for ValAttr {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Named + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self { items: IndexMap::new() }
    }

    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut set = Self::new();
        for item in items {
            set.add(item);
        }
        set
    }

    /// Insert `item`; a no-op if its name is already present (first
    /// occurrence wins — per spec §8 "`add` is no-op on existing key").
    pub fn add(&mut self, item: T) {
        self.items.entry(item.name().to_string()).or_insert(item);
    }

    /// Insert `item`, failing if its name already exists.
    pub fn add_or_fail(&mut self, item: T) -> Result<(), String> {
        if self.items.contains_key(item.name()) {
            return Err(format!("Duplicate name: {}", item.name()));
        }
        self.items.insert(item.name().to_string(), item);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.items.shift_remove(name)
    }

    pub fn find(&self, name: &str) -> Option<&T> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(|s| s.as_str())
    }
}

impl<T: Named + Clone> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Named + Clone + PartialEq> PartialEq for OrderedSet<T> {
    /// Order-insensitive equality, per spec §8: same elements, any order.
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self.iter().all(|item| other.find(item.name()) == Some(item))
    }
}

impl<T: Named + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

pub type Header = OrderedSet<Attr>;
pub type DefHeader = OrderedSet<DefAttr>;
pub type ValHeader = OrderedSet<ValAttr>;

impl Header {
    pub fn from_def_header(def: &DefHeader) -> Self {
        def.iter().map(DefAttr::as_attr).collect()
    }

    /// Get the type of a named attribute, per spec's `GetAttrType` helper.
    pub fn attr_type(&self, name: &str) -> Option<Type> {
        self.find(name).map(|a| a.ty)
    }
}

/// An ordered set of plain string keys — used for unique-key sets and
/// foreign-key local-attribute sets, which are themselves sets of names
/// rather than sets of typed attributes.
pub type NameSet = indexmap::IndexSet<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_preserves_insertion_order() {
        let h: Header = vec![
            Attr::new("b", Type::String),
            Attr::new("a", Type::Integer),
        ]
        .into_iter()
        .collect();
        let names: Vec<_> = h.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn find_returns_at_most_one() {
        let h: Header = vec![Attr::new("x", Type::Boolean)].into_iter().collect();
        assert_eq!(h.find("x"), Some(&Attr::new("x", Type::Boolean)));
        assert_eq!(h.find("y"), None);
    }

    #[test]
    fn equality_is_order_insensitive() {
        let a: Header = vec![Attr::new("a", Type::String), Attr::new("b", Type::Integer)]
            .into_iter()
            .collect();
        let b: Header = vec![Attr::new("b", Type::Integer), Attr::new("a", Type::String)]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn add_is_noop_on_existing_key() {
        let mut h = Header::new();
        h.add(Attr::new("a", Type::String));
        h.add(Attr::new("a", Type::Integer));
        assert_eq!(h.find("a").unwrap().ty, Type::String);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn add_or_fail_signals_failure() {
        let mut h = Header::new();
        h.add(Attr::new("a", Type::String));
        assert!(h.add_or_fail(Attr::new("a", Type::Integer)).is_err());
    }
}
