//! In-memory shapes the catalog mirrors from the backend: a RelVar's
//! attributes, unique keys and foreign keys.

use patsak_types::{DefHeader, Header, NameSet};

pub const MAX_NAME_LEN: usize = 60;
pub const MAX_ATTR_COUNT: usize = 500;
pub const MAX_REL_VAR_COUNT: usize = 500;

/// A foreign key: a local attribute set referencing a unique key of
/// (possibly the same) RelVar, stored by name rather than by handle — see
/// the self-referential-FK design note.
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKey {
    pub key_attr_names: NameSet,
    pub ref_rel_var_name: String,
    pub ref_attr_names: NameSet,
}

impl ForeignKey {
    pub fn new(key_attr_names: NameSet, ref_rel_var_name: impl Into<String>, ref_attr_names: NameSet) -> Self {
        Self { key_attr_names, ref_rel_var_name: ref_rel_var_name.into(), ref_attr_names }
    }
}

/// Two `NameSet`s are the same key if they contain the same names, any
/// order — unique/foreign key sets are sets, not sequences.
pub fn same_key(a: &NameSet, b: &NameSet) -> bool {
    a.len() == b.len() && a.iter().all(|n| b.contains(n))
}

fn intersects(a: &NameSet, b: &NameSet) -> bool {
    a.iter().any(|n| b.contains(n))
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelVar {
    pub(crate) name: String,
    pub(crate) def_header: DefHeader,
    pub(crate) header: Header,
    pub(crate) unique_key_set: Vec<NameSet>,
    pub(crate) foreign_key_set: Vec<ForeignKey>,
}

impl RelVar {
    pub(crate) fn from_def_header(name: String, def_header: DefHeader) -> Self {
        let header = Header::from_def_header(&def_header);
        Self { name, def_header, header, unique_key_set: Vec::new(), foreign_key_set: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn def_header(&self) -> &DefHeader {
        &self.def_header
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn unique_key_set(&self) -> &[NameSet] {
        &self.unique_key_set
    }

    pub fn foreign_key_set(&self) -> &[ForeignKey] {
        &self.foreign_key_set
    }

    pub fn has_unique_key(&self, key: &NameSet) -> bool {
        self.unique_key_set.iter().any(|k| same_key(k, key))
    }

    /// Attribute names this RelVar's remaining keys/FKs would keep after
    /// dropping `removed` — used by `drop_attrs` to recompute constraint
    /// sets before issuing DDL.
    pub(crate) fn keys_surviving_drop(&self, removed: &NameSet) -> (Vec<NameSet>, Vec<ForeignKey>) {
        let unique = self.unique_key_set.iter().filter(|k| !intersects(k, removed)).cloned().collect();
        let foreign = self.foreign_key_set.iter().filter(|fk| !intersects(&fk.key_attr_names, removed)).cloned().collect();
        (unique, foreign)
    }
}
