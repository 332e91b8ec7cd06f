//! The translator's view onto the catalog: just enough to resolve a Base
//! RelVar's header and walk a foreign-key chain. Kept as a trait so the
//! translator crate doesn't depend on the catalog crate — `patsak-catalog`
//! implements this for its `Meta`.

use patsak_types::Header;

use crate::error::Result;

pub trait CatalogView {
    /// The header of a RelVar referenced by name (a `Rel::Base`).
    fn get_header(&self, rel_var: &str) -> Result<Header>;

    /// Follow one hop of a foreign key: given the RelVar currently being
    /// walked and the local attribute names forming the FK, return the
    /// referenced RelVar's name and the attribute names in the referenced
    /// unique key, in corresponding order.
    fn follow_reference(
        &self,
        rel_var: &str,
        key_attrs: &[String],
    ) -> Result<(String, Vec<String>)>;
}
