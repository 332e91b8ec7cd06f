//! Reuses the catalog crate's closed error-kind set directly — almost every
//! kind a work unit can raise already originates in catalog mutation, so a
//! second parallel enum would just be a relay.

pub use patsak_catalog::Error;
pub use patsak_catalog::Result;
