//! Re-exports `patsak_db`'s error type directly — this crate adds no error
//! conditions of its own beyond connecting the backend, which surfaces as
//! `Error::Db` via `patsak_db::Error::db`.

pub use patsak_db::Error;
pub use patsak_db::Result;
