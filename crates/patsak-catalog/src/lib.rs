//! The relational catalog: RelVar definitions mirrored in memory from the
//! backend, plus the DDL-composition and mutation API that keeps the two
//! in sync (create/drop RelVars, add/drop attributes, defaults and
//! constraints).

pub mod bootstrap;
mod compose;
mod error;
mod load;
mod meta;
mod types;

pub use compose::{check_attr_count, check_name, check_rel_var_count};
pub use error::{Error, Result};
pub use meta::Meta;
pub use types::{ForeignKey, RelVar, MAX_ATTR_COUNT, MAX_NAME_LEN, MAX_REL_VAR_COUNT};

pub mod prelude {
    pub use crate::{check_attr_count, check_name, check_rel_var_count, Error, ForeignKey, Meta, RelVar, Result};
}
