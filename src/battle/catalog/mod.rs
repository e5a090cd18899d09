//! Static, read-only data tables: the unit catalog (C3) and ability catalog
//! (C4). Both are built once behind a `OnceLock` and never mutated after.

pub mod abilities;
pub mod units;
