//! Access-control modules (permission table, rights vocabulary).

pub mod table;

pub use table::*;
// Also expose the rights vocabulary under a shorter path.
pub use crate::rights;
