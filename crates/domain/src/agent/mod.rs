//! Canonical agent record and everything that mutates it.

mod mutation;
mod path;
mod record;
mod tool;

pub use mutation::*;
pub use record::*;
pub use tool::*;
