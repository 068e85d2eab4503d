//! Domain layer: the lookup registry and the identifier policy it relies on.

pub mod ident;
pub mod lookup;

pub use lookup::{CreateLookup, LookupConfig, LookupRow, LookupService, UpdateLookup};
