//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per entity; all public functions are re-exported here.

mod prediction;
mod user;

pub use prediction::*;
pub use user::*;
