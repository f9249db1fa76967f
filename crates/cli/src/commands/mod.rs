//! CLI command implementations.

pub mod inventory;
pub mod migrate;
