//! rusty-community/crates/domains/src/lib.rs
//!
//! Entities, vote rules, errors and port definitions shared by every crate.

pub mod errors;
pub mod models;
pub mod ports;
pub mod vote;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
pub use vote::*;
