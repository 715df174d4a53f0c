//! # storage-adapters
//!
//! In-process implementation of `ContentRepository` plus the seed dataset it
//! starts from.

pub mod memory;
pub mod seed;

pub use memory::InMemoryContentRepository;
pub use seed::{SeedData, SeedError};
