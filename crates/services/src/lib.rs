//! # services
//!
//! Business logic of the community store, written against the ports in
//! `domains`.

pub mod content_service;
pub mod threading;
pub mod validation;

pub use content_service::ContentService;
