//! Shared fixtures for the integration tests.

use chrono::Utc;
use domains::{User, UserId};
use services::ContentService;
use storage_adapters::{InMemoryContentRepository, SeedData};

pub type Store = ContentService<InMemoryContentRepository>;

/// A store over the built-in mock data with no simulated latency.
pub fn seeded_store() -> Store {
    ContentService::new(InMemoryContentRepository::seeded(SeedData::mock()))
}

pub fn empty_store() -> Store {
    ContentService::new(InMemoryContentRepository::new())
}

pub fn viewer() -> User {
    User {
        id: UserId::new("user_viewer"),
        username: "viewer".into(),
        email: Some("viewer@example.com".into()),
        avatar: None,
        created_at: Utc::now(),
    }
}
