//! # auth-adapters
//!
//! Stand-in for the external identity provider. Holds at most one signed-in
//! user, picked by username from a known directory. No credentials are
//! involved; the real provider owns that.

use async_trait::async_trait;
use domains::{DomainError, IdentityProvider, Result, User};
use tokio::sync::RwLock;
use tracing::info;

pub struct SessionIdentityProvider {
    directory: Vec<User>,
    session: RwLock<Option<User>>,
}

impl SessionIdentityProvider {
    /// An anonymous session over the given user directory.
    pub fn new(directory: Vec<User>) -> Self {
        Self {
            directory,
            session: RwLock::new(None),
        }
    }

    /// Starts already signed in as `user`.
    pub fn with_user(self, user: User) -> Self {
        Self {
            session: RwLock::new(Some(user)),
            ..self
        }
    }

    pub fn directory(&self) -> &[User] {
        &self.directory
    }

    /// Looks the username up case-insensitively and makes it the session user.
    pub async fn sign_in(&self, username: &str) -> Result<User> {
        let user = self
            .directory
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned()
            .ok_or_else(|| DomainError::not_found("user", username))?;

        info!(user_id = %user.id, "signed in");
        *self.session.write().await = Some(user.clone());
        Ok(user)
    }

    /// Ends the session, returning the user that was signed in.
    pub async fn sign_out(&self) -> Option<User> {
        let previous = self.session.write().await.take();
        if let Some(user) = &previous {
            info!(user_id = %user.id, "signed out");
        }
        previous
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentityProvider {
    async fn current_user(&self) -> Option<User> {
        self.session.read().await.clone()
    }
}
