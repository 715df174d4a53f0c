//! # DomainError
//!
//! Centralized error handling for the community store.
//! Every failure is reported to the caller as a distinguishable kind.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// The primary error type for all store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A mutating call was made without an acting user
    #[error("you must be signed in to {action}")]
    AuthRequired { action: &'static str },

    /// Input violates field constraints (e.g. community name charset, title length)
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Reference to a community, post, comment or user that does not exist
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Infrastructure failure inside an adapter
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn auth_required(action: &'static str) -> Self {
        DomainError::AuthRequired { action }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a validation error on a single field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        DomainError::Validation(errors)
    }

    /// Short machine-readable name of the kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::AuthRequired { .. } => "auth_required",
            DomainError::Validation(_) => "validation",
            DomainError::NotFound { .. } => "not_found",
            DomainError::Internal(_) => "internal",
        }
    }
}

/// Field name to message mapping, one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// A specialized Result type for store logic.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Community name is required");
        errors.add("name", "ignored");
        errors.add("description", "too long");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Community name is required"));
        assert_eq!(
            errors.to_string(),
            "description: too long; name: Community name is required"
        );
    }

    #[test]
    fn empty_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let err = DomainError::invalid("title", "Title is required");
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.to_string(), "validation failed: title: Title is required");
    }

    #[test]
    fn messages_name_the_missing_entity() {
        let err = DomainError::not_found("post", "abc");
        assert_eq!(err.to_string(), "post not found with ID abc");
        assert_eq!(
            DomainError::auth_required("vote").to_string(),
            "you must be signed in to vote"
        );
    }
}
