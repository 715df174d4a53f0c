//! Field rules for user-submitted content.
//!
//! Each function collects every failing field before returning, so the caller
//! can show all messages at once.

use domains::{Result, ValidationErrors};
use tracing::trace;
use url::Url;

pub const COMMUNITY_NAME_MIN: usize = 3;
pub const COMMUNITY_NAME_MAX: usize = 21;
pub const COMMUNITY_DESCRIPTION_MAX: usize = 500;
pub const POST_TITLE_MAX: usize = 300;
pub const POST_BODY_MAX: usize = 10_000;

pub fn validate_community(name: &str, description: Option<&str>) -> Result<()> {
    let mut errors = ValidationErrors::new();

    let length = name.chars().count();
    if name.trim().is_empty() {
        errors.add("name", "Community name is required");
    } else if length < COMMUNITY_NAME_MIN {
        errors.add(
            "name",
            format!("Community name must be at least {COMMUNITY_NAME_MIN} characters"),
        );
    } else if length > COMMUNITY_NAME_MAX {
        errors.add(
            "name",
            format!("Community name must be at most {COMMUNITY_NAME_MAX} characters"),
        );
    } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        errors.add(
            "name",
            "Community name can only contain letters, numbers, and underscores",
        );
    }

    if description.is_some_and(|d| d.chars().count() > COMMUNITY_DESCRIPTION_MAX) {
        errors.add(
            "description",
            format!("Description must be at most {COMMUNITY_DESCRIPTION_MAX} characters"),
        );
    }

    finish(errors)
}

pub fn validate_post(title: &str, body: Option<&str>, url: Option<&str>) -> Result<()> {
    let mut errors = ValidationErrors::new();

    if title.trim().is_empty() {
        errors.add("title", "Title is required");
    } else if title.chars().count() > POST_TITLE_MAX {
        errors.add(
            "title",
            format!("Title must be at most {POST_TITLE_MAX} characters"),
        );
    }

    if body.is_some_and(|b| b.chars().count() > POST_BODY_MAX) {
        errors.add(
            "body",
            format!("Content must be at most {POST_BODY_MAX} characters"),
        );
    }

    if let Some(url) = url {
        if Url::parse(url).is_err() {
            errors.add("url", "Please enter a valid URL");
        } else if body.is_some() {
            errors.add("url", "A post has either text content or a link, not both");
        }
    }

    finish(errors)
}

pub fn validate_comment(body: &str) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if body.trim().is_empty() {
        errors.add("body", "Comment cannot be empty");
    }
    finish(errors)
}

/// Maps blank optional input to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn finish(errors: ValidationErrors) -> Result<()> {
    if !errors.is_empty() {
        trace!("validation errors: {errors}");
    }
    errors.into_result()
}
