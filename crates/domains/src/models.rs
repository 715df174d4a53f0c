//! # Domain Models
//!
//! These structs represent the core entities of a community: users,
//! communities, posts and comments. Content ids are random UUIDs; user ids are
//! opaque strings issued by the identity provider.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vote::VoteState;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a [`Community`].
    CommunityId
);
uuid_id!(
    /// Identifier of a [`Post`].
    PostId
);
uuid_id!(
    /// Identifier of a [`Comment`].
    CommentId
);

/// Identifier issued by the external identity provider. Treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    /// URL of the profile picture
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A named topical group that owns posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    /// Unique, compared case-insensitively
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub creator_id: UserId,
    /// Starts at 1 (the creator). There is no join/leave bookkeeping.
    pub member_count: u64,
}

impl Community {
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A titled item of content, either text or a link, inside a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub community_id: CommunityId,
    pub author_id: UserId,
    pub vote_count: i64,
    pub comment_count: u64,
    /// The current viewer's vote on this post
    pub viewer_vote: VoteState,
}

/// A reply to a post, or to another comment when `parent_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: UserId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub vote_count: i64,
    pub viewer_vote: VoteState,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A comment together with its replies. Only ever built at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<ThreadedComment>,
}

impl ThreadedComment {
    pub fn leaf(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }
}

/// Ordering applied to post feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first
    New,
    /// Highest vote count first
    #[default]
    Top,
}

impl SortOrder {
    /// Sorts in place. The sort is stable, so ties keep their stored order.
    pub fn apply(self, posts: &mut [Post]) {
        match self {
            SortOrder::New => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Top => posts.sort_by(|a, b| b.vote_count.cmp(&a.vote_count)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::New => f.write_str("new"),
            SortOrder::Top => f.write_str("top"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(SortOrder::New),
            "top" => Ok(SortOrder::Top),
            other => Err(format!("unknown sort order '{other}', expected 'new' or 'top'")),
        }
    }
}
