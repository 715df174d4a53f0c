//! # Core Traits (Ports)
//!
//! Adapters implement these traits; the content service only depends on them.

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{Comment, CommentId, Community, CommunityId, Post, PostId, User, UserId};
use crate::vote::{VoteDirection, VoteOutcome, VoteTarget};

/// Storage contract for users, communities, posts and comments.
///
/// `list_posts` returns the newest insert first; the other list methods
/// return entities in insertion order. Every mutating method
/// must check and write atomically: it either applies fully or returns an
/// error without touching any collection.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    // User Operations
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    // Community Operations
    async fn list_communities(&self) -> Result<Vec<Community>>;
    async fn get_community(&self, id: CommunityId) -> Result<Option<Community>>;
    async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>>;
    /// Fails with a validation error on `name` if the name is taken, ignoring case.
    async fn insert_community(&self, community: Community) -> Result<Community>;

    // Post Operations
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn get_post(&self, id: PostId) -> Result<Option<Post>>;
    /// Fails with `NotFound` if the owning community does not exist.
    async fn insert_post(&self, post: Post) -> Result<Post>;

    // Comment Operations
    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>>;
    async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>>;
    /// Inserts the comment and bumps the post's comment count in one step.
    /// Fails with `NotFound` for an unknown post or parent, and with a
    /// validation error on `parent_id` when the parent sits on another post.
    async fn insert_comment(&self, comment: Comment) -> Result<Comment>;

    // Votes
    /// Fails with `NotFound` if the target does not exist.
    async fn apply_vote(&self, target: VoteTarget, direction: VoteDirection) -> Result<VoteOutcome>;
}

/// Identity contract. The store performs no credential logic; it only asks
/// who is acting.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` for an anonymous viewer.
    async fn current_user(&self) -> Option<User>;
}
