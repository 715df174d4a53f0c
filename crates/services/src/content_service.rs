//! # Content Service
//!
//! Single source of truth for communities, posts and comments: queries,
//! creation, voting, and the derived feed and thread views.
//!
//! The acting user is an opaque input supplied by the identity provider on
//! every mutating call. Create operations resolve after a configurable delay,
//! standing in for a network round trip.

use std::time::Duration;

use chrono::Utc;
use domains::{
    Comment, CommentId, Community, CommunityId, ContentRepository, DomainError, Post, PostId,
    Result, SortOrder, ThreadedComment, User, UserId, VoteDirection, VoteOutcome, VoteState,
    VoteTarget,
};
use tracing::{debug, info, instrument, warn};

use crate::threading::thread_comments;
use crate::validation::{non_blank, validate_comment, validate_community, validate_post};

pub struct ContentService<R> {
    repo: R,
    latency: Duration,
}

impl<R: ContentRepository> ContentService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            latency: Duration::ZERO,
        }
    }

    /// Delay applied before every create operation resolves.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// Every post, ordered by `sort`.
    #[instrument(skip(self))]
    pub async fn list_posts(&self, sort: SortOrder) -> Result<Vec<Post>> {
        let mut posts = self.repo.list_posts().await?;
        sort.apply(&mut posts);
        debug!(count = posts.len(), "listed posts");
        Ok(posts)
    }

    /// Posts of one community, ordered by `sort`. Unknown communities yield
    /// an empty feed.
    #[instrument(skip(self))]
    pub async fn posts_by_community(
        &self,
        community_id: CommunityId,
        sort: SortOrder,
    ) -> Result<Vec<Post>> {
        let mut posts = self.repo.list_posts().await?;
        posts.retain(|p| p.community_id == community_id);
        sort.apply(&mut posts);
        debug!(count = posts.len(), "listed community posts");
        Ok(posts)
    }

    #[instrument(skip(self))]
    pub async fn posts_by_author(&self, author_id: &UserId, sort: SortOrder) -> Result<Vec<Post>> {
        let mut posts = self.repo.list_posts().await?;
        posts.retain(|p| &p.author_id == author_id);
        sort.apply(&mut posts);
        Ok(posts)
    }

    pub async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        self.repo.get_post(id).await
    }

    pub async fn get_community(&self, id: CommunityId) -> Result<Option<Community>> {
        self.repo.get_community(id).await
    }

    pub async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>> {
        self.repo.find_community_by_name(name).await
    }

    pub async fn list_communities(&self) -> Result<Vec<Community>> {
        self.repo.list_communities().await
    }

    pub async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        self.repo.get_user(id).await
    }

    /// Top-level comments of a post, each with its direct replies.
    #[instrument(skip(self))]
    pub async fn comments_by_post(&self, post_id: PostId) -> Result<Vec<ThreadedComment>> {
        let comments = self.repo.list_comments(post_id).await?;
        let threads = thread_comments(comments);
        debug!(threads = threads.len(), "threaded comments");
        Ok(threads)
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    #[instrument(skip(self, description, acting_user))]
    pub async fn create_community(
        &self,
        name: String,
        description: Option<String>,
        acting_user: Option<&User>,
    ) -> Result<Community> {
        self.settle().await;
        let result = async {
            let user = require_user(acting_user, "create a community")?;
            let description = non_blank(description);
            validate_community(&name, description.as_deref())?;

            let community = Community {
                id: CommunityId::new(),
                name,
                description,
                created_at: Utc::now(),
                creator_id: user.id.clone(),
                member_count: 1,
            };
            self.repo.insert_community(community).await
        }
        .await;

        result
            .inspect(|c| info!(community_id = %c.id, name = %c.name, "community created"))
            .inspect_err(|err| log_rejection("create_community", err))
    }

    #[instrument(skip(self, body, url, acting_user))]
    pub async fn create_post(
        &self,
        title: String,
        body: Option<String>,
        url: Option<String>,
        community_id: CommunityId,
        acting_user: Option<&User>,
    ) -> Result<Post> {
        self.settle().await;
        let result = async {
            let user = require_user(acting_user, "create a post")?;
            let body = non_blank(body);
            let url = non_blank(url).map(|u| u.trim().to_string());
            validate_post(title.trim(), body.as_deref(), url.as_deref())?;

            let now = Utc::now();
            let post = Post {
                id: PostId::new(),
                title: title.trim().to_string(),
                body,
                url,
                created_at: now,
                updated_at: now,
                community_id,
                author_id: user.id.clone(),
                // The author's own upvote
                vote_count: 1,
                comment_count: 0,
                viewer_vote: VoteState::Up,
            };
            self.repo.insert_post(post).await
        }
        .await;

        result
            .inspect(|p| info!(post_id = %p.id, community_id = %p.community_id, "post created"))
            .inspect_err(|err| log_rejection("create_post", err))
    }

    /// Adds a comment, or a reply when `parent_id` is set, and bumps the
    /// post's comment count.
    #[instrument(skip(self, body, acting_user))]
    pub async fn create_comment(
        &self,
        body: String,
        post_id: PostId,
        acting_user: Option<&User>,
        parent_id: Option<CommentId>,
    ) -> Result<Comment> {
        self.settle().await;
        let result = async {
            let user = require_user(acting_user, "comment")?;
            validate_comment(&body)?;

            let now = Utc::now();
            let comment = Comment {
                id: CommentId::new(),
                body,
                created_at: now,
                updated_at: now,
                author_id: user.id.clone(),
                post_id,
                parent_id,
                vote_count: 1,
                viewer_vote: VoteState::Up,
            };
            self.repo.insert_comment(comment).await
        }
        .await;

        result
            .inspect(|c| info!(comment_id = %c.id, post_id = %c.post_id, "comment created"))
            .inspect_err(|err| log_rejection("create_comment", err))
    }

    /// Casts, reverses or retracts the viewer's vote on a post or comment.
    /// Votes apply immediately.
    #[instrument(skip(self, acting_user))]
    pub async fn vote(
        &self,
        target: VoteTarget,
        direction: VoteDirection,
        acting_user: Option<&User>,
    ) -> Result<VoteOutcome> {
        let result = async {
            require_user(acting_user, "vote")?;
            self.repo.apply_vote(target, direction).await
        }
        .await;

        result
            .inspect(|o| {
                debug!(
                    vote_count = o.vote_count,
                    viewer_vote = ?o.viewer_vote,
                    "vote applied"
                )
            })
            .inspect_err(|err| log_rejection("vote", err))
    }

    async fn settle(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn require_user<'a>(user: Option<&'a User>, action: &'static str) -> Result<&'a User> {
    user.ok_or_else(|| DomainError::auth_required(action))
}

fn log_rejection(operation: &str, err: &DomainError) {
    warn!(operation, kind = err.kind(), error = %err, "operation rejected");
}
