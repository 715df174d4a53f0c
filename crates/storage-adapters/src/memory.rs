//! # In-memory Content Repository
//!
//! Flat collections held for the lifetime of the process. Posts are kept
//! newest first; the other lists keep insertion order. One `RwLock` guards every collection, so each mutating
//! call checks and writes under a single guard.

use std::sync::Arc;

use async_trait::async_trait;
use domains::{
    Comment, CommentId, Community, CommunityId, ContentRepository, DomainError, Post, PostId,
    Result, User, UserId, Votable, VoteDirection, VoteOutcome, VoteTarget,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::seed::SeedData;

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    communities: Vec<Community>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

/// Clone-friendly via Arc; clones share the same collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentRepository {
    inner: Arc<RwLock<Collections>>,
}

impl InMemoryContentRepository {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with `seed`. The seed is taken as-is.
    pub fn seeded(seed: SeedData) -> Self {
        debug!(
            users = seed.users.len(),
            communities = seed.communities.len(),
            posts = seed.posts.len(),
            comments = seed.comments.len(),
            "loading seed data"
        );
        let SeedData {
            users,
            communities,
            posts,
            comments,
        } = seed;
        Self {
            inner: Arc::new(RwLock::new(Collections {
                users,
                communities,
                posts,
                comments,
            })),
        }
    }

    /// Copies every collection in its current state.
    pub async fn snapshot(&self) -> SeedData {
        let data = self.inner.read().await;
        SeedData {
            users: data.users.clone(),
            communities: data.communities.clone(),
            posts: data.posts.clone(),
            comments: data.comments.clone(),
        }
    }

    /// Makes a user known to the store, e.g. one reported by the identity
    /// provider. Existing ids are left untouched.
    pub async fn register_user(&self, user: User) {
        let mut data = self.inner.write().await;
        if !data.users.iter().any(|u| u.id == user.id) {
            data.users.push(user);
        }
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| &u.id == id).cloned())
    }

    async fn list_communities(&self) -> Result<Vec<Community>> {
        Ok(self.inner.read().await.communities.clone())
    }

    async fn get_community(&self, id: CommunityId) -> Result<Option<Community>> {
        let data = self.inner.read().await;
        Ok(data.communities.iter().find(|c| c.id == id).cloned())
    }

    async fn find_community_by_name(&self, name: &str) -> Result<Option<Community>> {
        let data = self.inner.read().await;
        Ok(data.communities.iter().find(|c| c.has_name(name)).cloned())
    }

    async fn insert_community(&self, community: Community) -> Result<Community> {
        let mut data = self.inner.write().await;
        if data.communities.iter().any(|c| c.has_name(&community.name)) {
            return Err(DomainError::invalid(
                "name",
                "A community with that name already exists",
            ));
        }
        data.communities.push(community.clone());
        Ok(community)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.inner.read().await.posts.clone())
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        let data = self.inner.read().await;
        Ok(data.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_post(&self, post: Post) -> Result<Post> {
        let mut data = self.inner.write().await;
        if !data.communities.iter().any(|c| c.id == post.community_id) {
            return Err(DomainError::not_found("community", post.community_id));
        }
        data.posts.insert(0, post.clone());
        Ok(post)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>> {
        let data = self.inner.read().await;
        Ok(data
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        let data = self.inner.read().await;
        Ok(data.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment> {
        let mut data = self.inner.write().await;
        let post_index = data
            .posts
            .iter()
            .position(|p| p.id == comment.post_id)
            .ok_or_else(|| DomainError::not_found("post", comment.post_id))?;

        if let Some(parent_id) = comment.parent_id {
            let parent = data
                .comments
                .iter()
                .find(|c| c.id == parent_id)
                .ok_or_else(|| DomainError::not_found("comment", parent_id))?;
            if parent.post_id != comment.post_id {
                return Err(DomainError::invalid(
                    "parent_id",
                    "A reply must belong to the same post as its parent",
                ));
            }
        }

        data.comments.push(comment.clone());
        data.posts[post_index].comment_count += 1;
        Ok(comment)
    }

    async fn apply_vote(&self, target: VoteTarget, direction: VoteDirection) -> Result<VoteOutcome> {
        let mut data = self.inner.write().await;
        let outcome = match target {
            VoteTarget::Post(id) => data
                .posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| DomainError::not_found("post", id))?
                .cast_vote(direction),
            VoteTarget::Comment(id) => data
                .comments
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| DomainError::not_found("comment", id))?
                .cast_vote(direction),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{seed_comment_id, seed_community_id, seed_post_id, seed_user_id};
    use chrono::Utc;
    use domains::VoteState;

    fn repo() -> InMemoryContentRepository {
        InMemoryContentRepository::seeded(SeedData::mock())
    }

    fn reply(post: PostId, parent: Option<CommentId>) -> Comment {
        let now = Utc::now();
        Comment {
            id: CommentId::new(),
            body: "reply".into(),
            created_at: now,
            updated_at: now,
            author_id: seed_user_id(1),
            post_id: post,
            parent_id: parent,
            vote_count: 1,
            viewer_vote: VoteState::Up,
        }
    }

    #[tokio::test]
    async fn lookups_find_seeded_entities() {
        let repo = repo();
        assert_eq!(repo.list_communities().await.unwrap().len(), 5);
        assert_eq!(repo.list_posts().await.unwrap().len(), 7);
        assert!(repo.get_post(seed_post_id(4)).await.unwrap().is_some());
        assert!(repo.get_post(PostId::new()).await.unwrap().is_none());
        let found = repo.find_community_by_name("GAMING").await.unwrap().unwrap();
        assert_eq!(found.id, seed_community_id(4));
        let user = repo.get_user(&seed_user_id(2)).await.unwrap().unwrap();
        assert_eq!(user.username, "techguru");
    }

    #[tokio::test]
    async fn duplicate_community_names_are_rejected() {
        let repo = repo();
        let mut community = repo.get_community(seed_community_id(1)).await.unwrap().unwrap();
        community.id = CommunityId::new();
        community.name = "Programming".into();
        let err = repo.insert_community(community).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.contains("name")));
        assert_eq!(repo.list_communities().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn comments_bump_the_post_count_once() {
        let repo = repo();
        let post = seed_post_id(1);
        let before = repo.get_post(post).await.unwrap().unwrap().comment_count;
        repo.insert_comment(reply(post, Some(seed_comment_id(3))))
            .await
            .unwrap();
        let after = repo.get_post(post).await.unwrap().unwrap().comment_count;
        assert_eq!(after, before + 1);
    }

    #[tokio::test]
    async fn rejected_comments_leave_no_trace() {
        let repo = repo();
        let before = repo.snapshot().await;

        let err = repo.insert_comment(reply(PostId::new(), None)).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");

        let err = repo
            .insert_comment(reply(seed_post_id(1), Some(CommentId::new())))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("comment not found"));

        // Comment 4 lives on post 2.
        let err = repo
            .insert_comment(reply(seed_post_id(1), Some(seed_comment_id(4))))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.contains("parent_id")));

        assert_eq!(repo.snapshot().await, before);
    }

    #[tokio::test]
    async fn posts_need_an_existing_community() {
        let repo = repo();
        let mut post = repo.get_post(seed_post_id(1)).await.unwrap().unwrap();
        post.id = PostId::new();
        post.community_id = CommunityId::new();
        let err = repo.insert_post(post).await.unwrap_err();
        assert!(err.to_string().starts_with("community not found"));
        assert_eq!(repo.list_posts().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn new_posts_are_listed_first() {
        let repo = repo();
        let template = repo.get_post(seed_post_id(1)).await.unwrap().unwrap();
        let older = Post {
            id: PostId::new(),
            ..template.clone()
        };
        let newer = Post {
            id: PostId::new(),
            ..template
        };
        repo.insert_post(older.clone()).await.unwrap();
        repo.insert_post(newer.clone()).await.unwrap();

        let ids: Vec<PostId> = repo.list_posts().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 9);
        assert_eq!(&ids[..3], &[newer.id, older.id, seed_post_id(1)]);
    }

    #[tokio::test]
    async fn votes_update_the_stored_tally() {
        let repo = repo();
        // Post 3 starts at 95 with a downvote from the viewer.
        let target = VoteTarget::Post(seed_post_id(3));
        let outcome = repo.apply_vote(target, VoteDirection::Up).await.unwrap();
        assert_eq!(outcome.vote_count, 97);
        assert_eq!(outcome.viewer_vote, VoteState::Up);
        let stored = repo.get_post(seed_post_id(3)).await.unwrap().unwrap();
        assert_eq!(stored.vote_count, 97);

        let target = VoteTarget::Comment(seed_comment_id(2));
        let outcome = repo.apply_vote(target, VoteDirection::Down).await.unwrap();
        assert_eq!((outcome.vote_count, outcome.viewer_vote), (7, VoteState::Down));

        let missing = VoteTarget::Comment(CommentId::new());
        assert!(repo.apply_vote(missing, VoteDirection::Up).await.is_err());
    }

    #[test]
    fn clones_share_state() {
        let repo = repo();
        let clone = repo.clone();
        tokio_test::block_on(clone.register_user(User {
            id: UserId::new("user_99"),
            username: "newcomer".into(),
            email: Some("new@example.com".into()),
            avatar: None,
            created_at: Utc::now(),
        }));
        let found = tokio_test::block_on(repo.get_user(&UserId::new("user_99"))).unwrap();
        assert_eq!(found.map(|u| u.username), Some("newcomer".to_string()));
    }
}
