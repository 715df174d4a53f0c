//! # Seed Data
//!
//! The initial dataset loaded into a store at construction: a handful of
//! users, communities, posts and comments. Ids are fixed so the data can be
//! addressed from the shell and from tests.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use domains::{
    Comment, CommentId, Community, CommunityId, Post, PostId, User, UserId, VoteState,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed seed data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Entities to preload, each list in insertion order. Comments are flat;
/// replies point at their parent through `parent_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub communities: Vec<Community>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl SeedData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The built-in mock dataset.
    pub fn mock() -> Self {
        let users = vec![
            user(1, "reddituser1", "photo-1649972904349-6e44c42644a7", at(2023, 1, 1, 0, 0)),
            user(2, "techguru", "photo-1526374965328-7f61d4dc18c5", at(2023, 1, 15, 0, 0)),
            user(3, "memer2000", "photo-1531297484001-80022131f5a1", at(2023, 2, 1, 0, 0)),
        ];

        let communities = vec![
            community(1, "programming", "All things programming and coding", 2, 1250, at(2023, 1, 10, 0, 0)),
            community(2, "technology", "Latest tech news and discussions", 1, 980, at(2023, 1, 20, 0, 0)),
            community(3, "movies", "Discuss your favorite films and TV shows", 3, 2100, at(2023, 2, 5, 0, 0)),
            community(4, "gaming", "For gamers and gaming enthusiasts", 1, 1830, at(2023, 2, 15, 0, 0)),
            community(5, "funny", "Share humor and memes", 3, 3200, at(2023, 3, 1, 0, 0)),
        ];

        let posts = vec![
            Post {
                viewer_vote: VoteState::Up,
                ..text_post(
                    1,
                    "What's your favorite programming language?",
                    "I'm learning to code and can't decide what to focus on first. What language do you recommend for beginners?",
                    (1, 1),
                    (42, 5),
                    at(2023, 4, 5, 0, 0),
                )
            },
            link_post(
                2,
                "New AI breakthrough can code entire websites from text descriptions",
                "https://tech-news-example.com/ai-coding",
                (2, 2),
                (128, 12),
                at(2023, 4, 10, 0, 0),
            ),
            Post {
                viewer_vote: VoteState::Down,
                ..text_post(
                    3,
                    "What do you think of the new Dune movie?",
                    "Just watched it and was blown away by the visuals. What did everyone else think?",
                    (3, 3),
                    (95, 8),
                    at(2023, 4, 15, 0, 0),
                )
            },
            Post {
                updated_at: at(2023, 4, 21, 0, 0),
                ..text_post(
                    4,
                    "Tips for optimizing React applications?",
                    "Working on a complex React app that's getting slow. Any best practices for performance optimization?",
                    (1, 2),
                    (78, 7),
                    at(2023, 4, 20, 0, 0),
                )
            },
            link_post(
                5,
                "Leaked images of the next iPhone",
                "https://tech-news-example.com/iphone-leak",
                (2, 1),
                (203, 24),
                at(2023, 4, 25, 0, 0),
            ),
            text_post(
                6,
                "Best games of 2023 so far?",
                "We're halfway through the year. What are your top games released in 2023?",
                (4, 3),
                (67, 14),
                at(2023, 5, 1, 0, 0),
            ),
            link_post(
                7,
                "This dog's reaction to its birthday cake is priceless",
                "https://funny-videos.example.com/dog-birthday",
                (5, 1),
                (352, 18),
                at(2023, 5, 5, 0, 0),
            ),
        ];

        let comments = vec![
            comment(
                1,
                "Python is great for beginners due to its readability and vast ecosystem.",
                (1, None),
                2,
                15,
                at(2023, 4, 5, 12, 30),
            ),
            comment(
                2,
                "I agree! Python was my first language and it made learning concepts much easier.",
                (1, Some(1)),
                3,
                8,
                at(2023, 4, 5, 13, 15),
            ),
            comment(
                3,
                "JavaScript is unavoidable if you want to do web development.",
                (1, None),
                1,
                12,
                at(2023, 4, 5, 14, 0),
            ),
            comment(
                4,
                "This is mind-blowing technology. The future of development is changing fast.",
                (2, None),
                3,
                24,
                at(2023, 4, 10, 9, 45),
            ),
            comment(
                5,
                "I wonder if developers will become obsolete or just work at a higher level of abstraction.",
                (2, Some(4)),
                1,
                18,
                at(2023, 4, 10, 10, 30),
            ),
        ];

        Self {
            users,
            communities,
            posts,
            comments,
        }
    }
}

// Entity kind lives in the top nibble of fixed ids.
const COMMUNITY_KIND: u128 = 0xc;
const POST_KIND: u128 = 0xa;
const COMMENT_KIND: u128 = 0xe;

fn fixed_id(kind: u128, n: u32) -> Uuid {
    Uuid::from_u128((kind << 124) | n as u128)
}

pub fn seed_user_id(n: u32) -> UserId {
    UserId::new(format!("user_{n}"))
}

pub fn seed_community_id(n: u32) -> CommunityId {
    CommunityId(fixed_id(COMMUNITY_KIND, n))
}

pub fn seed_post_id(n: u32) -> PostId {
    PostId(fixed_id(POST_KIND, n))
}

pub fn seed_comment_id(n: u32) -> CommentId {
    CommentId(fixed_id(COMMENT_KIND, n))
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn user(n: u32, username: &str, photo: &str, created_at: DateTime<Utc>) -> User {
    User {
        id: seed_user_id(n),
        username: username.to_string(),
        email: None,
        avatar: Some(format!("https://images.unsplash.com/{photo}")),
        created_at,
    }
}

fn community(
    n: u32,
    name: &str,
    description: &str,
    creator: u32,
    member_count: u64,
    created_at: DateTime<Utc>,
) -> Community {
    Community {
        id: seed_community_id(n),
        name: name.to_string(),
        description: Some(description.to_string()),
        created_at,
        creator_id: seed_user_id(creator),
        member_count,
    }
}

/// Placement is `(community, author)`, tally is `(votes, comments)`.
fn text_post(
    n: u32,
    title: &str,
    body: &str,
    placement: (u32, u32),
    tally: (i64, u64),
    created_at: DateTime<Utc>,
) -> Post {
    let (community, author) = placement;
    let (vote_count, comment_count) = tally;
    Post {
        id: seed_post_id(n),
        title: title.to_string(),
        body: Some(body.to_string()),
        url: None,
        created_at,
        updated_at: created_at,
        community_id: seed_community_id(community),
        author_id: seed_user_id(author),
        vote_count,
        comment_count,
        viewer_vote: VoteState::None,
    }
}

fn link_post(
    n: u32,
    title: &str,
    url: &str,
    placement: (u32, u32),
    tally: (i64, u64),
    created_at: DateTime<Utc>,
) -> Post {
    Post {
        body: None,
        url: Some(url.to_string()),
        ..text_post(n, title, "", placement, tally, created_at)
    }
}

fn comment(
    n: u32,
    body: &str,
    (post, parent): (u32, Option<u32>),
    author: u32,
    vote_count: i64,
    created_at: DateTime<Utc>,
) -> Comment {
    Comment {
        id: seed_comment_id(n),
        body: body.to_string(),
        created_at,
        updated_at: created_at,
        author_id: seed_user_id(author),
        post_id: seed_post_id(post),
        parent_id: parent.map(seed_comment_id),
        vote_count,
        viewer_vote: VoteState::None,
    }
}
