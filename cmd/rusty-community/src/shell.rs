//! Line-oriented command shell over the content service.
//!
//! Each input line is split into shell words and parsed with clap. Operation
//! errors are printed and the shell keeps going.

use std::collections::HashMap;
use std::io::Write;

use auth_adapters::SessionIdentityProvider;
use clap::{Parser, Subcommand, ValueEnum};
use domains::{
    CommentId, Community, CommunityId, ContentRepository, DomainError, IdentityProvider, Post,
    PostId, Result, SortOrder, ThreadedComment, UserId, VoteDirection, VoteState, VoteTarget,
};
use services::ContentService;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "rusty-community", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every post
    Feed {
        #[arg(long, default_value_t)]
        sort: SortOrder,
    },
    /// List communities
    Communities,
    /// Show the posts of one community, by id or name
    Community {
        community: String,
        #[arg(long, default_value_t)]
        sort: SortOrder,
    },
    /// Show a post with its comments
    Post { id: PostId },
    /// Sign in as a known user
    Login { username: String },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create a community
    CreateCommunity {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Submit a text or link post to a community (id or name)
    Submit {
        community: String,
        title: String,
        #[arg(long, conflicts_with = "url")]
        body: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Comment on a post, or reply to a comment with --parent
    Comment {
        post: PostId,
        body: String,
        #[arg(long)]
        parent: Option<CommentId>,
    },
    /// Vote on a post or comment; repeating a vote retracts it
    Vote {
        kind: TargetKind,
        id: String,
        direction: Direction,
    },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetKind {
    Post,
    Comment,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

impl From<Direction> for VoteDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => VoteDirection::Up,
            Direction::Down => VoteDirection::Down,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

pub struct Shell<'a, R> {
    service: &'a ContentService<R>,
    identity: &'a SessionIdentityProvider,
}

impl<'a, R: ContentRepository> Shell<'a, R> {
    pub fn new(service: &'a ContentService<R>, identity: &'a SessionIdentityProvider) -> Self {
        Self { service, identity }
    }

    /// Runs one input line and returns the text to show.
    pub async fn execute(&self, line: &str) -> Flow {
        let words = match shlex::split(line) {
            Some(words) if words.is_empty() => return Flow::Continue(String::new()),
            Some(words) => words,
            None => return Flow::Continue("error: unbalanced quotes".to_string()),
        };

        let command = match Line::try_parse_from(words) {
            Ok(line) => line.command,
            Err(err) => return Flow::Continue(err.render().to_string().trim_end().to_string()),
        };
        debug!(?command, "executing");

        if matches!(command, Command::Quit) {
            return Flow::Quit;
        }
        match self.dispatch(command).await {
            Ok(text) => Flow::Continue(text),
            Err(err) => Flow::Continue(render_error(&err)),
        }
    }

    async fn dispatch(&self, command: Command) -> Result<String> {
        let user = self.identity.current_user().await;
        let acting_user = user.as_ref();

        match command {
            Command::Feed { sort } => {
                let posts = self.service.list_posts(sort).await?;
                self.render_feed(&posts).await
            }
            Command::Communities => {
                let communities = self.service.list_communities().await?;
                Ok(communities
                    .iter()
                    .map(|c| {
                        format!(
                            "r/{:<21} {:>6} members  {}\n    {}",
                            c.name,
                            c.member_count,
                            c.description.as_deref().unwrap_or(""),
                            c.id
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Command::Community { community, sort } => {
                let community = self.resolve_community(&community).await?;
                let posts = self.service.posts_by_community(community.id, sort).await?;
                let header = format!(
                    "r/{} ({} members)\n{}",
                    community.name,
                    community.member_count,
                    community.description.as_deref().unwrap_or("")
                );
                let feed = self.render_feed(&posts).await?;
                Ok(format!("{header}\n\n{feed}"))
            }
            Command::Post { id } => {
                let post = self
                    .service
                    .get_post(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("post", id))?;
                self.render_post_page(&post).await
            }
            Command::Login { username } => {
                let user = self.identity.sign_in(&username).await?;
                Ok(format!("signed in as {}", user.username))
            }
            Command::Logout => Ok(match self.identity.sign_out().await {
                Some(user) => format!("signed out {}", user.username),
                None => "not signed in".to_string(),
            }),
            Command::Whoami => Ok(match acting_user {
                Some(user) => format!("{} ({})", user.username, user.id),
                None => "not signed in".to_string(),
            }),
            Command::CreateCommunity { name, description } => {
                let community = self
                    .service
                    .create_community(name, description, acting_user)
                    .await?;
                Ok(format!("created r/{} ({})", community.name, community.id))
            }
            Command::Submit {
                community,
                title,
                body,
                url,
            } => {
                let community_id = self.resolve_community_id(&community).await?;
                let post = self
                    .service
                    .create_post(title, body, url, community_id, acting_user)
                    .await?;
                Ok(format!("posted \"{}\" ({})", post.title, post.id))
            }
            Command::Comment { post, body, parent } => {
                let comment = self
                    .service
                    .create_comment(body, post, acting_user, parent)
                    .await?;
                Ok(format!("commented ({})", comment.id))
            }
            Command::Vote {
                kind,
                id,
                direction,
            } => {
                let target = parse_target(kind, &id)?;
                let outcome = self
                    .service
                    .vote(target, direction.into(), acting_user)
                    .await?;
                Ok(format!(
                    "{} {}",
                    outcome.vote_count,
                    vote_marker(outcome.viewer_vote)
                ))
            }
            Command::Quit => Ok(String::new()),
        }
    }

    async fn resolve_community(&self, reference: &str) -> Result<Community> {
        let found = match reference.parse::<CommunityId>() {
            Ok(id) => self.service.get_community(id).await?,
            Err(_) => {
                let name = reference.strip_prefix("r/").unwrap_or(reference);
                self.service.find_community_by_name(name).await?
            }
        };
        found.ok_or_else(|| DomainError::not_found("community", reference))
    }

    /// Ids pass through untouched so the service decides whether they exist.
    async fn resolve_community_id(&self, reference: &str) -> Result<CommunityId> {
        match reference.parse::<CommunityId>() {
            Ok(id) => Ok(id),
            Err(_) => self.resolve_community(reference).await.map(|c| c.id),
        }
    }

    async fn display_name(&self, id: &UserId, cache: &mut HashMap<UserId, String>) -> Result<String> {
        if let Some(name) = cache.get(id) {
            return Ok(name.clone());
        }
        let name = match self.service.get_user(id).await? {
            Some(user) => user.username,
            None => id.to_string(),
        };
        cache.insert(id.clone(), name.clone());
        Ok(name)
    }

    async fn render_feed(&self, posts: &[Post]) -> Result<String> {
        if posts.is_empty() {
            return Ok("no posts yet".to_string());
        }
        let communities: HashMap<CommunityId, String> = self
            .service
            .list_communities()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let mut authors = HashMap::new();

        let mut lines = Vec::with_capacity(posts.len() * 2);
        for post in posts {
            let community = communities
                .get(&post.community_id)
                .map(String::as_str)
                .unwrap_or("?");
            let author = self.display_name(&post.author_id, &mut authors).await?;
            lines.push(format!(
                "{:>5} {} {}",
                post.vote_count,
                vote_marker(post.viewer_vote),
                post.title
            ));
            lines.push(format!(
                "        r/{community} by {author} on {} | {} comments | {}",
                post.created_at.format("%Y-%m-%d"),
                post.comment_count,
                post.id
            ));
        }
        Ok(lines.join("\n"))
    }

    async fn render_post_page(&self, post: &Post) -> Result<String> {
        let mut authors = HashMap::new();
        let author = self.display_name(&post.author_id, &mut authors).await?;
        let mut lines = vec![
            format!(
                "{} {} {}",
                post.vote_count,
                vote_marker(post.viewer_vote),
                post.title
            ),
            format!("by {author} on {}", post.created_at.format("%Y-%m-%d %H:%M")),
        ];
        if let Some(url) = &post.url {
            lines.push(url.clone());
        }
        if let Some(body) = &post.body {
            lines.push(String::new());
            lines.push(body.clone());
        }
        lines.push(String::new());
        lines.push(format!("{} comments", post.comment_count));

        let threads = self.service.comments_by_post(post.id).await?;
        for thread in &threads {
            self.render_thread(thread, 1, &mut authors, &mut lines).await?;
        }
        Ok(lines.join("\n"))
    }

    async fn render_thread(
        &self,
        thread: &ThreadedComment,
        depth: usize,
        authors: &mut HashMap<UserId, String>,
        lines: &mut Vec<String>,
    ) -> Result<()> {
        let indent = "    ".repeat(depth);
        let comment = &thread.comment;
        let author = self.display_name(&comment.author_id, authors).await?;
        lines.push(format!(
            "{indent}{} {} {author}: {}",
            comment.vote_count,
            vote_marker(comment.viewer_vote),
            comment.body
        ));
        lines.push(format!("{indent}  {}", comment.id));
        // Threads carry one level of replies.
        for reply in &thread.replies {
            let reply_indent = "    ".repeat(depth + 1);
            let c = &reply.comment;
            let author = self.display_name(&c.author_id, authors).await?;
            lines.push(format!(
                "{reply_indent}{} {} {author}: {}",
                c.vote_count,
                vote_marker(c.viewer_vote),
                c.body
            ));
            lines.push(format!("{reply_indent}  {}", c.id));
        }
        Ok(())
    }
}

/// Reads commands until end of input or `quit`.
pub async fn run<R, I, W>(shell: &Shell<'_, R>, input: I, out: &mut W) -> anyhow::Result<()>
where
    R: ContentRepository,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    write!(out, "> ")?;
    out.flush()?;
    while let Some(line) = lines.next_line().await? {
        match shell.execute(&line).await {
            Flow::Continue(text) if text.is_empty() => {}
            Flow::Continue(text) => writeln!(out, "{text}")?,
            Flow::Quit => break,
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}

fn parse_target(kind: TargetKind, id: &str) -> Result<VoteTarget> {
    let invalid = |_| DomainError::invalid("id", format!("'{id}' is not a valid id"));
    match kind {
        TargetKind::Post => id.parse().map(VoteTarget::Post).map_err(invalid),
        TargetKind::Comment => id.parse().map(VoteTarget::Comment).map_err(invalid),
    }
}

fn vote_marker(state: VoteState) -> &'static str {
    match state {
        VoteState::Up => "▲",
        VoteState::Down => "▼",
        VoteState::None => "·",
    }
}

fn render_error(err: &DomainError) -> String {
    match err {
        DomainError::Validation(errors) => {
            let mut lines = vec!["invalid input:".to_string()];
            lines.extend(errors.iter().map(|(field, message)| format!("  {field}: {message}")));
            lines.join("\n")
        }
        other => format!("error: {other}"),
    }
}
