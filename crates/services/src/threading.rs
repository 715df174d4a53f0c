//! Threaded comment view.
//!
//! Comments are stored flat with a parent reference. The threaded shape is a
//! projection computed per query and never stored.

use std::collections::HashMap;

use domains::{Comment, CommentId, ThreadedComment};

/// Groups the comments of one post into top-level comments, each carrying its
/// direct replies in input order. Replies of replies are not attached.
///
/// Builds a parent index in one pass instead of filtering the full list once
/// per top-level comment.
pub fn thread_comments(comments: Vec<Comment>) -> Vec<ThreadedComment> {
    let mut top_level = Vec::new();
    let mut replies: HashMap<CommentId, Vec<ThreadedComment>> = HashMap::new();

    for comment in comments {
        match comment.parent_id {
            None => top_level.push(comment),
            Some(parent) => replies
                .entry(parent)
                .or_default()
                .push(ThreadedComment::leaf(comment)),
        }
    }

    top_level
        .into_iter()
        .map(|comment| {
            let replies = replies.remove(&comment.id).unwrap_or_default();
            ThreadedComment { comment, replies }
        })
        .collect()
}
