//! # Votes
//!
//! The viewer's relationship to a post or comment is a tri-state value. Casting
//! a vote moves it through a closed state machine:
//!
//! | from | vote | to   | delta |
//! |------|------|------|-------|
//! | None | Up   | Up   | +1    |
//! | None | Down | Down | -1    |
//! | Up   | Up   | None | -1    |
//! | Down | Down | None | +1    |
//! | Up   | Down | Down | -2    |
//! | Down | Up   | Up   | +2    |

use serde::{Deserialize, Serialize};

use crate::models::{Comment, CommentId, Post, PostId};

/// Direction of a single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn value(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

/// The current viewer's vote on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    #[default]
    None,
    Up,
    Down,
}

impl VoteState {
    /// Contribution of this state to the target's vote count.
    pub fn value(self) -> i64 {
        match self {
            VoteState::None => 0,
            VoteState::Up => 1,
            VoteState::Down => -1,
        }
    }

    /// Returns the next state and the vote count delta for casting `direction`.
    ///
    /// Voting in the same direction again retracts the vote.
    pub fn apply(self, direction: VoteDirection) -> (VoteState, i64) {
        let next = match (self, direction) {
            (VoteState::Up, VoteDirection::Up) | (VoteState::Down, VoteDirection::Down) => {
                VoteState::None
            }
            (_, VoteDirection::Up) => VoteState::Up,
            (_, VoteDirection::Down) => VoteState::Down,
        };
        (next, next.value() - self.value())
    }
}

impl From<VoteDirection> for VoteState {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => VoteState::Up,
            VoteDirection::Down => VoteState::Down,
        }
    }
}

/// What a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum VoteTarget {
    Post(PostId),
    Comment(CommentId),
}

/// State of the target after a vote has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub target: VoteTarget,
    pub vote_count: i64,
    pub viewer_vote: VoteState,
}

/// Anything carrying a vote count and a viewer vote.
pub trait Votable {
    fn target(&self) -> VoteTarget;
    fn tally_mut(&mut self) -> (&mut i64, &mut VoteState);

    /// Applies `direction` to the stored tally.
    fn cast_vote(&mut self, direction: VoteDirection) -> VoteOutcome {
        let target = self.target();
        let (count, state) = self.tally_mut();
        let (next, delta) = state.apply(direction);
        *count += delta;
        *state = next;
        VoteOutcome {
            target,
            vote_count: *count,
            viewer_vote: next,
        }
    }
}

impl Votable for Post {
    fn target(&self) -> VoteTarget {
        VoteTarget::Post(self.id)
    }

    fn tally_mut(&mut self) -> (&mut i64, &mut VoteState) {
        (&mut self.vote_count, &mut self.viewer_vote)
    }
}

impl Votable for Comment {
    fn target(&self) -> VoteTarget {
        VoteTarget::Comment(self.id)
    }

    fn tally_mut(&mut self) -> (&mut i64, &mut VoteState) {
        (&mut self.vote_count, &mut self.viewer_vote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoteDirection::{Down, Up};

    #[test]
    fn transition_table() {
        let cases = [
            (VoteState::None, Up, VoteState::Up, 1),
            (VoteState::None, Down, VoteState::Down, -1),
            (VoteState::Up, Up, VoteState::None, -1),
            (VoteState::Down, Down, VoteState::None, 1),
            (VoteState::Up, Down, VoteState::Down, -2),
            (VoteState::Down, Up, VoteState::Up, 2),
        ];
        for (from, direction, to, delta) in cases {
            assert_eq!(from.apply(direction), (to, delta), "{from:?} + {direction:?}");
        }
    }

    #[test]
    fn count_always_tracks_viewer_contribution() {
        let base = 10;
        let mut count = base;
        let mut state = VoteState::None;
        for direction in [Up, Up, Down, Up, Down, Down, Down] {
            let (next, delta) = state.apply(direction);
            count += delta;
            state = next;
            assert_eq!(count, base + state.value());
        }
    }

    #[test]
    fn direction_values() {
        assert_eq!(Up.value(), 1);
        assert_eq!(Down.value(), -1);
        assert_eq!(VoteState::from(Down), VoteState::Down);
    }
}
