//! The passive gamer record.

use std::fmt;

use goban_types::GamerId;

use crate::Game;

/// A registered gamer.
///
/// `game` is the back-reference to the session the gamer is currently
/// attached to, if any. The pool uses it to find candidate sessions
/// during matchmaking; the session itself never reads it. `Clone` is
/// the defensive-copy mechanism: every crossing of an actor boundary
/// clones the record so no one can mutate someone else's copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Gamer {
    /// Display name; not unique.
    pub name: String,
    /// Unique id.
    pub id: GamerId,
    /// The session this gamer is attached to, if any.
    pub game: Option<Game>,
}

impl Gamer {
    /// Creates an idle gamer (no session attached).
    pub fn new(id: GamerId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id,
            game: None,
        }
    }

    /// A copy with the session back-reference cleared.
    ///
    /// This is the form that crosses into a session on join: the
    /// session gets the identity, not the live handle.
    pub fn detached(&self) -> Self {
        Self {
            name: self.name.clone(),
            id: self.id,
            game: None,
        }
    }
}

impl fmt::Display for Gamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.game {
            Some(game) => write!(f, "[{} {:?} in {}]", self.id, self.name, game.id()),
            None => write!(f, "[{} {:?} idle]", self.id, self.name),
        }
    }
}
