//! Game session actor for goban.
//!
//! Each game runs in its own Tokio task, communicating with the outside
//! world through an mpsc command queue: the actor model, no shared
//! mutable state. The [`Game`] handle is cheap to clone and is the only
//! way to reach a session; callers that wait on game-start or
//! turn-change are parked on deferred reply channels the actor resolves
//! when the state changes.

mod board;
mod error;
mod game;
mod gamer;

pub use board::Board;
pub use error::GameError;
pub use game::{Game, GamerState};
pub use gamer::Gamer;
