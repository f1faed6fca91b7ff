//! Error types for the gamer pool.

use goban_game::GameError;
use goban_types::GamerId;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Another gamer is already registered under this id.
    #[error("id {0} is already occupied")]
    IdOccupied(GamerId),

    /// No gamer with this id in the pool.
    #[error("no gamer with id {0} in the pool")]
    NotFound(GamerId),

    /// The gamer is already attached to a game.
    #[error("gamer {0} has already joined another game")]
    GamerOccupied(GamerId),

    /// A fresh session could not be opened or entered.
    #[error("failed to start a new game")]
    GameStart(#[source] GameError),

    /// The pool's command queue is closed.
    #[error("the pool is not available")]
    Unavailable,
}
