//! Error types for the game session layer.

use goban_field::FieldError;
use goban_types::GamerId;

/// Errors that can occur during game session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Both seats are taken.
    #[error("no vacant place in the game")]
    NoPlace,

    /// The game has collapsed; only reads and `end` succeed.
    #[error("the game is over")]
    GameOver,

    /// The gamer never joined this game.
    #[error("gamer {0} is unknown to this game")]
    UnknownGamer(GamerId),

    /// It is the other participant's turn.
    #[error("not this gamer's turn")]
    NotYourTurn,

    /// The board engine rejected the move.
    #[error("wrong turn")]
    WrongTurn(#[source] FieldError),

    /// The other participant left while the caller was waiting.
    #[error("the other gamer left the game")]
    OtherGamerLeft,

    /// The session was destroyed while the caller was waiting.
    #[error("the game is destroyed")]
    Destroyed,

    /// The caller's cancel signal fired before the wait resolved.
    #[error("wait cancelled")]
    Cancelled,

    /// The session's command queue is closed.
    #[error("the game is not available")]
    Unavailable,

    /// The board engine could not be constructed.
    #[error("board setup failed")]
    Board(#[from] FieldError),
}
