//! Error types for the board engine.

use goban_types::{Colour, Coord};

/// Errors that can occur while constructing or driving a [`Field`].
///
/// [`Field`]: crate::Field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The requested board dimension is outside 1..=19.
    #[error("field size {0} is out of range (1x1 to 19x19)")]
    Size(usize),

    /// The move coordinate is off the board.
    #[error("position {0} is out of range")]
    Position(Coord),

    /// The target intersection already holds a chip.
    #[error("position {0} is occupied")]
    Occupied(Coord),

    /// The moving colour's cup is empty.
    #[error("no {0} chips left")]
    NoChips(Colour),
}
