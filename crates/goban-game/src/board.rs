//! The seam between the session actor and the board engine.

use goban_field::{Field, FieldError};
use goban_types::{Colour, Coord, FieldState};

/// What the session actor needs from a board engine.
///
/// The actor is the engine's sole caller, so implementations need no
/// internal synchronization. [`Field`] is the production engine; tests
/// substitute their own.
pub trait Board: Send {
    /// Attempts to place a chip. Any rejection reaches the caller as
    /// a wrong-turn error; the actor does not interpret it further.
    fn move_chip(&mut self, colour: Colour, at: Coord) -> Result<(), FieldError>;

    /// The board dimension.
    fn size(&self) -> usize;

    /// A full snapshot of the board situation.
    fn state(&self) -> FieldState;
}

impl Board for Field {
    fn move_chip(&mut self, colour: Colour, at: Coord) -> Result<(), FieldError> {
        Field::move_chip(self, colour, at)
    }

    fn size(&self) -> usize {
        Field::size(self)
    }

    fn state(&self) -> FieldState {
        Field::state(self)
    }
}
