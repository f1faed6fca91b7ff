//! Shared types for the goban coordination layer.
//!
//! Identity newtypes, chip colours with the turn-parity rule, board
//! coordinates, and the full board snapshot exchanged between the
//! session actor and its callers.

mod types;

pub use types::{Colour, Coord, FieldState, GameId, GamerId, PerColour};
