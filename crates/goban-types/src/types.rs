//! Core data types shared by the pool, the session actor, and the
//! board engine.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a registered gamer.
///
/// Newtype over `u64` so a gamer id can never be confused with a game
/// id in a signature. `#[serde(transparent)]` keeps the serialized
/// form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GamerId(pub u64);

impl fmt::Display for GamerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a game session.
///
/// The session handle compares and hashes by this id, so callers can
/// use handles as map keys to tally distinct games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// The colour of a chip.
///
/// There is deliberately no "no colour" variant: an empty board point
/// is `Option<Colour>`, and a joined participant always holds one of
/// the two colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Colour {
    Black,
    White,
}

impl Colour {
    /// The other colour.
    pub fn opposite(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    /// The colour that moves at the given turn index.
    ///
    /// Black moves on even turns, White on odd, per the Black-first
    /// convention of the game.
    pub fn to_move(turn_index: u64) -> Self {
        if turn_index % 2 == 0 {
            Self::Black
        } else {
            Self::White
        }
    }

    /// Whether this colour is the one to move at `turn_index`.
    pub fn is_to_move(self, turn_index: u64) -> bool {
        self == Self::to_move(turn_index)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "black"),
            Self::White => write!(f, "white"),
        }
    }
}

// ---------------------------------------------------------------------------
// Coord
// ---------------------------------------------------------------------------

/// A 1-based board coordinate.
///
/// `(1, 1)` is the first intersection; `0` is representable so that
/// out-of-range input reaches the engine's bounds check and comes back
/// as a position error instead of being untypable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// PerColour
// ---------------------------------------------------------------------------

/// A pair of values, one per chip colour, indexable by [`Colour`].
///
/// Replaces colour-keyed maps: both entries always exist, so lookups
/// cannot miss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerColour<T> {
    pub black: T,
    pub white: T,
}

impl<T> PerColour<T> {
    pub fn new(black: T, white: T) -> Self {
        Self { black, white }
    }

    pub fn get(&self, colour: Colour) -> &T {
        match colour {
            Colour::Black => &self.black,
            Colour::White => &self.white,
        }
    }

    pub fn get_mut(&mut self, colour: Colour) -> &mut T {
        match colour {
            Colour::Black => &mut self.black,
            Colour::White => &mut self.white,
        }
    }
}

impl<T> Index<Colour> for PerColour<T> {
    type Output = T;

    fn index(&self, colour: Colour) -> &T {
        self.get(colour)
    }
}

impl<T> IndexMut<Colour> for PerColour<T> {
    fn index_mut(&mut self, colour: Colour) -> &mut T {
        self.get_mut(colour)
    }
}

// ---------------------------------------------------------------------------
// FieldState
// ---------------------------------------------------------------------------

/// A full snapshot of the board situation.
///
/// Captured chips are derived, not tracked: initial supply minus chips
/// still in the cup minus chips on the board. Scores are captured plus
/// controlled points, with the komi added to White's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldState {
    /// True when either cup is empty.
    pub game_over: bool,
    /// Compensation added to White's score.
    pub komi: f64,
    /// Chips remaining in each cup.
    pub chips_in_cup: PerColour<u32>,
    /// Chips captured from each colour.
    pub chips_captured: PerColour<u32>,
    /// Positions of each colour's chips on the board.
    pub chips_on_board: PerColour<Vec<Coord>>,
    /// Territory under each colour's control. Empty until territory
    /// scoring lands.
    pub points_under_control: PerColour<Vec<Coord>>,
    /// Current score per colour.
    pub scores: PerColour<f64>,
}

// =========================================================================
// Tests
// =========================================================================
