//! The board itself: chip placement, cup bookkeeping, and snapshots.

use goban_types::{Colour, Coord, FieldState, PerColour};

use crate::FieldError;

/// Chips in Black's cup at the start of a game. One more than White's,
/// reflecting the Black-first convention.
pub const BLACK_CHIPS: u32 = 181;
/// Chips in White's cup at the start of a game.
pub const WHITE_CHIPS: u32 = 180;
/// Smallest legal board dimension.
pub const MIN_SIZE: usize = 1;
/// Largest legal board dimension.
pub const MAX_SIZE: usize = 19;

/// A square board of `size` x `size` intersections plus the two cups.
///
/// Coordinates are 1-based. The engine validates bounds, occupancy,
/// and cup supply; judging whose turn it is belongs to the session
/// actor.
#[derive(Debug, Clone)]
pub struct Field {
    size: usize,
    komi: f64,
    cells: Vec<Option<Colour>>,
    chips_in_cup: PerColour<u32>,
}

impl Field {
    /// Creates an empty field of `size` x `size` with the given komi.
    pub fn new(size: usize, komi: f64) -> Result<Self, FieldError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(FieldError::Size(size));
        }

        Ok(Self {
            size,
            komi,
            cells: vec![None; size * size],
            chips_in_cup: PerColour::new(BLACK_CHIPS, WHITE_CHIPS),
        })
    }

    /// The board dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Attempts to place a chip of `colour` at `at`.
    ///
    /// Checks run in order: position bounds, cup supply, occupancy.
    /// On success the chip leaves the cup and lands on the board.
    pub fn move_chip(&mut self, colour: Colour, at: Coord) -> Result<(), FieldError> {
        if !self.in_bounds(at) {
            return Err(FieldError::Position(at));
        }
        if self.chips_in_cup[colour] == 0 {
            return Err(FieldError::NoChips(colour));
        }

        let index = self.index(at);
        if self.cells[index].is_some() {
            return Err(FieldError::Occupied(at));
        }

        self.chips_in_cup[colour] -= 1;
        self.cells[index] = Some(colour);
        Ok(())
    }

    /// Computes the full board snapshot.
    pub fn state(&self) -> FieldState {
        let initial = PerColour::new(BLACK_CHIPS, WHITE_CHIPS);
        let mut state = FieldState {
            game_over: self.is_game_over(),
            komi: self.komi,
            chips_in_cup: self.chips_in_cup.clone(),
            chips_captured: PerColour::default(),
            chips_on_board: PerColour::default(),
            points_under_control: PerColour::default(),
            scores: PerColour::default(),
        };

        for colour in [Colour::Black, Colour::White] {
            let on_board = self.chips_on_board(colour);
            let captured =
                initial[colour] - state.chips_in_cup[colour] - on_board.len() as u32;

            state.chips_captured[colour] = captured;
            state.points_under_control[colour] = self.points_under_control(colour);
            state.scores[colour] =
                f64::from(captured) + state.points_under_control[colour].len() as f64;
            state.chips_on_board[colour] = on_board;
        }
        state.scores[Colour::White] += self.komi;

        state
    }

    /// True when either cup is exhausted.
    fn is_game_over(&self) -> bool {
        self.chips_in_cup[Colour::Black] == 0 || self.chips_in_cup[Colour::White] == 0
    }

    fn points_under_control(&self, _colour: Colour) -> Vec<Coord> {
        // TODO: territory scoring
        Vec::new()
    }

    fn chips_on_board(&self, colour: Colour) -> Vec<Coord> {
        let mut positions = Vec::new();
        for y in 1..=self.size as u16 {
            for x in 1..=self.size as u16 {
                let at = Coord::new(x, y);
                if self.cells[self.index(at)] == Some(colour) {
                    positions.push(at);
                }
            }
        }
        positions
    }

    fn in_bounds(&self, at: Coord) -> bool {
        let size = self.size as u16;
        (1..=size).contains(&at.x) && (1..=size).contains(&at.y)
    }

    fn index(&self, at: Coord) -> usize {
        (at.x as usize - 1) + (at.y as usize - 1) * self.size
    }
}

// =========================================================================
// Tests
// =========================================================================
