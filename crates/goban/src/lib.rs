//! # goban
//!
//! Thread-safe coordination layer for two-player Go/Baduk sessions.
//!
//! Two actors compose the control plane: a [`Pool`](goban_pool::Pool)
//! that registers gamers and matches them into sessions, and a
//! [`Game`](goban_game::Game) actor per session that serializes every
//! operation (joins, moves, reads, and the blocking waits on
//! game-start and turn-change) through one command queue processed by
//! one worker.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use goban::prelude::*;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = Pool::new();
//! pool.add_gamer(Gamer::new(GamerId(1), "Joe")).await?;
//! pool.add_gamer(Gamer::new(GamerId(2), "Nick")).await?;
//!
//! // Joe opens a game; Nick is matched into it.
//! pool.join_game(GamerId(1), 9, 0.0).await?;
//! pool.join_game(GamerId(2), 9, 0.0).await?;
//!
//! let game = pool.get_gamer(GamerId(1)).await?.game.expect("attached");
//! if game.is_my_turn(GamerId(1)).await? {
//!     game.make_turn(GamerId(1), Coord::new(3, 3)).await?;
//! }
//! # Ok(())
//! # }
//! ```

/// Re-exports everything a caller needs.
pub mod prelude {
    pub use goban_field::{Field, FieldError};
    pub use goban_game::{Board, Game, GameError, Gamer, GamerState};
    pub use goban_pool::{Pool, PoolError};
    pub use goban_types::{Colour, Coord, FieldState, GameId, GamerId, PerColour};
}

pub use goban_field as field;
pub use goban_game as game;
pub use goban_pool as pool;
pub use goban_types as types;
