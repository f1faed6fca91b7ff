//! Gamer pool: the registry and matchmaker for goban sessions.
//!
//! The pool is an actor like the sessions it brokers: one worker owns
//! the gamer map and processes commands from one queue, so no handler
//! ever races another. Matchmaking attaches a joining gamer to another
//! gamer's live session when one accepts, and opens a fresh session
//! otherwise.

mod error;
mod pool;

pub use error::PoolError;
pub use pool::Pool;
