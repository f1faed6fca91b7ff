//! The goban board engine.
//!
//! [`Field`] owns the chip layout and the per-colour cups. It is a
//! plain stateful struct with no interior synchronization: the session
//! actor is its sole caller and therefore its serializer.

mod error;
mod field;

pub use error::FieldError;
pub use field::{Field, BLACK_CHIPS, MAX_SIZE, MIN_SIZE, WHITE_CHIPS};
