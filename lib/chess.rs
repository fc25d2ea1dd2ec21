mod board;
mod color;
mod game;
mod r#move;
mod outcome;
mod piece;
mod position;
mod role;

/// Rules that decide which moves are legal.
pub mod legality;
/// Pseudo-legal move generation.
pub mod movegen;

pub use board::*;
pub use color::*;
pub use game::*;
pub use movegen::{pseudo_legal_moves, EmptySquare, Moves};
pub use outcome::*;
pub use piece::*;
pub use position::*;
pub use r#move::*;
pub use role::*;
