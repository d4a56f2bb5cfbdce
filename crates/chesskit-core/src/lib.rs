//! Core types for chess.
//!
//! This crate provides the fundamental vocabulary shared by the engine and
//! its consumers:
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Color`] and [`Piece`] for piece identity
//! - [`FenFields`] for validating and splitting FEN strings
//!
//! It deliberately knows nothing about bitboards or move generation; those
//! live in `chesskit-engine`.

mod color;
mod fen;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenFields};
pub use piece::Piece;
pub use square::{File, Rank, Square};
