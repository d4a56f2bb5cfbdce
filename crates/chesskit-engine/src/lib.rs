//! Bitboard chess move generation engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board sets with constant-time operations
//! - [`Board`] - full position state in two occupancy arrays and one
//!   packed flag word, round-tripping to FEN
//! - [`Move`] - an opaque 64-bit move that carries its own undo
//!   information, so positions are mutated in place and restored bit for
//!   bit
//! - [`MoveGen`] - a streaming, allocation-free legal move generator with
//!   terminal classification (checkmate/stalemate)
//! - magic-bitboard attack tables for the sliding pieces, built once per
//!   process
//!
//! # Example
//!
//! ```
//! use chesskit_engine::{Board, MoveGen};
//!
//! let mut board = Board::startpos();
//! let mut gen = MoveGen::new(&mut board);
//! let mut count = 0;
//! while let Some(m) = gen.next() {
//!     println!("{}", m);
//!     count += 1;
//! }
//! assert_eq!(count, 20);
//! assert!(!gen.is_checkmate() && !gen.is_stalemate());
//! ```
//!
//! # Concurrency
//!
//! The lookup tables are process-wide, initialized once behind a latch
//! (front-loadable via [`pregenerate_tables`]) and immutable afterwards. A
//! [`Board`] is never shared internally: move generation mutates it in
//! place and restores it, and a [`MoveGen`] borrows its board exclusively.
//! Concurrent searches should give each worker its own `Board` clone.

mod bitboard;
mod board;
pub mod movegen;
mod moves;

pub use bitboard::{Bitboard, BitboardIter, Direction};
pub use board::{Board, Wing};
pub use movegen::{
    bishop_attacks, king_moves, knight_moves, pawn_moves, pregenerate_tables, queen_attacks,
    rook_attacks, MoveGen,
};
pub use moves::{move_text_is_wellformed, Move};
