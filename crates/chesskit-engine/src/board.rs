//! Chess position representation.
//!
//! A [`Board`] packs the full game state into two per-side occupancy
//! bitboards, six per-kind bitboards, and one 32-bit flag word:
//!
//! ```text
//! bits 0..=5    en passant target square
//! bit  6        en passant target present
//! bit  7        side to move (0 = White, 1 = Black)
//! bits 8..=11   castling rights: white king, white queen, black king, black queen
//! bits 16..=31  fullmove number
//! ```
//!
//! The low 16 bits of the flag word are snapshotted into every [`Move`] so
//! that moves can be unmade without any external history.

use crate::{moves::ep_pawn_square, Bitboard, Move};
use chesskit_core::{Color, FenError, FenFields, Piece, Rank, Square};
use std::fmt;

const EP_SQUARE_MASK: u32 = 0x3F;
const EP_PRESENT: u32 = 1 << 6;
const TURN_BLACK: u32 = 1 << 7;
const CASTLE_WHITE_KING: u32 = 1 << 8;
const CASTLE_WHITE_QUEEN: u32 = 1 << 9;
const CASTLE_BLACK_KING: u32 = 1 << 10;
const CASTLE_BLACK_QUEEN: u32 = 1 << 11;
const MOVE_NUMBER_SHIFT: u32 = 16;
const MOVE_NUMBER_MASK: u32 = 0xFFFF_0000;
const LOW_FLAGS_MASK: u32 = 0x0000_FFFF;

/// The two sides of the board a king can castle toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wing {
    King,
    Queen,
}

/// A complete chess position.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    /// Squares occupied by each color.
    pub(crate) players: [Bitboard; 2],
    /// Squares occupied by each piece kind, color-blind.
    pub(crate) pieces: [Bitboard; 6],
    /// Packed flags; see the module docs.
    pub(crate) flags: u32,
}

impl Board {
    /// The standard starting position.
    pub const STARTPOS: &'static str = FenFields::STARTPOS;

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(Self::STARTPOS).expect("STARTPOS is valid")
    }

    /// Parses a FEN string.
    ///
    /// The halfmove clock is accepted and discarded. Fails on grammar
    /// violations and on positions that break the board invariants
    /// (overlapping occupancy, missing kings, occupied or misplaced en
    /// passant target).
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields = FenFields::parse(fen)?;
        let mut board = Board {
            players: [Bitboard::EMPTY; 2],
            pieces: [Bitboard::EMPTY; 6],
            flags: 0,
        };

        // Placement: ranks 8 down to 1. The field validator has already
        // checked that every rank covers exactly eight squares.
        for (rank_idx, rank_str) in fields.placement.split('/').enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(d) = c.to_digit(10) {
                    file += d as u8;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                    board.pieces[piece.index()].set(sq);
                    board.players[color.index()].set(sq);
                    file += 1;
                }
            }
        }

        if fields.side_to_move == 'b' {
            board.flags |= TURN_BLACK;
        }

        for c in fields.castling.chars() {
            match c {
                'K' => board.flags |= CASTLE_WHITE_KING,
                'Q' => board.flags |= CASTLE_WHITE_QUEEN,
                'k' => board.flags |= CASTLE_BLACK_KING,
                'q' => board.flags |= CASTLE_BLACK_QUEEN,
                _ => {}
            }
        }

        if fields.en_passant != "-" {
            if let Some(sq) = Square::from_algebraic(&fields.en_passant) {
                board.flags |= EP_PRESENT | sq.index() as u32;
            }
        }

        board.flags |= (fields.fullmove_number & 0xFFFF) << MOVE_NUMBER_SHIFT;

        board.validate()?;
        Ok(board)
    }

    /// Renders the position as FEN.
    ///
    /// Castling rights come out in canonical `KQkq` order and the halfmove
    /// clock, which the board does not track, is emitted as `0`.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                match (self.piece_on(sq), self.color_on(sq)) {
                    (Some(piece), Some(color)) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    _ => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.flags & (CASTLE_WHITE_KING | CASTLE_WHITE_QUEEN | CASTLE_BLACK_KING | CASTLE_BLACK_QUEEN) == 0
        {
            fen.push('-');
        } else {
            if self.can_castle(Color::White, Wing::King) {
                fen.push('K');
            }
            if self.can_castle(Color::White, Wing::Queen) {
                fen.push('Q');
            }
            if self.can_castle(Color::Black, Wing::King) {
                fen.push('k');
            }
            if self.can_castle(Color::Black, Wing::Queen) {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.en_passant_target() {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push_str(" 0 ");
        fen.push_str(&self.full_turn_number().to_string());
        fen
    }

    /// Returns the piece kind on the given square.
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        for piece in Piece::ALL {
            if self.pieces[piece.index()].contains(sq) {
                return Some(piece);
            }
        }
        None
    }

    /// Returns the color occupying the given square.
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        if self.players[Color::White.index()].contains(sq) {
            Some(Color::White)
        } else if self.players[Color::Black.index()].contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// The side to move.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        if self.flags & TURN_BLACK != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// The en passant target square: the square a pawn skipped over with a
    /// double push last move, onto which it can now be captured.
    #[inline]
    pub fn en_passant_target(&self) -> Option<Square> {
        if self.flags & EP_PRESENT != 0 {
            Square::from_index((self.flags & EP_SQUARE_MASK) as u8)
        } else {
            None
        }
    }

    /// Returns true if `color` still has castling rights on `wing`.
    #[inline]
    pub fn can_castle(&self, color: Color, wing: Wing) -> bool {
        self.flags & castle_bit(color, wing) != 0
    }

    /// The fullmove number. Starts at 1 and increments after Black moves.
    #[inline]
    pub fn full_turn_number(&self) -> u32 {
        (self.flags & MOVE_NUMBER_MASK) >> MOVE_NUMBER_SHIFT
    }

    /// All occupied squares.
    #[inline]
    pub fn occupancy(&self) -> Bitboard {
        self.players[0] | self.players[1]
    }

    /// Occupancy as seen by pawn lookups: all occupied squares plus the en
    /// passant target, so an en passant capture is indistinguishable from a
    /// regular capture.
    #[inline]
    pub(crate) fn occupancy_with_ep(&self) -> Bitboard {
        match self.en_passant_target() {
            Some(sq) => self.occupancy().with(sq),
            None => self.occupancy(),
        }
    }

    /// Squares occupied by the given color.
    #[inline]
    pub fn occupancy_of(&self, color: Color) -> Bitboard {
        self.players[color.index()]
    }

    /// Squares holding the given piece kind of the given color.
    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[piece.index()] & self.players[color.index()]
    }

    /// The low 16 flag bits snapshotted into moves.
    #[inline]
    pub(crate) fn low_flags(&self) -> u16 {
        (self.flags & LOW_FLAGS_MASK) as u16
    }

    /// Applies a move built for this exact position.
    ///
    /// # Panics
    /// Panics if the move's flag snapshot does not match the board (the
    /// move was built for a different position), or if the move does not
    /// fit the position at all. Such calls are programmer errors; moves
    /// coming out of the generator or [`Move::new_from_squares`] on the
    /// same board always fit.
    pub fn make(&mut self, m: Move) {
        self.check_invariants();
        assert_eq!(
            self.low_flags(),
            m.prev_flags(),
            "move was built for a different position"
        );
        let src = m.source();
        let dst = m.destination();
        let mover = self.side_to_move();
        let opponent = mover.opposite();
        let piece = self
            .piece_on(src)
            .expect("no piece on the move's source square");

        if m.is_castle() {
            self.castle_pieces(m, mover);
        } else {
            debug_assert!(
                !self.players[opponent.index()].contains(dst) || m.is_capture(),
                "landing on an opponent piece without a capture flag"
            );
            // A king move forfeits both castling rights.
            if piece == Piece::King {
                self.clear_castling(mover, Wing::King);
                self.clear_castling(mover, Wing::Queen);
            }
            // A rook leaving its home corner forfeits that wing.
            if piece == Piece::Rook {
                if let Some(wing) = rook_home_wing(mover, src) {
                    self.clear_castling(mover, wing);
                }
            }
            if let (Some(cap_piece), Some(cap_sq)) = (m.capture_piece(), m.capture_square()) {
                debug_assert_ne!(cap_sq, src);
                debug_assert_eq!(self.color_on(cap_sq), Some(opponent));
                self.players[opponent.index()].clear(cap_sq);
                self.pieces[cap_piece.index()].clear(cap_sq);
                // Capturing a rook on its home corner kills the right too.
                if cap_piece == Piece::Rook {
                    if let Some(wing) = rook_home_wing(opponent, cap_sq) {
                        self.clear_castling(opponent, wing);
                    }
                }
            }
            let dst_piece = m.promotion_piece().unwrap_or(piece);
            self.pieces[dst_piece.index()].set(dst);
            self.players[mover.index()].set(dst);
            self.pieces[piece.index()].clear(src);
            self.players[mover.index()].clear(src);
        }

        // The en passant window lasts exactly one move.
        self.flags &= !EP_PRESENT;
        if piece == Piece::Pawn && src.index().abs_diff(dst.index()) == 16 {
            debug_assert!(
                (mover == Color::White && src.rank() == Rank::R2)
                    || (mover == Color::Black && src.rank() == Rank::R7),
                "double push from a non-starting rank"
            );
            let ep = if dst.index() > src.index() {
                src.index() + 8
            } else {
                src.index() - 8
            };
            self.flags &= !EP_SQUARE_MASK;
            self.flags |= EP_PRESENT | ep as u32;
        }

        if mover == Color::Black {
            let turn = (self.full_turn_number() + 1) & 0xFFFF;
            self.flags = (self.flags & !MOVE_NUMBER_MASK) | (turn << MOVE_NUMBER_SHIFT);
        }
        self.flags ^= TURN_BLACK;
        self.check_invariants();
    }

    /// Reverts a move previously applied to this board with [`make`].
    /// Restores the position bit for bit.
    ///
    /// [`make`]: Board::make
    pub fn unmake(&mut self, m: Move) {
        self.check_invariants();
        // The snapshot carries side to move, castling rights and the en
        // passant window back in one assignment.
        self.flags = (self.flags & !LOW_FLAGS_MASK) | m.prev_flags() as u32;
        let src = m.source();
        let dst = m.destination();
        // After the restore the side to move is the side that moved.
        let mover = self.side_to_move();
        let opponent = mover.opposite();

        if mover == Color::Black {
            let turn = self.full_turn_number().wrapping_sub(1) & 0xFFFF;
            self.flags = (self.flags & !MOVE_NUMBER_MASK) | (turn << MOVE_NUMBER_SHIFT);
        }

        let dst_piece = self
            .piece_on(dst)
            .expect("unmake: no piece on the move's destination square");
        let src_piece = if m.is_promotion() {
            Piece::Pawn
        } else {
            dst_piece
        };
        self.pieces[dst_piece.index()].clear(dst);
        self.players[mover.index()].clear(dst);
        self.pieces[src_piece.index()].set(src);
        self.players[mover.index()].set(src);

        if let (Some(cap_piece), Some(cap_sq)) = (m.capture_piece(), m.capture_square()) {
            self.pieces[cap_piece.index()].set(cap_sq);
            self.players[opponent.index()].set(cap_sq);
        }

        if m.is_castle() {
            let wing = if dst.x() == 2 { Wing::Queen } else { Wing::King };
            let (rook_src, rook_dst) = rook_castle_squares(mover, wing);
            self.players[mover.index()].set(rook_src);
            self.pieces[Piece::Rook.index()].set(rook_src);
            self.players[mover.index()].clear(rook_dst);
            self.pieces[Piece::Rook.index()].clear(rook_dst);
        }
        self.check_invariants();
    }

    /// Moves king and rook for a castle and forfeits both rights.
    fn castle_pieces(&mut self, m: Move, mover: Color) {
        let src = m.source();
        let dst = m.destination();
        debug_assert!(dst.x() == 2 || dst.x() == 6);
        debug_assert_eq!(self.piece_on(src), Some(Piece::King));
        debug_assert!(!m.is_capture() && !m.is_promotion());
        debug_assert_eq!(dst.y(), mover.back_rank());
        let wing = if dst.x() == 2 { Wing::Queen } else { Wing::King };

        self.players[mover.index()].clear(src);
        self.pieces[Piece::King.index()].clear(src);
        self.players[mover.index()].set(dst);
        self.pieces[Piece::King.index()].set(dst);

        let (rook_src, rook_dst) = rook_castle_squares(mover, wing);
        self.players[mover.index()].clear(rook_src);
        self.pieces[Piece::Rook.index()].clear(rook_src);
        self.players[mover.index()].set(rook_dst);
        self.pieces[Piece::Rook.index()].set(rook_dst);

        self.clear_castling(mover, Wing::King);
        self.clear_castling(mover, Wing::Queen);
    }

    fn clear_castling(&mut self, color: Color, wing: Wing) {
        self.flags &= !castle_bit(color, wing);
    }

    /// Checks the structural invariants, reporting the first violation.
    fn validate(&self) -> Result<(), FenError> {
        let inconsistent = |msg: &str| FenError::InconsistentPosition(msg.to_string());

        if (self.players[0] & self.players[1]).is_not_empty() {
            return Err(inconsistent("both sides occupy the same square"));
        }
        for i in 0..6 {
            for j in (i + 1)..6 {
                if (self.pieces[i] & self.pieces[j]).is_not_empty() {
                    return Err(inconsistent("two piece kinds occupy the same square"));
                }
            }
        }
        for color in Color::BOTH {
            if self.pieces_of(Piece::King, color).count() != 1 {
                return Err(FenError::InconsistentPosition(format!(
                    "expected exactly one {} king",
                    color
                )));
            }
        }
        if let Some(ep) = self.en_passant_target() {
            if self.occupancy().contains(ep) {
                return Err(inconsistent("en passant target square is occupied"));
            }
            // The pawn that just double-pushed belongs to the side that is
            // *not* to move, so the target sits on rank 6 when White is to
            // move and rank 3 when Black is.
            let expected = match self.side_to_move() {
                Color::White => Rank::R6,
                Color::Black => Rank::R3,
            };
            if ep.rank() != expected {
                return Err(inconsistent(
                    "en passant target on the wrong rank for the side to move",
                ));
            }
            if self.piece_on(ep_pawn_square(ep)) != Some(Piece::Pawn) {
                return Err(inconsistent("en passant target with no pawn to capture"));
            }
        }
        Ok(())
    }

    /// Debug-build invariant check run at every make/unmake boundary.
    #[inline]
    fn check_invariants(&self) {
        #[cfg(debug_assertions)]
        if let Err(e) = self.validate() {
            panic!("board invariants violated: {}", e);
        }
    }
}

const fn castle_bit(color: Color, wing: Wing) -> u32 {
    match (color, wing) {
        (Color::White, Wing::King) => CASTLE_WHITE_KING,
        (Color::White, Wing::Queen) => CASTLE_WHITE_QUEEN,
        (Color::Black, Wing::King) => CASTLE_BLACK_KING,
        (Color::Black, Wing::Queen) => CASTLE_BLACK_QUEEN,
    }
}

/// Rook source and destination squares for a castle.
pub(crate) const fn rook_castle_squares(color: Color, wing: Wing) -> (Square, Square) {
    match (color, wing) {
        (Color::White, Wing::King) => (Square::H1, Square::F1),
        (Color::White, Wing::Queen) => (Square::A1, Square::D1),
        (Color::Black, Wing::King) => (Square::H8, Square::F8),
        (Color::Black, Wing::Queen) => (Square::A8, Square::D8),
    }
}

/// Returns the wing whose castling right depends on a rook standing on
/// `sq`, if `sq` is one of `color`'s home corners.
fn rook_home_wing(color: Color, sq: Square) -> Option<Wing> {
    match (color, sq) {
        (Color::White, Square::A1) => Some(Wing::Queen),
        (Color::White, Square::H1) => Some(Wing::King),
        (Color::Black, Square::A8) => Some(Wing::Queen),
        (Color::Black, Square::H8) => Some(Wing::King),
        _ => None,
    }
}

impl fmt::Display for Board {
    /// Displays the position as its FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for Board {
    /// Renders an ASCII board diagram with a flags summary.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} |", rank + 1)?;
            for file in 0..8u8 {
                let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                let c = match (self.piece_on(sq), self.color_on(sq)) {
                    (Some(piece), Some(color)) => piece.to_fen_char(color),
                    _ => '.',
                };
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(
            f,
            "{} to move, castling {}{}{}{}, ep {}, move {}",
            self.side_to_move(),
            if self.can_castle(Color::White, Wing::King) { "K" } else { "" },
            if self.can_castle(Color::White, Wing::Queen) { "Q" } else { "" },
            if self.can_castle(Color::Black, Wing::King) { "k" } else { "" },
            if self.can_castle(Color::Black, Wing::Queen) { "q" } else { "" },
            self.en_passant_target()
                .map_or("-".to_string(), |s| s.to_algebraic()),
            self.full_turn_number()
        )
    }
}
