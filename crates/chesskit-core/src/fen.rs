//! FEN (Forsyth-Edwards Notation) field parsing and validation.
//!
//! [`FenFields`] splits a FEN string into its six fields and validates each
//! against the grammar. Turning the fields into an actual position (and
//! checking position-level consistency) is the engine's job; position-level
//! failures reuse [`FenError`] so callers see a single error type for the
//! whole parse.

use thiserror::Error;

/// Errors that can occur when parsing a FEN string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid side to move: expected 'w' or 'b', got '{0}'")]
    InvalidSideToMove(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    /// The fields were well-formed but describe an impossible position
    /// (missing or duplicated kings, occupied en passant target, ...).
    #[error("inconsistent position: {0}")]
    InconsistentPosition(String),
}

/// The six validated fields of a FEN string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Piece placement, ranks 8 down to 1 separated by '/'.
    pub placement: String,
    /// Side to move, 'w' or 'b'.
    pub side_to_move: char,
    /// Castling availability, a subset of "KQkq" or "-".
    pub castling: String,
    /// En passant target square or "-".
    pub en_passant: String,
    /// Halfmove clock. Parsed for grammar only; the engine discards it.
    pub halfmove_clock: u32,
    /// Fullmove number.
    pub fullmove_number: u32,
}

impl FenFields {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses and validates a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();

        if fields.len() != 6 {
            return Err(FenError::InvalidFieldCount(fields.len()));
        }

        Self::validate_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => 'w',
            "b" => 'b',
            other => return Err(FenError::InvalidSideToMove(other.to_string())),
        };

        Self::validate_castling(fields[2])?;
        Self::validate_en_passant(fields[3])?;

        let halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(fields[4].to_string()))?;

        let fullmove_number = fields[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidFullmoveNumber(fields[5].to_string()))?;

        Ok(FenFields {
            placement: fields[0].to_string(),
            side_to_move,
            castling: fields[2].to_string(),
            en_passant: fields[3].to_string(),
            halfmove_clock,
            fullmove_number,
        })
    }

    fn validate_placement(placement: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (i, rank) in ranks.iter().enumerate() {
            let mut squares = 0;
            for c in rank.chars() {
                if c.is_ascii_digit() {
                    squares += c.to_digit(10).unwrap();
                } else if "kpnrbqKPNRBQ".contains(c) {
                    squares += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )));
                }
            }
            if squares != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    8 - i,
                    squares
                )));
            }
        }

        Ok(())
    }

    fn validate_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }
        if castling.is_empty() {
            return Err(FenError::InvalidCastlingRights("empty field".to_string()));
        }
        for c in castling.chars() {
            if !"KQkq".contains(c) {
                return Err(FenError::InvalidCastlingRights(format!(
                    "invalid character '{}'",
                    c
                )));
            }
        }
        Ok(())
    }

    fn validate_en_passant(ep: &str) -> Result<(), FenError> {
        if ep == "-" {
            return Ok(());
        }

        let chars: Vec<char> = ep.chars().collect();
        if chars.len() != 2 {
            return Err(FenError::InvalidEnPassantSquare(ep.to_string()));
        }
        // An en passant target is always on rank 3 or 6.
        if !('a'..='h').contains(&chars[0]) || !(chars[1] == '3' || chars[1] == '6') {
            return Err(FenError::InvalidEnPassantSquare(ep.to_string()));
        }

        Ok(())
    }
}
