//! Decoder and encoder error types

use thiserror::Error;

use crate::bits::{BitError, BitPosition};
use crate::token::Game;
use crate::types::{CastlingSide, Color, Role, Square};

/// A decoded value that cannot occur in a well-formed stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("No {piece} can reach {to}")]
    NoCandidate { piece: Role, to: Square },

    #[error("Index {index} is out of range for {count} choices")]
    IndexOutOfRange { index: u8, count: usize },

    #[error("Promotion without a pawn ready to promote")]
    NoPromotablePawn,

    #[error("Pawn on {from} has no promotion square")]
    NoPromotionTarget { from: Square },

    #[error("Pawn move to {to} must be a promotion")]
    PawnMoveToLastRank { to: Square },

    #[error("Castling {side:?} is not possible")]
    IllegalCastling { side: CastlingSide },

    #[error("Game end code 0b11 is reserved")]
    InvalidGameEnd,

    #[error("En-passant header declares {0} captures, at most 8 are allowed")]
    InvalidEnPassantCount(u8),

    #[error("Variation end outside of any variation")]
    UnbalancedVariationEnd,

    #[error("Variation opened before any move was played")]
    VariationWithoutPriorMove,

    #[error("Game end inside a variation")]
    GameEndInVariation,

    #[error("{0} is not valid UTF-8")]
    InvalidText(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No {color} king on the board")]
pub struct MissingKing {
    pub color: Color,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Truncated input reading {field} at {at}: needed {needed} bits, {remaining} left")]
    Truncated {
        field: &'static str,
        at: BitPosition,
        needed: usize,
        remaining: usize,
    },

    #[error("Cannot read {field} at {at}: {source}")]
    Stream {
        field: &'static str,
        at: BitPosition,
        source: BitError,
    },

    #[error("Malformed stream at {at}: {violation}")]
    Protocol { at: BitPosition, violation: Violation },

    #[error("Variation nesting exceeds {limit} at {at}")]
    VariationTooDeep { at: BitPosition, limit: usize },

    #[error("No {color} king on the board")]
    MissingKing { color: Color },
}

impl DecodeError {
    /// Attach the field being read to a bit stream failure.
    pub fn from_bits(field: &'static str, at: BitPosition, err: BitError) -> Self {
        match err {
            BitError::Exhausted { needed, remaining } => DecodeError::Truncated {
                field,
                at,
                needed,
                remaining,
            },
            source => DecodeError::Stream { field, at, source },
        }
    }

    /// Cursor location of the failure, when it happened while reading.
    pub fn position(&self) -> Option<BitPosition> {
        match self {
            DecodeError::Truncated { at, .. }
            | DecodeError::Stream { at, .. }
            | DecodeError::Protocol { at, .. }
            | DecodeError::VariationTooDeep { at, .. } => Some(*at),
            DecodeError::MissingKing { .. } => None,
        }
    }
}

impl From<MissingKing> for DecodeError {
    fn from(err: MissingKing) -> Self {
        DecodeError::MissingKing { color: err.color }
    }
}

/// Decoding stopped early. `game` holds everything decoded before the failure.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error} (after {} tokens)", .game.tokens.len())]
pub struct PartialDecode {
    pub game: Game,
    #[source]
    pub error: DecodeError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("It is {expected}'s turn, got a move by {got}")]
    OutOfTurn { expected: Color, got: Color },

    #[error("No {piece} on {from} can reach {to}")]
    Unreachable { piece: Role, from: Square, to: Square },

    #[error("{player} cannot castle {side:?}")]
    IllegalCastling { player: Color, side: CastlingSide },

    #[error("Promotion move has no promoted piece")]
    MissingPromotion,

    #[error("Cannot promote to {0}")]
    InvalidPromotion(Role),

    #[error("Pawn on {from} cannot promote on {to}")]
    InvalidPromotionMove { from: Square, to: Square },

    #[error("Text contains a NUL byte")]
    NulInText,

    #[error("Tag names cannot be empty")]
    EmptyTagName,

    #[error("{0} en-passant captures, at most 8 can be encoded")]
    TooManyEnPassant(usize),

    #[error("Variation before any move was played")]
    VariationWithoutPriorMove,

    #[error("No {color} king on the board")]
    MissingKing { color: Color },

    #[error("Bit stream error: {0}")]
    Bits(#[from] BitError),
}

impl From<MissingKing> for EncodeError {
    fn from(err: MissingKing) -> Self {
        EncodeError::MissingKing { color: err.color }
    }
}
