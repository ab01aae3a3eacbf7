//! Decoded game model: moves, tokens, tags and the game container.

use serde::{Deserialize, Serialize};

use crate::types::{CastlingSide, CheckStatus, Color, Outcome, Role, Square};

/// Per-piece extra information carried by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveExtra {
    #[default]
    None,
    Pawn {
        en_passant: bool,
        /// The capture is written with an explicit "e.p." suffix.
        explicit_en_passant: bool,
        promotion: Option<Role>,
    },
    King {
        castling: Option<CastlingSide>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub player: Color,
    pub piece: Role,
    pub from: Square,
    pub to: Square,
    pub capture: bool,
    pub check: CheckStatus,
    pub extra: MoveExtra,
}

impl Move {
    pub fn castling(player: Color, side: CastlingSide) -> Self {
        Self {
            player,
            piece: Role::King,
            from: CastlingSide::king_from(player),
            to: side.king_to(player),
            capture: false,
            check: CheckStatus::NoCheck,
            extra: MoveExtra::King {
                castling: Some(side),
            },
        }
    }

    pub fn castling_side(&self) -> Option<CastlingSide> {
        match self.extra {
            MoveExtra::King { castling } => castling,
            _ => None,
        }
    }

    pub fn promotion(&self) -> Option<Role> {
        match self.extra {
            MoveExtra::Pawn { promotion, .. } => promotion,
            _ => None,
        }
    }

    pub fn is_en_passant(&self) -> bool {
        matches!(self.extra, MoveExtra::Pawn { en_passant: true, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Token {
    Move(Move),
    Castling(Move),
    Promotion(Move),
    Comment(String),
    Nag(u8),
    Variation(Vec<Token>),
    GameEnd(Outcome),
}

impl Token {
    /// The move carried by a move-bearing token.
    pub fn as_move(&self) -> Option<&Move> {
        match self {
            Token::Move(mv) | Token::Castling(mv) | Token::Promotion(mv) => Some(mv),
            _ => None,
        }
    }
}

/// PGN metadata pair such as `Event` / `Date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Maximum number of en-passant captures the 4-bit header count may declare.
pub const MAX_EN_PASSANT: usize = 8;

/// One flag per en-passant capture in stream order: whether it is written with "e.p.".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnPassantHeader {
    pub explicit: Vec<bool>,
}

impl EnPassantHeader {
    pub fn count(&self) -> usize {
        self.explicit.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Game {
    pub version: u8,
    pub tags: Vec<Tag>,
    pub en_passant: EnPassantHeader,
    pub tokens: Vec<Token>,
}

impl Game {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    /// Moves of the main line, skipping variations and annotations.
    pub fn mainline(&self) -> impl Iterator<Item = &Move> {
        self.tokens.iter().filter_map(Token::as_move)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.tokens.iter().find_map(|t| match t {
            Token::GameEnd(outcome) => Some(*outcome),
            _ => None,
        })
    }
}
