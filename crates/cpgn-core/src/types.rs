//! Board primitives shared by the position model, the codec and the token model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side owning a piece, or side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank delta of a one-step pawn advance.
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank the pawns of this side start on.
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank a pawn must stand on to promote with its next move.
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Rank holding the king and rooks at the start of the game.
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

/// Piece type. The discriminants are the 3-bit codes used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    King = 0,
    Queen = 1,
    Bishop = 2,
    Knight = 3,
    Rook = 4,
    Pawn = 5,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::King,
        Role::Queen,
        Role::Bishop,
        Role::Knight,
        Role::Rook,
        Role::Pawn,
    ];

    /// Promotion choices indexed by their 2-bit wire code.
    pub const PROMOTIONS: [Role; 4] = [Role::Queen, Role::Bishop, Role::Knight, Role::Rook];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Role> {
        Role::ALL.get(usize::from(code)).copied()
    }

    pub fn promotion_code(self) -> Option<u8> {
        Role::PROMOTIONS
            .iter()
            .position(|&r| r == self)
            .map(|i| i as u8)
    }

    /// SAN letter, `None` for pawns.
    pub const fn letter(self) -> Option<char> {
        match self {
            Role::King => Some('K'),
            Role::Queen => Some('Q'),
            Role::Bishop => Some('B'),
            Role::Knight => Some('N'),
            Role::Rook => Some('R'),
            Role::Pawn => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::King => "king",
            Role::Queen => "queen",
            Role::Bishop => "bishop",
            Role::Knight => "knight",
            Role::Rook => "rook",
            Role::Pawn => "pawn",
        })
    }
}

/// A piece standing on a square. Empty squares are `None` at the board level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub role: Role,
    pub color: Color,
}

impl Piece {
    pub const fn new(role: Role, color: Color) -> Self {
        Self { role, color }
    }

    /// FEN-style character: uppercase for white, lowercase for black.
    pub fn char(self) -> char {
        let c = self.role.letter().unwrap_or('P');
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }
}

/// A square on the 8x8 board. Construction guarantees file and rank are in `0..8`;
/// a square that is not yet known is represented as `Option<Square>`.
///
/// Ordering follows the linear index: rank first, then file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        (file < 8 && rank < 8).then_some(Square { file, rank })
    }

    /// Offset a square, returning `None` when the result falls off the board.
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        let file = self.file as i8 + file_delta;
        let rank = self.rank as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// Square from two 3-bit wire fields; higher bits are ignored.
    pub const fn from_coords(file: u8, rank: u8) -> Square {
        Square {
            file: file & 7,
            rank: rank & 7,
        }
    }

    pub fn from_index(index: u8) -> Option<Square> {
        (index < 64).then(|| Square {
            file: index % 8,
            rank: index / 8,
        })
    }

    pub const fn file(self) -> u8 {
        self.file
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// Linear index `rank * 8 + file`, the ordering used for disambiguation.
    pub const fn index(self) -> u8 {
        self.rank * 8 + self.file
    }

    /// All 64 squares in ascending linear index.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).filter_map(Square::from_index)
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl std::str::FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [f @ b'a'..=b'h', r @ b'1'..=b'8'] => Ok(Square {
                file: f - b'a',
                rank: r - b'1',
            }),
            _ => Err(format!("Invalid square '{s}'")),
        }
    }
}

impl TryFrom<String> for Square {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> String {
        sq.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

impl CastlingSide {
    /// Wire bit: 0 kingside, 1 queenside.
    pub const fn bit(self) -> u8 {
        match self {
            CastlingSide::Kingside => 0,
            CastlingSide::Queenside => 1,
        }
    }

    pub const fn king_from(color: Color) -> Square {
        Square {
            file: 4,
            rank: color.back_rank(),
        }
    }

    pub const fn king_to(self, color: Color) -> Square {
        let file = match self {
            CastlingSide::Kingside => 6,
            CastlingSide::Queenside => 2,
        };
        Square {
            file,
            rank: color.back_rank(),
        }
    }

    pub const fn rook_from(self, color: Color) -> Square {
        let file = match self {
            CastlingSide::Kingside => 7,
            CastlingSide::Queenside => 0,
        };
        Square {
            file,
            rank: color.back_rank(),
        }
    }

    pub const fn rook_to(self, color: Color) -> Square {
        let file = match self {
            CastlingSide::Kingside => 5,
            CastlingSide::Queenside => 3,
        };
        Square {
            file,
            rank: color.back_rank(),
        }
    }
}

/// Check annotation of a move, from the point of view of the player who must reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    #[default]
    NoCheck,
    Check,
    Checkmate,
}

/// Result carried by the game-end token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner(Color),
    Draw,
}

impl Outcome {
    pub fn from_code(code: u8) -> Option<Outcome> {
        match code {
            0b00 => Some(Outcome::Winner(Color::White)),
            0b01 => Some(Outcome::Winner(Color::Black)),
            0b10 => Some(Outcome::Draw),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Outcome::Winner(Color::White) => 0b00,
            Outcome::Winner(Color::Black) => 0b01,
            Outcome::Draw => 0b10,
        }
    }

    /// PGN result string.
    pub const fn as_pgn(self) -> &'static str {
        match self {
            Outcome::Winner(Color::White) => "1-0",
            Outcome::Winner(Color::Black) => "0-1",
            Outcome::Draw => "1/2-1/2",
        }
    }
}
