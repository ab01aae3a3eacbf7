//! Decoder and encoder for compressed chess games.
//!
//! The format stores only what cannot be derived from the rules: a plain move is a piece
//! code and a destination, plus an index into the sorted list of same-kind pieces that can
//! reach it when there is more than one. Decoding therefore replays the game on a live
//! [`Board`] and uses the check engine to annotate every move.

pub mod bits;
pub mod board;
pub mod check;
pub mod decode;
pub mod encode;
pub mod error;
pub mod game_state;
pub mod token;
pub mod types;

pub use bits::{disambiguation_bits, pack_bits, BitError, BitPosition, BitReader, BitWriter};
pub use board::Board;
pub use decode::{decode_game, decode_game_with, Decoder, DecoderOptions};
pub use encode::encode_game;
pub use error::{DecodeError, EncodeError, MissingKing, PartialDecode, Violation};
pub use game_state::GameState;
pub use token::{EnPassantHeader, Game, Move, MoveExtra, Tag, Token};
pub use types::{CastlingSide, CheckStatus, Color, Outcome, Piece, Role, Square};
