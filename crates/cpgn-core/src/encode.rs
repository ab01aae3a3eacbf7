//! Encoder: writes a [`Game`] in the compact format, replaying the position so that
//! disambiguation indices match what the decoder will compute.

use std::io::{self, Write};

use tracing::debug;

use crate::bits::{disambiguation_bits, BitWriter};
use crate::error::EncodeError;
use crate::game_state::GameState;
use crate::token::{Game, Move, MoveExtra, Tag, Token, MAX_EN_PASSANT};
use crate::types::{Role, Square};

pub fn encode_game(game: &Game) -> Result<Vec<u8>, EncodeError> {
    // The header lists en-passant captures ahead of the moves, so a dry run finds them first.
    let mut dry_run = Encoder::new(BitWriter::new(io::sink()));
    dry_run.write_tokens(&game.tokens)?;
    let en_passant = dry_run.en_passant;
    if en_passant.len() > MAX_EN_PASSANT {
        return Err(EncodeError::TooManyEnPassant(en_passant.len()));
    }

    let mut buf = Vec::new();
    let bits = {
        let mut out = BitWriter::new(&mut buf);
        out.write(8, game.version)?;
        write_tags(&mut out, &game.tags)?;
        out.write(4, en_passant.len() as u8)?;
        for &explicit in &en_passant {
            out.write_bit(explicit)?;
        }

        let mut encoder = Encoder::new(out);
        encoder.write_tokens(&game.tokens)?;
        encoder.out.finish()?
    };

    debug!(bits, tokens = game.tokens.len(), "game encoded");
    Ok(buf)
}

fn write_tags<W: Write>(w: &mut BitWriter<W>, tags: &[Tag]) -> Result<(), EncodeError> {
    for tag in tags {
        if tag.name.is_empty() {
            return Err(EncodeError::EmptyTagName);
        }
        write_text(w, &tag.name)?;
        write_text(w, &tag.value)?;
    }
    w.write(8, 0)?;
    Ok(())
}

fn write_text<W: Write>(w: &mut BitWriter<W>, text: &str) -> Result<(), EncodeError> {
    if text.as_bytes().contains(&0) {
        return Err(EncodeError::NulInText);
    }
    w.write_bytes(text.as_bytes())?;
    w.write(8, 0)?;
    Ok(())
}

struct Encoder<W: Write> {
    out: BitWriter<W>,
    state: GameState,
    /// Explicit-notation flag of each en-passant capture, in stream order.
    en_passant: Vec<bool>,
}

impl<W: Write> Encoder<W> {
    fn new(out: BitWriter<W>) -> Self {
        Self {
            out,
            state: GameState::new(),
            en_passant: Vec::new(),
        }
    }

    fn write_tokens(&mut self, tokens: &[Token]) -> Result<(), EncodeError> {
        for token in tokens {
            match token {
                Token::Move(mv) | Token::Castling(mv) | Token::Promotion(mv) => self.write_move(mv)?,
                Token::Comment(text) => {
                    self.out.write(5, 0b111_00)?;
                    write_text(&mut self.out, text)?;
                }
                Token::Nag(code) => {
                    self.out.write(5, 0b111_10)?;
                    self.out.write(8, *code)?;
                }
                Token::Variation(children) => {
                    self.state
                        .enter_variation()
                        .map_err(|_| EncodeError::VariationWithoutPriorMove)?;
                    self.out.write(6, 0b111_01_1)?;
                    self.write_tokens(children)?;
                    self.out.write(6, 0b111_01_0)?;
                    self.state
                        .exit_variation()
                        .map_err(|_| EncodeError::VariationWithoutPriorMove)?;
                }
                Token::GameEnd(outcome) => {
                    self.out.write(5, 0b111_11)?;
                    self.out.write(2, outcome.code())?;
                }
            }
        }
        Ok(())
    }

    /// The token kind is taken from the move itself: castling side, then promotion.
    fn write_move(&mut self, mv: &Move) -> Result<(), EncodeError> {
        let player = self.state.current_player();
        if mv.player != player {
            return Err(EncodeError::OutOfTurn {
                expected: player,
                got: mv.player,
            });
        }

        let played = if let Some(side) = mv.castling_side() {
            if !self.state.board().can_castle(player, side) {
                return Err(EncodeError::IllegalCastling { player, side });
            }
            self.out.write(5, 0b110_0_0 | side.bit())?;
            self.state.castling_move(side)?
        } else if mv.promotion().is_some()
            || (mv.piece == Role::Pawn && mv.to.rank() == player.opposite().back_rank())
        {
            self.write_promotion(mv)?
        } else {
            self.write_plain(mv)?
        };

        self.state.apply_move(&played);
        Ok(())
    }

    fn write_plain(&mut self, mv: &Move) -> Result<Move, EncodeError> {
        let player = self.state.current_player();
        let candidates = self.state.board().count_candidates(player, mv.piece, mv.to);
        let index = index_of(&candidates, mv.from).ok_or(EncodeError::Unreachable {
            piece: mv.piece,
            from: mv.from,
            to: mv.to,
        })?;

        self.out.write(3, mv.piece.code())?;
        self.out.write(3, mv.to.file())?;
        self.out.write(3, mv.to.rank())?;
        self.out.write(disambiguation_bits(candidates.len()), index)?;

        let played = self.state.plain_move(mv.from, mv.to)?;
        if played.is_en_passant() {
            self.en_passant.push(explicit_en_passant(mv));
        }
        Ok(played)
    }

    fn write_promotion(&mut self, mv: &Move) -> Result<Move, EncodeError> {
        let promotion = mv.promotion().ok_or(EncodeError::MissingPromotion)?;
        let code = promotion
            .promotion_code()
            .ok_or(EncodeError::InvalidPromotion(promotion))?;

        let player = self.state.current_player();
        let board = self.state.board();
        let pawns = board.promotable_pawns(player);
        let targets = board.promotion_targets(mv.from, player);
        let invalid = EncodeError::InvalidPromotionMove {
            from: mv.from,
            to: mv.to,
        };
        let pawn_index = index_of(&pawns, mv.from).ok_or_else(|| invalid.clone())?;
        let target_index = index_of(&targets, mv.to).ok_or(invalid)?;

        self.out.write(4, 0b110_1)?;
        self.out.write(2, code)?;
        self.out.write(disambiguation_bits(pawns.len()), pawn_index)?;
        self.out.write(disambiguation_bits(targets.len()), target_index)?;

        Ok(self.state.promotion_move(mv.from, mv.to, promotion)?)
    }
}

fn index_of(options: &[Square], sq: Square) -> Option<u8> {
    options.iter().position(|&s| s == sq).map(|i| i as u8)
}

fn explicit_en_passant(mv: &Move) -> bool {
    matches!(
        mv.extra,
        MoveExtra::Pawn {
            explicit_en_passant: true,
            ..
        }
    )
}
