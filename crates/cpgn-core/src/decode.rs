//! Token decoder: the protocol state machine over the bit stream.
//!
//! Plain moves only carry their destination; the source square is recovered by asking the
//! live position which pieces of that kind can reach it, and reading a disambiguation index
//! when there is more than one.

use tracing::{debug, trace, warn};

use crate::bits::{disambiguation_bits, BitPosition, BitReader};
use crate::error::{DecodeError, PartialDecode, Violation};
use crate::game_state::GameState;
use crate::token::{EnPassantHeader, Game, MoveExtra, Tag, Token, MAX_EN_PASSANT};
use crate::types::{CastlingSide, Outcome, Role, Square};

const CASTLING_OR_PROMOTION: u8 = 0b110;
const ANNOTATION: u8 = 0b111;

const DEFAULT_MAX_VARIATION_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Deepest variation nesting accepted before failing with `VariationTooDeep`.
    pub max_variation_depth: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_variation_depth: DEFAULT_MAX_VARIATION_DEPTH,
        }
    }
}

/// Result of parsing one token: either a token or the end of the enclosing variation.
enum Parsed {
    Token(Token),
    VariationEnd,
}

pub struct Decoder<'a> {
    reader: BitReader<'a>,
    state: GameState,
    options: DecoderOptions,
    en_passant: EnPassantHeader,
    /// En-passant captures decoded so far, across variations, in stream order.
    en_passant_seen: usize,
    /// Variation that was being read when decoding failed, with the children read so far.
    unfinished: Option<Token>,
    finished: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, DecoderOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: DecoderOptions) -> Self {
        Self {
            reader: BitReader::new(buf),
            state: GameState::new(),
            options,
            en_passant: EnPassantHeader::default(),
            en_passant_seen: 0,
            unfinished: None,
            finished: false,
        }
    }

    /// Current read position in the stream.
    pub fn cursor(&self) -> BitPosition {
        self.reader.position()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// After an error inside a variation, the outermost unfinished variation holding
    /// every child decoded before the failure.
    pub fn take_unfinished(&mut self) -> Option<Token> {
        self.unfinished.take()
    }

    pub fn read_version(&mut self) -> Result<u8, DecodeError> {
        self.read(8, "version")
    }

    /// Tag pairs up to the empty name that terminates the section. A section that is a
    /// single 0x00 byte holds no tags.
    pub fn read_tags(&mut self) -> Result<Vec<Tag>, DecodeError> {
        let mut tags = Vec::new();
        loop {
            let name = self.read_text("tag name")?;
            if name.is_empty() {
                break;
            }
            let value = self.read_text("tag value")?;
            trace!(%name, %value, "tag");
            tags.push(Tag { name, value });
        }
        Ok(tags)
    }

    pub fn read_en_passant_header(&mut self) -> Result<EnPassantHeader, DecodeError> {
        let at = self.reader.position();
        let count = self.read(4, "en-passant count")?;
        if usize::from(count) > MAX_EN_PASSANT {
            return Err(protocol(at, Violation::InvalidEnPassantCount(count)));
        }
        let explicit = (0..count)
            .map(|_| self.read_bit("en-passant notation flag"))
            .collect::<Result<Vec<_>, _>>()?;
        self.en_passant = EnPassantHeader { explicit };
        Ok(self.en_passant.clone())
    }

    /// Decode the next main-line token. `Ok(None)` once the game end token has been read
    /// or the stream holds nothing but padding.
    pub fn next_token(&mut self) -> Result<Option<Token>, DecodeError> {
        if self.finished || self.at_padding() {
            self.finished = true;
            return Ok(None);
        }

        let at = self.reader.position();
        let result = match self.parse_token() {
            Ok(Parsed::Token(token)) => Ok(token),
            Ok(Parsed::VariationEnd) => Err(protocol(at, Violation::UnbalancedVariationEnd)),
            Err(err) => Err(err),
        };

        match result {
            Ok(token) => {
                if matches!(token, Token::GameEnd(_)) {
                    self.finished = true;
                }
                Ok(Some(token))
            }
            Err(err) => {
                self.finished = true;
                Err(err)
            }
        }
    }

    /// Fewer than nine bits left, all zero: the encoder's padding, not a token.
    fn at_padding(&self) -> bool {
        let remaining = self.reader.remaining_bits();
        remaining == 0 || (remaining <= 8 && self.reader.peek(remaining as u8) == Ok(0))
    }

    fn parse_token(&mut self) -> Result<Parsed, DecodeError> {
        let at = self.reader.position();
        let discriminant = self.read(3, "token discriminant")?;

        let token = match discriminant {
            CASTLING_OR_PROMOTION => {
                if self.read_bit("castling or promotion")? {
                    self.parse_promotion(at)?
                } else {
                    self.parse_castling(at)?
                }
            }
            ANNOTATION => match self.read(2, "annotation kind")? {
                0b00 => Token::Comment(self.read_text("comment")?),
                0b01 => {
                    if !self.read_bit("variation start or end")? {
                        debug!(depth = self.state.depth(), "variation end");
                        return Ok(Parsed::VariationEnd);
                    }
                    self.parse_variation(at)?
                }
                0b10 => Token::Nag(self.read(8, "NAG")?),
                _ => {
                    let code = self.read(2, "game end")?;
                    let outcome =
                        Outcome::from_code(code).ok_or_else(|| protocol(at, Violation::InvalidGameEnd))?;
                    Token::GameEnd(outcome)
                }
            },
            code => self.parse_move(Role::ALL[usize::from(code)], at)?,
        };

        debug!(?token, %at, "decoded token");
        Ok(Parsed::Token(token))
    }

    fn parse_move(&mut self, role: Role, at: BitPosition) -> Result<Token, DecodeError> {
        let file = self.read(3, "destination file")?;
        let rank = self.read(3, "destination rank")?;
        let to = Square::from_coords(file, rank);
        let player = self.state.current_player();
        if role == Role::Pawn && to.rank() == player.opposite().back_rank() {
            return Err(protocol(at, Violation::PawnMoveToLastRank { to }));
        }

        let candidates = self.state.board().count_candidates(player, role, to);
        trace!(%player, %role, %to, ?candidates, "candidates");
        if candidates.is_empty() {
            trace!(board = %self.state.board(), "no candidate");
        }
        let from = self.select(
            at,
            &candidates,
            "disambiguation index",
            Violation::NoCandidate { piece: role, to },
        )?;

        let mut mv = self.state.plain_move(from, to)?;
        if let MoveExtra::Pawn {
            en_passant: true,
            ref mut explicit_en_passant,
            ..
        } = mv.extra
        {
            *explicit_en_passant = self.next_en_passant_flag();
        }
        self.state.apply_move(&mv);
        Ok(Token::Move(mv))
    }

    fn parse_castling(&mut self, at: BitPosition) -> Result<Token, DecodeError> {
        let side = if self.read_bit("castling side")? {
            CastlingSide::Queenside
        } else {
            CastlingSide::Kingside
        };
        let player = self.state.current_player();
        if !self.state.board().can_castle(player, side) {
            return Err(protocol(at, Violation::IllegalCastling { side }));
        }
        let mv = self.state.castling_move(side)?;
        self.state.apply_move(&mv);
        Ok(Token::Castling(mv))
    }

    fn parse_promotion(&mut self, at: BitPosition) -> Result<Token, DecodeError> {
        let code = self.read(2, "promotion piece")?;
        let promotion = Role::PROMOTIONS[usize::from(code)];
        let player = self.state.current_player();

        let pawns = self.state.board().promotable_pawns(player);
        let from = self.select(at, &pawns, "promotion pawn index", Violation::NoPromotablePawn)?;

        let targets = self.state.board().promotion_targets(from, player);
        let to = self.select(
            at,
            &targets,
            "promotion target index",
            Violation::NoPromotionTarget { from },
        )?;

        let mv = self.state.promotion_move(from, to, promotion)?;
        self.state.apply_move(&mv);
        Ok(Token::Promotion(mv))
    }

    fn parse_variation(&mut self, at: BitPosition) -> Result<Token, DecodeError> {
        let limit = self.options.max_variation_depth;
        if self.state.depth() >= limit {
            return Err(DecodeError::VariationTooDeep { at, limit });
        }
        self.state
            .enter_variation()
            .map_err(|violation| protocol(at, violation))?;
        debug!(depth = self.state.depth(), "variation start");

        let mut tokens = Vec::new();
        loop {
            let token_at = self.reader.position();
            let error = match self.parse_token() {
                Ok(Parsed::VariationEnd) => break,
                Ok(Parsed::Token(Token::GameEnd(_))) => {
                    protocol(token_at, Violation::GameEndInVariation)
                }
                Ok(Parsed::Token(token)) => {
                    tokens.push(token);
                    continue;
                }
                Err(err) => err,
            };
            tokens.extend(self.unfinished.take());
            self.unfinished = Some(Token::Variation(tokens));
            return Err(error);
        }

        self.state
            .exit_variation()
            .map_err(|violation| protocol(at, violation))?;
        Ok(Token::Variation(tokens))
    }

    /// Pick one of `options`, reading an index only when there is a choice to make.
    fn select(
        &mut self,
        at: BitPosition,
        options: &[Square],
        field: &'static str,
        none: Violation,
    ) -> Result<Square, DecodeError> {
        match options {
            [] => Err(protocol(at, none)),
            [only] => Ok(*only),
            _ => {
                let index = self.read(disambiguation_bits(options.len()), field)?;
                trace!(index, count = options.len(), field, "disambiguation");
                options
                    .get(usize::from(index))
                    .copied()
                    .ok_or_else(|| {
                        protocol(
                            at,
                            Violation::IndexOutOfRange {
                                index,
                                count: options.len(),
                            },
                        )
                    })
            }
        }
    }

    fn next_en_passant_flag(&mut self) -> bool {
        let index = self.en_passant_seen;
        self.en_passant_seen += 1;
        match self.en_passant.explicit.get(index) {
            Some(&explicit) => explicit,
            None => {
                warn!(
                    declared = self.en_passant.count(),
                    capture = index + 1,
                    "more en-passant captures than the header declares"
                );
                false
            }
        }
    }

    fn read(&mut self, n: u8, field: &'static str) -> Result<u8, DecodeError> {
        let at = self.reader.position();
        self.reader
            .read(n)
            .map_err(|err| DecodeError::from_bits(field, at, err))
    }

    fn read_bit(&mut self, field: &'static str) -> Result<bool, DecodeError> {
        Ok(self.read(1, field)? == 1)
    }

    fn read_text(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let at = self.reader.position();
        let bytes = self
            .reader
            .read_cstring()
            .map_err(|err| DecodeError::from_bits(field, at, err))?;
        String::from_utf8(bytes).map_err(|_| protocol(at, Violation::InvalidText(field)))
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Token, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

fn protocol(at: BitPosition, violation: Violation) -> DecodeError {
    DecodeError::Protocol { at, violation }
}

/// Decode a complete game with default options.
pub fn decode_game(buf: &[u8]) -> Result<Game, PartialDecode> {
    decode_game_with(buf, DecoderOptions::default())
}

pub fn decode_game_with(buf: &[u8], options: DecoderOptions) -> Result<Game, PartialDecode> {
    let mut decoder = Decoder::with_options(buf, options);
    let mut game = Game::default();
    match fill_game(&mut decoder, &mut game) {
        Ok(()) => {
            debug!(tokens = game.tokens.len(), tags = game.tags.len(), "game decoded");
            Ok(game)
        }
        Err(error) => {
            warn!(%error, tokens = game.tokens.len(), "decoding stopped");
            Err(PartialDecode { game, error })
        }
    }
}

fn fill_game(decoder: &mut Decoder<'_>, game: &mut Game) -> Result<(), DecodeError> {
    game.version = decoder.read_version()?;
    game.tags = decoder.read_tags()?;
    game.en_passant = decoder.read_en_passant_header()?;
    loop {
        match decoder.next_token() {
            Ok(Some(token)) => game.tokens.push(token),
            Ok(None) => return Ok(()),
            Err(err) => {
                game.tokens.extend(decoder.take_unfinished());
                return Err(err);
            }
        }
    }
}
