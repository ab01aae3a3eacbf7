//! PGN text rendering of decoded games.

use std::fmt::Write;

use cpgn_core::{check, Board, CastlingSide, CheckStatus, Color, Game, GameState, Move, MoveExtra, Square, Token};

use crate::config::OutputFormat;
use crate::error::CliError;

/// Render `game` in the requested output format.
pub fn render(game: &Game, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Pgn => render_pgn(game),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(game)? + "\n"),
    }
}

pub fn render_pgn(game: &Game) -> Result<String, CliError> {
    let mut out = String::new();
    for tag in &game.tags {
        let value = tag.value.replace('\\', "\\\\").replace('"', "\\\"");
        let _ = writeln!(out, "[{} \"{}\"]", tag.name, value);
    }
    if !game.tags.is_empty() {
        out.push('\n');
    }

    let mut movetext = Movetext {
        state: GameState::new(),
        need_number: true,
    };
    let mut parts = movetext.tokens(&game.tokens)?;
    if game.outcome().is_none() {
        parts.push("*".to_string());
    }
    out.push_str(&parts.join(" "));
    out.push('\n');
    Ok(out)
}

struct Movetext {
    state: GameState,
    /// Black's next move needs an explicit `N...` number.
    need_number: bool,
}

impl Movetext {
    fn tokens(&mut self, tokens: &[Token]) -> Result<Vec<String>, CliError> {
        let mut parts = Vec::new();
        for token in tokens {
            match token {
                Token::Move(mv) | Token::Castling(mv) | Token::Promotion(mv) => {
                    let number = self.state.move_number();
                    if mv.player == Color::White {
                        parts.push(format!("{number}."));
                    } else if self.need_number {
                        parts.push(format!("{number}..."));
                    }
                    parts.push(san(self.state.board(), mv));
                    self.state.apply_move(mv);
                    self.need_number = false;
                }
                Token::Comment(text) => {
                    parts.push(format!("{{{text}}}"));
                    self.need_number = true;
                }
                Token::Nag(code) => parts.push(format!("${code}")),
                Token::Variation(children) => {
                    self.state.enter_variation()?;
                    self.need_number = true;
                    let inner = self.tokens(children)?;
                    self.state.exit_variation()?;
                    parts.push(format!("({})", inner.join(" ")));
                    self.need_number = true;
                }
                Token::GameEnd(outcome) => parts.push(outcome.as_pgn().to_string()),
            }
        }
        Ok(parts)
    }
}

/// Standard algebraic notation for `mv`, played on `board`.
pub fn san(board: &Board, mv: &Move) -> String {
    let mut s = String::new();
    match mv.castling_side() {
        Some(CastlingSide::Kingside) => s.push_str("O-O"),
        Some(CastlingSide::Queenside) => s.push_str("O-O-O"),
        None => {
            match mv.piece.letter() {
                Some(letter) => {
                    s.push(letter);
                    s.push_str(&disambiguation(board, mv));
                }
                None if mv.capture => s.push(mv.from.file_char()),
                None => {}
            }
            if mv.capture {
                s.push('x');
            }
            s.push_str(&mv.to.to_string());
            if let Some(letter) = mv.promotion().and_then(|role| role.letter()) {
                s.push('=');
                s.push(letter);
            }
        }
    }

    match mv.check {
        CheckStatus::NoCheck => {}
        CheckStatus::Check => s.push('+'),
        CheckStatus::Checkmate => s.push('#'),
    }
    if let MoveExtra::Pawn {
        en_passant: true,
        explicit_en_passant: true,
        ..
    } = mv.extra
    {
        s.push_str(" e.p.");
    }
    s
}

/// File, rank or full square of the source, whichever is the shortest that
/// tells the move apart from other same-kind pieces that can legally reach the
/// destination. Pinned pieces do not count.
fn disambiguation(board: &Board, mv: &Move) -> String {
    let others: Vec<Square> = board
        .count_candidates(mv.player, mv.piece, mv.to)
        .into_iter()
        .filter(|&sq| sq != mv.from)
        .filter(|&sq| {
            let mut scratch = *board;
            scratch.relocate(sq, mv.to, None);
            !check::in_check(&scratch, mv.player).unwrap_or(false)
        })
        .collect();

    if others.is_empty() {
        String::new()
    } else if others.iter().all(|sq| sq.file() != mv.from.file()) {
        mv.from.file_char().to_string()
    } else if others.iter().all(|sq| sq.rank() != mv.from.rank()) {
        mv.from.rank_char().to_string()
    } else {
        mv.from.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpgn_core::{EnPassantHeader, Outcome, Piece, Role, Tag};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(state: &mut GameState, from: &str, to: &str) -> Token {
        let mv = state.plain_move(sq(from), sq(to)).unwrap();
        state.apply_move(&mv);
        Token::Move(mv)
    }

    #[test]
    fn test_render_with_variation_and_comment() {
        let mut state = GameState::new();
        let mut tokens = vec![play(&mut state, "e2", "e4"), play(&mut state, "e7", "e5")];

        let mut branch = state.clone();
        branch.enter_variation().unwrap();
        let alt = play(&mut branch, "c7", "c5");
        tokens.push(Token::Variation(vec![alt]));
        tokens.push(Token::Comment("main line".into()));
        tokens.push(play(&mut state, "g1", "f3"));
        tokens.push(Token::Nag(1));
        tokens.push(play(&mut state, "b8", "c6"));
        tokens.push(Token::GameEnd(Outcome::Draw));

        let game = Game {
            version: 1,
            tags: vec![Tag::new("Event", "Say \"hi\"")],
            en_passant: EnPassantHeader::default(),
            tokens,
        };
        let pgn = render_pgn(&game).unwrap();
        assert_eq!(
            pgn,
            "[Event \"Say \\\"hi\\\"\"]\n\n1. e4 e5 (1... c5) {main line} 2. Nf3 $1 Nc6 1/2-1/2\n"
        );
    }

    #[test]
    fn test_san_disambiguation() {
        let mut board = Board::empty();
        board.set(sq("a1"), Some(Piece::new(Role::Rook, Color::White)));
        board.set(sq("h1"), Some(Piece::new(Role::Rook, Color::White)));
        board.set(sq("a5"), Some(Piece::new(Role::Rook, Color::White)));
        board.set(sq("e8"), Some(Piece::new(Role::King, Color::Black)));
        board.set(sq("e2"), Some(Piece::new(Role::King, Color::White)));
        let state = GameState::from_board(board, Color::White);

        let mv = state.plain_move(sq("h1"), sq("d1")).unwrap();
        assert_eq!(san(&board, &mv), "Rhd1");
        let mv = state.plain_move(sq("a1"), sq("a3")).unwrap();
        assert_eq!(san(&board, &mv), "R1a3");
        let mv = state.plain_move(sq("a5"), sq("a8")).unwrap();
        assert_eq!(san(&board, &mv), "Ra8+");
    }

    #[test]
    fn test_san_ignores_pinned_twin() {
        let mut board = Board::empty();
        board.set(sq("e1"), Some(Piece::new(Role::King, Color::White)));
        board.set(sq("c3"), Some(Piece::new(Role::Knight, Color::White)));
        board.set(sq("g1"), Some(Piece::new(Role::Knight, Color::White)));
        board.set(sq("b4"), Some(Piece::new(Role::Bishop, Color::Black)));
        board.set(sq("e8"), Some(Piece::new(Role::King, Color::Black)));
        let state = GameState::from_board(board, Color::White);

        let mv = state.plain_move(sq("g1"), sq("e2")).unwrap();
        assert_eq!(san(&board, &mv), "Ne2");

        board.set(sq("b4"), None);
        assert_eq!(san(&board, &mv), "Nge2");
    }

    #[test]
    fn test_san_special_moves() {
        let castle = Move::castling(Color::Black, CastlingSide::Queenside);
        assert_eq!(san(&Board::starting_position(), &castle), "O-O-O");

        let mut state = GameState::new();
        for (from, to) in [("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")] {
            play(&mut state, from, to);
        }
        let mut mv = state.plain_move(sq("e5"), sq("d6")).unwrap();
        assert_eq!(san(state.board(), &mv), "exd6");
        mv.extra = MoveExtra::Pawn {
            en_passant: true,
            explicit_en_passant: true,
            promotion: None,
        };
        assert_eq!(san(state.board(), &mv), "exd6 e.p.");
    }

    #[test]
    fn test_json_output() {
        let game = Game::default();
        let json = render(&game, OutputFormat::Json).unwrap();
        let back: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(back, game);
        assert_eq!(render(&game, OutputFormat::Pgn).unwrap(), "*\n");
    }
}
