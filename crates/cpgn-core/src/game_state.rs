//! Live game position plus the snapshot stack used to branch into variations.

use crate::board::Board;
use crate::check;
use crate::error::{MissingKing, Violation};
use crate::token::{Move, MoveExtra};
use crate::types::{CastlingSide, CheckStatus, Color, Role, Square};

#[derive(Debug, Clone)]
struct Snapshot {
    board: Board,
    before_last_move: Option<Board>,
    player: Color,
    move_number: u32,
}

/// Side to move, move counter and position, threaded through one decode or encode run.
#[derive(Debug, Clone)]
pub struct GameState {
    current_player: Color,
    move_number: u32,
    board: Board,
    /// Position the last move was played from; the branch point of a variation.
    before_last_move: Option<Board>,
    saved: Vec<Snapshot>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::from_board(Board::starting_position(), Color::White)
    }

    pub fn from_board(board: Board, current_player: Color) -> Self {
        Self {
            current_player,
            move_number: 1,
            board,
            before_last_move: None,
            saved: Vec::new(),
        }
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    /// Full-move number of the next move, starting at 1 and incremented after Black moves.
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of variations currently open.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Play a move for the side to move. The move is trusted; callers build it with
    /// [`GameState::plain_move`], [`GameState::castling_move`] or [`GameState::promotion_move`].
    pub fn apply_move(&mut self, mv: &Move) {
        self.before_last_move = Some(self.board);
        self.board.apply(mv);
        if self.current_player == Color::Black {
            self.move_number += 1;
        }
        self.current_player = self.current_player.opposite();
    }

    /// Save the current state and rewind to the position before the last move,
    /// with the player who made that move to play again.
    pub fn enter_variation(&mut self) -> Result<(), Violation> {
        let branch = self
            .before_last_move
            .ok_or(Violation::VariationWithoutPriorMove)?;

        self.saved.push(Snapshot {
            board: self.board,
            before_last_move: self.before_last_move,
            player: self.current_player,
            move_number: self.move_number,
        });

        self.board = branch;
        self.before_last_move = None;
        self.current_player = self.current_player.opposite();
        if self.current_player == Color::Black {
            self.move_number -= 1;
        }
        Ok(())
    }

    /// Restore the state saved by the matching [`GameState::enter_variation`].
    pub fn exit_variation(&mut self) -> Result<(), Violation> {
        let snapshot = self.saved.pop().ok_or(Violation::UnbalancedVariationEnd)?;
        self.board = snapshot.board;
        self.before_last_move = snapshot.before_last_move;
        self.current_player = snapshot.player;
        self.move_number = snapshot.move_number;
        Ok(())
    }

    /// Describe moving the piece on `from` to `to` for the side to move: capture,
    /// en passant and the check status of the reply.
    pub fn plain_move(&self, from: Square, to: Square) -> Result<Move, MissingKing> {
        let player = self.current_player;
        let piece = self
            .board
            .piece_at(from)
            .map_or(Role::Pawn, |p| p.role);

        let en_passant = piece == Role::Pawn
            && self.board.piece_at(to).is_none()
            && self.board.en_passant_victim(to, player).is_some();
        let capture = self.board.piece_at(to).is_some() || en_passant;

        let extra = match piece {
            Role::Pawn => MoveExtra::Pawn {
                en_passant,
                explicit_en_passant: false,
                promotion: None,
            },
            Role::King => MoveExtra::King { castling: None },
            _ => MoveExtra::None,
        };

        self.annotate(Move {
            player,
            piece,
            from,
            to,
            capture,
            check: CheckStatus::NoCheck,
            extra,
        })
    }

    pub fn castling_move(&self, side: CastlingSide) -> Result<Move, MissingKing> {
        self.annotate(Move::castling(self.current_player, side))
    }

    pub fn promotion_move(&self, from: Square, to: Square, promotion: Role) -> Result<Move, MissingKing> {
        self.annotate(Move {
            player: self.current_player,
            piece: Role::Pawn,
            from,
            to,
            capture: self.board.piece_at(to).is_some(),
            check: CheckStatus::NoCheck,
            extra: MoveExtra::Pawn {
                en_passant: false,
                explicit_en_passant: false,
                promotion: Some(promotion),
            },
        })
    }

    /// Play `mv` on a scratch copy and record whether it checks or mates the opponent.
    fn annotate(&self, mut mv: Move) -> Result<Move, MissingKing> {
        let mut scratch = self.board;
        scratch.apply(&mv);
        mv.check = check::status(&scratch, mv.player.opposite(), true)?;
        Ok(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(state: &mut GameState, from: &str, to: &str) -> Move {
        let mv = state.plain_move(sq(from), sq(to)).unwrap();
        state.apply_move(&mv);
        mv
    }

    #[test]
    fn test_turn_and_move_number() {
        let mut state = GameState::new();
        assert_eq!((state.current_player(), state.move_number()), (Color::White, 1));
        play(&mut state, "e2", "e4");
        assert_eq!((state.current_player(), state.move_number()), (Color::Black, 1));
        play(&mut state, "e7", "e5");
        assert_eq!((state.current_player(), state.move_number()), (Color::White, 2));
    }

    #[test]
    fn test_variation_branches_from_before_last_move() {
        let mut state = GameState::new();
        play(&mut state, "e2", "e4");
        play(&mut state, "e7", "e5");
        let after_e5 = *state.board();

        state.enter_variation().unwrap();
        assert_eq!(state.current_player(), Color::Black);
        assert_eq!(state.move_number(), 1);
        assert!(state.board().piece_at(sq("e7")).is_some());
        play(&mut state, "c7", "c5");
        assert_eq!(state.move_number(), 2);
        state.exit_variation().unwrap();

        assert_eq!(*state.board(), after_e5);
        assert_eq!((state.current_player(), state.move_number()), (Color::White, 2));

        // A sibling variation branches from the same point.
        state.enter_variation().unwrap();
        assert!(state.board().piece_at(sq("e7")).is_some());
        state.exit_variation().unwrap();
        assert_eq!(*state.board(), after_e5);
    }

    #[test]
    fn test_variation_after_white_move() {
        let mut state = GameState::new();
        play(&mut state, "e2", "e4");
        state.enter_variation().unwrap();
        assert_eq!((state.current_player(), state.move_number()), (Color::White, 1));
        assert_eq!(*state.board(), Board::starting_position());
        state.exit_variation().unwrap();
        assert_eq!((state.current_player(), state.move_number()), (Color::Black, 1));
    }

    #[test]
    fn test_variation_balance_errors() {
        let mut state = GameState::new();
        assert_eq!(state.enter_variation(), Err(Violation::VariationWithoutPriorMove));
        assert_eq!(state.exit_variation(), Err(Violation::UnbalancedVariationEnd));

        play(&mut state, "d2", "d4");
        state.enter_variation().unwrap();
        assert_eq!(state.depth(), 1);
        // Nothing has been played inside the variation yet.
        assert_eq!(state.enter_variation(), Err(Violation::VariationWithoutPriorMove));
        play(&mut state, "c2", "c4");
        state.enter_variation().unwrap();
        assert_eq!(state.depth(), 2);
        state.exit_variation().unwrap();
        state.exit_variation().unwrap();
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_plain_move_annotations() {
        let mut state = GameState::new();
        play(&mut state, "e2", "e4");
        play(&mut state, "f7", "f6");
        play(&mut state, "d2", "d4");
        play(&mut state, "g7", "g5");
        let mate = play(&mut state, "d1", "h5");
        assert_eq!(mate.piece, Role::Queen);
        assert_eq!(mate.check, CheckStatus::Checkmate);
        assert!(!mate.capture);
    }

    #[test]
    fn test_en_passant_move_is_flagged() {
        let mut state = GameState::new();
        play(&mut state, "e2", "e4");
        play(&mut state, "a7", "a6");
        play(&mut state, "e4", "e5");
        play(&mut state, "d7", "d5");
        let mv = play(&mut state, "e5", "d6");
        assert!(mv.is_en_passant());
        assert!(mv.capture);
        assert!(state.board().piece_at(sq("d5")).is_none());
    }

    #[test]
    fn test_castling_and_promotion_are_annotated() {
        let mut board = Board::empty();
        board.set(sq("e1"), Some(crate::types::Piece::new(Role::King, Color::White)));
        board.set(sq("h1"), Some(crate::types::Piece::new(Role::Rook, Color::White)));
        board.set(sq("f8"), Some(crate::types::Piece::new(Role::King, Color::Black)));
        board.set(sq("b7"), Some(crate::types::Piece::new(Role::Pawn, Color::White)));
        let state = GameState::from_board(board, Color::White);

        let castle = state.castling_move(CastlingSide::Kingside).unwrap();
        assert_eq!(castle.check, CheckStatus::Check);

        let promo = state.promotion_move(sq("b7"), sq("b8"), Role::Queen).unwrap();
        assert_eq!(promo.promotion(), Some(Role::Queen));
        assert_eq!(promo.check, CheckStatus::Check);
    }
}
