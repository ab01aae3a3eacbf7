//! 8x8 mailbox position with the per-piece reachability rules the codec relies on.
//!
//! Reachability here ignores whose turn it is and ignores self-check; the check
//! engine layers those concerns on top.

use std::fmt;

use crate::token::{Move, MoveExtra};
use crate::types::{CastlingSide, Color, Piece, Role, Square};

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Indexed `[rank][file]`.
    squares: [[Option<Piece>; 8]; 8],
    /// Square skipped by the last double pawn push, if the last move was one.
    en_passant: Option<Square>,
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            en_passant: None,
        }
    }

    pub fn starting_position() -> Self {
        const BACK_RANK: [Role; 8] = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];

        let mut board = Self::empty();
        for (file, &role) in BACK_RANK.iter().enumerate() {
            board.squares[0][file] = Some(Piece::new(role, Color::White));
            board.squares[1][file] = Some(Piece::new(Role::Pawn, Color::White));
            board.squares[6][file] = Some(Piece::new(Role::Pawn, Color::Black));
            board.squares[7][file] = Some(Piece::new(role, Color::Black));
        }
        board
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[usize::from(sq.rank())][usize::from(sq.file())]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[usize::from(sq.rank())][usize::from(sq.file())] = piece;
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    fn is_empty_at(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Empty, or holding a piece of the other side.
    fn is_enterable(&self, sq: Square, mover: Color) -> bool {
        self.piece_at(sq).map_or(true, |p| p.color != mover)
    }

    /// Pieces in ascending square index.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Whether a `role` belonging to `mover` standing on `from` may move to `to`.
    /// King moves additionally require the destination to be safe.
    pub fn can_reach(&self, role: Role, from: Square, to: Square, mover: Color) -> bool {
        if from == to {
            return false;
        }
        match role {
            Role::Pawn => self.pawn_can_reach(from, to, mover),
            Role::Knight => is_knight_jump(from, to) && self.is_enterable(to, mover),
            Role::Bishop => is_diagonal(from, to) && self.line_is_clear(from, to) && self.is_enterable(to, mover),
            Role::Rook => is_orthogonal(from, to) && self.line_is_clear(from, to) && self.is_enterable(to, mover),
            Role::Queen => {
                (is_diagonal(from, to) || is_orthogonal(from, to))
                    && self.line_is_clear(from, to)
                    && self.is_enterable(to, mover)
            }
            Role::King => self.king_can_reach(from, to, mover, true),
        }
    }

    /// King step. `check_safety` rejects destinations attacked by the opponent;
    /// callers evaluating the opponent king as an attacker pass `false` to stop the recursion.
    pub fn king_can_reach(&self, from: Square, to: Square, mover: Color, check_safety: bool) -> bool {
        if !is_king_step(from, to) || !self.is_enterable(to, mover) {
            return false;
        }
        if !check_safety {
            return true;
        }
        // Lift the king so sliders see through its old square.
        let mut lifted = *self;
        lifted.set(from, None);
        !lifted.is_attacked(to, mover.opposite(), false)
    }

    fn pawn_can_reach(&self, from: Square, to: Square, mover: Color) -> bool {
        let forward = mover.forward();
        let rank_delta = to.rank() as i8 - from.rank() as i8;
        let file_delta = to.file() as i8 - from.file() as i8;

        if file_delta == 0 {
            if rank_delta == forward {
                return self.is_empty_at(to);
            }
            if rank_delta == 2 * forward && from.rank() == mover.pawn_rank() {
                return from
                    .offset(0, forward)
                    .is_some_and(|mid| self.is_empty_at(mid))
                    && self.is_empty_at(to);
            }
            return false;
        }

        if file_delta.abs() != 1 || rank_delta != forward {
            return false;
        }
        match self.piece_at(to) {
            Some(target) => target.color != mover,
            None => self.en_passant_victim(to, mover).is_some(),
        }
    }

    /// Square of the pawn an en-passant capture onto `to` by `mover` would remove.
    pub fn en_passant_victim(&self, to: Square, mover: Color) -> Option<Square> {
        if self.en_passant != Some(to) {
            return None;
        }
        let victim = to.offset(0, -mover.forward())?;
        match self.piece_at(victim) {
            Some(p) if p.role == Role::Pawn && p.color != mover => Some(victim),
            _ => None,
        }
    }

    /// Every square strictly between two aligned squares is empty.
    fn line_is_clear(&self, from: Square, to: Square) -> bool {
        let file_step = (to.file() as i8 - from.file() as i8).signum();
        let rank_step = (to.rank() as i8 - from.rank() as i8).signum();
        let mut cur = from.offset(file_step, rank_step);
        while let Some(sq) = cur {
            if sq == to {
                return true;
            }
            if !self.is_empty_at(sq) {
                return false;
            }
            cur = sq.offset(file_step, rank_step);
        }
        false
    }

    /// Whether `piece` standing on `from` attacks `target`, whatever occupies it.
    fn attacks(&self, from: Square, piece: Piece, target: Square, consider_king_safety: bool) -> bool {
        if from == target {
            return false;
        }
        match piece.role {
            Role::Pawn => {
                target.rank() as i8 - from.rank() as i8 == piece.color.forward()
                    && (target.file() as i8 - from.file() as i8).abs() == 1
            }
            Role::Knight => is_knight_jump(from, target),
            Role::Bishop => is_diagonal(from, target) && self.line_is_clear(from, target),
            Role::Rook => is_orthogonal(from, target) && self.line_is_clear(from, target),
            Role::Queen => {
                (is_diagonal(from, target) || is_orthogonal(from, target)) && self.line_is_clear(from, target)
            }
            Role::King => {
                is_king_step(from, target)
                    && (!consider_king_safety || {
                        let mut lifted = *self;
                        lifted.set(from, None);
                        !lifted.is_attacked(target, piece.color.opposite(), false)
                    })
            }
        }
    }

    /// Whether any piece of `by` attacks `sq`. With `consider_opponent_king`, an attacking
    /// king only counts if it could step onto `sq` without being attacked itself.
    pub fn is_attacked(&self, sq: Square, by: Color, consider_opponent_king: bool) -> bool {
        self.pieces()
            .filter(|(_, p)| p.color == by)
            .any(|(from, p)| self.attacks(from, p, sq, consider_opponent_king))
    }

    /// Pawns of `player` one step away from promoting, ordered by file.
    pub fn promotable_pawns(&self, player: Color) -> Vec<Square> {
        let pawn = Piece::new(Role::Pawn, player);
        (0..8)
            .filter_map(|file| Square::new(file, player.promotion_rank()))
            .filter(|&sq| self.piece_at(sq) == Some(pawn))
            .collect()
    }

    /// Destinations on the last rank available to the pawn on `from`, ascending.
    pub fn promotion_targets(&self, from: Square, player: Color) -> Vec<Square> {
        [-1, 0, 1]
            .into_iter()
            .filter_map(|df| from.offset(df, player.forward()))
            .filter(|&to| self.pawn_can_reach(from, to, player))
            .collect()
    }

    /// The `n`-th (zero-based) piece of this kind scanning rank 1 to 8, files a to h.
    pub fn nth_piece(&self, player: Color, role: Role, n: usize) -> Option<Square> {
        let wanted = Piece::new(role, player);
        self.pieces()
            .filter(|&(_, p)| p == wanted)
            .nth(n)
            .map(|(sq, _)| sq)
    }

    /// Source squares of every `role` of `player` that can reach `to`,
    /// in ascending linear index. Disambiguation indices point into this list.
    pub fn count_candidates(&self, player: Color, role: Role, to: Square) -> Vec<Square> {
        let wanted = Piece::new(role, player);
        self.pieces()
            .filter(|&(from, p)| p == wanted && self.can_reach(role, from, to, player))
            .map(|(from, _)| from)
            .collect()
    }

    /// Castling preconditions: king and rook at home, nothing between them, the king
    /// not in check and not crossing or landing on an attacked square.
    pub fn can_castle(&self, color: Color, side: CastlingSide) -> bool {
        let king_from = CastlingSide::king_from(color);
        let king_to = side.king_to(color);
        let rook_from = side.rook_from(color);

        if self.piece_at(king_from) != Some(Piece::new(Role::King, color))
            || self.piece_at(rook_from) != Some(Piece::new(Role::Rook, color))
        {
            return false;
        }
        if !self.line_is_clear(king_from, rook_from) {
            return false;
        }

        let opponent = color.opposite();
        let step = (king_to.file() as i8 - king_from.file() as i8).signum();
        let mut sq = Some(king_from);
        while let Some(cur) = sq {
            if self.is_attacked(cur, opponent, false) {
                return false;
            }
            if cur == king_to {
                break;
            }
            sq = cur.offset(step, 0);
        }
        true
    }

    /// Relocate a piece. Handles castling rooks, en-passant removal and promotion.
    /// No legality check is done here.
    pub fn apply(&mut self, mv: &Move) {
        if let MoveExtra::King { castling: Some(side) } = mv.extra {
            let rook = self.piece_at(side.rook_from(mv.player));
            let king = self.piece_at(mv.from);
            self.set(mv.from, None);
            self.set(side.rook_from(mv.player), None);
            self.set(side.king_to(mv.player), king);
            self.set(side.rook_to(mv.player), rook);
            self.en_passant = None;
            return;
        }

        let promotion = match mv.extra {
            MoveExtra::Pawn { promotion, .. } => promotion,
            _ => None,
        };
        self.relocate(mv.from, mv.to, promotion);
    }

    /// Move whatever stands on `from` to `to`. Used directly by the escape search.
    pub fn relocate(&mut self, from: Square, to: Square, promotion: Option<Role>) {
        let Some(mut piece) = self.piece_at(from) else {
            return;
        };

        let mut next_en_passant = None;
        if piece.role == Role::Pawn {
            if from.file() != to.file() && self.is_empty_at(to) {
                if let Some(victim) = self.en_passant_victim(to, piece.color) {
                    self.set(victim, None);
                }
            }
            if (to.rank() as i8 - from.rank() as i8).abs() == 2 {
                next_en_passant = from.offset(0, piece.color.forward());
            }
            if let Some(role) = promotion {
                piece.role = role;
            }
        }

        self.set(from, None);
        self.set(to, Some(piece));
        self.en_passant = next_en_passant;
    }
}

fn is_knight_jump(from: Square, to: Square) -> bool {
    let df = to.file() as i8 - from.file() as i8;
    let dr = to.rank() as i8 - from.rank() as i8;
    KNIGHT_JUMPS.contains(&(df, dr))
}

fn is_diagonal(from: Square, to: Square) -> bool {
    let df = (to.file() as i8 - from.file() as i8).abs();
    let dr = (to.rank() as i8 - from.rank() as i8).abs();
    df == dr && df != 0
}

fn is_orthogonal(from: Square, to: Square) -> bool {
    from != to && (from.file() == to.file() || from.rank() == to.rank())
}

fn is_king_step(from: Square, to: Square) -> bool {
    from != to
        && (to.file() as i8 - from.file() as i8).abs() <= 1
        && (to.rank() as i8 - from.rank() as i8).abs() <= 1
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = Square::new(file, rank)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', Piece::char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board (en passant: {:?})", self.en_passant)?;
        fmt::Display::fmt(self, f)
    }
}
