//! Check and checkmate detection.

use crate::board::Board;
use crate::error::MissingKing;
use crate::types::{CheckStatus, Color, Role, Square};

pub fn king_square(board: &Board, color: Color) -> Result<Square, MissingKing> {
    board
        .nth_piece(color, Role::King, 0)
        .ok_or(MissingKing { color })
}

pub fn in_check(board: &Board, color: Color) -> Result<bool, MissingKing> {
    let king = king_square(board, color)?;
    Ok(board.is_attacked(king, color.opposite(), false))
}

/// Check status of `player`. Without `search_escape` a check is never upgraded to mate.
pub fn status(board: &Board, player: Color, search_escape: bool) -> Result<CheckStatus, MissingKing> {
    if !in_check(board, player)? {
        return Ok(CheckStatus::NoCheck);
    }
    if !search_escape || has_escape(board, player)? {
        return Ok(CheckStatus::Check);
    }
    Ok(CheckStatus::Checkmate)
}

/// Brute-force search for any move of `player` that leaves its king out of check.
pub fn has_escape(board: &Board, player: Color) -> Result<bool, MissingKing> {
    for (from, piece) in board.pieces().filter(|(_, p)| p.color == player) {
        for to in Square::all() {
            if !board.can_reach(piece.role, from, to, player) {
                continue;
            }
            let mut scratch = *board;
            scratch.relocate(from, to, None);
            if !in_check(&scratch, player)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
