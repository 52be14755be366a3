// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::attacks::threats_against;
use crate::board::Board;
use crate::legality::legal_moves;
use crate::types::{CastleStatus, Color, PieceKind, PrevMove};

/// Half-moves without a capture before the game is drawn for inactivity.
/// Unlike the FIDE fifty-move clock, the counter resets only on captures,
/// not on pawn advances.
pub const INACTIVITY_DRAW_HALFMOVES: u32 = 50;

pub fn is_check(board: &Board, side: Color) -> bool {
    !threats_against(board, side.toggle(), board.king(side), None).is_empty()
}

/// Checkmate for the side to move: the king is attacked, has no safe square
/// to step to, and the check cannot be resolved. A double check is
/// unresolvable by anything but a king move; a single check can still be
/// answered by capturing the attacker or interposing on its ray.
pub fn is_checkmate(board: &Board, side: Color, prev_move: Option<PrevMove>) -> bool {
    let king = board.king(side);
    let threats = threats_against(board, side.toggle(), king, None);
    if threats.is_empty() {
        return false;
    }

    // Castling is never available in check, so no rights are offered here.
    if !legal_moves(board, king, CastleStatus::NONE, prev_move)
        .destinations
        .is_empty()
    {
        return false;
    }

    if threats.len() > 1 {
        return true;
    }

    // Single check: collect the squares that would resolve it - the
    // attacker's own square, plus every square strictly between king and
    // attacker when the attack rides a ray.
    let attacker = threats[0];
    let mut resolutions = vec![attacker.from];
    if let Some(dir) = attacker.ray {
        let mut cursor = king
            .towards(dir)
            .expect("ray threat implies at least one square toward the attacker");
        while cursor != attacker.from {
            resolutions.push(cursor);
            cursor = cursor
                .towards(dir)
                .expect("ray walk reaches the attacker before the board edge");
        }
    }

    for (origin, piece) in board.pieces(side) {
        if piece.kind == PieceKind::King {
            continue;
        }

        let moves = legal_moves(board, origin, CastleStatus::NONE, prev_move);
        if resolutions
            .iter()
            .any(|sq| moves.destinations.contains(sq))
        {
            return false;
        }

        // An en-passant capture lands behind the checking pawn rather than
        // on it, so the resolution-square scan above misses it.
        if let Some(target) = moves.en_passant {
            if moves.destinations.contains(&target)
                && prev_move.map(|prev| prev.to) == Some(attacker.from)
            {
                return false;
            }
        }
    }

    true
}

/// Standard no-legal-moves stalemate: the side to move is not in check and
/// has nothing legal to play.
pub fn is_stalemate(
    board: &Board,
    side: Color,
    castling: CastleStatus,
    prev_move: Option<PrevMove>,
) -> bool {
    if is_check(board, side) {
        return false;
    }

    for (origin, _) in board.pieces(side) {
        if !legal_moves(board, origin, castling, prev_move)
            .destinations
            .is_empty()
        {
            return false;
        }
    }

    true
}
