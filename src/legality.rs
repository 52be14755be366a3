// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::attacks::threats_against;
use crate::board::Board;
use crate::movegen::{pseudo_legal, PseudoMoves};
use crate::types::{CastleStatus, Color, PieceKind, PrevMove, Square};

/// The legal destinations for the piece at `origin`: the pseudo-legal set
/// minus everything that would leave the mover's own king attacked, plus
/// castling for a king still holding rights.
///
/// King candidates are tested in place with the origin square logically
/// vacated. Non-king candidates are validated by simulating the move on a
/// scratch board - including en-passant victim removal - and re-running the
/// threat detector; this subsumes the ray-pin test and also handles check
/// evasion, which a pure pin test does not.
pub fn legal_moves(
    board: &Board,
    origin: Square,
    castling: CastleStatus,
    prev_move: Option<PrevMove>,
) -> PseudoMoves {
    let piece = match board.piece_at(origin) {
        Some(piece) => piece,
        None => return PseudoMoves::default(),
    };

    let mut moves = pseudo_legal(board, origin, prev_move);
    let enemy = piece.color.toggle();

    if piece.kind == PieceKind::King {
        moves.destinations = moves
            .destinations
            .iter()
            .cloned()
            .filter(|&dest| threats_against(board, enemy, dest, Some(origin)).is_empty())
            .collect();
        add_castles(board, piece.color, castling, &mut moves);
    } else {
        let en_passant = moves.en_passant;
        moves.destinations = moves
            .destinations
            .iter()
            .cloned()
            .filter(|&dest| {
                let mut scratch = board.clone();
                if Some(dest) == en_passant {
                    // The en-passant victim sits beside the mover, not on
                    // the destination square.
                    scratch.remove_piece(Square::of(origin.row(), dest.col()));
                }
                scratch.relocate(origin, dest);
                threats_against(&scratch, enemy, scratch.king(piece.color), None).is_empty()
            })
            .collect();
        if moves.en_passant.map_or(false, |t| !moves.destinations.contains(&t)) {
            moves.en_passant = None;
        }
    }

    moves
}

/// Castle destinations are the king's two-column slides toward either rook.
/// Legal iff the right is still held, the rook is home, every square
/// strictly between king and rook is empty, the king is not currently
/// attacked, and neither transited square is attacked. The rook relocation
/// itself happens when the move is committed, not here.
fn add_castles(board: &Board, color: Color, castling: CastleStatus, moves: &mut PseudoMoves) {
    let home_row = match color {
        Color::White => 7,
        Color::Black => 0,
    };
    let king_sq = board.king(color);
    if king_sq != Square::of(home_row, 4) {
        return;
    }

    // No castling out of check.
    if !threats_against(board, color.toggle(), king_sq, None).is_empty() {
        return;
    }

    let (kingside, queenside) = match color {
        Color::White => (CastleStatus::WHITE_KINGSIDE, CastleStatus::WHITE_QUEENSIDE),
        Color::Black => (CastleStatus::BLACK_KINGSIDE, CastleStatus::BLACK_QUEENSIDE),
    };

    if castling.contains(kingside) {
        try_castle(board, color, king_sq, Square::of(home_row, 7), 1, moves);
    }
    if castling.contains(queenside) {
        try_castle(board, color, king_sq, Square::of(home_row, 0), -1, moves);
    }
}

fn try_castle(
    board: &Board,
    color: Color,
    king_sq: Square,
    rook_sq: Square,
    dc: i8,
    moves: &mut PseudoMoves,
) {
    match board.piece_at(rook_sq) {
        Some(piece) if piece.kind == PieceKind::Rook && piece.color == color => {}
        _ => return,
    }

    // Squares strictly between king and rook must be empty.
    let mut cursor = king_sq.offset(0, dc).expect("castle walk stays on the home row");
    while cursor != rook_sq {
        if board.piece_at(cursor).is_some() {
            return;
        }
        cursor = cursor.offset(0, dc).expect("castle walk stays on the home row");
    }

    // The king may not pass through or land on an attacked square. The walk
    // pretends the king has left its origin so a slider shielded by the king
    // itself still counts.
    let enemy = color.toggle();
    for step in 1..=2 {
        let transit = king_sq
            .offset(0, dc * step)
            .expect("castle transit stays on the home row");
        if !threats_against(board, enemy, transit, Some(king_sq)).is_empty() {
            return;
        }
    }

    let destination = king_sq.offset(0, dc * 2).expect("castle lands on the home row");
    moves.destinations.insert(destination);
}

#[cfg(test)]
mod tests {
    use super::legal_moves;
    use crate::board::Board;
    use crate::types::{CastleStatus, Square};

    fn destinations(board: &Board, origin: Square, castling: CastleStatus) -> Vec<Square> {
        let mut out: Vec<Square> = legal_moves(board, origin, castling, None)
            .destinations
            .iter()
            .cloned()
            .collect();
        out.sort_by_key(|sq| (sq.row(), sq.col()));
        out
    }

    #[test]
    fn pinned_piece_stays_on_the_ray() {
        // White bishop on e2 is pinned to the e1 king by the rook on e7. It
        // has diagonal pseudo-moves but no legal ones.
        let board = Board::from_layout("4k3/4r3/8/8/8/8/4B3/4K3").unwrap();
        assert!(destinations(&board, Square::of(6, 4), CastleStatus::NONE).is_empty());
    }

    #[test]
    fn pinned_rook_may_slide_along_the_pin() {
        // A rook pinned along the file can still move on that file,
        // including capturing the pinning piece.
        let board = Board::from_layout("4k3/4r3/8/8/8/8/4R3/4K3").unwrap();
        assert_eq!(
            vec![
                Square::of(1, 4),
                Square::of(2, 4),
                Square::of(3, 4),
                Square::of(4, 4),
                Square::of(5, 4),
            ],
            destinations(&board, Square::of(6, 4), CastleStatus::NONE)
        );
    }

    #[test]
    fn checked_side_must_resolve_the_check() {
        // The e1 king is checked by the e7 rook. The d2 knight's only legal
        // move is the interposition on e4; the a-pawn has none.
        let board = Board::from_layout("4k3/4r3/8/8/8/8/P2N4/4K3").unwrap();
        assert_eq!(
            vec![Square::of(4, 4)],
            destinations(&board, Square::of(6, 3), CastleStatus::NONE)
        );
        assert!(destinations(&board, Square::of(6, 0), CastleStatus::NONE).is_empty());
    }

    #[test]
    fn king_cannot_step_into_attack() {
        // Rook on d7 seals the d-file; the e1 king cannot step onto it, and
        // cannot retreat along the e-file it currently shields.
        let board = Board::from_layout("4k3/3r4/8/8/8/8/8/4K3").unwrap();
        assert_eq!(
            vec![Square::of(6, 4), Square::of(6, 5), Square::of(7, 5)],
            destinations(&board, Square::of(7, 4), CastleStatus::NONE)
        );
    }

    #[test]
    fn king_cannot_retreat_along_checking_ray() {
        // A king checked by a rook may not step backwards along the same
        // ray: its own body no longer shields the square behind it.
        let board = Board::from_layout("4k3/8/8/8/r3K3/8/8/8").unwrap();
        let dests = destinations(&board, Square::of(4, 4), CastleStatus::NONE);
        assert!(!dests.contains(&Square::of(4, 5)));
    }

    #[test]
    fn kingside_castle_offered_when_clear() {
        let board = Board::from_layout("4k3/8/8/8/8/8/8/4K2R").unwrap();
        let dests = destinations(&board, Square::of(7, 4), CastleStatus::WHITE_KINGSIDE);
        assert!(dests.contains(&Square::of(7, 6)));
    }

    #[test]
    fn queenside_castle_offered_when_clear() {
        let board = Board::from_layout("4k3/8/8/8/8/8/8/R3K3").unwrap();
        let dests = destinations(&board, Square::of(7, 4), CastleStatus::WHITE_QUEENSIDE);
        assert!(dests.contains(&Square::of(7, 2)));
    }

    #[test]
    fn castle_withheld_without_the_right() {
        let board = Board::from_layout("4k3/8/8/8/8/8/8/4K2R").unwrap();
        let dests = destinations(&board, Square::of(7, 4), CastleStatus::NONE);
        assert!(!dests.contains(&Square::of(7, 6)));
    }

    #[test]
    fn castle_withheld_through_occupied_square() {
        let board = Board::from_layout("4k3/8/8/8/8/8/8/4KB1R").unwrap();
        let dests = destinations(&board, Square::of(7, 4), CastleStatus::WHITE_KINGSIDE);
        assert!(!dests.contains(&Square::of(7, 6)));
    }

    #[test]
    fn castle_withheld_when_transit_square_attacked() {
        // Black rook on f8 covers f1; the king may not pass through it.
        let board = Board::from_layout("4kr2/8/8/8/8/8/8/4K2R").unwrap();
        let dests = destinations(&board, Square::of(7, 4), CastleStatus::WHITE_KINGSIDE);
        assert!(!dests.contains(&Square::of(7, 6)));
    }

    #[test]
    fn castle_withheld_while_in_check() {
        let board = Board::from_layout("4k3/4r3/8/8/8/8/8/4K2R").unwrap();
        let dests = destinations(&board, Square::of(7, 4), CastleStatus::WHITE_KINGSIDE);
        assert!(!dests.contains(&Square::of(7, 6)));
    }

    #[test]
    fn en_passant_dropped_when_it_exposes_the_king() {
        // Removing both pawns from the fifth row would expose the white
        // king to the h5 rook, so the en-passant capture is illegal and the
        // remembered target is cleared.
        let board = Board::from_layout("4k3/8/8/K2pP2r/8/8/8/8").unwrap();
        let prev = crate::types::PrevMove {
            from: Square::of(1, 3),
            to: Square::of(3, 3),
        };
        let moves = legal_moves(&board, Square::of(3, 4), CastleStatus::NONE, Some(prev));
        assert!(!moves.destinations.contains(&Square::of(2, 3)));
        assert_eq!(None, moves.en_passant);
    }
}
