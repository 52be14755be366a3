// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use hashbrown::HashSet;

use crate::board::Board;
use crate::types::{
    Color, Direction, PieceKind, PrevMove, Square, DIAGONALS, DIRECTIONS, KNIGHT_OFFSETS,
    ORTHOGONALS,
};

/// Geometrically reachable destinations for one piece, before any self-check
/// filtering. `en_passant` carries the capture square when the pawn generator
/// found an en-passant opportunity, for the caller to remember across the
/// reply.
#[derive(Clone, Debug, Default)]
pub struct PseudoMoves {
    pub destinations: HashSet<Square>,
    pub en_passant: Option<Square>,
}

/// Destinations reachable from `origin` by occupancy and geometry alone.
/// `prev_move` is consulted only by pawns, to recognize an adjacent
/// double-step advance that opened an en-passant window.
pub fn pseudo_legal(board: &Board, origin: Square, prev_move: Option<PrevMove>) -> PseudoMoves {
    let mut moves = PseudoMoves::default();
    let piece = match board.piece_at(origin) {
        Some(piece) => piece,
        None => return moves,
    };

    match piece.kind {
        PieceKind::Pawn => add_pawn(board, origin, piece.color, prev_move, &mut moves),
        PieceKind::Knight => add_knight(board, origin, piece.color, &mut moves.destinations),
        PieceKind::Bishop => {
            add_slides(board, origin, piece.color, &DIAGONALS, 7, &mut moves.destinations)
        }
        PieceKind::Rook => add_slides(
            board,
            origin,
            piece.color,
            &ORTHOGONALS,
            7,
            &mut moves.destinations,
        ),
        PieceKind::Queen => add_slides(
            board,
            origin,
            piece.color,
            &DIRECTIONS,
            7,
            &mut moves.destinations,
        ),
        PieceKind::King => add_slides(
            board,
            origin,
            piece.color,
            &DIRECTIONS,
            1,
            &mut moves.destinations,
        ),
    }

    moves
}

/// Walks each direction up to `depth` squares, stopping at the first
/// occupied square and including it only when it holds an enemy piece.
/// The king is a slider of depth 1.
fn add_slides(
    board: &Board,
    origin: Square,
    color: Color,
    dirs: &[Direction],
    depth: u8,
    destinations: &mut HashSet<Square>,
) {
    for &dir in dirs {
        let (dr, dc) = dir.as_vector();
        let mut cursor = origin;
        for _ in 0..depth {
            cursor = match cursor.offset(dr, dc) {
                Some(sq) => sq,
                None => break,
            };

            match board.piece_at(cursor) {
                None => {
                    destinations.insert(cursor);
                }
                Some(occupant) => {
                    if occupant.color != color {
                        destinations.insert(cursor);
                    }
                    break;
                }
            }
        }
    }
}

fn add_knight(board: &Board, origin: Square, color: Color, destinations: &mut HashSet<Square>) {
    for &(dr, dc) in &KNIGHT_OFFSETS {
        if let Some(target) = origin.offset(dr, dc) {
            match board.piece_at(target) {
                None => {
                    destinations.insert(target);
                }
                Some(occupant) if occupant.color != color => {
                    destinations.insert(target);
                }
                Some(_) => {}
            }
        }
    }
}

fn add_pawn(
    board: &Board,
    origin: Square,
    color: Color,
    prev_move: Option<PrevMove>,
    moves: &mut PseudoMoves,
) {
    let (forward, start_row): (i8, u8) = match color {
        Color::White => (-1, 6),
        Color::Black => (1, 1),
    };

    // Advances land on empty squares only.
    if let Some(one) = origin.offset(forward, 0) {
        if board.piece_at(one).is_none() {
            moves.destinations.insert(one);

            if origin.row() == start_row {
                let two = one
                    .offset(forward, 0)
                    .expect("double advance from the starting rank stays on board");
                if board.piece_at(two).is_none() {
                    moves.destinations.insert(two);
                }
            }
        }
    }

    // Diagonal captures land on enemy-occupied squares only.
    for &dc in &[-1, 1] {
        if let Some(target) = origin.offset(forward, dc) {
            if let Some(occupant) = board.piece_at(target) {
                if occupant.color != color {
                    moves.destinations.insert(target);
                }
            }
        }
    }

    // En passant: the immediately preceding move was an enemy pawn's
    // two-square advance ending beside this pawn. The capture lands on the
    // empty square the enemy pawn skipped.
    if let Some(prev) = prev_move {
        let double_step = match board.piece_at(prev.to) {
            Some(mover) => {
                mover.kind == PieceKind::Pawn
                    && mover.color != color
                    && (prev.to.row() as i8 - prev.from.row() as i8).abs() == 2
            }
            None => false,
        };

        if double_step
            && prev.to.row() == origin.row()
            && (prev.to.col() as i8 - origin.col() as i8).abs() == 1
        {
            let target = Square::of((origin.row() as i8 + forward) as u8, prev.to.col());
            debug_assert!(board.piece_at(target).is_none());
            moves.destinations.insert(target);
            moves.en_passant = Some(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pseudo_legal;
    use crate::board::Board;
    use crate::types::{PrevMove, Square};

    fn squares(cells: &[(u8, u8)]) -> Vec<Square> {
        cells.iter().map(|&(r, c)| Square::of(r, c)).collect()
    }

    fn assert_destinations(board: &Board, origin: Square, expected: &[(u8, u8)]) {
        let moves = pseudo_legal(board, origin, None);
        let mut actual: Vec<Square> = moves.destinations.iter().cloned().collect();
        let mut expected = squares(expected);
        actual.sort_by_key(|sq| (sq.row(), sq.col()));
        expected.sort_by_key(|sq| (sq.row(), sq.col()));
        assert_eq!(expected, actual);
    }

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn opening_pawn_has_double_step() {
        let board = Board::from_layout(START).unwrap();
        assert_destinations(&board, Square::of(6, 4), &[(5, 4), (4, 4)]);
        assert_destinations(&board, Square::of(6, 0), &[(5, 0), (4, 0)]);
    }

    #[test]
    fn blocked_pawn_cannot_advance() {
        let board = Board::from_layout("4k3/8/8/8/4n3/4P3/8/4K3").unwrap();
        assert_destinations(&board, Square::of(5, 4), &[]);
    }

    #[test]
    fn pawn_off_starting_rank_single_steps() {
        let board = Board::from_layout("4k3/8/8/8/8/4P3/8/4K3").unwrap();
        assert_destinations(&board, Square::of(5, 4), &[(4, 4)]);
    }

    #[test]
    fn pawn_captures_diagonally_only() {
        // White pawn on e4; enemy pieces on d5 and e5, friend on f5.
        let board = Board::from_layout("4k3/8/8/3rnB2/4P3/8/8/4K3").unwrap();
        assert_destinations(&board, Square::of(4, 4), &[(3, 3)]);
    }

    #[test]
    fn knight_jumps_ignore_blockers() {
        let board = Board::from_layout(START).unwrap();
        assert_destinations(&board, Square::of(7, 1), &[(5, 0), (5, 2)]);
    }

    #[test]
    fn rook_stops_at_first_capture() {
        let board = Board::from_layout("4k3/4p3/8/8/8/8/4R3/4K3").unwrap();
        assert_destinations(
            &board,
            Square::of(6, 4),
            &[
                (5, 4),
                (4, 4),
                (3, 4),
                (2, 4),
                (1, 4), // capture, then stop
                (6, 0),
                (6, 1),
                (6, 2),
                (6, 3),
                (6, 5),
                (6, 6),
                (6, 7),
            ],
        );
    }

    #[test]
    fn king_walks_one_square() {
        let board = Board::from_layout("4k3/8/8/8/3K4/8/8/8").unwrap();
        assert_destinations(
            &board,
            Square::of(4, 3),
            &[
                (3, 2),
                (3, 3),
                (3, 4),
                (4, 2),
                (4, 4),
                (5, 2),
                (5, 3),
                (5, 4),
            ],
        );
    }

    #[test]
    fn en_passant_offered_after_adjacent_double_step() {
        // White pawn on e5; Black just played d7-d5.
        let board = Board::from_layout("4k3/8/8/3pP3/8/8/8/4K3").unwrap();
        let prev = PrevMove {
            from: Square::of(1, 3),
            to: Square::of(3, 3),
        };
        let moves = pseudo_legal(&board, Square::of(3, 4), Some(prev));
        assert!(moves.destinations.contains(&Square::of(2, 3)));
        assert_eq!(Some(Square::of(2, 3)), moves.en_passant);
    }

    #[test]
    fn en_passant_requires_double_step() {
        // Same shape, but the black pawn arrived with a single step.
        let board = Board::from_layout("4k3/8/8/3pP3/8/8/8/4K3").unwrap();
        let prev = PrevMove {
            from: Square::of(2, 3),
            to: Square::of(3, 3),
        };
        let moves = pseudo_legal(&board, Square::of(3, 4), Some(prev));
        assert!(!moves.destinations.contains(&Square::of(2, 3)));
        assert_eq!(None, moves.en_passant);
    }

    #[test]
    fn empty_square_generates_nothing() {
        let board = Board::from_layout(START).unwrap();
        let moves = pseudo_legal(&board, Square::of(4, 4), None);
        assert!(moves.destinations.is_empty());
    }
}
