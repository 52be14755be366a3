// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use arrayvec::ArrayVec;

use crate::board::Board;
use crate::types::{Color, Direction, Piece, PieceKind, Square, DIRECTIONS, KNIGHT_OFFSETS};

/// One attack on a square. `ray` is the direction from the attacked square
/// toward the attacker for sliding attacks, and `None` for the contact
/// attacks (pawn, knight, king) that leave no squares to interpose on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Threat {
    pub from: Square,
    pub ray: Option<Direction>,
}

// At most eight knights plus eight ray attackers can bear on one square;
// contact attackers on adjacent squares displace the ray that would have
// passed through them.
pub type ThreatVec = ArrayVec<[Threat; 16]>;

/// Every attack the given color has on `target`: pawn, knight, and king
/// contact probes first, then a ray walk in each compass direction. Two or
/// more entries is a double check, which the
/// endgame evaluator treats as unresolvable by capture or interposition.
///
/// `vacated` names a square treated as empty during the walk. Legality tests
/// for hypothetical moves pass the mover's origin here, so a piece that has
/// "already left" its square cannot block an attack against its own king.
pub fn threats_against(
    board: &Board,
    attacker: Color,
    target: Square,
    vacated: Option<Square>,
) -> ThreatVec {
    let mut threats = ThreatVec::new();

    // Pawns capture toward their direction of travel, so a pawn attacking
    // `target` sits one row behind it from the attacker's point of view.
    let pawn_row_delta = match attacker {
        Color::White => 1,
        Color::Black => -1,
    };
    for &dc in &[-1, 1] {
        if let Some(from) = target.offset(pawn_row_delta, dc) {
            if Some(from) != vacated
                && board.piece_at(from) == Some(Piece::new(PieceKind::Pawn, attacker))
            {
                threats.push(Threat { from, ray: None });
            }
        }
    }

    for &(dr, dc) in &KNIGHT_OFFSETS {
        if let Some(from) = target.offset(dr, dc) {
            if Some(from) != vacated
                && board.piece_at(from) == Some(Piece::new(PieceKind::Knight, attacker))
            {
                threats.push(Threat { from, ray: None });
            }
        }
    }

    // There's only one king, so it's cheap to check.
    let enemy_king = board.king(attacker);
    if enemy_king != target
        && (enemy_king.row() as i8 - target.row() as i8).abs() <= 1
        && (enemy_king.col() as i8 - target.col() as i8).abs() <= 1
    {
        threats.push(Threat {
            from: enemy_king,
            ray: None,
        });
    }

    for &dir in &DIRECTIONS {
        if let Some(from) = cast_ray(board, attacker, target, dir, vacated) {
            threats.push(Threat {
                from,
                ray: Some(dir),
            });
        }
    }

    threats
}

/// Walks from `target` along `dir` until the board edge or the first
/// non-empty square. The ray is an attack only if that square holds an enemy
/// slider whose movement covers the ray: rook/queen on orthogonals,
/// bishop/queen on diagonals. Anything else blocks.
fn cast_ray(
    board: &Board,
    attacker: Color,
    target: Square,
    dir: Direction,
    vacated: Option<Square>,
) -> Option<Square> {
    let (dr, dc) = dir.as_vector();
    let mut cursor = target.offset(dr, dc)?;
    loop {
        if Some(cursor) != vacated {
            if let Some(piece) = board.piece_at(cursor) {
                if piece.color == attacker && slider_covers(piece.kind, dir) {
                    return Some(cursor);
                }

                return None;
            }
        }

        cursor = cursor.offset(dr, dc)?;
    }
}

fn slider_covers(kind: PieceKind, dir: Direction) -> bool {
    match kind {
        PieceKind::Queen => true,
        PieceKind::Rook => !dir.is_diagonal(),
        PieceKind::Bishop => dir.is_diagonal(),
        _ => false,
    }
}
