// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The turn state machine. A `Game` is an immutable value; feeding it an
//! event with `handle` yields the successor state and leaves the original
//! untouched, so callers can keep old states around for undo or inspection.
use hashbrown::HashSet;
use serde::ser::Serializer;

use crate::board::Board;
use crate::endgame::{is_check, is_checkmate, is_stalemate, INACTIVITY_DRAW_HALFMOVES};
use crate::legality::legal_moves;
use crate::types::{CastleStatus, Color, Piece, PieceKind, PrevMove, Square, TableIndex};

const START_LAYOUT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

lazy_static! {
    static ref START_BOARD: Board =
        Board::from_layout(START_LAYOUT).expect("fixed starting layout must parse");
}

/// The resting phases of a game. Everything between two events is computed
/// synchronously, so there are no in-flight phases; a game is either waiting
/// for input or finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Waiting for the side to move to select a piece or play a move.
    Idle,
    /// A pawn reached the far rank; waiting for a promotion choice.
    AwaitingPromotion,
    Checkmate,
    Stalemate,
    Resigned,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        match self {
            Phase::Checkmate | Phase::Stalemate | Phase::Resigned => true,
            Phase::Idle | Phase::AwaitingPromotion => false,
        }
    }
}

/// Player input. Coordinates arrive raw from the UI layer and are
/// bounds-checked before use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Select { row: u8, col: u8 },
    Move { row: u8, col: u8 },
    SelectPromotion { kind: PieceKind },
    Resign,
}

/// Per-player tally of captured pieces, indexed by piece kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CapturedTally {
    counts: [u32; 6],
}

impl CapturedTally {
    pub fn record(&mut self, kind: PieceKind) {
        self.counts[kind.as_index()] += 1;
    }

    pub fn count(&self, kind: PieceKind) -> u32 {
        self.counts[kind.as_index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// A complete game state. `handle` is the only way to move a game forward;
/// events that make no sense in the current phase return the state unchanged.
#[derive(Clone, Debug, Serialize)]
pub struct Game {
    board: Board,
    #[serde(serialize_with = "serialize_castling")]
    castling: CastleStatus,
    /// En-passant target of the currently published move set, if any.
    en_passant: Option<Square>,
    prev_move: Option<PrevMove>,
    /// The currently selected square, if the side to move has picked one.
    active: Option<Square>,
    valid_moves: HashSet<Square>,
    side_to_move: Color,
    king_check: bool,
    check_mate: bool,
    /// Square of the pawn awaiting a promotion choice.
    pending_promotion: Option<Square>,
    moves_since_capture: u32,
    captured_by_white: CapturedTally,
    captured_by_black: CapturedTally,
    phase: Phase,
}

impl Game {
    pub fn new() -> Game {
        Game {
            board: START_BOARD.clone(),
            castling: CastleStatus::all(),
            en_passant: None,
            prev_move: None,
            active: None,
            valid_moves: HashSet::new(),
            side_to_move: Color::White,
            king_check: false,
            check_mate: false,
            pending_promotion: None,
            moves_since_capture: 0,
            captured_by_white: CapturedTally::default(),
            captured_by_black: CapturedTally::default(),
            phase: Phase::Idle,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn active(&self) -> Option<Square> {
        self.active
    }

    pub fn valid_moves(&self) -> &HashSet<Square> {
        &self.valid_moves
    }

    pub fn castling(&self) -> CastleStatus {
        self.castling
    }

    pub fn prev_move(&self) -> Option<PrevMove> {
        self.prev_move
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn in_check(&self) -> bool {
        self.king_check
    }

    pub fn is_checkmated(&self) -> bool {
        self.check_mate
    }

    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending_promotion
    }

    pub fn moves_since_capture(&self) -> u32 {
        self.moves_since_capture
    }

    pub fn captured_by(&self, color: Color) -> &CapturedTally {
        match color {
            Color::White => &self.captured_by_white,
            Color::Black => &self.captured_by_black,
        }
    }

    /// Consumes this state and an event and produces the successor state.
    pub fn handle(self, event: Event) -> Game {
        match (self.phase, event) {
            (Phase::Idle, Event::Select { row, col }) => self.select(row, col),
            (Phase::Idle, Event::Move { row, col }) => self.move_to(row, col),
            (Phase::AwaitingPromotion, Event::SelectPromotion { kind }) => self.promote(kind),
            (phase, Event::Resign) if !phase.is_terminal() => self.resign(),
            (phase, event) => {
                debug!("ignoring {:?} in phase {:?}", event, phase);
                self
            }
        }
    }

    fn select(mut self, row: u8, col: u8) -> Game {
        let square = match Square::try_of(row, col) {
            Some(sq) => sq,
            None => {
                debug!("select out of bounds: ({}, {})", row, col);
                return self;
            }
        };

        match self.board.piece_at(square) {
            Some(piece) if piece.color == self.side_to_move => {
                let moves = legal_moves(&self.board, square, self.castling, self.prev_move);
                debug!(
                    "{} selected {}, {} legal moves",
                    self.side_to_move,
                    square,
                    moves.destinations.len()
                );
                self.active = Some(square);
                self.valid_moves = moves.destinations;
                self.en_passant = moves.en_passant;
            }
            _ => {
                // Empty square or opponent piece clears the selection.
                self.active = None;
                self.valid_moves.clear();
                self.en_passant = None;
            }
        }

        self
    }

    fn move_to(mut self, row: u8, col: u8) -> Game {
        let dest = match Square::try_of(row, col) {
            Some(sq) if self.valid_moves.contains(&sq) => sq,
            _ => {
                debug!("move to ({}, {}) not in the published move set", row, col);
                return self;
            }
        };
        let origin = self
            .active
            .expect("a non-empty move set implies an active square");
        let mover = self
            .board
            .piece_at(origin)
            .expect("the active square holds the mover");

        // An en-passant capture lands on an empty square; the victim sits
        // beside the origin and must be lifted separately.
        let mut captured = None;
        if mover.kind == PieceKind::Pawn
            && self.en_passant == Some(dest)
            && self.board.piece_at(dest).is_none()
        {
            let victim_sq = Square::of(origin.row(), dest.col());
            captured = self.board.remove_piece(victim_sq);
            debug!("{} captures {} en passant", mover.color, victim_sq);
        }

        if let Some(piece) = self.board.relocate(origin, dest) {
            captured = Some(piece);
        }

        match captured {
            Some(piece) => {
                self.tally_for(mover.color).record(piece.kind);
                self.moves_since_capture = 0;
                // Capturing a rook on its home square kills that castle.
                if piece.kind == PieceKind::Rook {
                    self.castling.remove(rook_right(piece.color, dest));
                }
            }
            None => self.moves_since_capture += 1,
        }

        match mover.kind {
            PieceKind::King => {
                // A two-column king move is a castle; carry the rook along.
                if dest.col() == origin.col() + 2 {
                    let rook_from = Square::of(origin.row(), 7);
                    let rook_to = Square::of(origin.row(), dest.col() - 1);
                    self.board.relocate(rook_from, rook_to);
                } else if origin.col() >= 2 && dest.col() == origin.col() - 2 {
                    let rook_from = Square::of(origin.row(), 0);
                    let rook_to = Square::of(origin.row(), dest.col() + 1);
                    self.board.relocate(rook_from, rook_to);
                }
                self.castling.remove(castle_mask(mover.color));
            }
            PieceKind::Rook => {
                self.castling.remove(rook_right(mover.color, origin));
            }
            _ => {}
        }

        self.prev_move = Some(PrevMove {
            from: origin,
            to: dest,
        });
        self.active = None;
        self.valid_moves = HashSet::new();
        self.en_passant = None;

        let far_row = match mover.color {
            Color::White => 0,
            Color::Black => 7,
        };
        if mover.kind == PieceKind::Pawn && dest.row() == far_row {
            self.pending_promotion = Some(dest);
            self.phase = Phase::AwaitingPromotion;
            self
        } else {
            self.check_endgame()
        }
    }

    fn promote(mut self, kind: PieceKind) -> Game {
        if !kind.is_promotion_choice() {
            debug!("rejecting promotion to {:?}", kind);
            return self;
        }
        let square = self
            .pending_promotion
            .expect("AwaitingPromotion implies a pending square");
        let color = self
            .board
            .piece_at(square)
            .expect("the pending square holds the promoting pawn")
            .color;
        self.board.put_piece(square, Piece::new(kind, color));
        self.pending_promotion = None;
        self.phase = Phase::Idle;
        self.check_endgame()
    }

    fn resign(mut self) -> Game {
        info!("{} resigns", self.side_to_move);
        self.active = None;
        self.valid_moves = HashSet::new();
        self.en_passant = None;
        self.phase = Phase::Resigned;
        self
    }

    /// Hands the turn over and classifies the resulting position for the
    /// new side to move.
    fn check_endgame(mut self) -> Game {
        self.side_to_move = self.side_to_move.toggle();
        self.king_check = is_check(&self.board, self.side_to_move);
        if is_checkmate(&self.board, self.side_to_move, self.prev_move) {
            info!("{} is checkmated", self.side_to_move);
            self.check_mate = true;
            self.phase = Phase::Checkmate;
        } else if self.moves_since_capture >= INACTIVITY_DRAW_HALFMOVES
            || is_stalemate(&self.board, self.side_to_move, self.castling, self.prev_move)
        {
            info!("drawn position, {} to move", self.side_to_move);
            self.phase = Phase::Stalemate;
        } else {
            self.phase = Phase::Idle;
        }
        self
    }

    fn tally_for(&mut self, color: Color) -> &mut CapturedTally {
        match color {
            Color::White => &mut self.captured_by_white,
            Color::Black => &mut self.captured_by_black,
        }
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

/// The castle right tied to a rook standing on the given square, or no
/// right at all if the square is not that color's rook home.
fn rook_right(color: Color, sq: Square) -> CastleStatus {
    match (color, sq.row(), sq.col()) {
        (Color::White, 7, 7) => CastleStatus::WHITE_KINGSIDE,
        (Color::White, 7, 0) => CastleStatus::WHITE_QUEENSIDE,
        (Color::Black, 0, 7) => CastleStatus::BLACK_KINGSIDE,
        (Color::Black, 0, 0) => CastleStatus::BLACK_QUEENSIDE,
        _ => CastleStatus::NONE,
    }
}

fn castle_mask(color: Color) -> CastleStatus {
    match color {
        Color::White => CastleStatus::WHITE,
        Color::Black => CastleStatus::BLACK,
    }
}

fn serialize_castling<S: Serializer>(status: &CastleStatus, ser: S) -> Result<S::Ok, S::Error> {
    let mut buf = String::new();
    if status.contains(CastleStatus::WHITE_KINGSIDE) {
        buf.push('K');
    }
    if status.contains(CastleStatus::WHITE_QUEENSIDE) {
        buf.push('Q');
    }
    if status.contains(CastleStatus::BLACK_KINGSIDE) {
        buf.push('k');
    }
    if status.contains(CastleStatus::BLACK_QUEENSIDE) {
        buf.push('q');
    }
    if buf.is_empty() {
        buf.push('-');
    }
    ser.serialize_str(&buf)
}
