// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use serde::{Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt::{self, Write};

use crate::types::{Color, Piece, PieceKind, Square};

/// Possible errors that can arise when parsing a layout string into a `Board`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutParseError {
    UnexpectedEnd,
    TooManyRows,
    InvalidDigit,
    RowDoesNotSumToEight,
    UnknownPiece,
    MissingKing(Color),
    DuplicateKing(Color),
}

/// An 8x8 grid of piece-or-empty cells, plus cached king locations. The
/// caches are updated in lockstep with the grid by `relocate`; everything
/// else in the crate asks `king` instead of scanning for one.
#[derive(Clone, Debug)]
pub struct Board {
    grid: [[Option<Piece>; 8]; 8],
    white_king: Square,
    black_king: Square,
}

//
// Board state getters
//

impl Board {
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.grid[sq.row() as usize][sq.col() as usize]
    }

    pub fn king(&self, color: Color) -> Square {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    /// All squares occupied by the given color, with their pieces.
    pub fn pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        let mut out = Vec::new();
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square::of(row, col);
                if let Some(piece) = self.piece_at(sq) {
                    if piece.color == color {
                        out.push((sq, piece));
                    }
                }
            }
        }

        out
    }

    /// Invariant probe used by tests and debug assertions: exactly one king
    /// per color, sitting where the caches say it is.
    pub fn is_consistent(&self) -> bool {
        let mut white_kings = Vec::new();
        let mut black_kings = Vec::new();
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square::of(row, col);
                if let Some(piece) = self.piece_at(sq) {
                    if piece.kind == PieceKind::King {
                        match piece.color {
                            Color::White => white_kings.push(sq),
                            Color::Black => black_kings.push(sq),
                        }
                    }
                }
            }
        }

        white_kings == [self.white_king] && black_kings == [self.black_king]
    }
}

//
// Board mutation
//

impl Board {
    /// Places a piece on a square, returning whatever was there before.
    /// Kings never enter the board this way; they only arrive via layout
    /// parsing and move via `relocate`, which keeps the caches honest.
    pub fn put_piece(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        debug_assert!(piece.kind != PieceKind::King);
        self.grid[sq.row() as usize][sq.col() as usize].replace(piece)
    }

    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.grid[sq.row() as usize][sq.col() as usize].take()
    }

    /// Moves the piece at `from` to `to`, returning the captured piece, if
    /// any. When the mover is a king the cached king square is updated in
    /// the same call, so the cache can never be observed stale.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let mover = self
            .remove_piece(from)
            .expect("invalid relocation: no piece at source square");
        let captured = self.grid[to.row() as usize][to.col() as usize].replace(mover);
        debug_assert!(captured.map_or(true, |p| p.kind != PieceKind::King));

        if mover.kind == PieceKind::King {
            match mover.color {
                Color::White => self.white_king = to,
                Color::Black => self.black_king = to,
            }
        }

        debug_assert!(self.is_consistent());
        captured
    }
}

//
// Layout parsing and generation
//
// A layout is the board field of a FEN record: eight rows from row 0 (Black's
// back rank) to row 7, separated by '/', with digits spanning runs of empty
// squares. It is the only position notation this crate speaks.
//

impl Board {
    pub fn from_layout<S: AsRef<str>>(layout: S) -> Result<Board, LayoutParseError> {
        let mut grid = [[None; 8]; 8];
        let mut white_king = None;
        let mut black_king = None;

        let mut rows = layout.as_ref().split('/');
        for row in 0..8u8 {
            let row_str = rows.next().ok_or(LayoutParseError::UnexpectedEnd)?;
            let mut col = 0u8;
            for c in row_str.chars() {
                if let Some(run) = c.to_digit(10) {
                    if run < 1 || run > 8 {
                        return Err(LayoutParseError::InvalidDigit);
                    }

                    col += run as u8;
                    if col > 8 {
                        return Err(LayoutParseError::RowDoesNotSumToEight);
                    }

                    continue;
                }

                if col >= 8 {
                    return Err(LayoutParseError::RowDoesNotSumToEight);
                }

                let piece =
                    Piece::try_from(c).map_err(|_| LayoutParseError::UnknownPiece)?;
                let sq = Square::of(row, col);
                if piece.kind == PieceKind::King {
                    let cache = match piece.color {
                        Color::White => &mut white_king,
                        Color::Black => &mut black_king,
                    };
                    if cache.is_some() {
                        return Err(LayoutParseError::DuplicateKing(piece.color));
                    }

                    *cache = Some(sq);
                }

                grid[row as usize][col as usize] = Some(piece);
                col += 1;
            }

            if col != 8 {
                return Err(LayoutParseError::RowDoesNotSumToEight);
            }
        }

        if rows.next().is_some() {
            return Err(LayoutParseError::TooManyRows);
        }

        let white_king = white_king.ok_or(LayoutParseError::MissingKing(Color::White))?;
        let black_king = black_king.ok_or(LayoutParseError::MissingKing(Color::Black))?;
        Ok(Board {
            grid,
            white_king,
            black_king,
        })
    }

    pub fn as_layout(&self) -> String {
        let mut buf = String::new();
        for row in 0..8 {
            let mut empty_squares = 0;
            for col in 0..8 {
                if let Some(piece) = self.piece_at(Square::of(row, col)) {
                    if empty_squares != 0 {
                        write!(&mut buf, "{}", empty_squares).unwrap();
                    }
                    write!(&mut buf, "{}", piece).unwrap();
                    empty_squares = 0;
                } else {
                    empty_squares += 1;
                }
            }

            if empty_squares != 0 {
                write!(&mut buf, "{}", empty_squares).unwrap();
            }

            if row != 7 {
                buf.push('/');
            }
        }

        buf
    }

    /// The boundary encoding read by the UI: one ASCII character per square,
    /// uppercase = White, lowercase = Black, '-' = empty.
    pub fn char_grid(&self) -> [[char; 8]; 8] {
        let mut out = [['-'; 8]; 8];
        for row in 0..8 {
            for col in 0..8 {
                if let Some(piece) = self.piece_at(Square::of(row, col)) {
                    let mut s = piece.to_string();
                    out[row as usize][col as usize] = s.pop().unwrap();
                }
            }
        }

        out
    }
}

//
// Trait implementations
//

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..8 {
            for col in 0..8 {
                if let Some(piece) = self.piece_at(Square::of(row, col)) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " - ")?;
                }
            }

            writeln!(f, "| {}", 8 - row)?;
        }

        for _ in 0..8 {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for col in 0..8u8 {
            write!(f, " {} ", (b'a' + col) as char)?;
        }

        writeln!(f)?;
        Ok(())
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_layout())
    }
}
