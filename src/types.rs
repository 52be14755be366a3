// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use num_traits::{FromPrimitive, ToPrimitive};
use std::convert::TryFrom;
use std::fmt::{self, Display, Write};

// TableIndex is a trait for all types that can serve as an index into a table.
// It is common to use these types as indices into tables, so this trait allows
// any type implementing To and FromPrimitive to be used as table indices.
pub trait TableIndex {
    fn as_index(self) -> usize;
    fn from_index(idx: usize) -> Self;
}

impl<T> TableIndex for T
where
    T: FromPrimitive + ToPrimitive,
{
    fn as_index(self) -> usize {
        self.to_u32().unwrap() as usize
    }

    fn from_index(idx: usize) -> T {
        <T as FromPrimitive>::from_u64(idx as u64).unwrap()
    }
}

/// A square on the board, addressed by row and column, both 0 through 7.
/// Row 0 is Black's back rank (the rank rendered at the top of the board),
/// so White pawns advance toward smaller rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    pub fn of(row: u8, col: u8) -> Square {
        debug_assert!(row < 8 && col < 8);
        Square { row, col }
    }

    /// Bounds-checked constructor for coordinates arriving from outside the
    /// engine (UI event payloads).
    pub fn try_of(row: u8, col: u8) -> Option<Square> {
        if row < 8 && col < 8 {
            Some(Square { row, col })
        } else {
            None
        }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Steps off this square by the given row and column deltas, returning
    /// `None` when the step leaves the board. Every ray walk in the crate
    /// bottoms out here.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Square> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn towards(self, dir: Direction) -> Option<Square> {
        let (dr, dc) = dir.as_vector();
        self.offset(dr, dc)
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, 8 - self.row)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn toggle(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            Color::White => 'w',
            Color::Black => 'b',
        };
        f.write_char(chr)
    }
}

pub static COLORS: [Color; 2] = [Color::White, Color::Black];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// The kinds a pawn may promote to.
    pub fn is_promotion_choice(self) -> bool {
        match self {
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => true,
            PieceKind::Pawn | PieceKind::King => false,
        }
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        f.write_char(chr)
    }
}

pub static PIECE_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

/// The eight compass directions, in board coordinates: north points toward
/// row 0 (Black's back rank), so it is "up the board" from White's seat.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive, Serialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub fn as_vector(self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn is_diagonal(self) -> bool {
        let (dr, dc) = self.as_vector();
        dr != 0 && dc != 0
    }
}

pub static DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

pub static ORTHOGONALS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

pub static DIAGONALS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

pub static KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

bitflags! {
    pub struct CastleStatus: u8 {
        const NONE = 0;
        const WHITE_KINGSIDE = 0b0000_0001;
        const WHITE_QUEENSIDE = 0b0000_0010;
        const WHITE = Self::WHITE_KINGSIDE.bits | Self::WHITE_QUEENSIDE.bits;
        const BLACK_KINGSIDE = 0b0000_0100;
        const BLACK_QUEENSIDE = 0b0000_1000;
        const BLACK = Self::BLACK_KINGSIDE.bits | Self::BLACK_QUEENSIDE.bits;
    }
}

/// A piece on the board: kind and color, decided once when the square's
/// character encoding is parsed. The single-character encoding (uppercase =
/// White, lowercase = Black) lives only in `TryFrom<char>` and `Display`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Piece {
        Piece { kind, color }
    }
}

impl TryFrom<char> for Piece {
    type Error = ();

    fn try_from(c: char) -> Result<Self, Self::Error> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return Err(()),
        };

        Ok(Piece::new(kind, color))
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };

        match self.color {
            Color::White => f.write_char(chr.to_ascii_uppercase()),
            Color::Black => f.write_char(chr),
        }
    }
}

/// The origin and destination of the last applied move. Needed to recognize
/// the one-ply en-passant window after a double pawn advance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrevMove {
    pub from: Square,
    pub to: Square,
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::{Color, Direction, Piece, PieceKind, Square};

    #[test]
    fn square_display_is_algebraic() {
        // Row 0 is Black's back rank, so (0, 0) is a8 and (7, 7) is h1.
        assert_eq!("a8", Square::of(0, 0).to_string());
        assert_eq!("h1", Square::of(7, 7).to_string());
        assert_eq!("e4", Square::of(4, 4).to_string());
    }

    #[test]
    fn square_offset_bounds() {
        assert_eq!(None, Square::of(0, 0).offset(-1, 0));
        assert_eq!(None, Square::of(7, 7).offset(0, 1));
        assert_eq!(Some(Square::of(4, 3)), Square::of(5, 4).offset(-1, -1));
        assert_eq!(None, Square::try_of(8, 0));
        assert_eq!(Some(Square::of(3, 3)), Square::try_of(3, 3));
    }

    #[test]
    fn piece_char_encoding_round_trip() {
        let white_knight = Piece::try_from('N').unwrap();
        assert_eq!(PieceKind::Knight, white_knight.kind);
        assert_eq!(Color::White, white_knight.color);
        assert_eq!("N", white_knight.to_string());

        let black_queen = Piece::try_from('q').unwrap();
        assert_eq!(PieceKind::Queen, black_queen.kind);
        assert_eq!(Color::Black, black_queen.color);
        assert_eq!("q", black_queen.to_string());

        assert!(Piece::try_from('-').is_err());
        assert!(Piece::try_from('z').is_err());
    }

    #[test]
    fn direction_vectors() {
        // North walks toward row 0.
        assert_eq!((-1, 0), Direction::North.as_vector());
        assert!(Direction::NorthEast.is_diagonal());
        assert!(!Direction::East.is_diagonal());
    }

    #[test]
    fn promotion_choices() {
        assert!(PieceKind::Queen.is_promotion_choice());
        assert!(PieceKind::Knight.is_promotion_choice());
        assert!(!PieceKind::Pawn.is_promotion_choice());
        assert!(!PieceKind::King.is_promotion_choice());
    }
}
