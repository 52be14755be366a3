// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! arbiter is a rules engine for two-player chess. It keeps the full game
//! state as an immutable value, publishes legal move sets for a selected
//! piece, and classifies terminal positions (checkmate, stalemate,
//! inactivity draws, resignation).
//!
//! The crate is driven entirely through [`Game::handle`]: construct a game
//! with [`Game::new`] and feed it [`Event`]s. The lower layers - board
//! representation, threat detection, move generation, and legality
//! filtering - are exposed for direct use as well.
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate serde_derive;

pub mod attacks;
pub mod board;
pub mod endgame;
pub mod game;
pub mod legality;
pub mod movegen;
pub mod types;

pub use crate::attacks::{threats_against, Threat, ThreatVec};
pub use crate::board::{Board, LayoutParseError};
pub use crate::endgame::{
    is_check, is_checkmate, is_stalemate, INACTIVITY_DRAW_HALFMOVES,
};
pub use crate::game::{CapturedTally, Event, Game, Phase};
pub use crate::legality::legal_moves;
pub use crate::movegen::{pseudo_legal, PseudoMoves};
pub use crate::types::{
    CastleStatus, Color, Direction, Piece, PieceKind, PrevMove, Square,
};
