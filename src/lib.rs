//! Montecasino: a flat Monte Carlo Go engine.
//!
//! There is no search tree. Every decision plays a fixed number of random
//! games from the current position and keeps two tables: how each first move
//! fared, and how each opponent reply fared against it. The move whose best
//! reply is weakest gets played.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and engine defaults
//! - [`board`] - Colors, moves and the [`board::Board`] rules interface
//! - [`position`] - Padded 1-D board implementing the rules
//! - [`patterns`] - 3x3 shape patterns
//! - [`hint`] - Urgent-move suggestions for playouts
//! - [`playout`] - One random game and its outcome
//! - [`ledger`] - Win/loss tables for first moves and replies
//! - [`engine`] - Batched playouts and move selection
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use montecasino::board::{Color, Move};
//! use montecasino::engine::{EngineParams, select_move};
//! use montecasino::hint::DomainHint;
//! use montecasino::position::{Position, parse_coord, play_move, str_coord};
//!
//! let mut pos = Position::new();
//! play_move(&mut pos, Move::new(parse_coord("E5"), Color::Black)).unwrap();
//!
//! let params = EngineParams::with_games(200);
//! let decision = select_move(&pos, Color::White, &params, &DomainHint::default());
//! println!("White plays {} ({:.2})", str_coord(decision.point), decision.ratio);
//! ```

pub mod board;
pub mod constants;
pub mod engine;
pub mod gtp;
pub mod hint;
pub mod ledger;
pub mod patterns;
pub mod playout;
pub mod position;
