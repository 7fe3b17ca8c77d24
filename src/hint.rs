//! Urgent-move hints.
//!
//! A playout asks its [`Hint`] for a move before every ply and only plays
//! randomly when the hint passes or suggests an illegal point. Hints must not
//! change the board they look at.

use crate::board::{Color, Move, Point};
use crate::constants::{PASS_MOVE, PROB_HINT_ATARI, PROB_HINT_CAPTURE, PROB_HINT_LOCAL};
use crate::engine::EngineParams;
use crate::patterns::pat3_match;
use crate::position::{Position, all_neighbors, group_liberties, liberty_points, neighbors, play_move};

pub trait Hint<B>: Sync {
    /// A point `color` should urgently play, or [`PASS_MOVE`].
    fn suggest(&self, board: &B, color: Color, rng: &mut fastrand::Rng) -> Point;
}

/// Never suggests anything: playouts become uniformly random.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHint;

impl<B> Hint<B> for NoHint {
    fn suggest(&self, _board: &B, _color: Color, _rng: &mut fastrand::Rng) -> Point {
        PASS_MOVE
    }
}

/// Local tactics around the last move, each tried with its own probability:
/// capture, escape from atari, then a 3x3 shape reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainHint {
    pub capture_rate: f32,
    pub atari_rate: f32,
    pub local_rate: f32,
}

impl Default for DomainHint {
    fn default() -> Self {
        Self {
            capture_rate: PROB_HINT_CAPTURE,
            atari_rate: PROB_HINT_ATARI,
            local_rate: PROB_HINT_LOCAL,
        }
    }
}

impl DomainHint {
    pub fn from_params(params: &EngineParams) -> Self {
        Self {
            capture_rate: params.capture_rate,
            atari_rate: params.atari_rate,
            local_rate: params.local_rate,
        }
    }
}

impl Hint<Position> for DomainHint {
    fn suggest(&self, pos: &Position, color: Color, rng: &mut fastrand::Rng) -> Point {
        if pos.last == PASS_MOVE {
            return PASS_MOVE;
        }
        if rng.f32() < self.capture_rate {
            if let Some(pt) = capture_move(pos, color) {
                return pt;
            }
        }
        if rng.f32() < self.atari_rate {
            if let Some(pt) = escape_move(pos, color) {
                return pt;
            }
        }
        if rng.f32() < self.local_rate {
            if let Some(pt) = pattern_move(pos, rng) {
                return pt;
            }
        }
        PASS_MOVE
    }
}

/// The last move and its orthogonal neighbors.
fn around_last(pos: &Position) -> impl Iterator<Item = Point> {
    std::iter::once(pos.last).chain(neighbors(pos.last))
}

/// Liberty of an opponent group in atari touching the last move.
fn capture_move(pos: &Position, color: Color) -> Option<Point> {
    let opp = color.other().stone();
    around_last(pos)
        .filter(|&pt| pos.color[pt] == opp)
        .find_map(|pt| single_liberty(pos, pt))
}

/// Liberty of an own group in atari next to the last move, if extending
/// there gets it out of atari.
fn escape_move(pos: &Position, color: Color) -> Option<Point> {
    let own = color.stone();
    neighbors(pos.last)
        .into_iter()
        .filter(|&pt| pos.color[pt] == own)
        .filter_map(|pt| single_liberty(pos, pt))
        .find(|&lib| {
            let mut after = pos.clone();
            play_move(&mut after, Move::new(lib, color)).is_ok() && group_liberties(&after, lib) >= 2
        })
}

/// A random empty neighbor of the last move that matches a shape pattern.
fn pattern_move(pos: &Position, rng: &mut fastrand::Rng) -> Option<Point> {
    let matches: Vec<Point> = all_neighbors(pos.last)
        .into_iter()
        .filter(|&pt| pat3_match(&pos.color, pt))
        .collect();
    if matches.is_empty() {
        None
    } else {
        Some(matches[rng.usize(..matches.len())])
    }
}

fn single_liberty(pos: &Position, pt: Point) -> Option<Point> {
    let libs = liberty_points(pos, pt, 2);
    if libs.len() == 1 { Some(libs[0]) } else { None }
}
