//! The rules-engine seam.
//!
//! The Monte Carlo core never touches board internals. Everything it needs
//! from a position goes through [`Board`]: copy it, play on it, ask it for a
//! random legal move, and score it. [`crate::position::Position`] is the
//! implementation shipped with the crate.

use std::fmt;

use crate::constants::{PASS_MOVE, STONE_BLACK, STONE_WHITE};

/// A point on the board, represented as an index into the 1D board array.
pub type Point = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The opponent's color.
    #[inline]
    pub fn other(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Stone byte used in the board array.
    #[inline]
    pub fn stone(self) -> u8 {
        match self {
            Color::Black => STONE_BLACK,
            Color::White => STONE_WHITE,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// Parse a GTP color ("b", "black", "w", "white").
    pub fn parse(s: &str) -> Option<Color> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A move: a point (or [`PASS_MOVE`]) played by a color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub point: Point,
    pub color: Color,
}

impl Move {
    pub fn new(point: Point, color: Color) -> Self {
        Self { point, color }
    }

    pub fn pass(color: Color) -> Self {
        Self::new(PASS_MOVE, color)
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        self.point == PASS_MOVE
    }
}

/// Why the rules engine refused a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Point is not empty
    Occupied,
    /// Move retakes a ko
    Ko,
    /// Single-stone suicide
    Suicide,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::Occupied => write!(f, "illegal move: point not EMPTY"),
            MoveError::Ko => write!(f, "illegal move: retakes ko"),
            MoveError::Suicide => write!(f, "illegal move: suicide"),
        }
    }
}

impl std::error::Error for MoveError {}

/// Capabilities the Monte Carlo core requires from a position.
///
/// Copies must be fully independent: playouts run on clones in parallel and
/// never observe each other.
pub trait Board: Clone + Send + Sync {
    /// Play a specific move. A refused move leaves the board untouched.
    fn play(&mut self, mv: Move) -> Result<(), MoveError>;

    /// Play a uniformly random legal move for `color` that does not fill one
    /// of its own eyes. Returns the point played, or [`PASS_MOVE`] after
    /// passing when no such move exists.
    fn play_random(&mut self, color: Color, rng: &mut fastrand::Rng) -> Point;

    /// Whether a stone group occupies `pt`.
    fn group_at(&self, pt: Point) -> bool;

    /// Whether the last move recreated an earlier whole-board position.
    fn superko_violation(&self) -> bool;

    fn clear_superko_violation(&mut self);

    /// Quick area estimate; positive favours White.
    fn fast_score(&self) -> f32;

    /// Number of moves played so far, passes included.
    fn moves(&self) -> usize;
}
