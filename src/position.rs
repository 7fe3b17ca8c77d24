//! Go position representation and move execution.
//!
//! This module is the rules engine behind the [`Board`] seam:
//! - Board state using a 1D array with padding
//! - Stone placement and capture detection
//! - Simple ko, and positional superko flagged through Zobrist hashes
//! - Eye detection for playout move generation
//! - Fast area scoring
//!
//! The rules are New Zealand style: a multi-stone suicide is a legal move
//! that removes the suiciding group, a single-stone suicide is refused, and a
//! move recreating an earlier position is played but raises
//! `superko_violation`. Callers that need Chinese semantics filter on top.

use std::fmt;
use std::sync::OnceLock;

use crate::board::{Board, Color, Move, MoveError, Point};
use crate::constants::*;

/// Zobrist keys, one per (point, color).
static ZOBRIST: OnceLock<Vec<[u64; 2]>> = OnceLock::new();

fn make_zobrist() -> Vec<[u64; 2]> {
    let mut rng = fastrand::Rng::with_seed(0x9e37_79b9_7f4a_7c15);
    (0..BOARDSIZE).map(|_| [rng.u64(..), rng.u64(..)]).collect()
}

#[inline]
fn zobrist(pt: Point, stone: u8) -> u64 {
    let keys = ZOBRIST.get_or_init(make_zobrist);
    if stone == STONE_BLACK { keys[pt][0] } else { keys[pt][1] }
}

/// A Go position (board state).
#[derive(Clone)]
pub struct Position {
    /// Board state: 'X' = black, 'O' = white, '.' = empty, ' ' = out of bounds
    pub color: [u8; BOARDSIZE],
    /// Move number (0 = start of game), passes included
    pub n: usize,
    /// Ko point (0 if no ko)
    pub ko: Point,
    /// Last move played
    pub last: Point,
    /// Second-to-last move
    pub last2: Point,
    /// Stones captured by black and by white
    pub caps: [u32; 2],
    /// Komi (compensation points for White)
    pub komi: f32,
    /// Zobrist hash of the stones on the board
    pub hash: u64,
    /// Set when the last move recreated an earlier position
    pub superko_violation: bool,
    /// Hashes of every position reached so far
    history: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    pub fn new() -> Self {
        let mut p = Position {
            color: [OUT; BOARDSIZE],
            n: 0,
            ko: 0,
            last: 0,
            last2: 0,
            caps: [0; 2],
            komi: KOMI,
            hash: 0,
            superko_violation: false,
            history: Vec::new(),
        };
        empty_position(&mut p);
        p
    }
}

/// Reset a position to the initial empty board state. Komi is kept.
///
/// The board is laid out as a 1D array with padding:
/// - Index 0 to N: top padding (out of bounds)
/// - Each row: one padding cell + N playable points
/// - Bottom padding
pub fn empty_position(pos: &mut Position) {
    pos.color = [OUT; BOARDSIZE];
    for pt in board_points() {
        pos.color[pt] = EMPTY;
    }
    pos.n = 0;
    pos.ko = 0;
    pos.last = 0;
    pos.last2 = 0;
    pos.caps = [0; 2];
    pos.hash = 0;
    pos.superko_violation = false;
    pos.history.clear();
    pos.history.push(0);
}

/// All playable points, row by row from the top.
pub fn board_points() -> impl Iterator<Item = Point> {
    (1..=N).flat_map(|row| (1..=N).map(move |col| row * W + col))
}

/// Return the line number (0-indexed) from the nearest board edge.
pub fn line_height(pt: Point) -> usize {
    let row = pt / W;
    let col = pt % W;
    let row_dist = (row - 1).min(N - row);
    let col_dist = (col - 1).min(N - col);
    row_dist.min(col_dist)
}

/// Execute a pass move.
///
/// This increments the move counter and clears the ko and the superko flag.
pub fn pass_move(pos: &mut Position) {
    pos.n += 1;
    pos.last2 = pos.last;
    pos.last = PASS_MOVE;
    pos.ko = 0;
    pos.superko_violation = false;
}

/// Check if a point is "eyeish" (surrounded by stones of one color).
///
/// Returns the color of the surrounding stones, or 0 if not eyeish.
/// Note: This may return true for false eyes.
pub fn is_eyeish(pos: &Position, pt: Point) -> u8 {
    let mut eyecolor: u8 = 0;
    for n in neighbors(pt) {
        let c = pos.color[n];
        if c == OUT {
            continue;
        }
        if c == EMPTY {
            return 0;
        }
        if eyecolor == 0 {
            eyecolor = c;
        } else if c != eyecolor {
            return 0;
        }
    }
    eyecolor
}

/// Check if a point is a true eye.
///
/// A true eye is eyeish and has at most one "bad" diagonal at the edge,
/// zero in the center. A diagonal is "bad" if it holds an opponent stone.
/// Returns the color of the eye, or 0 if not a true eye.
pub fn is_eye(pos: &Position, pt: Point) -> u8 {
    let eyecolor = is_eyeish(pos, pt);
    if eyecolor == 0 {
        return 0;
    }
    let falsecolor = if eyecolor == STONE_BLACK {
        STONE_WHITE
    } else {
        STONE_BLACK
    };
    let mut at_edge = false;
    let mut false_count = 0;

    for d in diagonal_neighbors(pt) {
        if pos.color[d] == OUT {
            at_edge = true;
        } else if pos.color[d] == falsecolor {
            false_count += 1;
        }
    }

    let tolerance = if at_edge { 1 } else { 0 };
    if false_count > tolerance {
        return 0;
    }
    eyecolor
}

/// Play a move.
///
/// Handles passes, legality checking, captures, ko, multi-stone suicide and
/// superko flagging. A refused move leaves the position untouched.
pub fn play_move(pos: &mut Position, mv: Move) -> Result<(), MoveError> {
    if mv.is_pass() {
        pass_move(pos);
        return Ok(());
    }
    let pt = mv.point;
    if pos.color[pt] != EMPTY {
        return Err(MoveError::Occupied);
    }
    if pt == pos.ko {
        return Err(MoveError::Ko);
    }

    let own = mv.color.stone();
    let opp = mv.color.other().stone();

    // Playing into an enemy eye is what makes a single capture a ko
    let in_enemy_eye = is_eyeish(pos, pt) == opp;

    pos.color[pt] = own;
    let mut captured: Vec<Point> = Vec::new();
    for n in neighbors(pt) {
        if pos.color[n] == opp && !captured.contains(&n) && group_liberties(pos, n) == 0 {
            collect_group(pos, n, &mut captured);
        }
    }

    if captured.is_empty() && group_liberties(pos, pt) == 0 {
        let mut group = Vec::new();
        collect_group(pos, pt, &mut group);
        if group.len() == 1 {
            pos.color[pt] = EMPTY;
            return Err(MoveError::Suicide);
        }
        // Multi-stone suicide: the whole group goes
        pos.hash ^= zobrist(pt, own);
        for &r in &group {
            pos.color[r] = EMPTY;
            pos.hash ^= zobrist(r, own);
        }
        pos.caps[mv.color.other().index()] += group.len() as u32;
        pos.ko = 0;
    } else {
        pos.hash ^= zobrist(pt, own);
        for &r in &captured {
            pos.color[r] = EMPTY;
            pos.hash ^= zobrist(r, opp);
        }
        pos.caps[mv.color.index()] += captured.len() as u32;
        pos.ko = if captured.len() == 1 && in_enemy_eye {
            captured[0]
        } else {
            0
        };
    }

    // The flag describes the latest move only
    pos.superko_violation = pos.history.contains(&pos.hash);
    pos.history.push(pos.hash);

    pos.n += 1;
    pos.last2 = pos.last;
    pos.last = pt;
    Ok(())
}

/// Play a random legal move for `color`, never filling one of its own true
/// eyes. Passes and returns [`PASS_MOVE`] when nothing is playable.
pub fn play_random(pos: &mut Position, color: Color, rng: &mut fastrand::Rng) -> Point {
    let own = color.stone();
    let mut candidates: Vec<Point> = board_points()
        .filter(|&pt| pos.color[pt] == EMPTY && is_eye(pos, pt) != own)
        .collect();

    // Draw without replacement until one is legal
    while !candidates.is_empty() {
        let i = rng.usize(..candidates.len());
        let pt = candidates.swap_remove(i);
        if play_move(pos, Move::new(pt, color)).is_ok() {
            return pt;
        }
    }

    pass_move(pos);
    PASS_MOVE
}

/// Area estimate: komi plus stones and one-point territories, positive
/// when White is ahead.
pub fn fast_score(pos: &Position) -> f32 {
    let mut s = pos.komi;
    for pt in board_points() {
        let c = pos.color[pt];
        let effective = if c == EMPTY { is_eyeish(pos, pt) } else { c };
        match effective {
            STONE_WHITE => s += 1.0,
            STONE_BLACK => s -= 1.0,
            _ => {}
        }
    }
    s
}

/// Whether a stone occupies `pt`.
#[inline]
pub fn group_at(pos: &Position, pt: Point) -> bool {
    let c = pos.color[pt];
    c == STONE_BLACK || c == STONE_WHITE
}

/// Get the 4 orthogonal neighbors (N, E, S, W) of a point.
#[inline]
pub fn neighbors(pt: Point) -> [Point; 4] {
    [
        (pt as isize + DELTA[0]) as usize,
        (pt as isize + DELTA[1]) as usize,
        (pt as isize + DELTA[2]) as usize,
        (pt as isize + DELTA[3]) as usize,
    ]
}

/// Get the 4 diagonal neighbors (NE, SE, SW, NW) of a point.
#[inline]
fn diagonal_neighbors(pt: Point) -> [Point; 4] {
    [
        (pt as isize + DELTA[4]) as usize,
        (pt as isize + DELTA[5]) as usize,
        (pt as isize + DELTA[6]) as usize,
        (pt as isize + DELTA[7]) as usize,
    ]
}

/// Get all 8 neighbors (4 orthogonal + 4 diagonal) of a point.
#[inline]
pub fn all_neighbors(pt: Point) -> [Point; 8] {
    std::array::from_fn(|i| (pt as isize + DELTA[i]) as usize)
}

/// Collect all stones in a group starting from a point.
///
/// Appends the stones to `out` and returns how many were added.
pub fn collect_group(pos: &Position, start: Point, out: &mut Vec<Point>) -> u32 {
    let color = pos.color[start];
    let mut stack = vec![start];
    let mut visited = [false; BOARDSIZE];
    let mut count = 0u32;

    while let Some(pt) = stack.pop() {
        if visited[pt] {
            continue;
        }
        visited[pt] = true;

        if pos.color[pt] == color {
            out.push(pt);
            count += 1;
            for n in neighbors(pt) {
                if !visited[n] && pos.color[n] == color {
                    stack.push(n);
                }
            }
        }
    }
    count
}

/// Count the number of liberties (empty adjacent points) of a group.
pub fn group_liberties(pos: &Position, start: Point) -> u32 {
    liberty_points(pos, start, usize::MAX).len() as u32
}

/// Liberties of the group at `start`, stopping once `max` are found.
pub fn liberty_points(pos: &Position, start: Point, max: usize) -> Vec<Point> {
    let color = pos.color[start];
    let mut stack = vec![start];
    let mut visited = [false; BOARDSIZE];
    let mut libs = Vec::new();

    while let Some(pt) = stack.pop() {
        if visited[pt] {
            continue;
        }
        visited[pt] = true;

        for n in neighbors(pt) {
            match pos.color[n] {
                EMPTY => {
                    if !visited[n] {
                        visited[n] = true;
                        libs.push(n);
                        if libs.len() >= max {
                            return libs;
                        }
                    }
                }
                c if c == color && !visited[n] => stack.push(n),
                _ => {}
            }
        }
    }
    libs
}

/// Parse a coordinate string (e.g., "D4", "pass") into a Point.
///
/// Go coordinates use letters A-T (skipping I) for columns.
/// Returns `PASS_MOVE` for "pass" or input that is not on the board.
pub fn parse_coord(s: &str) -> Point {
    if s.eq_ignore_ascii_case("pass") {
        return PASS_MOVE;
    }

    let bytes = s.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() {
        return PASS_MOVE;
    }

    let col_char = bytes[0].to_ascii_uppercase();
    if col_char == b'I' {
        return PASS_MOVE;
    }
    let mut col = (col_char - b'A' + 1) as usize;
    // Skip 'I' column (Go convention to avoid confusion with 'J')
    if col_char > b'I' {
        col -= 1;
    }

    let digits = &bytes[1..];
    if digits.len() > 2 || !digits.iter().all(u8::is_ascii_digit) {
        return PASS_MOVE;
    }
    let row: usize = digits
        .iter()
        .fold(0, |acc, &b| acc * 10 + (b - b'0') as usize);

    if !(1..=N).contains(&col) || !(1..=N).contains(&row) {
        return PASS_MOVE;
    }
    (N - row + 1) * W + col
}

/// Convert a Point to a coordinate string (e.g., "D4").
///
/// Returns "pass" for `PASS_MOVE` and "resign" for `RESIGN_MOVE`.
pub fn str_coord(pt: Point) -> String {
    if pt == PASS_MOVE {
        return "pass".into();
    }
    if pt == RESIGN_MOVE {
        return "resign".into();
    }

    let row = pt / W;
    let col = pt % W;

    format!("{}{}", col_letter(col), N + 1 - row)
}

fn col_letter(col: usize) -> char {
    let mut c = (b'@' + col as u8) as char;
    if c >= 'I' {
        c = (c as u8 + 1) as char;
    }
    c
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 1..=N {
            write!(f, "{} ", col_letter(col))?;
        }
        writeln!(f)?;
        for row in 1..=N {
            write!(f, "{:2} ", N + 1 - row)?;
            for col in 1..=N {
                let pt = row * W + col;
                let ch = if pt == self.last { self.color[pt].to_ascii_lowercase() } else { self.color[pt] };
                write!(f, "{} ", ch as char)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "move {} komi {:.1} captures B {} W {}",
            self.n, self.komi, self.caps[0], self.caps[1]
        )
    }
}

impl Board for Position {
    fn play(&mut self, mv: Move) -> Result<(), MoveError> {
        play_move(self, mv)
    }

    fn play_random(&mut self, color: Color, rng: &mut fastrand::Rng) -> Point {
        play_random(self, color, rng)
    }

    fn group_at(&self, pt: Point) -> bool {
        group_at(self, pt)
    }

    fn superko_violation(&self) -> bool {
        self.superko_violation
    }

    fn clear_superko_violation(&mut self) {
        self.superko_violation = false;
    }

    fn fast_score(&self) -> f32 {
        fast_score(self)
    }

    fn moves(&self) -> usize {
        self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(pos: &mut Position, coord: &str, color: Color) -> Result<(), MoveError> {
        play_move(pos, Move::new(parse_coord(coord), color))
    }

    /// Play alternately Black, White, ... "pass" passes.
    fn setup_position(moves: &[&str]) -> Position {
        let mut pos = Position::new();
        let mut color = Color::Black;
        for mv in moves {
            play(&mut pos, mv, color).unwrap();
            color = color.other();
        }
        pos
    }

    fn ko_position() -> Position {
        // . X O .
        // X O . O
        // . X O .
        setup_position(&["C5", "D5", "B4", "C4", "C3", "E4", "pass", "D3"])
    }

    #[test]
    fn test_empty_position() {
        let pos = Position::new();
        let center = (N / 2 + 1) * W + (N / 2 + 1);
        assert_eq!(pos.color[center], EMPTY);
        assert_eq!(pos.n, 0);
        assert_eq!(pos.ko, 0);
        assert_eq!(board_points().count(), N * N);
        assert!(board_points().all(|pt| pos.color[pt] == EMPTY));
    }

    #[test]
    fn test_parse_str_coord_roundtrip() {
        for pt in board_points() {
            let s = str_coord(pt);
            assert_eq!(pt, parse_coord(&s), "Failed roundtrip for {}", s);
        }
    }

    #[test]
    fn test_parse_coord_rejects_off_board() {
        assert_eq!(parse_coord("Z1"), PASS_MOVE);
        assert_eq!(parse_coord("A0"), PASS_MOVE);
        assert_eq!(parse_coord("A99"), PASS_MOVE);
        assert_eq!(parse_coord("I3"), PASS_MOVE);
        assert_eq!(parse_coord("3A"), PASS_MOVE);
    }

    #[test]
    fn test_play_move_basic() {
        let mut pos = Position::new();
        let pt = parse_coord("D4");
        assert!(play(&mut pos, "D4", Color::Black).is_ok());
        assert_eq!(pos.n, 1);
        assert_eq!(pos.last, pt);
        assert_eq!(pos.color[pt], STONE_BLACK);
        assert_ne!(pos.hash, 0);
    }

    #[test]
    fn test_occupied() {
        let mut pos = Position::new();
        play(&mut pos, "D4", Color::Black).unwrap();
        assert_eq!(play(&mut pos, "D4", Color::White), Err(MoveError::Occupied));
        assert_eq!(pos.n, 1);
    }

    #[test]
    fn test_single_stone_suicide_refused() {
        let mut pos = setup_position(&["A2", "H8", "B1"]);
        let n = pos.n;
        let hash = pos.hash;
        assert_eq!(play(&mut pos, "A1", Color::White), Err(MoveError::Suicide));
        assert_eq!(pos.color[parse_coord("A1")], EMPTY);
        assert_eq!(pos.n, n);
        assert_eq!(pos.hash, hash);
    }

    #[test]
    fn test_multi_stone_suicide_removes_group() {
        let mut pos = setup_position(&["A1", "A2", "pass", "B2", "pass", "C1"]);
        assert!(play(&mut pos, "B1", Color::Black).is_ok());
        assert!(!group_at(&pos, parse_coord("A1")));
        assert!(!group_at(&pos, parse_coord("B1")));
        assert_eq!(pos.caps[Color::White.index()], 2);
        assert_eq!(pos.last, parse_coord("B1"));
    }

    #[test]
    fn test_capture() {
        let mut pos = setup_position(&["C4", "D4", "E4", "H8", "D3", "H9"]);
        assert!(play(&mut pos, "D5", Color::Black).is_ok());
        assert_eq!(pos.color[parse_coord("D4")], EMPTY);
        assert_eq!(pos.caps[Color::Black.index()], 1);
    }

    #[test]
    fn test_ko_rule() {
        let mut pos = ko_position();
        assert!(play(&mut pos, "D4", Color::Black).is_ok());
        assert_eq!(pos.color[parse_coord("C4")], EMPTY);
        assert_eq!(pos.ko, parse_coord("C4"));
        assert_eq!(play(&mut pos, "C4", Color::White), Err(MoveError::Ko));

        // A move elsewhere clears the ko
        play(&mut pos, "H8", Color::White).unwrap();
        assert_eq!(pos.ko, 0);
    }

    #[test]
    fn test_superko_flagged() {
        let mut pos = ko_position();
        let before = pos.hash;
        play(&mut pos, "D4", Color::Black).unwrap();
        play(&mut pos, "pass", Color::White).unwrap();
        play(&mut pos, "pass", Color::Black).unwrap();
        assert!(!pos.superko_violation);

        // Retaking after the passes recreates the earlier position
        play(&mut pos, "C4", Color::White).unwrap();
        assert_eq!(pos.hash, before);
        assert!(pos.superko_violation);
        pos.clear_superko_violation();
        assert!(!pos.superko_violation);
    }

    #[test]
    fn test_superko_flag_only_reflects_last_move() {
        let mut pos = ko_position();
        for (mv, color) in [("D4", Color::Black), ("pass", Color::White), ("pass", Color::Black), ("C4", Color::White)] {
            play(&mut pos, mv, color).unwrap();
        }
        assert!(pos.superko_violation);
        play(&mut pos, "H8", Color::Black).unwrap();
        assert!(!pos.superko_violation);

        // A pass clears it as well
        let mut pos = ko_position();
        for (mv, color) in [("D4", Color::Black), ("pass", Color::White), ("pass", Color::Black), ("C4", Color::White)] {
            play(&mut pos, mv, color).unwrap();
        }
        play(&mut pos, "pass", Color::Black).unwrap();
        assert!(!pos.superko_violation);
    }

    #[test]
    fn test_group_liberties() {
        let mut pos = Position::new();
        play(&mut pos, "D4", Color::Black).unwrap();
        assert_eq!(group_liberties(&pos, parse_coord("D4")), 4);
        play(&mut pos, "A1", Color::White).unwrap();
        assert_eq!(group_liberties(&pos, parse_coord("A1")), 2);
        assert_eq!(liberty_points(&pos, parse_coord("D4"), 1).len(), 1);
    }

    #[test]
    fn test_is_eye() {
        let pos = setup_position(&["A2", "pass", "B1"]);
        assert_eq!(is_eye(&pos, parse_coord("A1")), STONE_BLACK);
        assert_eq!(is_eye(&Position::new(), parse_coord("A1")), 0);
    }

    #[test]
    fn test_play_random_skips_own_eyes() {
        let mut pos = Position::new();
        // Black everywhere except isolated one-point eyes
        for pt in board_points() {
            let (row, col) = (pt / W, pt % W);
            if row % 2 == 1 || col % 2 == 1 {
                pos.color[pt] = STONE_BLACK;
            }
        }
        let mut rng = fastrand::Rng::with_seed(7);
        assert_eq!(play_random(&mut pos, Color::Black, &mut rng), PASS_MOVE);
        assert_eq!(pos.n, 1);
        // White may not fill them either: every one is a suicide
        assert_eq!(play_random(&mut pos, Color::White, &mut rng), PASS_MOVE);
    }

    #[test]
    fn test_play_random_plays_legal_move() {
        let mut pos = Position::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let pt = play_random(&mut pos, Color::White, &mut rng);
        assert_ne!(pt, PASS_MOVE);
        assert_eq!(pos.color[pt], STONE_WHITE);
    }

    #[test]
    fn test_fast_score() {
        let mut pos = Position::new();
        assert_eq!(fast_score(&pos), KOMI);
        play(&mut pos, "D4", Color::Black).unwrap();
        assert_eq!(fast_score(&pos), KOMI - 1.0);

        // A one-point eye counts for its owner
        let pos = setup_position(&["A2", "pass", "B1"]);
        assert_eq!(fast_score(&pos), KOMI - 3.0);
    }

    #[test]
    fn test_line_height() {
        assert_eq!(line_height(parse_coord("A1")), 0);
        assert_eq!(line_height(parse_coord("B2")), 1);
        assert_eq!(line_height(parse_coord("C5")), 2);
        assert_eq!(line_height(parse_coord("E5")), 4);
    }
}
