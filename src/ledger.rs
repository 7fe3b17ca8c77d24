//! Playout statistics.
//!
//! [`Ledger`] counts games and wins per candidate first move. [`PairLedger`]
//! counts, per candidate, how each opponent reply fared; its wins are the
//! *opponent's* wins. Both are dense arrays over board indices.

use std::fmt::Write;

use crate::board::Point;
use crate::constants::{BOARDSIZE, N, W};
use crate::position::board_points;

/// Games observed and games won for one point (or one pair of points).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveStat {
    pub games: u32,
    pub wins: u32,
}

impl MoveStat {
    /// Count one game, won or not. Keeps `wins <= games`.
    #[inline]
    pub fn record(&mut self, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
    }

    /// Win ratio, or `None` without data.
    #[inline]
    pub fn ratio(&self) -> Option<f32> {
        (self.games > 0).then(|| self.wins as f32 / self.games as f32)
    }
}

/// First-level ledger: candidate point -> statistic.
#[derive(Debug, Clone)]
pub struct Ledger {
    stats: Vec<MoveStat>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            stats: vec![MoveStat::default(); BOARDSIZE],
        }
    }

    #[inline]
    pub fn get(&self, pt: Point) -> &MoveStat {
        &self.stats[pt]
    }

    #[inline]
    pub fn record(&mut self, pt: Point, won: bool) {
        self.stats[pt].record(won);
    }

    /// Board points that have at least one recorded game, row-major.
    pub fn candidates(&self) -> impl Iterator<Item = Point> + '_ {
        board_points().filter(|&pt| self.stats[pt].games > 0)
    }

    /// Board-shaped dump of win percentages, for debug logging.
    pub fn render(&self) -> String {
        render_grid(|pt| self.stats[pt].ratio())
    }
}

/// Second-level ledger: (candidate, opponent reply) -> statistic, where a
/// win means the opponent won.
#[derive(Debug, Clone)]
pub struct PairLedger {
    stats: Vec<MoveStat>,
}

impl Default for PairLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PairLedger {
    pub fn new() -> Self {
        Self {
            stats: vec![MoveStat::default(); BOARDSIZE * BOARDSIZE],
        }
    }

    /// All reply statistics for one candidate, indexed by reply point.
    #[inline]
    pub fn replies(&self, first: Point) -> &[MoveStat] {
        &self.stats[first * BOARDSIZE..(first + 1) * BOARDSIZE]
    }

    #[inline]
    pub fn get(&self, first: Point, reply: Point) -> &MoveStat {
        &self.stats[first * BOARDSIZE + reply]
    }

    #[inline]
    pub fn record(&mut self, first: Point, reply: Point, opponent_won: bool) {
        self.stats[first * BOARDSIZE + reply].record(opponent_won);
    }

    /// The opponent's strongest counter to `first`: the best win ratio among
    /// its replies with data, or 0 if there is none.
    pub fn best_reply_ratio(&self, first: Point) -> f32 {
        self.replies(first)
            .iter()
            .filter_map(MoveStat::ratio)
            .fold(0.0, f32::max)
    }

    /// The reply achieving [`PairLedger::best_reply_ratio`], first in board
    /// order on ties.
    pub fn best_reply(&self, first: Point) -> Option<Point> {
        let replies = self.replies(first);
        let mut best: Option<(Point, f32)> = None;
        for (reply, stat) in replies.iter().enumerate() {
            if let Some(r) = stat.ratio() {
                if best.is_none_or(|(_, b)| r > b) {
                    best = Some((reply, r));
                }
            }
        }
        best.map(|(pt, _)| pt)
    }

    /// Board-shaped dump of the opponent's reply ratios against `first`.
    pub fn render(&self, first: Point) -> String {
        let replies = self.replies(first);
        render_grid(|pt| replies[pt].ratio())
    }
}

fn render_grid(ratio: impl Fn(Point) -> Option<f32>) -> String {
    let mut out = String::new();
    for row in 1..=N {
        let _ = write!(out, "{:2} ", N + 1 - row);
        for col in 1..=N {
            match ratio(row * W + col) {
                Some(r) => {
                    let _ = write!(out, "{:4}", (r * 100.0).round() as u32);
                }
                None => out.push_str("   ."),
            }
        }
        out.push('\n');
    }
    out
}
