//! Flat Monte Carlo move selection.
//!
//! Plays `games` random games from the current position, each starting with
//! a random legal first move, and records the win/loss ratio of every first
//! move together with how each opponent reply fared against it. The chosen
//! move is not the one with the best average but the one whose strongest
//! counterattack is weakest.
//!
//! Moves are returned under Chinese rules: multi-stone suicides are never
//! chosen even though the rules engine plays them inside playouts.
//!
//! Playouts run in parallel batches. Playout `k` seeds its generator from
//! `(params.seed, k)` and results are consumed in issue order, so the
//! decision only depends on the seed, never on thread count or batch size.

use std::fmt;
use std::str::FromStr;

use log::{Level, debug, info, log_enabled, warn};
use rayon::prelude::*;

use crate::board::{Board, Color, Point};
use crate::constants::{
    BATCH_SIZE, DEFAULT_SEED, LOSS_THRESHOLD, MC_GAMELEN, MC_GAMES, OPENING_MIN_HEIGHT,
    OPENING_MOVES, PASS_MOVE, PROB_HINT_ATARI, PROB_HINT_CAPTURE, PROB_HINT_LOCAL, RESIGN_MOVE,
    RESIGN_RATIO,
};
use crate::hint::Hint;
use crate::ledger::{Ledger, PairLedger};
use crate::playout::{FirstMove, Outcome, simulate};
use crate::position::{line_height, str_coord};

/// Engine configuration, read-only during a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    /// Playouts per decision
    pub games: usize,
    /// Playout length cap, counted in moves from the start of the game
    pub gamelen: usize,
    /// Resign when no move reaches this ratio
    pub resign_ratio: f32,
    /// Stop early if nothing was lost by this playout index
    pub loss_threshold: usize,
    /// Playouts issued per parallel batch
    pub batch: usize,
    /// Root of the per-playout random streams
    pub seed: u64,
    pub capture_rate: f32,
    pub atari_rate: f32,
    pub local_rate: f32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            games: MC_GAMES,
            gamelen: MC_GAMELEN,
            resign_ratio: RESIGN_RATIO,
            loss_threshold: LOSS_THRESHOLD,
            batch: BATCH_SIZE,
            seed: DEFAULT_SEED,
            capture_rate: PROB_HINT_CAPTURE,
            atari_rate: PROB_HINT_ATARI,
            local_rate: PROB_HINT_LOCAL,
        }
    }
}

impl EngineParams {
    /// Default parameters with a given playout budget.
    pub fn with_games(games: usize) -> Self {
        Self {
            games,
            ..Self::default()
        }
    }

    /// Apply `key=value` pairs separated by commas.
    pub fn apply(&mut self, arg: &str) -> Result<(), ParamError> {
        for item in arg.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = match item.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => return Err(ParamError::MissingValue(item.to_string())),
            };
            match key {
                "games" => self.games = parse_value(key, value)?,
                "gamelen" => self.gamelen = parse_value(key, value)?,
                "resign_ratio" => self.resign_ratio = parse_rate(key, value)?,
                "loss_threshold" => self.loss_threshold = parse_value(key, value)?,
                "batch" => self.batch = parse_value(key, value)?,
                "seed" => self.seed = parse_value(key, value)?,
                "capture_rate" => self.capture_rate = parse_rate(key, value)?,
                "atari_rate" => self.atari_rate = parse_rate(key, value)?,
                "local_rate" => self.local_rate = parse_rate(key, value)?,
                _ => return Err(ParamError::UnknownKey(key.to_string())),
            }
        }
        Ok(())
    }
}

impl FromStr for EngineParams {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut params = EngineParams::default();
        params.apply(s)?;
        Ok(params)
    }
}

/// A malformed engine argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    UnknownKey(String),
    InvalidValue { key: String, value: String },
    MissingValue(String),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::UnknownKey(key) => write!(f, "unknown engine parameter '{key}'"),
            ParamError::InvalidValue { key, value } => {
                write!(f, "invalid value '{value}' for engine parameter '{key}'")
            }
            ParamError::MissingValue(key) => write!(f, "engine parameter '{key}' needs a value"),
        }
    }
}

impl std::error::Error for ParamError {}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ParamError> {
    value.parse().map_err(|_| ParamError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_rate(key: &str, value: &str) -> Result<f32, ParamError> {
    let rate: f32 = parse_value(key, value)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ParamError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// The chosen move (a point, [`PASS_MOVE`] or [`RESIGN_MOVE`]) and the
/// winning ratio that justified it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub point: Point,
    pub ratio: f32,
}

impl Decision {
    fn pass() -> Self {
        Self {
            point: PASS_MOVE,
            ratio: 0.5,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.point == PASS_MOVE
    }

    pub fn is_resign(&self) -> bool {
        self.point == RESIGN_MOVE
    }
}

/// How the playout loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The whole budget was consumed.
    Budget,
    /// No loss by the loss threshold.
    EarlyStop,
    /// No legal move is left.
    Exhausted,
    /// Too many superko playouts, probably a triple ko.
    SuperkoLoop,
}

/// Everything a decision learned.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub decision: Decision,
    pub termination: Termination,
    /// Candidates with data and their ratio `1 - best opponent reply`, in
    /// board order.
    pub ranking: Vec<(Point, f32)>,
    pub first: Ledger,
    pub second: PairLedger,
    /// Budget units consumed
    pub playouts: usize,
    /// Playouts that produced a win or a loss
    pub good_games: usize,
    /// Playouts voided by superko
    pub superko: usize,
    /// Losses feeding the early stop
    pub losses: usize,
}

/// Choose a move for `color`.
pub fn select_move<B, H>(board: &B, color: Color, params: &EngineParams, hint: &H) -> Decision
where
    B: Board,
    H: Hint<B> + ?Sized,
{
    search(board, color, params, hint).decision
}

/// Run the playouts for one decision and rank the candidates.
pub fn search<B, H>(board: &B, color: Color, params: &EngineParams, hint: &H) -> SearchReport
where
    B: Board,
    H: Hint<B> + ?Sized,
{
    let opening = board.moves() < OPENING_MOVES;
    let batch = params.batch.max(1);

    let mut report = SearchReport {
        decision: Decision {
            point: RESIGN_MOVE,
            ratio: params.resign_ratio,
        },
        termination: Termination::Budget,
        ranking: Vec::new(),
        first: Ledger::new(),
        second: PairLedger::new(),
        playouts: 0,
        good_games: 0,
        superko: 0,
        losses: 0,
    };

    let mut issued = 0usize;
    let mut stopped = None;

    'collect: while report.playouts < params.games {
        let want = (params.games - report.playouts).min(batch);
        let outcomes: Vec<Outcome> = (issued..issued + want)
            .into_par_iter()
            .map(|k| {
                let mut rng = fastrand::Rng::with_seed(playout_seed(params.seed, k));
                simulate(board, color, FirstMove::Random, params, hint, &mut rng)
            })
            .collect();
        issued += want;

        for outcome in &outcomes {
            match outcome {
                Outcome::Exhausted => {
                    stopped = Some(Termination::Exhausted);
                    break 'collect;
                }
                Outcome::SuperkoInGame | Outcome::SuperkoAtRoot => {
                    // Voided playouts do not use up the budget
                    if report.superko > 2 * params.games {
                        stopped = Some(Termination::SuperkoLoop);
                        break 'collect;
                    }
                    report.superko += 1;
                }
                Outcome::MultiStoneSuicide(_) | Outcome::Rejected(_) => {
                    report.playouts += 1;
                }
                Outcome::Win { .. } | Outcome::Loss { .. } => {
                    let Some((first, reply, won)) = outcome.result() else {
                        continue;
                    };
                    let i = report.playouts;
                    report.playouts += 1;
                    report.good_games += 1;
                    report.second.record(first, reply, !won);

                    // Avoid opening on the first or second line
                    if opening && line_height(first) < OPENING_MIN_HEIGHT {
                        report.first.record(first, false);
                        continue;
                    }

                    report.first.record(first, won);
                    if !won {
                        report.losses += 1;
                    }
                    if report.losses == 0 && i == params.loss_threshold {
                        stopped = Some(Termination::EarlyStop);
                        break 'collect;
                    }
                }
            }
        }
    }

    report.termination = stopped.unwrap_or(Termination::Budget);
    match report.termination {
        Termination::Exhausted | Termination::SuperkoLoop => {
            if report.termination == Termination::SuperkoLoop {
                warn!("superko loop, passing; did we hit a triple ko?");
            }
            report.decision = Decision::pass();
        }
        _ if report.good_games == 0 => report.decision = Decision::pass(),
        _ => {
            let (decision, ranking) = rank(&report.first, &report.second, params.resign_ratio);
            report.decision = decision;
            report.ranking = ranking;
        }
    }

    log_report(&report);
    report
}

/// Pick the candidate whose best opponent reply is weakest.
///
/// Every point with first-level data is scored `1 - best_reply_ratio`. A
/// candidate replaces the current choice only with a strictly higher score,
/// and nothing at or below `resign_ratio` is chosen. The first-level win
/// ratio plays no part.
pub fn rank(first: &Ledger, second: &PairLedger, resign_ratio: f32) -> (Decision, Vec<(Point, f32)>) {
    let mut decision = Decision {
        point: RESIGN_MOVE,
        ratio: resign_ratio,
    };
    let mut ranking = Vec::new();
    for pt in first.candidates() {
        let ratio = 1.0 - second.best_reply_ratio(pt);
        if ratio > decision.ratio {
            decision = Decision { point: pt, ratio };
        }
        ranking.push((pt, ratio));
    }
    (decision, ranking)
}

/// Well-mixed seed for playout `k`.
fn playout_seed(seed: u64, k: usize) -> u64 {
    let mut z = seed.wrapping_add((k as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn log_report(report: &SearchReport) {
    if log_enabled!(Level::Debug) && !report.ranking.is_empty() {
        debug!("our board stats:\n{}", report.first.render());
        if !report.decision.is_resign() && !report.decision.is_pass() {
            let point = report.decision.point;
            debug!("opponent's reaction stats:\n{}", report.second.render(point));
            if let Some(reply) = report.second.best_reply(point) {
                debug!("strongest answer to {} is {}", str_coord(point), str_coord(reply));
            }
        }
    }
    info!(
        "*** WINNER is {} with score {:.4} ({} games, {} good, {} superko, {:?})",
        str_coord(report.decision.point),
        report.decision.ratio,
        report.playouts,
        report.good_games,
        report.superko,
        report.termination
    );
}
