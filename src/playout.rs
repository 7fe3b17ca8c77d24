//! Monte Carlo playouts (random game completion).
//!
//! A playout plays one candidate first move on a private copy of the board,
//! then alternates hint-guided or random moves until both sides pass or the
//! ply budget runs out, and scores the result for the candidate's color.

use log::trace;

use crate::board::{Board, Color, Move, MoveError, Point};
use crate::constants::{MIN_PLAYOUT_PLIES, PASS_MOVE};
use crate::engine::EngineParams;
use crate::hint::Hint;
use crate::position::str_coord;

/// How the candidate first move is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstMove {
    /// A uniformly random legal move picked by the rules engine.
    Random,
    /// A fixed point.
    At(Point),
}

/// What one playout produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The candidate's color won. `reply` is the opponent's first answer.
    Win { first: Point, reply: Point },
    /// The candidate's color lost.
    Loss { first: Point, reply: Point },
    /// No legal first move is left.
    Exhausted,
    /// The first move itself recreated an earlier position.
    SuperkoAtRoot,
    /// A superko cycle inside the playout; the sample is void.
    SuperkoInGame,
    /// The first move killed its own group.
    MultiStoneSuicide(Point),
    /// A fixed first move the rules engine refused.
    Rejected(MoveError),
}

impl Outcome {
    /// `(first, reply, won)` for finished games.
    pub fn result(&self) -> Option<(Point, Point, bool)> {
        match *self {
            Outcome::Win { first, reply } => Some((first, reply, true)),
            Outcome::Loss { first, reply } => Some((first, reply, false)),
            _ => None,
        }
    }
}

/// Play one game to the end from `board` starting with `first` for `color`.
///
/// `board` is never modified.
pub fn simulate<B, H>(
    board: &B,
    color: Color,
    first: FirstMove,
    params: &EngineParams,
    hint: &H,
    rng: &mut fastrand::Rng,
) -> Outcome
where
    B: Board,
    H: Hint<B> + ?Sized,
{
    let mut b2 = board.clone();

    let first = match first {
        FirstMove::Random => b2.play_random(color, rng),
        FirstMove::At(pt) => {
            if let Err(e) = b2.play(Move::new(pt, color)) {
                return Outcome::Rejected(e);
            }
            pt
        }
    };
    if first == PASS_MOVE {
        trace!("no moves left for {color}");
        return Outcome::Exhausted;
    }
    if !b2.group_at(first) {
        trace!("suicide detected at {}", str_coord(first));
        return Outcome::MultiStoneSuicide(first);
    }
    if b2.superko_violation() {
        return Outcome::SuperkoAtRoot;
    }

    let mut plies = params
        .gamelen
        .saturating_sub(b2.moves())
        .max(MIN_PLAYOUT_PLIES);
    let mut mover = color.other();
    let mut reply: Option<Point> = None;
    let mut passes = 0;

    // The candidate may have ignored an urgent answer to the opponent's last
    // move; if so the opponent gets to play it first.
    let mut urgent = hint.suggest(board, color, rng);
    if urgent != PASS_MOVE {
        // That answer comes on top of the ply budget
        plies += 1;
    }

    while plies > 0 && passes < 2 {
        plies -= 1;
        if urgent == PASS_MOVE {
            urgent = hint.suggest(&b2, mover, rng);
        }
        let pt = play_one(&mut b2, mover, urgent, rng);
        urgent = PASS_MOVE;
        reply.get_or_insert(pt);

        if b2.superko_violation() {
            // Suicides that repeat a position are harmless late-game noise
            if b2.group_at(pt) {
                trace!("superko at {} in playout", str_coord(pt));
                return Outcome::SuperkoInGame;
            }
            trace!("ignoring suicide superko at {}", str_coord(pt));
            b2.clear_superko_violation();
        }

        if pt == PASS_MOVE {
            passes += 1;
        } else {
            passes = 0;
        }
        mover = mover.other();
    }

    let score = b2.fast_score();
    let won = match color {
        Color::White => score > 0.0,
        Color::Black => score < 0.0,
    };
    let reply = reply.unwrap_or(PASS_MOVE);
    trace!(
        "{} {}: result {} (score {:.1})",
        color,
        str_coord(first),
        won as u8,
        score
    );

    if won {
        Outcome::Win { first, reply }
    } else {
        Outcome::Loss { first, reply }
    }
}

/// Play the urgent move if there is one and it is legal, otherwise a random
/// legal move. Returns the point played.
fn play_one<B: Board>(b: &mut B, color: Color, urgent: Point, rng: &mut fastrand::Rng) -> Point {
    if urgent != PASS_MOVE {
        match b.play(Move::new(urgent, color)) {
            Ok(()) => return urgent,
            Err(e) => trace!("urgent move {} rejected: {}", str_coord(urgent), e),
        }
    }
    b.play_random(color, rng)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::constants::{STONE_BLACK, W};
    use crate::hint::NoHint;
    use crate::position::{Position, board_points, parse_coord, play_move};

    const ROOT: Point = 30;
    const SPOT: Point = 42;
    const BAD: Point = 43;

    /// A rules engine stand-in with a fixed score and scripted random moves.
    #[derive(Clone)]
    struct Fake {
        moves: usize,
        score: f32,
        random_point: Point,
        random_superko: bool,
        spot_has_group: bool,
        superko: bool,
        random_calls: Arc<AtomicUsize>,
    }

    impl Fake {
        fn new(score: f32) -> Self {
            Self {
                moves: 0,
                score,
                random_point: PASS_MOVE,
                random_superko: false,
                spot_has_group: true,
                superko: false,
                random_calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn calls(&self) -> usize {
            self.random_calls.load(Ordering::SeqCst)
        }
    }

    impl Board for Fake {
        fn play(&mut self, mv: Move) -> Result<(), MoveError> {
            if mv.point == BAD {
                return Err(MoveError::Occupied);
            }
            self.moves += 1;
            Ok(())
        }

        fn play_random(&mut self, _color: Color, _rng: &mut fastrand::Rng) -> Point {
            self.random_calls.fetch_add(1, Ordering::SeqCst);
            self.moves += 1;
            if self.random_superko {
                self.superko = true;
            }
            self.random_point
        }

        fn group_at(&self, pt: Point) -> bool {
            pt == ROOT || (pt == SPOT && self.spot_has_group)
        }

        fn superko_violation(&self) -> bool {
            self.superko
        }

        fn clear_superko_violation(&mut self) {
            self.superko = false;
        }

        fn fast_score(&self) -> f32 {
            self.score
        }

        fn moves(&self) -> usize {
            self.moves
        }
    }

    /// Suggests one point and remembers the move count of every board it saw.
    struct Recording {
        point: Point,
        seen: Mutex<Vec<usize>>,
    }

    impl Hint<Fake> for Recording {
        fn suggest(&self, board: &Fake, _color: Color, _rng: &mut fastrand::Rng) -> Point {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(board.moves);
            }
            self.point
        }
    }

    fn params(gamelen: usize) -> EngineParams {
        EngineParams {
            gamelen,
            ..EngineParams::default()
        }
    }

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(11)
    }

    #[test]
    fn test_score_sign_decides_winner() {
        let white_ahead = Fake::new(5.5);
        let p = params(100);
        let out = simulate(&white_ahead, Color::White, FirstMove::At(ROOT), &p, &NoHint, &mut rng());
        assert_eq!(out, Outcome::Win { first: ROOT, reply: PASS_MOVE });
        let out = simulate(&white_ahead, Color::Black, FirstMove::At(ROOT), &p, &NoHint, &mut rng());
        assert_eq!(out, Outcome::Loss { first: ROOT, reply: PASS_MOVE });

        // A jigo is nobody's win
        let even = Fake::new(0.0);
        for color in [Color::Black, Color::White] {
            let out = simulate(&even, color, FirstMove::At(ROOT), &p, &NoHint, &mut rng());
            assert!(matches!(out, Outcome::Loss { .. }));
        }
    }

    #[test]
    fn test_double_pass_ends_game() {
        let board = Fake::new(1.0);
        simulate(&board, Color::Black, FirstMove::At(ROOT), &params(100), &NoHint, &mut rng());
        assert_eq!(board.calls(), 2);
    }

    #[test]
    fn test_ply_budget_is_clamped() {
        let mut board = Fake::new(1.0);
        board.random_point = SPOT;
        simulate(&board, Color::Black, FirstMove::At(ROOT), &params(0), &NoHint, &mut rng());
        assert_eq!(board.calls(), MIN_PLAYOUT_PLIES);

        let mut board = Fake::new(1.0);
        board.random_point = SPOT;
        board.moves = 5;
        // 30 minus the 6 moves played once the candidate is down
        simulate(&board, Color::Black, FirstMove::At(ROOT), &params(30), &NoHint, &mut rng());
        assert_eq!(board.calls(), 24);
    }

    #[test]
    fn test_exhausted_when_random_root_passes() {
        let board = Fake::new(1.0);
        let out = simulate(&board, Color::Black, FirstMove::Random, &params(100), &NoHint, &mut rng());
        assert_eq!(out, Outcome::Exhausted);
    }

    #[test]
    fn test_superko_with_group_voids_playout() {
        let mut board = Fake::new(1.0);
        board.random_point = SPOT;
        board.random_superko = true;
        let out = simulate(&board, Color::Black, FirstMove::At(ROOT), &params(100), &NoHint, &mut rng());
        assert_eq!(out, Outcome::SuperkoInGame);
        assert_eq!(board.calls(), 1);
    }

    #[test]
    fn test_superko_by_suicide_is_ignored() {
        let mut board = Fake::new(-1.0);
        board.random_point = SPOT;
        board.random_superko = true;
        board.spot_has_group = false;
        let out = simulate(&board, Color::Black, FirstMove::At(ROOT), &params(0), &NoHint, &mut rng());
        assert_eq!(out, Outcome::Win { first: ROOT, reply: SPOT });
        assert_eq!(board.calls(), MIN_PLAYOUT_PLIES);
    }

    #[test]
    fn test_superko_at_root() {
        let mut board = Fake::new(1.0);
        board.random_point = SPOT;
        board.random_superko = true;
        let out = simulate(&board, Color::Black, FirstMove::Random, &params(100), &NoHint, &mut rng());
        assert_eq!(out, Outcome::SuperkoAtRoot);
    }

    #[test]
    fn test_root_suicide_reported_before_superko() {
        let mut board = Fake::new(1.0);
        board.random_point = SPOT;
        board.random_superko = true;
        board.spot_has_group = false;
        let out = simulate(&board, Color::Black, FirstMove::Random, &params(100), &NoHint, &mut rng());
        assert_eq!(out, Outcome::MultiStoneSuicide(SPOT));
    }

    #[test]
    fn test_urgent_answer_does_not_use_a_ply() {
        // The hint answers once, then the random moves fill the budget
        struct Once;
        impl Hint<Fake> for Once {
            fn suggest(&self, board: &Fake, _color: Color, _rng: &mut fastrand::Rng) -> Point {
                if board.moves == 0 { SPOT } else { PASS_MOVE }
            }
        }
        let mut board = Fake::new(1.0);
        board.random_point = SPOT;
        simulate(&board, Color::Black, FirstMove::At(ROOT), &params(0), &Once, &mut rng());
        assert_eq!(board.calls(), MIN_PLAYOUT_PLIES);
    }

    #[test]
    fn test_rejected_fixed_move() {
        let board = Fake::new(1.0);
        let out = simulate(&board, Color::Black, FirstMove::At(BAD), &params(100), &NoHint, &mut rng());
        assert_eq!(out, Outcome::Rejected(MoveError::Occupied));
    }

    #[test]
    fn test_urgent_reply_comes_first() {
        let board = Fake::new(1.0);
        let hint = Recording {
            point: SPOT,
            seen: Mutex::new(Vec::new()),
        };
        let out = simulate(&board, Color::Black, FirstMove::At(ROOT), &params(0), &hint, &mut rng());
        assert_eq!(out, Outcome::Loss { first: ROOT, reply: SPOT });
        // The hint always answers, so no random move was needed
        assert_eq!(board.calls(), 0);

        let seen = hint.seen.lock().map(|s| s.clone()).unwrap_or_default();
        // First query on the untouched board, then one per ply after the
        // free urgent answer
        assert_eq!(seen[0], 0);
        assert_eq!(seen.len(), MIN_PLAYOUT_PLIES + 1);
        assert_eq!(seen[1], 2);
    }

    #[test]
    fn test_illegal_hint_falls_back_to_random() {
        let board = Fake::new(1.0);
        let hint = Recording {
            point: BAD,
            seen: Mutex::new(Vec::new()),
        };
        let out = simulate(&board, Color::Black, FirstMove::At(ROOT), &params(100), &hint, &mut rng());
        assert_eq!(out, Outcome::Loss { first: ROOT, reply: PASS_MOVE });
        assert_eq!(board.calls(), 2);
    }

    #[test]
    fn test_real_playout_finishes() {
        let pos = Position::new();
        let e5 = parse_coord("E5");
        let p = EngineParams::default();
        let hint = crate::hint::DomainHint::default();
        let out = simulate(&pos, Color::Black, FirstMove::At(e5), &p, &hint, &mut rng());
        match out.result() {
            Some((first, reply, _)) => {
                assert_eq!(first, e5);
                assert_ne!(reply, e5);
            }
            None => assert_eq!(out, Outcome::SuperkoInGame),
        }
        // The input position is untouched
        assert_eq!(pos.n, 0);
        assert_eq!(pos.hash, 0);
    }

    #[test]
    fn test_real_multi_stone_suicide() {
        let mut pos = Position::new();
        for (coord, color) in [("A1", Color::Black), ("A2", Color::White), ("B2", Color::White), ("C1", Color::White)] {
            play_move(&mut pos, Move::new(parse_coord(coord), color)).unwrap();
        }
        let b1 = parse_coord("B1");
        let out = simulate(&pos, Color::Black, FirstMove::At(b1), &params(100), &NoHint, &mut rng());
        assert_eq!(out, Outcome::MultiStoneSuicide(b1));
    }

    #[test]
    fn test_real_exhausted() {
        let mut pos = Position::new();
        for pt in board_points() {
            let (row, col) = (pt / W, pt % W);
            if row % 2 == 1 || col % 2 == 1 {
                pos.color[pt] = STONE_BLACK;
            }
        }
        let out = simulate(&pos, Color::Black, FirstMove::Random, &params(100), &NoHint, &mut rng());
        assert_eq!(out, Outcome::Exhausted);
    }
}
