//! Constants for board geometry, engine defaults and hint rates.
//!
//! The board uses a 1D array representation with padding for boundary detection.
//!
//! # Board Size Configuration
//!
//! The board size is controlled by Cargo features:
//! - `board9x9` (default): 9x9 board
//! - `board13x13`: 13x13 board
//! - `board19x19`: 19x19 board
//!
//! ```sh
//! cargo build                                               # 9x9 (default)
//! cargo build --no-default-features --features board19x19  # 19x19
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
#[cfg(feature = "board9x9")]
pub const N: usize = 9;

#[cfg(feature = "board13x13")]
pub const N: usize = 13;

#[cfg(feature = "board19x19")]
pub const N: usize = 19;

#[cfg(any(
    all(feature = "board9x9", feature = "board13x13"),
    all(feature = "board9x9", feature = "board19x19"),
    all(feature = "board13x13", feature = "board19x19"),
))]
compile_error!("Enable only one of 'board9x9', 'board13x13' and 'board19x19'");

#[cfg(not(any(feature = "board9x9", feature = "board13x13", feature = "board19x19")))]
compile_error!("Must enable exactly one board size feature: 'board9x9', 'board13x13' or 'board19x19'");

/// Row stride: N playable points plus one padding column shared by the
/// right edge of a row and the left edge of the next.
pub const W: usize = N + 1;

/// Total board array size including all padding.
pub const BOARDSIZE: usize = (N + 2) * W + 1;

// =============================================================================
// Special Move Values
// =============================================================================

/// Pass move marker (index 0 is padding, so safe to use).
pub const PASS_MOVE: usize = 0;

/// Resign move marker.
pub const RESIGN_MOVE: usize = usize::MAX;

// =============================================================================
// Engine Defaults
// =============================================================================

/// Default number of playouts per decision.
pub const MC_GAMES: usize = 40_000;

/// Default playout length cap (in moves, counted from the start of the game).
pub const MC_GAMELEN: usize = 400;

/// Effective ply budget never drops below this many moves.
pub const MIN_PLAYOUT_PLIES: usize = 10;

/// Winning ratio below which the engine resigns.
pub const RESIGN_RATIO: f32 = 0.1;

/// Playout index at which a loss-free search stops early.
pub const LOSS_THRESHOLD: usize = 5_000;

/// Playouts issued per parallel batch.
pub const BATCH_SIZE: usize = 256;

/// Default root of the per-playout random stream.
pub const DEFAULT_SEED: u64 = 0x6d6f_6e74_6563_6173;

/// While the game has fewer moves than this, the opening heuristic applies.
pub const OPENING_MOVES: usize = 3;

/// Opening candidates closer to the edge than this line height do not feed
/// the loss counter.
pub const OPENING_MIN_HEIGHT: usize = 2;

// =============================================================================
// Hint Probabilities
// =============================================================================

/// Probability of suggesting a capture of an opponent group in atari.
pub const PROB_HINT_CAPTURE: f32 = 0.9;

/// Probability of suggesting an escape for an own group in atari.
pub const PROB_HINT_ATARI: f32 = 0.9;

/// Probability of suggesting a 3x3 pattern reply next to the last move.
pub const PROB_HINT_LOCAL: f32 = 0.95;

// =============================================================================
// Neighbor Offsets
// =============================================================================

/// Offsets to neighboring points in the 1D board array.
/// Order: North, East, South, West, NE, SE, SW, NW
pub const DELTA: [isize; 8] = [
    -(W as isize),     // North (up one row)
    1,                 // East
    W as isize,        // South (down one row)
    -1,                // West
    -(W as isize) + 1, // NE
    W as isize + 1,    // SE
    W as isize - 1,    // SW
    -(W as isize) - 1, // NW
];

// =============================================================================
// Stone Color Constants (as bytes for direct comparison)
// =============================================================================

/// Black stone.
pub const STONE_BLACK: u8 = b'X';

/// White stone.
pub const STONE_WHITE: u8 = b'O';

/// Empty point.
pub const EMPTY: u8 = b'.';

/// Out of bounds (padding).
pub const OUT: u8 = b' ';

/// Komi used for a fresh position.
pub const KOMI: f32 = 7.5;
