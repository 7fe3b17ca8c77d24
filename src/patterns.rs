//! 3x3 shape patterns around an empty point.
//!
//! Each pattern is a 9-character string for a 3x3 grid read row by row,
//! centered on the candidate point:
//! - X: a stone of one color, O: a stone of the other color
//! - .: empty, #: edge of board (out of bounds)
//! - x: not X, o: not O, ?: anything
//!
//! All rotations, reflections and color swaps are expanded once into a
//! 65536-bit table indexed by the 16-bit code of the eight neighbors.

use std::sync::OnceLock;

use crate::board::Point;
use crate::constants::{DELTA, EMPTY, OUT, STONE_BLACK, STONE_WHITE};

const PAT3_SRC: &[&str] = &[
    "XOX...???", // hane: enclosing hane
    "XO....?.?", // hane: non-cutting hane
    "XO?X..x.?", // hane: magari
    ".O.X.....", // katatsuke or diagonal attachment
    "XO?O.o?o?", // cut1: unprotected cut
    "XO?O.X???", // cut1: peeped cut
    "?X?O.Oooo", // cut2
    "OX?o.O???", // cut keima
    "X.?O.?##?", // side: chase
    "OX?X.O###", // side: block side cut
    "?X?x.O###", // side: block side connection
    "?XOx.x###", // side: sagari
    "?OXX.O###", // side: cut
];

/// Grid cells other than the center, in code order.
const RING: [usize; 8] = [0, 1, 2, 3, 5, 6, 7, 8];

/// Board offset of each grid cell (index into [`DELTA`]), center excluded.
const RING_DELTA: [usize; 8] = [7, 0, 4, 3, 1, 6, 2, 5];

static PAT3SET: OnceLock<Vec<u64>> = OnceLock::new();

/// Whether the empty point `pt` matches any 3x3 pattern.
pub fn pat3_match(color: &[u8], pt: Point) -> bool {
    if color[pt] != EMPTY {
        return false;
    }
    let set = PAT3SET.get_or_init(make_pat3set);
    let mut code = 0usize;
    for (i, &d) in RING_DELTA.iter().enumerate() {
        let n = (pt as isize + DELTA[d]) as usize;
        let v = match color[n] {
            STONE_BLACK => 1,
            STONE_WHITE => 2,
            OUT => 3,
            _ => 0,
        };
        code |= v << (2 * i);
    }
    set[code >> 6] & (1 << (code & 63)) != 0
}

fn make_pat3set() -> Vec<u64> {
    let mut set = vec![0u64; 1024];
    for src in PAT3_SRC {
        let grid: [u8; 9] = match src.as_bytes().try_into() {
            Ok(g) => g,
            Err(_) => continue,
        };
        for sym in symmetries(&grid) {
            expand(&sym, 0, 0, &mut set);
            expand(&swap_colors(&sym), 0, 0, &mut set);
        }
    }
    set
}

/// The 8 rotations and reflections of a grid.
fn symmetries(grid: &[u8; 9]) -> Vec<[u8; 9]> {
    let mut out = Vec::with_capacity(8);
    let mut g = *grid;
    for _ in 0..4 {
        out.push(g);
        out.push(std::array::from_fn(|i| g[(i / 3) * 3 + (2 - i % 3)]));
        g = std::array::from_fn(|i| g[(2 - i % 3) * 3 + i / 3]);
    }
    out
}

fn swap_colors(grid: &[u8; 9]) -> [u8; 9] {
    grid.map(|c| match c {
        b'X' => b'O',
        b'O' => b'X',
        b'x' => b'o',
        b'o' => b'x',
        other => other,
    })
}

/// Set the bit of every concrete neighborhood the wildcard grid covers.
fn expand(grid: &[u8; 9], i: usize, code: usize, set: &mut [u64]) {
    if i == RING.len() {
        set[code >> 6] |= 1 << (code & 63);
        return;
    }
    let values: &[usize] = match grid[RING[i]] {
        b'.' => &[0],
        b'X' => &[1],
        b'O' => &[2],
        b'#' => &[3],
        b'x' => &[0, 2, 3],
        b'o' => &[0, 1, 3],
        _ => &[0, 1, 2, 3],
    };
    for &v in values {
        expand(grid, i + 1, code | v << (2 * i), set);
    }
}
