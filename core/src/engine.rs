//! Slide-and-merge move engine.
//!
//! Every move is handled one line at a time. A line is the sequence of
//! cells in a row (Left/Right) or a column (Up/Down), ordered so that index
//! 0 sits against the wall the tiles are pushed into. Each line then goes
//! through compress, merge, compress.

use crate::board::{can_merge, Board};

/// The four directions tiles can be pushed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Left = 0,
    Up = 1,
    Right = 2,
    Down = 3,
}

impl Direction {
    /// Convert a u8 to a Direction (0=Left, 1=Up, 2=Right, 3=Down).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Left),
            1 => Some(Direction::Up),
            2 => Some(Direction::Right),
            3 => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Down,
        ]
    }

    /// Flat index of the `step`-th cell of line `line`, counted from the
    /// wall this direction pushes into.
    fn cell(self, side: usize, line: usize, step: usize) -> usize {
        let back = side - 1 - step;
        match self {
            Direction::Left => line * side + step,
            Direction::Right => line * side + back,
            Direction::Up => step * side + line,
            Direction::Down => back * side + line,
        }
    }
}

/// Push every tile on `board` towards `direction`, merging equal neighbors.
///
/// Returns the points earned, i.e. the sum of every newly formed tile.
/// Whether anything moved is left to the caller to decide by comparing
/// against a copy taken beforehand.
pub fn slide(board: &mut Board, direction: Direction) -> u64 {
    let side = board.side();
    let cells = board.cells_mut();
    let mut line = vec![0u32; side];
    let mut reward = 0;

    for l in 0..side {
        for (step, slot) in line.iter_mut().enumerate() {
            *slot = cells[direction.cell(side, l, step)];
        }
        reward += compress_and_merge(&mut line);
        for (step, &value) in line.iter().enumerate() {
            cells[direction.cell(side, l, step)] = value;
        }
    }

    reward
}

/// Whether pushing in `direction` would change `board`.
pub fn can_move(board: &Board, direction: Direction) -> bool {
    let mut probe = board.clone();
    slide(&mut probe, direction);
    probe != *board
}

/// Compress, merge once, compress again. Tiles move towards index 0.
///
/// Returns the points earned from merges.
pub fn compress_and_merge(line: &mut [u32]) -> u64 {
    compress(line);
    let reward = merge(line);
    compress(line);
    reward
}

/// Move every non-zero value towards index 0, keeping their order.
pub fn compress(line: &mut [u32]) {
    let mut write_idx = 0;
    for read_idx in 0..line.len() {
        if line[read_idx] != 0 {
            if write_idx != read_idx {
                line[write_idx] = line[read_idx];
                line[read_idx] = 0;
            }
            write_idx += 1;
        }
    }
}

/// Single merge pass over a compressed line, starting at the wall.
///
/// The rear tile of a merged pair is cleared, so the doubled tile can never
/// take part in a second merge during the same pass. Tiles already at
/// [`crate::MAX_TILE`] stay as they are.
fn merge(line: &mut [u32]) -> u64 {
    let mut reward = 0;
    for i in 1..line.len() {
        if can_merge(line[i - 1], line[i]) {
            line[i - 1] <<= 1;
            line[i] = 0;
            reward += u64::from(line[i - 1]);
        }
    }
    reward
}
