//! Errors reported by the engine.

use crate::{MAX_SIDE, MIN_SIDE};

/// Convenience alias used throughout the crate.
pub type Result<T, E = GameError> = std::result::Result<T, E>;

/// Everything that can go wrong while driving a game.
///
/// None of these leave the board or the history half-updated: the request
/// is rejected before anything is mutated.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("board side {side} is outside {min}..={max}", min = MIN_SIDE, max = MAX_SIDE)]
    InvalidSize { side: usize },

    /// A tile was requested on a board without an empty cell.
    #[error("no empty cell left to place a tile")]
    BoardFull,

    #[error("cannot undo past the beginning of the game")]
    AtHistoryBoundary,

    #[error("expected {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },

    #[error("cell {index} is out of range for a board of {cells} cells")]
    CellOutOfRange { index: usize, cells: usize },

    /// Tiles are zero or a power of two no smaller than 2.
    #[error("{value} is not a valid tile value")]
    InvalidTileValue { value: u32 },
}
