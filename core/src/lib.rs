//! # 1024 Game Core Engine
//!
//! Game logic for 1024, a sliding-tile merge puzzle in the 2048 family,
//! played on a square board of any side from 4 to 12. Each move pushes the
//! tiles towards one wall, merging equal neighbors once; a new 2 or 4 then
//! appears on a random empty cell. The game is won when a tile reaches the
//! goal for the board size and lost when no move can change the board.
//!
//! The crate performs no I/O. A front end feeds [`Command`]s into a
//! [`Session`] and renders the [`TurnReport`] it gets back.
//!
//! ## Example
//!
//! ```rust
//! use game_1024_core::{Command, Direction, Session};
//!
//! let mut session = Session::with_seed(4, 42).unwrap();
//! let report = session.apply(Command::Move(Direction::Left)).unwrap();
//! println!("Score: {}, Changed: {}", report.score, report.changed);
//! assert_eq!(session.goal(), 1024);
//! ```

pub mod board;
pub mod engine;
pub mod error;
pub mod history;
pub mod session;

pub use board::Board;
pub use engine::Direction;
pub use error::{GameError, Result};
pub use history::{History, Snapshot};
pub use session::{Command, Session, Status, TurnReport};

/// Smallest playable side length.
pub const MIN_SIDE: usize = 4;

/// Largest playable side length.
pub const MAX_SIDE: usize = 12;

/// Largest tile value the engine stores. Two tiles of this value do not
/// merge, so doubling never leaves `u32`.
pub const MAX_TILE: u32 = 1 << 30;

/// Goal on the smallest board; it doubles for every step away from it.
pub const BASE_GOAL: u32 = 1024;

/// Tile value that wins on a `side` x `side` board: `1024 * 2^|side - 4|`.
pub fn goal_for(side: usize) -> Result<u32> {
    let side = board::validate_side(side)?;
    Ok(BASE_GOAL << side.abs_diff(MIN_SIDE))
}
