//! One game from setup to win or loss.

use std::fmt;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::board::Board;
use crate::engine::{self, Direction};
use crate::error::Result;
use crate::goal_for;
use crate::history::{History, Snapshot};

/// Where the game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Playing,
    /// A tile reached the goal value.
    Won,
    /// No move can change the board any more.
    Lost,
}

impl Status {
    pub fn is_over(self) -> bool {
        self != Status::Playing
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Playing => "playing",
            Status::Won => "won",
            Status::Lost => "lost",
        };
        f.write_str(text)
    }
}

/// One input from the player or the front end driving the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Undo,
    /// Start over on a board with the given side length.
    Reset(usize),
    /// Overwrite a single cell. Only meant for setting up tests and
    /// debugging: score, move counter, history and status are not touched.
    DebugSet { index: usize, value: u32 },
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        Command::Move(direction)
    }
}

/// State of the session after a command was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub board: Board,
    pub score: u64,
    pub move_number: u32,
    pub status: Status,
    /// Whether the board differs from before the command.
    pub changed: bool,
    /// Points earned by merges during this command.
    pub reward: u64,
}

/// A running game.
///
/// The session owns the board, the undo log and the random generator used
/// for spawning tiles. Turns are processed one at a time to completion.
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    score: u64,
    move_number: u32,
    goal: u32,
    status: Status,
    history: History,
    rng: SmallRng,
}

impl Session {
    /// Start a game with a generator seeded from the operating system.
    pub fn new(side: usize) -> Result<Self> {
        Self::with_rng(side, SmallRng::from_entropy())
    }

    /// Start a game whose tile spawns are fully determined by `seed`.
    pub fn with_seed(side: usize, seed: u64) -> Result<Self> {
        Self::with_rng(side, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(side: usize, mut rng: SmallRng) -> Result<Self> {
        let goal = goal_for(side)?;
        let board = seeded_board(side, &mut rng)?;
        let initial = Snapshot {
            board: board.clone(),
            score: 0,
            move_number: 1,
        };
        info!(side, goal, "new session");
        Ok(Session {
            board,
            score: 0,
            move_number: 1,
            goal,
            status: Status::Playing,
            history: History::new(initial),
            rng,
        })
    }

    /// Handle one command and report the resulting state.
    #[instrument(skip(self), fields(move_number = self.move_number))]
    pub fn apply(&mut self, command: Command) -> Result<TurnReport> {
        match command {
            Command::Move(direction) => self.step(direction),
            Command::Undo => self.undo(),
            Command::Reset(side) => self.reset(side),
            Command::DebugSet { index, value } => self.debug_set(index, value),
        }
    }

    /// Push the tiles towards `direction`.
    ///
    /// A move that leaves the board as it was costs nothing: no tile is
    /// spawned, the move counter stays put and no history entry is added.
    /// Once the game is won or lost, moves are ignored.
    pub fn step(&mut self, direction: Direction) -> Result<TurnReport> {
        if self.status.is_over() {
            debug!(?direction, status = %self.status, "move ignored, game is over");
            return Ok(self.report(false, 0));
        }

        let before = self.board.clone();
        let reward = engine::slide(&mut self.board, direction);
        let changed = self.board != before;

        if changed {
            self.score += reward;
            self.board.spawn_random_tile(&mut self.rng)?;
            self.move_number += 1;
            let snapshot = self.snapshot();
            self.history.push(snapshot);
        }
        debug!(?direction, changed, reward, "move");

        self.update_status();
        Ok(self.report(changed, reward))
    }

    /// Go back to the state before the last board-changing move.
    pub fn undo(&mut self) -> Result<TurnReport> {
        let previous = match self.history.undo() {
            Ok(snapshot) => snapshot.clone(),
            Err(err) => {
                warn!("undo requested at the start of the game");
                return Err(err);
            }
        };

        let changed = previous.board != self.board;
        self.board = previous.board;
        self.score = previous.score;
        self.move_number = previous.move_number;
        info!(move_number = self.move_number, score = self.score, "undo");

        self.update_status();
        Ok(self.report(changed, 0))
    }

    /// Throw the game away and start fresh on a `side` x `side` board.
    ///
    /// An invalid side is rejected and the current game carries on untouched.
    pub fn reset(&mut self, side: usize) -> Result<TurnReport> {
        let goal = match goal_for(side) {
            Ok(goal) => goal,
            Err(err) => {
                warn!(side, "reset rejected");
                return Err(err);
            }
        };

        self.board = seeded_board(side, &mut self.rng)?;
        self.goal = goal;
        self.score = 0;
        self.move_number = 1;
        self.status = Status::Playing;
        let initial = self.snapshot();
        self.history.reset(initial);
        info!(side, goal, "reset");

        Ok(self.report(true, 0))
    }

    /// Overwrite the cell at `index` with `value`.
    pub fn debug_set(&mut self, index: usize, value: u32) -> Result<TurnReport> {
        let old = self.board.get_index(index);
        self.board.set(index, value)?;
        debug!(index, value, "cell overwritten");
        Ok(self.report(old != Some(value), 0))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side(&self) -> usize {
        self.board.side()
    }

    /// Value at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<u32> {
        self.board.get(row, col)
    }

    /// Value at a flat row-major index.
    pub fn cell_at(&self, index: usize) -> Option<u32> {
        self.board.get_index(index)
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// Tile value that wins the game on this board size.
    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            score: self.score,
            move_number: self.move_number,
        }
    }

    fn report(&self, changed: bool, reward: u64) -> TurnReport {
        TurnReport {
            board: self.board.clone(),
            score: self.score,
            move_number: self.move_number,
            status: self.status,
            changed,
            reward,
        }
    }

    fn update_status(&mut self) {
        let status = if self.board.has_value(self.goal) {
            Status::Won
        } else if self.board.is_full() {
            Status::Lost
        } else {
            Status::Playing
        };

        if status != self.status {
            info!(from = %self.status, to = %status, score = self.score, "status changed");
            self.status = status;
        }
    }
}

/// Empty board of the given side with the two opening tiles placed.
fn seeded_board(side: usize, rng: &mut SmallRng) -> Result<Board> {
    let mut board = Board::new(side)?;
    board.spawn_random_tile(rng)?;
    board.spawn_random_tile(rng)?;
    Ok(board)
}
