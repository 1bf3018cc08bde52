//! Undo log.
//!
//! A stack of snapshots, newest on top. The bottom entry is the position the
//! game started from and cannot be popped; only [`History::reset`] replaces it.

use serde::Serialize;

use crate::board::Board;
use crate::error::{GameError, Result};

/// Board, score and move counter captured after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub board: Board,
    pub score: u64,
    pub move_number: u32,
}

#[derive(Debug, Clone)]
pub struct History {
    initial: Snapshot,
    later: Vec<Snapshot>,
}

impl History {
    /// Start a log whose permanent bottom entry is `initial`.
    pub fn new(initial: Snapshot) -> Self {
        History {
            initial,
            later: Vec::new(),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.later.push(snapshot);
    }

    /// Drop the newest entry and return the one below it.
    ///
    /// With only the initial entry left this fails with
    /// [`GameError::AtHistoryBoundary`] and the log is not touched.
    pub fn undo(&mut self) -> Result<&Snapshot> {
        if self.later.pop().is_none() {
            return Err(GameError::AtHistoryBoundary);
        }
        Ok(self.head())
    }

    /// The newest entry.
    pub fn head(&self) -> &Snapshot {
        self.later.last().unwrap_or(&self.initial)
    }

    /// Throw every entry away and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.initial = initial;
        self.later.clear();
    }

    /// Number of entries, never zero.
    pub fn len(&self) -> usize {
        self.later.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.later.iter().rev().chain(std::iter::once(&self.initial))
    }

    /// Move numbers from newest to oldest, e.g. `3, 2, 1`.
    pub fn move_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.iter().map(|s| s.move_number)
    }
}
