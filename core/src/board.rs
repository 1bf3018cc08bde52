//! Square grid of tiles.
//!
//! Cells are stored row-major in a flat vector of `side * side` values, so
//! `index(row, col) = row * side + col`. A cell is either 0 (empty) or a
//! power of two no smaller than 2.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::error::{GameError, Result};
use crate::{MAX_SIDE, MAX_TILE, MIN_SIDE};

/// Returns true for 0 and for every power of two from 2 up to [`MAX_TILE`].
pub fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

/// Whether two neighboring cells combine when pushed together.
pub fn can_merge(a: u32, b: u32) -> bool {
    a != 0 && a == b && a < MAX_TILE
}

/// Checks that a requested side length is playable.
pub fn validate_side(side: usize) -> Result<usize> {
    if (MIN_SIDE..=MAX_SIDE).contains(&side) {
        Ok(side)
    } else {
        Err(GameError::InvalidSize { side })
    }
}

/// The playing field.
///
/// Two boards compare equal when they have the same side and the same value
/// in every cell; the session uses this to tell whether a move did anything.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Board {
    side: usize,
    cells: Vec<u32>,
}

impl Board {
    /// Create an empty board with the given side length.
    pub fn new(side: usize) -> Result<Self> {
        let side = validate_side(side)?;
        Ok(Board {
            side,
            cells: vec![0; side * side],
        })
    }

    /// Build a board from explicit row-major cell values.
    ///
    /// The cell count must be `side * side` and every value a valid tile.
    pub fn from_cells(side: usize, cells: Vec<u32>) -> Result<Self> {
        let side = validate_side(side)?;
        if cells.len() != side * side {
            return Err(GameError::CellCountMismatch {
                expected: side * side,
                actual: cells.len(),
            });
        }
        if let Some(&value) = cells.iter().find(|&&v| !is_valid_tile(v)) {
            return Err(GameError::InvalidTileValue { value });
        }
        Ok(Board { side, cells })
    }

    /// Resize to `side` and clear every cell.
    ///
    /// On an invalid side the board is left exactly as it was.
    pub fn reset(&mut self, side: usize) -> Result<()> {
        let side = validate_side(side)?;
        self.side = side;
        self.cells.clear();
        self.cells.resize(side * side, 0);
        Ok(())
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of cells, `side * side`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a board has at least `MIN_SIDE * MIN_SIDE` cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat row-major index of `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.side + col
    }

    /// Value at `(row, col)`, or `None` outside the board.
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.side && col < self.side {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Value at a flat index, or `None` outside the board.
    pub fn get_index(&self, index: usize) -> Option<u32> {
        self.cells.get(index).copied()
    }

    /// Overwrite one cell after validating both the index and the value.
    pub fn set(&mut self, index: usize, value: u32) -> Result<()> {
        if index >= self.cells.len() {
            return Err(GameError::CellOutOfRange {
                index,
                cells: self.cells.len(),
            });
        }
        if !is_valid_tile(value) {
            return Err(GameError::InvalidTileValue { value });
        }
        self.cells[index] = value;
        Ok(())
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [u32] {
        &mut self.cells
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of every tile on the board.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    /// Place a 2 or a 4 (even odds) on a uniformly chosen empty cell.
    ///
    /// Returns the index that received the tile.
    pub fn spawn_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize> {
        let empty_cells: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect();

        if empty_cells.is_empty() {
            return Err(GameError::BoardFull);
        }

        let value = if rng.gen_bool(0.5) { 2 } else { 4 };
        let idx = empty_cells[rng.gen_range(0..empty_cells.len())];
        self.cells[idx] = value;
        Ok(idx)
    }

    /// True when no move in any direction can change the board: every cell
    /// is occupied and no two row- or column-neighbors can merge.
    pub fn is_full(&self) -> bool {
        if self.cells.contains(&0) {
            return false;
        }

        let n = self.side;
        for row in 0..n {
            for col in 0..n {
                let here = self.cells[self.index(row, col)];
                if col + 1 < n && can_merge(here, self.cells[self.index(row, col + 1)]) {
                    return false;
                }
                if row + 1 < n && can_merge(here, self.cells[self.index(row + 1, col)]) {
                    return false;
                }
            }
        }
        true
    }

    /// True when some cell holds exactly `goal`.
    pub fn has_value(&self, goal: u32) -> bool {
        self.cells.contains(&goal)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ side: {} }}", self.side)?;
        for row in self.cells.chunks(self.side) {
            for &val in row {
                if val == 0 {
                    write!(f, "     .")?;
                } else {
                    write!(f, "{:6}", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = "+--------".repeat(self.side) + "+";
        writeln!(f, "{}", border)?;
        for row in self.cells.chunks(self.side) {
            write!(f, "|")?;
            for &val in row {
                if val == 0 {
                    write!(f, "   .    |")?;
                } else {
                    write!(f, "{:^8}|", val)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "{}", border)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    // -------------------------------------------------------------------------
    // Construction and reset
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(4).unwrap();
        assert_eq!(board.len(), 16);
        assert_eq!(board.empty_count(), 16);
        assert_eq!(board.max_tile(), 0);
    }

    #[test]
    fn test_side_bounds() {
        assert_eq!(Board::new(3), Err(GameError::InvalidSize { side: 3 }));
        assert_eq!(Board::new(13), Err(GameError::InvalidSize { side: 13 }));
        assert!(Board::new(4).is_ok());
        assert_eq!(Board::new(12).unwrap().len(), 144);
    }

    #[test]
    fn test_reset_resizes_and_clears() {
        let mut board = Board::from_cells(4, vec![2; 16]).unwrap();
        board.reset(6).unwrap();
        assert_eq!(board.side(), 6);
        assert_eq!(board.cells(), &[0; 36][..]);
    }

    #[test]
    fn test_invalid_reset_keeps_board() {
        let mut board = Board::from_cells(4, vec![2; 16]).unwrap();
        let before = board.clone();
        assert_eq!(board.reset(20), Err(GameError::InvalidSize { side: 20 }));
        assert_eq!(board, before);
    }

    #[test]
    fn test_from_cells_rejects_bad_input() {
        assert_eq!(
            Board::from_cells(4, vec![0; 15]),
            Err(GameError::CellCountMismatch {
                expected: 16,
                actual: 15
            })
        );
        let mut cells = vec![0; 16];
        cells[3] = 6;
        assert_eq!(
            Board::from_cells(4, cells),
            Err(GameError::InvalidTileValue { value: 6 })
        );
    }

    // -------------------------------------------------------------------------
    // Addressing
    // -------------------------------------------------------------------------

    #[test]
    fn test_row_major_addressing() {
        let mut board = Board::new(5).unwrap();
        board.set(board.index(2, 3), 8).unwrap();
        assert_eq!(board.get_index(13), Some(8));
        assert_eq!(board.get(2, 3), Some(8));
        assert_eq!(board.get(5, 0), None);
        assert_eq!(board.get_index(25), None);
    }

    #[test]
    fn test_set_validates() {
        let mut board = Board::new(4).unwrap();
        assert_eq!(
            board.set(16, 2),
            Err(GameError::CellOutOfRange { index: 16, cells: 16 })
        );
        assert_eq!(board.set(0, 1), Err(GameError::InvalidTileValue { value: 1 }));
        assert_eq!(board.set(0, 12), Err(GameError::InvalidTileValue { value: 12 }));
        assert_eq!(board.empty_count(), 16);
        board.set(0, 1024).unwrap();
        board.set(0, 0).unwrap();
        assert_eq!(board.empty_count(), 16);
    }

    #[test]
    fn test_tile_values_are_capped() {
        let mut board = Board::new(4).unwrap();
        assert_eq!(
            board.set(0, 1 << 31),
            Err(GameError::InvalidTileValue { value: 1 << 31 })
        );
        assert_eq!(board.get_index(0), Some(0));
        board.set(0, MAX_TILE).unwrap();

        let mut cells = vec![0; 16];
        cells[0] = 1 << 31;
        assert_eq!(
            Board::from_cells(4, cells),
            Err(GameError::InvalidTileValue { value: 1 << 31 })
        );
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    #[test]
    fn test_spawn_fills_an_empty_cell() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut board = Board::new(4).unwrap();
        let idx = board.spawn_random_tile(&mut rng).unwrap();
        let value = board.get_index(idx).unwrap();
        assert!(value == 2 || value == 4);
        assert_eq!(board.empty_count(), 15);
    }

    #[test]
    fn test_spawn_only_targets_last_empty_cell() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut cells = vec![2; 16];
        cells[9] = 0;
        let mut board = Board::from_cells(4, cells).unwrap();
        assert_eq!(board.spawn_random_tile(&mut rng), Ok(9));
    }

    #[test]
    fn test_spawn_on_full_board_fails() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut board = Board::from_cells(4, vec![2; 16]).unwrap();
        let before = board.clone();
        assert_eq!(board.spawn_random_tile(&mut rng), Err(GameError::BoardFull));
        assert_eq!(board, before);
    }

    #[test]
    fn test_failed_spawn_leaves_rng_untouched() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut twin = rng.clone();
        let mut board = Board::from_cells(4, vec![2; 16]).unwrap();
        assert!(board.spawn_random_tile(&mut rng).is_err());
        assert_eq!(rng.gen::<u64>(), twin.gen::<u64>());
    }

    #[test]
    fn test_spawn_produces_both_values() {
        let mut rng = SmallRng::seed_from_u64(99);
        let mut seen = [false; 2];
        for _ in 0..64 {
            let mut board = Board::new(4).unwrap();
            let idx = board.spawn_random_tile(&mut rng).unwrap();
            match board.get_index(idx) {
                Some(2) => seen[0] = true,
                Some(4) => seen[1] = true,
                other => panic!("unexpected tile {:?}", other),
            }
        }
        assert_eq!(seen, [true, true]);
    }

    // -------------------------------------------------------------------------
    // Terminal checks
    // -------------------------------------------------------------------------

    #[test]
    fn test_full_board_without_merges() {
        let board =
            Board::from_cells(4, vec![2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]).unwrap();
        assert!(board.is_full());
    }

    #[test]
    fn test_occupied_board_with_horizontal_merge_is_not_full() {
        let board = Board::from_cells(
            4,
            vec![2, 2, 4, 8, 4, 8, 16, 32, 8, 16, 32, 64, 16, 32, 64, 128],
        )
        .unwrap();
        assert!(!board.is_full());
    }

    #[test]
    fn test_occupied_board_with_vertical_merge_is_not_full() {
        let board = Board::from_cells(
            4,
            vec![2, 4, 8, 16, 2, 8, 16, 32, 4, 16, 32, 64, 8, 32, 64, 128],
        )
        .unwrap();
        assert!(!board.is_full());
    }

    #[test]
    fn test_is_full_uses_actual_side() {
        // Checkerboard on 5x5; only the bottom-right corner pair can merge.
        let mut cells: Vec<u32> = (0..25)
            .map(|i| if (i / 5 + i % 5) % 2 == 0 { 2 } else { 4 })
            .collect();
        let board = Board::from_cells(5, cells.clone()).unwrap();
        assert!(board.is_full());

        cells[24] = cells[23];
        let board = Board::from_cells(5, cells).unwrap();
        assert!(!board.is_full());
    }

    #[test]
    fn test_capped_neighbors_do_not_count_as_merges() {
        let mut cells = vec![2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2];
        cells[14] = MAX_TILE;
        cells[15] = MAX_TILE;
        assert!(Board::from_cells(4, cells).unwrap().is_full());
    }

    #[test]
    fn test_empty_cell_means_not_full() {
        let mut cells = vec![2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2];
        cells[15] = 0;
        assert!(!Board::from_cells(4, cells).unwrap().is_full());
    }

    #[test]
    fn test_has_value() {
        let mut board = Board::new(4).unwrap();
        assert!(!board.has_value(1024));
        board.set(5, 1024).unwrap();
        assert!(board.has_value(1024));
        assert!(!board.has_value(2048));
    }

    // -------------------------------------------------------------------------
    // Formatting
    // -------------------------------------------------------------------------

    #[test]
    fn test_display_scales_with_side() {
        let board = Board::new(6).unwrap();
        let text = format!("{}", board);
        let first = text.lines().next().unwrap();
        assert_eq!(first.matches('+').count(), 7);
        assert_eq!(text.lines().count(), 13);
    }
}
