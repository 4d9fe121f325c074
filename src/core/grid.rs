//! Grid Coordinates
//!
//! Cell addressing for the square puzzle grids. Cells use `(row, col)`
//! with `(0, 0)` in the top-left corner; wire input arrives as signed
//! integers and is validated before it becomes a `Cell`.

use serde::{Deserialize, Serialize};

/// One cell of a square puzzle grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Row index, 0 at the top.
    pub row: u8,
    /// Column index, 0 at the left.
    pub col: u8,
}

impl Cell {
    /// Creates a cell without bounds checking.
    pub fn new(row: u8, col: u8) -> Self {
        Cell { row, col }
    }

    /// Validates signed wire coordinates against a grid size.
    pub fn checked(row: i32, col: i32, size: u8) -> Option<Self> {
        if row < 0 || col < 0 || row >= i32::from(size) || col >= i32::from(size) {
            return None;
        }
        Some(Cell {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Row-major index of this cell in a `size` by `size` grid.
    #[inline]
    pub fn index(self, size: u8) -> usize {
        usize::from(self.row) * usize::from(size) + usize::from(self.col)
    }

    /// True when `other` is exactly one orthogonal step away.
    #[inline]
    pub fn is_adjacent4(self, other: Cell) -> bool {
        let dr = (i16::from(self.row) - i16::from(other.row)).abs();
        let dc = (i16::from(self.col) - i16::from(other.col)).abs();
        dr + dc == 1
    }

    /// True when `other` is one of the 8 surrounding cells.
    #[inline]
    pub fn is_adjacent8(self, other: Cell) -> bool {
        let dr = (i16::from(self.row) - i16::from(other.row)).abs();
        let dc = (i16::from(self.col) - i16::from(other.col)).abs();
        dr <= 1 && dc <= 1 && (dr, dc) != (0, 0)
    }
}

/// All cells of a `size` by `size` grid in row-major order.
pub fn all_cells(size: u8) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(usize::from(size) * usize::from(size));
    for row in 0..size {
        for col in 0..size {
            cells.push(Cell { row, col });
        }
    }
    cells
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_bounds() {
        assert_eq!(Cell::checked(0, 0, 5), Some(Cell::new(0, 0)));
        assert_eq!(Cell::checked(4, 4, 5), Some(Cell::new(4, 4)));
        assert_eq!(Cell::checked(-1, 0, 5), None);
        assert_eq!(Cell::checked(0, -3, 5), None);
        assert_eq!(Cell::checked(5, 0, 5), None);
        assert_eq!(Cell::checked(0, 17, 5), None);
    }

    #[test]
    fn test_adjacency() {
        let center = Cell::new(2, 2);

        // Orthogonal neighbors count for both kinds.
        assert!(center.is_adjacent4(Cell::new(1, 2)));
        assert!(center.is_adjacent8(Cell::new(1, 2)));

        // Diagonal neighbors only count for 8-adjacency.
        assert!(!center.is_adjacent4(Cell::new(1, 1)));
        assert!(center.is_adjacent8(Cell::new(1, 1)));

        // A cell is not adjacent to itself.
        assert!(!center.is_adjacent4(center));
        assert!(!center.is_adjacent8(center));

        // Two steps away is out of reach for both.
        assert!(!center.is_adjacent4(Cell::new(0, 2)));
        assert!(!center.is_adjacent8(Cell::new(0, 2)));
        assert!(!center.is_adjacent8(Cell::new(4, 4)));
    }

    #[test]
    fn test_row_major_order() {
        let cells = all_cells(3);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[1], Cell::new(0, 1));
        assert_eq!(cells[3], Cell::new(1, 0));
        assert_eq!(cells[8], Cell::new(2, 2));

        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.index(3), i);
        }
    }
}
