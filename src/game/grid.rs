//! Letter grid: cell arena keyed by stable id, row spawn, clock shift, gravity.
//!
//! Row 0 is the loss edge (top of the board); row `rows - 1` is the spawn edge
//! where new letters enter.

use crate::Language;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::HashSet;

pub const GRID_ROWS: usize = 15;
pub const GRID_COLS: usize = 8;

const ENGLISH_ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

const ARABIC_ALPHABET: [char; 36] = [
    'ا', 'أ', 'إ', 'آ', 'ب', 'ت', 'ث', 'ج', 'ح', 'خ', 'د', 'ذ', 'ر', 'ز', 'س', 'ش', 'ص', 'ض', 'ط',
    'ظ', 'ع', 'غ', 'ف', 'ق', 'ك', 'ل', 'م', 'ن', 'ه', 'و', 'ي', 'ى', 'ة', 'ء', 'ئ', 'ؤ',
];

/// Letters a new cell may carry in `language`.
pub fn alphabet(language: Language) -> &'static [char] {
    match language {
        Language::English => &ENGLISH_ALPHABET,
        Language::Arabic => &ARABIC_ALPHABET,
    }
}

pub fn random_glyph<R: Rng + ?Sized>(language: Language, rng: &mut R) -> char {
    let letters = alphabet(language);
    letters[rng.gen_range(0..letters.len())]
}

/// Stable identity of a cell; survives moves, never reused within a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub id: CellId,
    pub glyph: char,
    pub row: usize,
    pub col: usize,
    pub selected: bool,
    /// Glyph was swapped by the replace power-up (cosmetic).
    pub replaced: bool,
}

/// Board contents. At most one cell per (row, col); rows and cols are always in bounds.
#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<Cell>,
    next_id: u64,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: Vec::with_capacity(rows * cols),
            next_id: 0,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.id == id)
    }

    pub fn at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Put a new cell at (row, col). Returns `None` if out of bounds or occupied.
    pub fn place(&mut self, row: usize, col: usize, glyph: char) -> Option<CellId> {
        if row >= self.rows || col >= self.cols || self.at(row, col).is_some() {
            return None;
        }
        let id = CellId(self.next_id);
        self.next_id += 1;
        self.cells.push(Cell {
            id,
            glyph,
            row,
            col,
            selected: false,
            replaced: false,
        });
        Some(id)
    }

    /// Fill the spawn-edge row with random letters. Occupied slots are left alone.
    pub fn spawn_row<R: Rng + ?Sized>(&mut self, language: Language, rng: &mut R) {
        let row = self.rows - 1;
        for col in 0..self.cols {
            let glyph = random_glyph(language, rng);
            self.place(row, col, glyph);
        }
    }

    /// Move every cell one row toward the loss edge.
    /// Returns false, leaving the grid untouched, if some cell is already on row 0.
    pub fn shift_toward_loss_edge(&mut self) -> bool {
        if self.cells.iter().any(|c| c.row == 0) {
            return false;
        }
        for cell in &mut self.cells {
            cell.row -= 1;
        }
        true
    }

    /// Drop the given cells. Returns how many were actually removed.
    pub fn remove(&mut self, ids: &HashSet<CellId>) -> usize {
        let before = self.cells.len();
        self.cells.retain(|c| !ids.contains(&c.id));
        before - self.cells.len()
    }

    /// Compact every column toward the spawn edge, keeping vertical order inside the column.
    /// A cell moves down by the number of empty slots beneath it.
    pub fn settle(&mut self) {
        let bottom = self.rows - 1;
        for col in 0..self.cols {
            let mut column: Vec<&mut Cell> = self.cells.iter_mut().filter(|c| c.col == col).collect();
            column.sort_by_key(|c| Reverse(c.row));
            for (depth, cell) in column.into_iter().enumerate() {
                cell.row = bottom - depth;
            }
        }
    }

    /// Smallest occupied row (closest to the loss edge); `rows` when empty.
    pub fn min_row(&self) -> usize {
        self.cells.iter().map(|c| c.row).min().unwrap_or(self.rows)
    }

    /// Largest occupied row (closest to the spawn edge).
    pub fn bottom_row(&self) -> Option<usize> {
        self.cells.iter().map(|c| c.row).max()
    }

    /// Orthogonal neighbour positions of (row, col) that lie inside the grid.
    pub fn neighbour_positions(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push((row - 1, col));
        }
        if row + 1 < self.rows {
            out.push((row + 1, col));
        }
        if col > 0 {
            out.push((row, col - 1));
        }
        if col + 1 < self.cols {
            out.push((row, col + 1));
        }
        out
    }

    /// Build a grid from a picture aligned to the spawn edge: the last line is the bottom row,
    /// `.` is an empty slot.
    #[cfg(test)]
    pub fn from_picture(rows: usize, cols: usize, picture: &[&str]) -> Self {
        let mut grid = Self::new(rows, cols);
        let top = rows - picture.len();
        for (i, line) in picture.iter().enumerate() {
            for (col, glyph) in line.chars().enumerate() {
                if glyph != '.' {
                    grid.place(top + i, col, glyph);
                }
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn positions(grid: &Grid) -> Vec<(CellId, usize, usize)> {
        let mut v: Vec<_> = grid.cells().iter().map(|c| (c.id, c.row, c.col)).collect();
        v.sort();
        v
    }

    fn assert_no_overlap(grid: &Grid) {
        let slots: HashSet<_> = grid.cells().iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(slots.len(), grid.len());
    }

    #[test]
    fn test_spawn_row_fills_bottom() {
        let mut grid = Grid::new(GRID_ROWS, GRID_COLS);
        let mut rng = StdRng::seed_from_u64(1);
        grid.spawn_row(Language::English, &mut rng);
        assert_eq!(grid.len(), GRID_COLS);
        assert!(grid.cells().iter().all(|c| c.row == GRID_ROWS - 1));
        assert!(grid.cells().iter().all(|c| c.glyph.is_ascii_uppercase()));
    }

    #[test]
    fn test_arabic_row_uses_arabic_letters() {
        let mut grid = Grid::new(GRID_ROWS, GRID_COLS);
        let mut rng = StdRng::seed_from_u64(2);
        grid.spawn_row(Language::Arabic, &mut rng);
        let letters = alphabet(Language::Arabic);
        assert!(grid.cells().iter().all(|c| letters.contains(&c.glyph)));
    }

    #[test]
    fn test_settle_drops_cells_over_gaps() {
        let mut grid = Grid::from_picture(4, 2, &["A.", "B.", ".C", "D."]);
        grid.settle();
        let col0: Vec<_> = (0..4).map(|r| grid.at(r, 0).map(|c| c.glyph)).collect();
        assert_eq!(col0, vec![None, Some('A'), Some('B'), Some('D')]);
        assert_eq!(grid.at(3, 1).map(|c| c.glyph), Some('C'));
        assert_no_overlap(&grid);
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut grid = Grid::from_picture(5, 3, &["A..", ".B.", "C.D", "...", "EF."]);
        grid.settle();
        let once = positions(&grid);
        grid.settle();
        assert_eq!(positions(&grid), once);
    }

    #[test]
    fn test_settle_only_touches_removed_column() {
        let mut grid = Grid::from_picture(4, 3, &["ABC", "DEF", "GHI"]);
        grid.settle();
        let before = positions(&grid);
        let removed = grid.at(2, 1).map(|c| c.id).unwrap();
        grid.remove(&HashSet::from([removed]));
        grid.settle();
        for (id, row, col) in positions(&grid) {
            let (_, old_row, _) = before.iter().find(|(i, _, _)| *i == id).copied().unwrap();
            if col == 1 {
                assert!(row >= old_row);
            } else {
                assert_eq!(row, old_row);
            }
        }
        assert_eq!(grid.at(2, 1).map(|c| c.glyph), Some('B'));
        assert_no_overlap(&grid);
    }

    #[test]
    fn test_shift_refuses_at_loss_edge() {
        let mut grid = Grid::from_picture(3, 1, &["A", "B", "C"]);
        let before = positions(&grid);
        assert!(!grid.shift_toward_loss_edge());
        assert_eq!(positions(&grid), before);

        let mut grid = Grid::from_picture(3, 1, &["B", "C"]);
        assert!(grid.shift_toward_loss_edge());
        assert_eq!(grid.min_row(), 0);
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_bounds() {
        let mut grid = Grid::new(2, 2);
        assert!(grid.place(1, 1, 'A').is_some());
        assert!(grid.place(1, 1, 'B').is_none());
        assert!(grid.place(2, 0, 'B').is_none());
        assert_eq!(grid.min_row(), 1);
        assert_eq!(Grid::new(2, 2).min_row(), 2);
    }

    #[test]
    fn test_neighbour_positions_at_corner() {
        let grid = Grid::new(GRID_ROWS, GRID_COLS);
        let n = grid.neighbour_positions(0, 0);
        assert_eq!(n, vec![(1, 0), (0, 1)]);
        assert_eq!(grid.neighbour_positions(5, 5).len(), 4);
    }
}
