//! Toroidal binary grid and synchronous rule application.

use std::fmt;

use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

use crate::schema::{Rule, Seed};

/// Moore neighborhood offsets as (row, col).
const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Grid construction and seeding errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("Grid dimensions (rows, cols) must be non-zero")]
    EmptyGrid,
    #[error("Expected {expected} cells for a {rows}x{cols} grid, got {actual}")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Seed probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
}

/// Fixed-size boolean matrix whose edges wrap around.
///
/// Cells are stored row-major: index `row * cols + col`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all-dead grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        })
    }

    /// Create a grid from row-major cell states.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<bool>) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        if cells.len() != rows * cols {
            return Err(GridError::DimensionMismatch {
                rows,
                cols,
                expected: rows * cols,
                actual: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Create a grid from a matrix of rows. All rows must have equal length.
    pub fn from_rows(matrix: &[Vec<bool>]) -> Result<Self, GridError> {
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, Vec::len);
        let cells: Vec<bool> = matrix.iter().flatten().copied().collect();
        if matrix.iter().any(|row| row.len() != cols) {
            return Err(GridError::DimensionMismatch {
                rows,
                cols,
                expected: rows * cols,
                actual: cells.len(),
            });
        }
        Self::from_cells(rows, cols, cells)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells.
    #[inline]
    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Cell state. Panics if out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[self.idx(row, col)]
    }

    /// Cell state with toroidal wrapping of signed coordinates.
    #[inline]
    pub fn get_wrapped(&self, row: isize, col: isize) -> bool {
        let r = row.rem_euclid(self.rows as isize) as usize;
        let c = col.rem_euclid(self.cols as isize) as usize;
        self.cells[self.idx(r, c)]
    }

    /// Set a cell. Panics if out of range.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        let idx = self.idx(row, col);
        self.cells[idx] = alive;
    }

    /// Row-major cell states.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Kill every cell.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Apply a seed procedure.
    pub fn seed<R: Rng + ?Sized>(&mut self, seed: &Seed, rng: &mut R) -> Result<(), GridError> {
        match *seed {
            Seed::Random { probability } => self.seed_random(probability, rng),
            Seed::Center => {
                self.seed_center();
                Ok(())
            }
        }
    }

    /// Each cell becomes alive independently with the given probability.
    pub fn seed_random<R: Rng + ?Sized>(
        &mut self,
        probability: f64,
        rng: &mut R,
    ) -> Result<(), GridError> {
        let alive = Bernoulli::new(probability)
            .map_err(|_| GridError::InvalidProbability(probability))?;
        for cell in &mut self.cells {
            *cell = alive.sample(rng);
        }
        Ok(())
    }

    /// Clear the grid, then set the single cell at `(rows / 2, cols / 2)`.
    pub fn seed_center(&mut self) {
        self.clear();
        self.set(self.rows / 2, self.cols / 2, true);
    }

    /// Live cells among the 8 Moore neighbors, wrapping at the edges.
    ///
    /// On grids narrower than 3 cells several offsets land on the same cell;
    /// each offset is still counted.
    pub fn neighbor_count(&self, row: usize, col: usize) -> usize {
        let (row, col) = (row as isize, col as isize);
        MOORE_OFFSETS
            .iter()
            .filter(|&&(dr, dc)| self.get_wrapped(row + dr, col + dc))
            .count()
    }

    /// Compute the next generation into a fresh grid.
    pub fn step(&self, rule: &Rule) -> Grid {
        let mut next = Grid {
            rows: self.rows,
            cols: self.cols,
            cells: vec![false; self.area()],
        };
        self.step_into(rule, &mut next);
        next
    }

    /// Compute the next generation into `next`, which is resized if needed.
    ///
    /// Only `self` is read, so every cell sees the same generation.
    pub fn step_into(&self, rule: &Rule, next: &mut Grid) {
        if next.rows != self.rows || next.cols != self.cols {
            next.rows = self.rows;
            next.cols = self.cols;
            next.cells.clear();
            next.cells.resize(self.area(), false);
        }

        for (i, cell) in next.cells.iter_mut().enumerate() {
            let neighbors = self.neighbor_count(i / self.cols, i % self.cols);
            *cell = if self.cells[i] {
                rule.survives(neighbors)
            } else {
                rule.is_born(neighbors)
            };
        }
    }

    /// Number of live cells.
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Live and dead cell counts.
    pub fn count_live_dead(&self) -> (usize, usize) {
        let live = self.live_count();
        (live, self.area() - live)
    }

    /// Number of cells that differ from `other` (cell-wise XOR).
    pub fn diff_count(&self, other: &Grid) -> usize {
        debug_assert_eq!(self.area(), other.area());
        self.cells
            .iter()
            .zip(&other.cells)
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Cells that differ from the left-right mirrored grid.
    pub fn mirror_mismatch_lr(&self) -> usize {
        (0..self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| (r, c)))
            .filter(|&(r, c)| self.get(r, c) != self.get(r, self.cols - 1 - c))
            .count()
    }

    /// Cells that differ from the up-down mirrored grid.
    pub fn mirror_mismatch_ud(&self) -> usize {
        (0..self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| (r, c)))
            .filter(|&(r, c)| self.get(r, c) != self.get(self.rows - 1 - r, c))
            .count()
    }

    /// Copy of the cells as a matrix of rows, for rendering and export.
    pub fn snapshot(&self) -> Vec<Vec<bool>> {
        self.cells.chunks(self.cols).map(<[bool]>::to_vec).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().map(|&c| if c { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn grid_from_pattern(lines: &[&str]) -> Grid {
    let matrix: Vec<Vec<bool>> = lines
        .iter()
        .map(|line| line.chars().map(|c| c == '#').collect())
        .collect();
    Grid::from_rows(&matrix).unwrap()
}
