//! # Grid Reservation
//!
//! Symbolic occupancy grid over the rows one structure just produced.
//!
//! Rows run forward along the ribbon, columns are lateral lanes counted from
//! the left edge. A reservation claims a straight run of cells and fails if
//! any cell is taken or lies outside the grid. The addons executor turns
//! every accepted [`GridSegment`] into exactly one addon placement.
//!
//! One `GridCreator` is kept for the lifetime of the generator and reset for
//! every structure, so its cell storage is reused.

use rand::Rng;

use crate::error::{TrackError, TrackResult};

/// Direction of a reserved run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Along the ribbon: consecutive rows, one column.
    Vertical,
    /// Across the ribbon: one row, consecutive columns.
    Horizontal,
}

/// An accepted reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSegment {
    /// First row, relative to the grid.
    pub row: usize,
    /// First column.
    pub col: usize,
    /// Number of cells.
    pub length: usize,
    /// Run direction.
    pub orientation: Orientation,
}

impl GridSegment {
    /// Last row covered (inclusive).
    #[inline]
    #[must_use]
    pub const fn last_row(&self) -> usize {
        match self.orientation {
            Orientation::Vertical => self.row + self.length - 1,
            Orientation::Horizontal => self.row,
        }
    }

    /// Columns covered as a half-open range.
    #[inline]
    #[must_use]
    pub const fn col_span(&self) -> (usize, usize) {
        match self.orientation {
            Orientation::Vertical => (self.col, self.col + 1),
            Orientation::Horizontal => (self.col, self.col + self.length),
        }
    }

    /// Iterates the `(row, col)` cells of the run.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let Self {
            row,
            col,
            orientation,
            ..
        } = *self;
        (0..self.length).map(move |i| match orientation {
            Orientation::Vertical => (row + i, col),
            Orientation::Horizontal => (row, col + i),
        })
    }
}

/// Occupancy grid for one structure's addon phase.
#[derive(Clone, Debug, Default)]
pub struct GridCreator {
    rows: usize,
    cols: usize,
    row_offset: u64,
    occupied: Vec<bool>,
    candidates: Vec<(usize, usize)>,
}

impl GridCreator {
    /// Creates an empty `rows x cols` grid whose row 0 is absolute row
    /// `row_offset` of the row buffer.
    #[must_use]
    pub fn new(rows: usize, cols: usize, row_offset: u64) -> Self {
        let mut grid = Self::default();
        grid.reset(rows, cols, row_offset);
        grid
    }

    /// Re-scopes the grid to another structure, clearing every cell.
    ///
    /// Reuses the existing storage.
    pub fn reset(&mut self, rows: usize, cols: usize, row_offset: u64) {
        self.rows = rows;
        self.cols = cols;
        self.row_offset = row_offset;
        self.occupied.clear();
        self.occupied.resize(rows.saturating_mul(cols), false);
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Absolute row-buffer index of grid row 0.
    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> u64 {
        self.row_offset
    }

    /// Absolute row-buffer index of a grid row.
    #[inline]
    #[must_use]
    pub const fn absolute_row(&self, row: usize) -> u64 {
        self.row_offset + row as u64
    }

    /// Whether a cell is taken. Cells outside the grid report `false`.
    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.occupied[row * self.cols + col]
    }

    /// Number of cells taken.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&cell| cell).count()
    }

    fn fits_inside(&self, row: usize, col: usize, length: usize, orientation: Orientation) -> bool {
        if length == 0 {
            return false;
        }
        let (row_end, col_end) = match orientation {
            Orientation::Vertical => (row.checked_add(length), col.checked_add(1)),
            Orientation::Horizontal => (row.checked_add(1), col.checked_add(length)),
        };
        matches!((row_end, col_end), (Some(r), Some(c)) if r <= self.rows && c <= self.cols)
    }

    fn first_conflict(&self, segment: &GridSegment) -> Option<(usize, usize)> {
        segment.cells().find(|&(r, c)| self.occupied[r * self.cols + c])
    }

    fn reserve(
        &mut self,
        row: usize,
        col: usize,
        length: usize,
        orientation: Orientation,
    ) -> TrackResult<GridSegment> {
        if !self.fits_inside(row, col, length, orientation) {
            return Err(TrackError::GridOutOfRange {
                row,
                col,
                length,
                orientation,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let segment = GridSegment {
            row,
            col,
            length,
            orientation,
        };
        if let Some((row, col)) = self.first_conflict(&segment) {
            return Err(TrackError::GridOverlap { row, col });
        }
        for (r, c) in segment.cells() {
            self.occupied[r * self.cols + c] = true;
        }
        Ok(segment)
    }

    /// Reserves `length` rows in column `col`, starting at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::GridOutOfRange`] if the run leaves the grid or is
    /// empty, and [`TrackError::GridOverlap`] if any cell is taken. Nothing is
    /// reserved on failure.
    pub fn reserve_vertical(&mut self, row: usize, col: usize, length: usize) -> TrackResult<GridSegment> {
        self.reserve(row, col, length, Orientation::Vertical)
    }

    /// Reserves `length` columns in row `row`, starting at `col`.
    ///
    /// # Errors
    ///
    /// Same as [`GridCreator::reserve_vertical`].
    pub fn reserve_horizontal(&mut self, row: usize, col: usize, length: usize) -> TrackResult<GridSegment> {
        self.reserve(row, col, length, Orientation::Horizontal)
    }

    /// Reserves a free vertical run picked uniformly among all that fit.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::NoFit`] if no free run of that length exists.
    pub fn reserve_random_fitting_vertical<R: Rng + ?Sized>(
        &mut self,
        length: usize,
        rng: &mut R,
    ) -> TrackResult<GridSegment> {
        self.reserve_random(length, Orientation::Vertical, rng)
    }

    /// Reserves a free horizontal run picked uniformly among all that fit.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::NoFit`] if no free run of that length exists.
    pub fn reserve_random_fitting_horizontal<R: Rng + ?Sized>(
        &mut self,
        length: usize,
        rng: &mut R,
    ) -> TrackResult<GridSegment> {
        self.reserve_random(length, Orientation::Horizontal, rng)
    }

    fn reserve_random<R: Rng + ?Sized>(
        &mut self,
        length: usize,
        orientation: Orientation,
        rng: &mut R,
    ) -> TrackResult<GridSegment> {
        self.collect_fits(length, orientation);
        if self.candidates.is_empty() {
            return Err(TrackError::NoFit {
                length,
                orientation,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let (row, col) = self.candidates[rng.gen_range(0..self.candidates.len())];
        self.reserve(row, col, length, orientation)
    }

    /// Fills `candidates` with the origin of every free run, in row-major
    /// order.
    fn collect_fits(&mut self, length: usize, orientation: Orientation) {
        self.candidates.clear();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if !self.fits_inside(row, col, length, orientation) {
                    continue;
                }
                let segment = GridSegment {
                    row,
                    col,
                    length,
                    orientation,
                };
                if self.first_conflict(&segment).is_none() {
                    self.candidates.push((row, col));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_reserve_vertical_marks_cells() {
        let mut grid = GridCreator::new(6, 3, 10);
        let segment = grid.reserve_vertical(1, 2, 4).unwrap();

        assert_eq!(segment.last_row(), 4);
        assert_eq!(segment.col_span(), (2, 3));
        assert_eq!(grid.occupied_count(), 4);
        assert!(grid.is_occupied(4, 2));
        assert!(!grid.is_occupied(5, 2));
        assert_eq!(grid.absolute_row(3), 13);
    }

    #[test]
    fn test_overlap_rejected_without_side_effects() {
        let mut grid = GridCreator::new(4, 3, 0);
        grid.reserve_horizontal(2, 0, 3).unwrap();

        let err = grid.reserve_vertical(0, 1, 4).unwrap_err();
        assert_eq!(err, TrackError::GridOverlap { row: 2, col: 1 });
        // The failed run claimed nothing
        assert!(!grid.is_occupied(0, 1));
        assert_eq!(grid.occupied_count(), 3);
    }

    #[test]
    fn test_out_of_range() {
        let mut grid = GridCreator::new(4, 3, 0);

        assert!(matches!(
            grid.reserve_vertical(2, 0, 3),
            Err(TrackError::GridOutOfRange { .. })
        ));
        assert!(matches!(
            grid.reserve_horizontal(0, 1, 3),
            Err(TrackError::GridOutOfRange { .. })
        ));
        assert!(matches!(
            grid.reserve_vertical(0, 3, 1),
            Err(TrackError::GridOutOfRange { .. })
        ));
        assert!(matches!(
            grid.reserve_vertical(0, 0, 0),
            Err(TrackError::GridOutOfRange { .. })
        ));
        assert!(matches!(
            grid.reserve_vertical(usize::MAX, 0, 2),
            Err(TrackError::GridOutOfRange { .. })
        ));
    }

    #[test]
    fn test_random_fit_fills_grid_then_fails() {
        let mut grid = GridCreator::new(4, 3, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        // 3 columns of 4 rows hold exactly six vertical runs of two
        for _ in 0..6 {
            let segment = grid.reserve_random_fitting_vertical(2, &mut rng).unwrap();
            assert_eq!(segment.length, 2);
            assert!(segment.last_row() < 4);
        }
        assert_eq!(grid.occupied_count(), 12);
        assert!(matches!(
            grid.reserve_random_fitting_vertical(1, &mut rng),
            Err(TrackError::NoFit { .. })
        ));
    }

    #[test]
    fn test_random_fit_oversize_rejected() {
        let mut grid = GridCreator::new(2, 3, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(matches!(
            grid.reserve_random_fitting_horizontal(4, &mut rng),
            Err(TrackError::NoFit { .. })
        ));
        assert!(matches!(
            grid.reserve_random_fitting_vertical(3, &mut rng),
            Err(TrackError::NoFit { .. })
        ));
    }

    #[test]
    fn test_random_fit_is_seeded() {
        let pick = |seed| {
            let mut grid = GridCreator::new(8, 3, 0);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..5)
                .map(|_| grid.reserve_random_fitting_horizontal(1, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(7), pick(7));
    }

    #[test]
    fn test_reset_clears_cells() {
        let mut grid = GridCreator::new(2, 2, 0);
        grid.reserve_horizontal(0, 0, 2).unwrap();

        grid.reset(3, 2, 5);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.row_offset(), 5);
        grid.reserve_horizontal(0, 0, 2).unwrap();
    }
}
