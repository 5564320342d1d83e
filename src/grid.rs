use crate::error::PuzzleError;
use crate::point::Point;

/// The fixed part of a puzzle: its size and which cells are barriers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: isize,
    height: isize,
    barriers: Vec<bool>,
}

impl Grid {
    pub fn new(width: isize, height: isize, barriers: &[Point]) -> Result<Self, PuzzleError> {
        let cells = width
            .checked_mul(height)
            .filter(|_| width > 0 && height > 0)
            .ok_or(PuzzleError::InvalidDimensions { width, height })?;

        let mut grid = Grid {
            width,
            height,
            barriers: vec![false; cells as usize],
        };

        for &barrier in barriers {
            let index = grid
                .index(barrier)
                .ok_or(PuzzleError::BarrierOutOfBounds(barrier))?;
            grid.barriers[index] = true;
        }

        Ok(grid)
    }

    pub fn width(&self) -> isize {
        self.width
    }

    pub fn height(&self) -> isize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.barriers.len()
    }

    pub fn in_bounds(&self, pt: Point) -> bool {
        pt.x >= 0 && pt.y >= 0 && pt.x < self.width && pt.y < self.height
    }

    pub fn is_barrier(&self, pt: Point) -> bool {
        match self.index(pt) {
            Some(index) => self.barriers[index],
            None => false,
        }
    }

    /// In bounds and not a barrier.
    pub fn is_open(&self, pt: Point) -> bool {
        self.index(pt).is_some_and(|index| !self.barriers[index])
    }

    /// Row-major index of an in-bounds point.
    pub fn index(&self, pt: Point) -> Option<usize> {
        if self.in_bounds(pt) {
            Some((pt.y * self.width + pt.x) as usize)
        } else {
            None
        }
    }

    pub fn barriers(&self) -> impl Iterator<Item = Point> + '_ {
        self.barriers
            .iter()
            .enumerate()
            .filter(|(_, &barrier)| barrier)
            .map(|(index, _)| Point {
                x: index as isize % self.width,
                y: index as isize / self.width,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_barriers() {
        let grid = Grid::new(3, 2, &[Point::new(1, 0)]).unwrap();

        assert!(grid.in_bounds(Point::new(2, 1)));
        assert!(!grid.in_bounds(Point::new(3, 0)));
        assert!(!grid.in_bounds(Point::new(0, -1)));

        assert!(grid.is_barrier(Point::new(1, 0)));
        assert!(!grid.is_barrier(Point::new(1, 1)));
        assert!(!grid.is_barrier(Point::new(5, 5)));

        assert!(grid.is_open(Point::new(0, 0)));
        assert!(!grid.is_open(Point::new(1, 0)));
        assert!(!grid.is_open(Point::new(-1, 0)));
    }

    #[test]
    fn test_barrier_out_of_bounds() {
        assert_eq!(
            Grid::new(2, 2, &[Point::new(2, 0)]),
            Err(PuzzleError::BarrierOutOfBounds(Point::new(2, 0)))
        );
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Grid::new(0, 3, &[]),
            Err(PuzzleError::InvalidDimensions { width: 0, height: 3 })
        ));
        assert!(Grid::new(1, 1, &[]).is_ok());
    }

    #[test]
    fn test_dimensions_too_large() {
        assert_eq!(
            Grid::new(isize::MAX, 2, &[]),
            Err(PuzzleError::InvalidDimensions {
                width: isize::MAX,
                height: 2
            })
        );
    }

    #[test]
    fn test_barrier_listing() {
        let barriers = [Point::new(0, 1), Point::new(2, 0)];
        let grid = Grid::new(3, 2, &barriers).unwrap();

        let mut listed = grid.barriers().collect::<Vec<_>>();
        listed.sort();
        assert_eq!(listed, vec![Point::new(0, 1), Point::new(2, 0)]);
        assert_eq!(grid.cell_count(), 6);
    }
}
