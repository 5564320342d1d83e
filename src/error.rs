use thiserror::Error;

use crate::board::Piece;
use crate::point::Point;

/// A malformed grid, barrier layout or piece placement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("grid dimensions must be positive and addressable, got {width}x{height}")]
    InvalidDimensions { width: isize, height: isize },
    #[error("barrier at {0} is outside the grid")]
    BarrierOutOfBounds(Point),
    #[error("piece of color {} at {} is outside the grid", .0.color, .0.point)]
    PieceOutOfBounds(Piece),
    #[error("piece of color {} at {} sits on a barrier", .0.color, .0.point)]
    PieceOnBarrier(Piece),
    #[error("cell {point} holds pieces of colors {first} and {second}")]
    CellConflict { point: Point, first: u8, second: u8 },
}

/// A search that ran out of budget before it could finish.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("state limit reached after visiting {visited} states")]
    StateLimit { visited: usize },
}
