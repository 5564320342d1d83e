use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::PuzzleError;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::grid::Grid;
use crate::point::Point;
use crate::State;

pub type Color = u8;

// Field order gives the (color, x, y) ordering the fingerprint relies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub point: Point,
}

impl Piece {
    pub fn new(color: Color, x: isize, y: isize) -> Piece {
        Piece {
            color,
            point: Point { x, y },
        }
    }
}

/// The moving part of a puzzle: where every piece currently is.
///
/// Pieces are kept sorted and merged, so no two pieces share both color and
/// position and derived equality compares piece multisets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pieces: Vec<Piece>,
}

impl Board {
    /// Validate a caller supplied piece list against `grid`.
    ///
    /// Pieces must be in bounds and off barriers, and one cell may only hold
    /// a single color. Same colored pieces placed on one cell are merged.
    pub fn new(grid: &Grid, pieces: Vec<Piece>) -> Result<Board, PuzzleError> {
        let mut occupant: Vec<Option<Color>> = vec![None; grid.cell_count()];

        for piece in &pieces {
            let index = grid
                .index(piece.point)
                .ok_or(PuzzleError::PieceOutOfBounds(*piece))?;

            if grid.is_barrier(piece.point) {
                return Err(PuzzleError::PieceOnBarrier(*piece));
            }

            match occupant[index] {
                Some(color) if color != piece.color => {
                    return Err(PuzzleError::CellConflict {
                        point: piece.point,
                        first: color,
                        second: piece.color,
                    });
                }
                _ => occupant[index] = Some(piece.color),
            }
        }

        let mut board = Board { pieces };
        board.merge();
        Ok(board)
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn piece_at(&self, pt: Point) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.point == pt)
    }

    /// Push every piece in `direction` until nothing can move, then merge.
    ///
    /// Each round moves all unblocked pieces one cell at the same time. A piece
    /// is blocked by the edge, a barrier, or a piece of another color in the
    /// target cell as it was at the start of the round. A piece of its own
    /// color never blocks it.
    pub fn slide(&self, grid: &Grid, direction: Direction) -> Board {
        let delta = Point::from(direction);
        let mut next = self.clone();

        let mut occupant: Vec<Option<Color>> = vec![None; grid.cell_count()];
        let mut moving = Vec::with_capacity(next.pieces.len());

        loop {
            occupant.fill(None);
            for piece in &next.pieces {
                if let Some(index) = grid.index(piece.point) {
                    occupant[index] = Some(piece.color);
                }
            }

            moving.clear();
            moving.extend(next.pieces.iter().map(|piece| {
                let target = piece.point + delta;
                grid.is_open(target)
                    && grid
                        .index(target)
                        .and_then(|index| occupant[index])
                        .map_or(true, |color| color == piece.color)
            }));

            if !moving.contains(&true) {
                break;
            }

            for (piece, _) in next.pieces.iter_mut().zip(&moving).filter(|(_, m)| **m) {
                piece.point = piece.point + delta;
            }
        }

        next.merge();
        next
    }

    // Sorting first makes every duplicate adjacent, so one dedup collapses
    // any number of co-located same colored pieces
    fn merge(&mut self) {
        self.pieces.sort_unstable();
        self.pieces.dedup();
    }

    /// True when no color appears more than once.
    pub fn is_solved(&self) -> bool {
        // Sorted by color first
        self.pieces
            .windows(2)
            .all(|pair| pair[0].color != pair[1].color)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.pieces)
    }

    pub fn stringify(&self, grid: &Grid) -> String {
        let mut output = String::new();

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let pt = Point { x, y };
                let c = if grid.is_barrier(pt) {
                    '#'
                } else if let Some(piece) = self.piece_at(pt) {
                    std::char::from_digit(piece.color as u32, 10).unwrap_or('*')
                } else {
                    '.'
                };
                output.push(c);
            }
            output.push('\n');
        }

        output
    }
}

impl State<Grid> for Board {
    type Step = Direction;
    type Key = Fingerprint;

    fn next_states(&self, grid: &Grid) -> Vec<(Direction, Board)> {
        Direction::ALL
            .iter()
            .map(|&direction| (direction, self.slide(grid, direction)))
            .collect()
    }

    fn is_solved(&self, _grid: &Grid) -> bool {
        Board::is_solved(self)
    }

    fn key(&self) -> Fingerprint {
        self.fingerprint()
    }

    fn stringify(&self, grid: &Grid) -> String {
        Board::stringify(self, grid)
    }
}
