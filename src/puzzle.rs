use std::sync::Arc;

use crate::board::{Board, Piece};
use crate::direction::Direction;
use crate::error::{PuzzleError, SearchError};
use crate::grid::Grid;
use crate::point::Point;
use crate::{SearchConfig, SearchResult};

/// A puzzle being played: the shared grid, the board as it was handed over,
/// and the board as it is now.
#[derive(Debug, Clone)]
pub struct Puzzle {
    grid: Arc<Grid>,
    initial: Board,
    board: Board,
    history: Vec<Direction>,
}

impl Puzzle {
    pub fn new(grid: Grid, pieces: Vec<Piece>) -> Result<Puzzle, PuzzleError> {
        let board = Board::new(&grid, pieces)?;

        Ok(Puzzle {
            grid: Arc::new(grid),
            initial: board.clone(),
            board,
            history: Vec::new(),
        })
    }

    pub fn from_parts(
        width: isize,
        height: isize,
        barriers: &[Point],
        pieces: Vec<Piece>,
    ) -> Result<Puzzle, PuzzleError> {
        Puzzle::new(Grid::new(width, height, barriers)?, pieces)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn initial(&self) -> &Board {
        &self.initial
    }

    pub fn history(&self) -> &[Direction] {
        &self.history
    }

    /// Push the current board. Returns true if any piece moved or merged.
    pub fn apply(&mut self, direction: Direction) -> bool {
        let next = self.board.slide(&self.grid, direction);
        let changed = next != self.board;

        log::debug!(
            "{direction:?} ({}):\n{}",
            if changed { "moved" } else { "blocked" },
            next.stringify(&self.grid)
        );

        self.board = next;
        self.history.push(direction);
        changed
    }

    pub fn is_complete(&self) -> bool {
        self.board.is_solved()
    }

    /// Back to the board as it was handed over, history cleared.
    pub fn reset(&mut self) {
        self.board = self.initial.clone();
        self.history.clear();
    }

    /// The board reached by playing `moves` from the initial board.
    pub fn replay(&self, moves: &[Direction]) -> Board {
        moves
            .iter()
            .fold(self.initial.clone(), |board, &direction| {
                board.slide(&self.grid, direction)
            })
    }

    /// Search from the current board. The search works on its own copy.
    pub fn solve(&self, config: &SearchConfig) -> Result<SearchResult<Direction>, SearchError> {
        log::info!(
            "Solving with {} from:\n{}",
            config.strategy,
            self.board.stringify(&self.grid)
        );
        crate::solve(self.grid.as_ref(), &self.board, config)
    }

    pub fn stringify(&self) -> String {
        self.board.stringify(&self.grid)
    }
}
