use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::point::Point;

/// A push applied to every piece on the board at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl From<Direction> for Point {
    fn from(direction: Direction) -> Point {
        match direction {
            Direction::Up => Point { x: 0, y: -1 },
            Direction::Down => Point { x: 0, y: 1 },
            Direction::Left => Point { x: -1, y: 0 },
            Direction::Right => Point { x: 1, y: 0 },
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = anyhow::Error;

    fn try_from(value: char) -> Result<Self> {
        match value {
            'U' | 'u' | '↑' => Ok(Direction::Up),
            'D' | 'd' | '↓' => Ok(Direction::Down),
            'L' | 'l' | '←' => Ok(Direction::Left),
            'R' | 'r' | '→' => Ok(Direction::Right),
            _ => Err(anyhow!("Invalid direction: {value}")),
        }
    }
}

impl Direction {
    /// Expansion order used by every search strategy.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn all() -> Vec<Direction> {
        Direction::ALL.to_vec()
    }

    pub fn arrow(&self) -> char {
        match self {
            Direction::Up => '↑',
            Direction::Down => '↓',
            Direction::Left => '←',
            Direction::Right => '→',
        }
    }
}

/// Parse a move string such as `"RD"` or `"→↓"`, skipping whitespace.
pub fn parse_moves(input: &str) -> Result<Vec<Direction>> {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(Direction::try_from)
        .collect()
}

/// Render a move sequence as arrows.
pub fn arrows(moves: &[Direction]) -> String {
    moves.iter().map(Direction::arrow).collect()
}
