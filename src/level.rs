//! Turning caller supplied level descriptions into a [`Puzzle`].
//!
//! Two inputs are understood: an ASCII map, one line per row, where `#` is a
//! barrier, a digit is a piece of that color and `.`, `-` or a space is an
//! empty cell; and a JSON definition listing the size, barriers and pieces.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::board::Piece;
use crate::point::Point;
use crate::puzzle::Puzzle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceDefinition {
    pub color: u8,
    pub x: isize,
    pub y: isize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDefinition {
    pub width: isize,
    pub height: isize,
    #[serde(default)]
    pub barriers: Vec<(isize, isize)>,
    pub pieces: Vec<PieceDefinition>,
}

impl TryFrom<PuzzleDefinition> for Puzzle {
    type Error = anyhow::Error;

    fn try_from(definition: PuzzleDefinition) -> Result<Self> {
        let barriers = definition
            .barriers
            .iter()
            .map(|&pt| Point::from(pt))
            .collect::<Vec<_>>();
        let pieces = definition
            .pieces
            .iter()
            .map(|p| Piece::new(p.color, p.x, p.y))
            .collect();

        Ok(Puzzle::from_parts(
            definition.width,
            definition.height,
            &barriers,
            pieces,
        )?)
    }
}

/// Parse an ASCII map. Short rows are padded with empty cells.
pub fn parse_map(input: &str) -> Result<Puzzle> {
    let mut lines = input.lines().collect::<Vec<_>>();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let mut width = 0;
    let mut barriers = Vec::new();
    let mut pieces = Vec::new();

    for (y, line) in lines.iter().enumerate() {
        width = width.max(line.chars().count());

        for (x, c) in line.chars().enumerate() {
            let pt = Point {
                x: x as isize,
                y: y as isize,
            };

            match c {
                '.' | '-' | ' ' => {}
                '#' => barriers.push(pt),
                '0'..='9' => pieces.push(Piece {
                    color: c as u8 - b'0',
                    point: pt,
                }),
                _ => return Err(anyhow!("Invalid character {c:?} at {pt}")),
            }
        }
    }

    if lines.is_empty() || width == 0 {
        return Err(anyhow!("Empty map"));
    }

    let puzzle = Puzzle::from_parts(width as isize, lines.len() as isize, &barriers, pieces)?;
    log::debug!(
        "Loaded {}x{} map with {} pieces",
        width,
        lines.len(),
        puzzle.board().len()
    );
    Ok(puzzle)
}

pub fn parse_json(input: &str) -> Result<Puzzle> {
    let definition: PuzzleDefinition = serde_json::from_str(input)?;
    Puzzle::try_from(definition)
}

/// JSON if the input starts with `{`, otherwise an ASCII map.
pub fn load(input: &str) -> Result<Puzzle> {
    if input.trim_start().starts_with('{') {
        parse_json(input)
    } else {
        parse_map(input)
    }
}
