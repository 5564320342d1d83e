use std::fmt;

use crate::board::Piece;

/// Order-independent identity of a piece collection.
///
/// Pieces are sorted by `(color, x, y)`, so two collections holding the same
/// multiset of pieces produce equal fingerprints no matter how they are stored.
/// Only used as a visited-set key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Box<[Piece]>);

pub fn fingerprint(pieces: &[Piece]) -> Fingerprint {
    let mut sorted = pieces.to_vec();
    sorted.sort_unstable();
    Fingerprint(sorted.into_boxed_slice())
}

impl Fingerprint {
    pub fn pieces(&self) -> &[Piece] {
        &self.0
    }
}

// color,x,y; per piece
impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in self.0.iter() {
            write!(f, "{},{},{};", piece.color, piece.point.x, piece.point.y)?;
        }
        Ok(())
    }
}
