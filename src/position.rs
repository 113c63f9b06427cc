//! Board position assembled from per-cell piece labels, and its FEN form.

use std::fmt;

use crate::error::{RecognitionError, Result};
use crate::models::{Orientation, PieceLabel, Side};

pub const SQUARE_COUNT: usize = 64;

/// Algebraic square; file 0 = a, rank 1..=8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && (1..=8).contains(&rank)).then_some(Self { file, rank })
    }

    /// Square shown by cell `index` (row-major from the top-left of the
    /// rectified photo)
    pub fn from_cell_index(index: usize, orientation: Orientation) -> Self {
        let col = (index % 8) as u8;
        let row = (index / 8) as u8;
        match orientation {
            Orientation::WhiteAtBottom => Self {
                file: col,
                rank: 8 - row,
            },
            Orientation::BlackAtBottom => Self {
                file: 7 - col,
                rank: row + 1,
            },
        }
    }

    /// Parse an algebraic name such as `e4`
    pub fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let file = chars.next()?;
        let rank = chars.next()?.to_digit(10)?;
        if chars.next().is_some() || !('a'..='h').contains(&file) {
            return None;
        }
        Self::new(file as u8 - b'a', rank as u8)
    }

    fn slot(self) -> usize {
        (self.rank as usize - 1) * 8 + self.file as usize
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank)
    }
}

/// Piece placement plus side to move. Castling, en passant and clocks cannot
/// be seen in a photo and are always serialised as `- - 0 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    squares: [Option<PieceLabel>; SQUARE_COUNT],
    side_to_move: Side,
}

impl Position {
    pub fn empty(side_to_move: Side) -> Self {
        Self {
            squares: [None; SQUARE_COUNT],
            side_to_move,
        }
    }

    /// Place one label per cell. Piece counts are not checked for legality.
    pub fn from_labels(
        labels: &[PieceLabel],
        side_to_move: Side,
        orientation: Orientation,
    ) -> Result<Self> {
        if labels.len() != SQUARE_COUNT {
            return Err(RecognitionError::InvalidLabelCount {
                expected: SQUARE_COUNT,
                actual: labels.len(),
            });
        }

        let mut position = Self::empty(side_to_move);
        for (index, label) in labels.iter().enumerate() {
            if label.is_empty() {
                continue;
            }
            let square = Square::from_cell_index(index, orientation);
            position.squares[square.slot()] = Some(*label);
        }
        Ok(position)
    }

    pub fn piece_at(&self, square: Square) -> Option<PieceLabel> {
        self.squares[square.slot()]
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn piece_count(&self) -> usize {
        self.squares.iter().flatten().count()
    }

    /// Piece placement field, rank 8 first
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (1..=8u8).rev() {
            let mut run = 0;
            for file in 0..8u8 {
                match self.squares[Square { file, rank }.slot()] {
                    Some(label) => {
                        if run > 0 {
                            out.push(char::from(b'0' + run));
                            run = 0;
                        }
                        out.push(label.to_char());
                    }
                    None => run += 1,
                }
            }
            if run > 0 {
                out.push(char::from(b'0' + run));
            }
            if rank > 1 {
                out.push('/');
            }
        }
        out
    }

    pub fn to_fen(&self) -> String {
        format!("{} {} - - 0 1", self.placement(), self.side_to_move)
    }
}

/// Diagram with rank 8 on top, `.` for empty squares
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (1..=8u8).rev() {
            write!(f, "{rank} ")?;
            for file in 0..8u8 {
                let c = self.squares[Square { file, rank }.slot()]
                    .map_or('.', PieceLabel::to_char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

/// FEN for 64 row-major labels with White at the bottom of the photo
pub fn assemble(labels: &[PieceLabel], side_to_move: Side) -> Result<String> {
    assemble_oriented(labels, side_to_move, Orientation::WhiteAtBottom)
}

pub fn assemble_oriented(
    labels: &[PieceLabel],
    side_to_move: Side,
    orientation: Orientation,
) -> Result<String> {
    Ok(Position::from_labels(labels, side_to_move, orientation)?.to_fen())
}
