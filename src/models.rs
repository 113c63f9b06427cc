use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::RecognitionError;

/// A point in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn sum(&self) -> f32 {
        self.x + self.y
    }

    pub fn diff(&self) -> f32 {
        self.x - self.y
    }

    pub fn as_tuple(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Four board corners in (top-left, top-right, bottom-right, bottom-left) order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub corners: [Point2D; 4],
}

impl Quadrilateral {
    pub fn top_left(&self) -> Point2D {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point2D {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point2D {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point2D {
        self.corners[3]
    }

    /// Axis-aligned rectangle covering a whole `width` x `height` image
    pub fn image_bounds(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            corners: [
                Point2D::new(0.0, 0.0),
                Point2D::new(w, 0.0),
                Point2D::new(w, h),
                Point2D::new(0.0, h),
            ],
        }
    }
}

/// One of the 64 sub-images of a rectified board
#[derive(Debug, Clone)]
pub struct Cell {
    /// Row-major grid index, 0 = top-left of the rectified board
    pub index: usize,
    pub row: u32,
    pub col: u32,
    /// Origin of the cropped content inside the board image
    pub x: u32,
    pub y: u32,
    pub image: RgbImage,
}

impl Cell {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Classifier output vocabulary: six white pieces, six black pieces, empty.
///
/// Variant order is the class-index order used by piece classification
/// models: `K Q R B N P k q r b n p .`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceLabel {
    WhiteKing,
    WhiteQueen,
    WhiteRook,
    WhiteBishop,
    WhiteKnight,
    WhitePawn,
    BlackKing,
    BlackQueen,
    BlackRook,
    BlackBishop,
    BlackKnight,
    BlackPawn,
    Empty,
}

impl PieceLabel {
    pub const ALL: [PieceLabel; 13] = [
        PieceLabel::WhiteKing,
        PieceLabel::WhiteQueen,
        PieceLabel::WhiteRook,
        PieceLabel::WhiteBishop,
        PieceLabel::WhiteKnight,
        PieceLabel::WhitePawn,
        PieceLabel::BlackKing,
        PieceLabel::BlackQueen,
        PieceLabel::BlackRook,
        PieceLabel::BlackBishop,
        PieceLabel::BlackKnight,
        PieceLabel::BlackPawn,
        PieceLabel::Empty,
    ];

    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn class_index(self) -> usize {
        self as usize
    }

    /// FEN letter, `.` for an empty square
    pub fn to_char(self) -> char {
        match self {
            PieceLabel::WhiteKing => 'K',
            PieceLabel::WhiteQueen => 'Q',
            PieceLabel::WhiteRook => 'R',
            PieceLabel::WhiteBishop => 'B',
            PieceLabel::WhiteKnight => 'N',
            PieceLabel::WhitePawn => 'P',
            PieceLabel::BlackKing => 'k',
            PieceLabel::BlackQueen => 'q',
            PieceLabel::BlackRook => 'r',
            PieceLabel::BlackBishop => 'b',
            PieceLabel::BlackKnight => 'n',
            PieceLabel::BlackPawn => 'p',
            PieceLabel::Empty => '.',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.to_char() == c)
    }

    pub fn is_empty(self) -> bool {
        self == PieceLabel::Empty
    }
}

impl fmt::Display for PieceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Side to move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[default]
    White,
    Black,
}

impl Side {
    pub fn fen_char(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

impl FromStr for Side {
    type Err = RecognitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Side::White),
            "b" | "black" => Ok(Side::Black),
            _ => Err(RecognitionError::InvalidSideToMove(s.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen_char())
    }
}

/// Which player's pieces sit at the bottom edge of the photo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    WhiteAtBottom,
    BlackAtBottom,
}

/// Final output of one recognition request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub fen: String,
    pub confidence: f32,
}
