use std::io::Cursor;

use board2fen::classifier::{Classification, PieceClassifier};
use board2fen::{Cell, PieceLabel};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

pub const LIGHT: Rgb<u8> = Rgb([220, 220, 220]);
pub const DARK: Rgb<u8> = Rgb([40, 40, 40]);
pub const BRIGHT: Rgb<u8> = Rgb([245, 245, 245]);

/// Creates a single-colour image
pub fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Light background with a dark axis-aligned rectangle standing in for a board
pub fn rect_board(width: u32, height: u32, x: i32, y: i32, w: u32, h: u32) -> RgbImage {
    let mut img = solid_image(width, height, LIGHT);
    draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), DARK);
    img
}

/// Light background with a dark filled quadrilateral
pub fn quad_board(width: u32, height: u32, corners: [(i32, i32); 4]) -> RgbImage {
    let mut img = solid_image(width, height, LIGHT);
    let points: Vec<Point<i32>> = corners.iter().map(|&(x, y)| Point::new(x, y)).collect();
    draw_polygon_mut(&mut img, &points, DARK);
    img
}

/// Every pixel differs from every other pixel
pub fn unique_pixel_image(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, (x / 256 + 2 * (y / 256)) as u8])
    })
}

/// Encodes an image as PNG bytes
pub fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

/// Always answers with the same labels, regardless of the cells
pub struct StubClassifier {
    pub labels: Vec<PieceLabel>,
}

impl StubClassifier {
    pub fn all(label: PieceLabel, count: usize) -> Self {
        Self {
            labels: vec![label; count],
        }
    }
}

impl PieceClassifier for StubClassifier {
    fn classify(&self, _cells: &[Cell]) -> anyhow::Result<Vec<Classification>> {
        Ok(self.labels.iter().map(|&l| Classification::new(l)).collect())
    }

    fn name(&self) -> &str {
        "Stub"
    }
}

/// Labels a cell as a white king when enough of it is bright, with a fixed
/// probability per cell
pub struct BrightnessClassifier {
    pub probability: Option<f32>,
}

impl PieceClassifier for BrightnessClassifier {
    fn classify(&self, cells: &[Cell]) -> anyhow::Result<Vec<Classification>> {
        Ok(cells
            .iter()
            .map(|cell| {
                let bright = cell.image.pixels().filter(|p| p[0] > 128).count();
                let total = (cell.width() * cell.height()).max(1) as usize;
                let label = if bright * 10 > total {
                    PieceLabel::WhiteKing
                } else {
                    PieceLabel::Empty
                };
                Classification {
                    label,
                    probability: self.probability,
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Brightness"
    }
}

/// Fails every call
pub struct FailingClassifier;

impl PieceClassifier for FailingClassifier {
    fn classify(&self, _cells: &[Cell]) -> anyhow::Result<Vec<Classification>> {
        anyhow::bail!("model exploded")
    }

    fn name(&self) -> &str {
        "Failing"
    }
}

/// 64 labels, all empty except the given (index, label) pairs
pub fn labels_with(pieces: &[(usize, PieceLabel)]) -> Vec<PieceLabel> {
    let mut labels = vec![PieceLabel::Empty; 64];
    for &(index, label) in pieces {
        labels[index] = label;
    }
    labels
}
