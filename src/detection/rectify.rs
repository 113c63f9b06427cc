use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::warn;

use crate::models::Quadrilateral;

/// True when any three corners are (nearly) collinear, so no perspective
/// transform exists
pub fn is_degenerate(quad: &Quadrilateral) -> bool {
    let c = &quad.corners;
    (0..4).any(|skip| {
        let [a, b, d] = match skip {
            0 => [c[1], c[2], c[3]],
            1 => [c[0], c[2], c[3]],
            2 => [c[0], c[1], c[3]],
            _ => [c[0], c[1], c[2]],
        };
        let cross = (b.x - a.x) * (d.y - a.y) - (b.y - a.y) * (d.x - a.x);
        cross.abs() < 1e-3
    })
}

/// Perspective transform taking the quad's corners onto an `size` x `size`
/// square. `None` when the corners are collinear.
pub fn board_projection(quad: &Quadrilateral, size: u32) -> Option<Projection> {
    if is_degenerate(quad) {
        return None;
    }
    let s = size as f32;
    let from = [
        quad.top_left().as_tuple(),
        quad.top_right().as_tuple(),
        quad.bottom_right().as_tuple(),
        quad.bottom_left().as_tuple(),
    ];
    let to = [(0.0, 0.0), (s, 0.0), (s, s), (0.0, s)];
    Projection::from_control_points(from, to)
}

/// Warp the quadrilateral region of `image` into a fresh square image
pub fn rectify(image: RgbImage, quad: &Quadrilateral, size: u32) -> RgbImage {
    let Some(projection) = board_projection(quad, size) else {
        warn!(
            ?quad,
            "Degenerate board quadrilateral, resampling the whole image instead"
        );
        return imageops::resize(&image, size, size, FilterType::Triangle);
    };

    let mut out = RgbImage::new(size, size);
    warp_into(
        &image,
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut out,
    );
    out
}
