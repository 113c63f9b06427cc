use image::{GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;

/// Convert image to grayscale
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Apply Gaussian blur to reduce sensor noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Grow edge pixels with a 3x3 square, `iterations` times, to close small
/// gaps in the board border
pub fn dilate_edges(edges: &GrayImage, iterations: u32) -> GrayImage {
    let mut out = edges.clone();
    for _ in 0..iterations {
        out = dilate(&out, Norm::LInf, 1);
    }
    out
}
