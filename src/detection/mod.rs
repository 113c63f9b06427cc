pub mod cells;
pub mod contours;
pub mod corners;
pub mod preprocessing;
pub mod rectify;

use image::{GrayImage, RgbImage};
use tracing::{debug, warn};

use crate::config::LocatorConfig;
use crate::models::Quadrilateral;

pub use cells::slice_board;
pub use corners::order_corners;
pub use rectify::rectify;

/// Everything the locator computed on the way to a board quadrilateral
#[derive(Debug, Clone)]
pub struct BoardLocation {
    /// Canonically ordered board corners
    pub quad: Quadrilateral,
    /// True when no plausible quad was found and the image bounds were used
    pub fell_back: bool,
    pub edges: GrayImage,
    pub dilated: GrayImage,
}

/// Finds the most likely board outline in a photo
#[derive(Debug, Clone, Default)]
pub struct BoardLocator {
    pub config: LocatorConfig,
}

impl BoardLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Board corners in (TL, TR, BR, BL) order. Never fails: falls back to
    /// the full image rectangle.
    pub fn locate(&self, img: &RgbImage) -> Quadrilateral {
        self.locate_detailed(img).quad
    }

    pub fn locate_detailed(&self, img: &RgbImage) -> BoardLocation {
        let (width, height) = img.dimensions();

        let gray = preprocessing::to_grayscale(img);
        let blurred = preprocessing::apply_blur(&gray, self.config.blur_sigma);
        let edges =
            preprocessing::detect_edges(&blurred, self.config.canny_low, self.config.canny_high);
        let dilated = preprocessing::dilate_edges(&edges, self.config.dilate_iterations);

        let candidates = contours::find_quad_candidates(&dilated, self.config.approx_epsilon_ratio);
        debug!("Found {} four-vertex contour candidates", candidates.len());

        let image_area = width as f64 * height as f64;
        let min_area = self.config.min_area_ratio * image_area;

        let best = contours::largest_quad(&candidates);
        let (points, fell_back) = match best {
            Some(candidate) if candidate.area as f64 >= min_area => {
                debug!(
                    area = candidate.area,
                    perimeter = candidate.perimeter,
                    "Selected board candidate"
                );
                (candidate.vertices, false)
            }
            Some(candidate) => {
                warn!(
                    "Largest quadrilateral covers {:.1}% of the image, using full image bounds",
                    100.0 * candidate.area as f64 / image_area
                );
                (Quadrilateral::image_bounds(width, height).corners, true)
            }
            None => {
                warn!("No quadrilateral found, using full image bounds");
                (Quadrilateral::image_bounds(width, height).corners, true)
            }
        };

        BoardLocation {
            quad: order_corners(points),
            fell_back,
            edges,
            dilated,
        }
    }
}
