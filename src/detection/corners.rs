use crate::models::{Point2D, Quadrilateral};

/// Sort four unordered points into (top-left, top-right, bottom-right,
/// bottom-left).
///
/// Smallest `x + y` is top-left, largest is bottom-right. Smallest `y - x`
/// (largest `x - y`) is top-right, largest `y - x` is bottom-left.
/// Degenerate inputs may pick the same point twice; that is returned as-is
/// rather than rejected.
pub fn order_corners(points: [Point2D; 4]) -> Quadrilateral {
    let pick = |key: fn(&Point2D) -> f32, largest: bool| -> Point2D {
        let mut best = points[0];
        for p in &points[1..] {
            let better = if largest {
                key(p) > key(&best)
            } else {
                key(p) < key(&best)
            };
            if better {
                best = *p;
            }
        }
        best
    };

    Quadrilateral {
        corners: [
            pick(Point2D::sum, false),
            pick(Point2D::diff, true),
            pick(Point2D::sum, true),
            pick(Point2D::diff, false),
        ],
    }
}
