use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length, contour_area};
use imageproc::point::Point;

use crate::models::Point2D;

/// A four-vertex polygon approximated from an external contour.
/// Vertices are in contour order, not yet canonical corner order.
#[derive(Debug, Clone)]
pub struct QuadCandidate {
    pub vertices: [Point2D; 4],
    pub area: f32,
    pub perimeter: f64,
}

/// Outer borders of top-level regions in a binary edge map
pub fn find_external_contours(edges: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Simplify a closed contour with a tolerance relative to its perimeter.
///
/// The contour is split at the point farthest from its start so that each
/// half is an open curve with distinct endpoints, both halves are simplified
/// with Douglas-Peucker, and split points that end up lying on a straight
/// edge are dropped again.
pub fn approximate_polygon(contour: &[Point<i32>], epsilon_ratio: f64) -> Vec<Point<i32>> {
    if contour.len() < 3 {
        return contour.to_vec();
    }
    let epsilon = epsilon_ratio * arc_length(contour, true);
    if epsilon <= 0.0 {
        return contour.to_vec();
    }

    let start = contour[0];
    let far = (1..contour.len())
        .max_by_key(|&i| squared_distance(start, contour[i]))
        .unwrap_or(0);
    if squared_distance(start, contour[far]) == 0 {
        return vec![start];
    }

    let mut second = contour[far..].to_vec();
    second.push(start);

    let mut polygon = approximate_polygon_dp(&contour[..=far], epsilon, false);
    // Far point opens the second half
    polygon.pop();
    polygon.extend(approximate_polygon_dp(&second, epsilon, false));
    // Start point closes the loop
    polygon.pop();

    prune_flat_vertices(polygon, epsilon)
}

/// Remove vertices closer than `epsilon` to the line through their neighbours
fn prune_flat_vertices(mut polygon: Vec<Point<i32>>, epsilon: f64) -> Vec<Point<i32>> {
    while polygon.len() > 3 {
        let n = polygon.len();
        let flat = (0..n).find(|&i| {
            let prev = polygon[(i + n - 1) % n];
            let next = polygon[(i + 1) % n];
            distance_to_line(polygon[i], prev, next) < epsilon
        });
        match flat {
            Some(i) => {
                polygon.remove(i);
            }
            None => break,
        }
    }
    polygon
}

fn squared_distance(a: Point<i32>, b: Point<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}

fn distance_to_line(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let length = dx.hypot(dy);
    if length == 0.0 {
        return ((p.x - a.x) as f64).hypot((p.y - a.y) as f64);
    }
    (dx * (p.y - a.y) as f64 - dy * (p.x - a.x) as f64).abs() / length
}

/// All external contours whose approximation has exactly four vertices
pub fn find_quad_candidates(edges: &GrayImage, epsilon_ratio: f64) -> Vec<QuadCandidate> {
    find_external_contours(edges)
        .iter()
        .filter_map(|contour| {
            let approx = approximate_polygon(contour, epsilon_ratio);
            if approx.len() != 4 {
                return None;
            }

            let vertices = [
                to_point2d(approx[0]),
                to_point2d(approx[1]),
                to_point2d(approx[2]),
                to_point2d(approx[3]),
            ];
            Some(QuadCandidate {
                vertices,
                area: contour_area(&approx) as f32,
                perimeter: arc_length(&approx, true),
            })
        })
        .collect()
}

/// Candidate with the largest enclosed area
pub fn largest_quad(candidates: &[QuadCandidate]) -> Option<&QuadCandidate> {
    candidates.iter().max_by(|a, b| a.area.total_cmp(&b.area))
}

fn to_point2d(p: Point<i32>) -> Point2D {
    Point2D::new(p.x as f32, p.y as f32)
}
