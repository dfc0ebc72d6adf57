//! Planar geometry helpers shared by the builder, the board queries and the
//! relaxation engine.

use nalgebra::{Point2, Vector2};

/// Signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise winding, negative for clockwise.
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        twice_area += p.x * q.y - q.x * p.y;
    }
    0.5 * twice_area
}

/// Area centroid of a simple polygon.
///
/// Falls back to the vertex average when the polygon has (near) zero area.
pub fn centroid(points: &[Point2<f64>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    let area = signed_area(points);
    if area.abs() < 1e-12 {
        return vertex_average(points);
    }

    let n = points.len();
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    let scale = 1.0 / (6.0 * area);
    Point2::new(cx * scale, cy * scale)
}

/// Arithmetic mean of a point set.
pub fn vertex_average(points: &[Point2<f64>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    let sum: Vector2<f64> = points.iter().map(|p| p.coords).sum();
    Point2::from(sum / points.len() as f64)
}

/// 2D cross product (z component of the 3D cross product).
#[inline]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Counter-clockwise perpendicular of a vector.
#[inline]
pub fn perp(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// Whether segments `ab` and `cd` cross at a single interior point.
///
/// Touching endpoints and collinear overlaps are not proper intersections.
pub fn segments_properly_intersect(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    d: &Point2<f64>,
) -> bool {
    let d1 = cross(&(b - a), &(c - a));
    let d2 = cross(&(b - a), &(d - a));
    let d3 = cross(&(d - c), &(a - c));
    let d4 = cross(&(d - c), &(b - c));
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Distance from point `p` to segment `ab`.
pub fn point_segment_distance(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Minimum distance between segments `ab` and `cd` (zero if they cross).
pub fn segment_distance(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    if segments_properly_intersect(a, b, c, d) {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_signed_area_winding() {
        let mut square = unit_square();
        assert!((signed_area(&square) - 1.0).abs() < 1e-12);
        square.reverse();
        assert!((signed_area(&square) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid() {
        let c = centroid(&unit_square());
        assert!((c.x - 0.5).abs() < 1e-12);
        assert!((c.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_proper_intersection() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 2.0);
        let c = Point2::new(0.0, 2.0);
        let d = Point2::new(2.0, 0.0);
        assert!(segments_properly_intersect(&a, &b, &c, &d));

        // Shared endpoint only
        assert!(!segments_properly_intersect(&a, &b, &b, &d));
    }

    #[test]
    fn test_segment_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.5, 0.25);
        let d = Point2::new(0.5, 1.0);
        assert!((segment_distance(&a, &b, &c, &d) - 0.25).abs() < 1e-12);
    }
}
