//! Area-preserving correction of displacement fields.
//!
//! A displacement field generally changes the total signed area of the board.
//! The correction is a uniform radial field about the vertex centroid, scaled
//! by a factor `k` chosen by Newton iteration so that applying the given
//! field plus the correction leaves the total area where it was.

use nalgebra::{Point2, Vector2};

use super::ForceField;
use crate::mesh::{Board, VertexId};

/// Newton iterations used by the integrator.
pub const AREA_CORRECTION_ITERATIONS: usize = 5;

/// Radial field `k * (p - c)` that cancels the area change of `field`.
///
/// Returns a zero field when the board area does not respond to radial
/// scaling (a degenerate board).
pub fn area_correction(board: &Board, field: &ForceField, iterations: usize) -> ForceField {
    let target = board.signed_area();
    let centre = board.vertex_centroid();

    let mut radial = ForceField::for_board(board);
    for v in board.vertex_ids() {
        radial.set(v, board.position(v) - centre);
    }

    let mut k = 0.0;
    for _ in 0..iterations {
        let (area, slope) = area_and_slope(board, |v| {
            board.position(v) + field.get(v) + radial.get(v) * k
        }, &radial);
        if slope.abs() < f64::EPSILON {
            break;
        }
        let delta = (target - area) / slope;
        k += delta;
        if delta.abs() < 1e-16 {
            break;
        }
    }

    radial * k
}

/// Total signed area at the displaced positions, and its derivative along
/// `direction`.
fn area_and_slope<P>(board: &Board, position: P, direction: &ForceField) -> (f64, f64)
where
    P: Fn(VertexId) -> Point2<f64>,
{
    let mut area = 0.0;
    let mut slope = 0.0;

    for (_, face) in board.faces() {
        let points: Vec<Point2<f64>> = face.vertices.iter().map(|&v| position(v)).collect();
        let n = points.len();
        for i in 0..n {
            let (p, q) = (points[i], points[(i + 1) % n]);
            area += 0.5 * (p.x * q.y - q.x * p.y);

            // d(area)/d(p_i) = 0.5 * (w.y, -w.x) with w = p_{i+1} - p_{i-1}
            let w = q - points[(i + n - 1) % n];
            let gradient = Vector2::new(w.y, -w.x) * 0.5;
            slope += gradient.dot(&direction.get(face.vertices[i]));
        }
    }

    (area, slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::{hex_board, square_board};
    use crate::mesh::LatticeCoord;

    #[test]
    fn test_uniform_growth_is_cancelled() {
        let mut board = square_board(2, 2).unwrap();
        let before = board.signed_area();

        let centre = board.vertex_centroid();
        let mut field = ForceField::for_board(&board);
        for v in board.vertex_ids() {
            field.set(v, (board.position(v) - centre) * 0.1);
        }

        let correction = area_correction(&board, &field, AREA_CORRECTION_ITERATIONS);
        (field + correction).apply(&mut board);
        assert!((board.signed_area() - before).abs() < 1e-9 * before);
    }

    #[test]
    fn test_single_corner_pull_is_cancelled() {
        let mut board = hex_board(2).unwrap();
        let before = board.signed_area();

        let mut field = ForceField::for_board(&board);
        let v = board.vertex_ids().next().unwrap();
        field.set(v, Vector2::new(0.3, -0.2));

        let correction = area_correction(&board, &field, AREA_CORRECTION_ITERATIONS);
        (field + correction).apply(&mut board);
        assert!((board.signed_area() - before).abs() < 1e-9 * before.abs());
    }

    #[test]
    fn test_interior_moves_need_no_correction() {
        let board = square_board(2, 2).unwrap();
        let centre = board.find_vertex(LatticeCoord::new(1, 1)).unwrap();
        let mut field = ForceField::for_board(&board);
        field.set(centre, Vector2::new(0.2, 0.1));

        let correction = area_correction(&board, &field, AREA_CORRECTION_ITERATIONS);
        assert!(correction.max_norm() < 1e-12);
    }
}
