//! Regular-polygon shape matching with self-intersection detection.
//!
//! Every face is compared against a regular polygon with the same number of
//! sides and the ideal edge length. The regular polygon is rotated onto the
//! face by Procrustes alignment; the remaining offset of each corner is its
//! force. Faces that cross themselves, or come close to it, report a defect
//! ratio in `[0, 1]` that lets this force take over from the others.

use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};
use rayon::prelude::*;

use super::{ForceField, ShapeOptions};
use crate::algo::procrustes::optimal_rotation;
use crate::mesh::geometry::{segment_distance, segments_properly_intersect, vertex_average};
use crate::mesh::{Board, ElementId, FaceId, VertexId};

/// Shape-matching forces and the per-vertex defect ratio.
#[derive(Debug, Clone)]
pub struct ShapeForces {
    /// Corrective force per vertex.
    pub field: ForceField,
    /// Largest defect ratio of any face around each vertex slot.
    pub defect: Vec<f64>,
}

/// Corners of a regular `n`-gon with the given edge length, centred on the
/// origin, counter-clockwise from the positive x axis.
pub fn regular_polygon(n: usize, edge_length: f64) -> Vec<Vector2<f64>> {
    if n < 3 {
        return Vec::new();
    }
    let radius = edge_length / (2.0 * (PI / n as f64).sin());
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            Vector2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Where each corner of `points` should move to become a regular polygon of
/// edge length `edge_length`, best aligned to its current placement.
pub fn regular_polygon_targets(points: &[Point2<f64>], edge_length: f64) -> Vec<Point2<f64>> {
    let centre = vertex_average(points);
    let current: Vec<Vector2<f64>> = points.iter().map(|p| p - centre).collect();
    let ideal = regular_polygon(points.len(), edge_length);
    let rotation = optimal_rotation(&ideal, &current);
    ideal.iter().map(|s| centre + rotation * s).collect()
}

/// How close a polygon is to crossing itself.
///
/// 1 if two non-adjacent sides properly intersect, otherwise
/// `max(0, 1 - d / threshold)` over the closest pair of non-adjacent sides.
pub fn defect_ratio(points: &[Point2<f64>], threshold: f64) -> f64 {
    let n = points.len();
    if n < 4 {
        return 0.0;
    }

    let mut ratio: f64 = 0.0;
    for i in 0..n {
        let (a, b) = (&points[i], &points[(i + 1) % n]);
        // Sides i and j are adjacent when they share a corner
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (&points[j], &points[(j + 1) % n]);
            if segments_properly_intersect(a, b, c, d) {
                return 1.0;
            }
            if threshold > 0.0 {
                let distance = segment_distance(a, b, c, d);
                ratio = ratio.max(1.0 - distance / threshold);
            }
        }
    }
    ratio.clamp(0.0, 1.0)
}

/// Shape-matching forces for every face, scaled by `options.strength`.
pub fn shape_forces(
    board: &Board,
    edge_length: f64,
    options: &ShapeOptions,
    parallel: bool,
) -> ShapeForces {
    let ids: Vec<FaceId> = board.face_ids().collect();
    let per_face = |f: FaceId| -> (Vec<(VertexId, Vector2<f64>)>, f64) {
        let face = board.face(f);
        let points = board.face_positions(f);
        let targets = regular_polygon_targets(&points, edge_length);
        let forces = face
            .vertices
            .iter()
            .zip(points.iter().zip(&targets))
            .map(|(&v, (p, t))| (v, (t - p) * options.strength))
            .collect();
        (forces, defect_ratio(&points, options.defect_distance))
    };

    let results: Vec<(Vec<(VertexId, Vector2<f64>)>, f64)> = if parallel {
        ids.par_iter().map(|&f| per_face(f)).collect()
    } else {
        ids.iter().map(|&f| per_face(f)).collect()
    };

    let mut field = ForceField::for_board(board);
    let mut defect = vec![0.0; board.vertex_index_bound()];
    for (forces, ratio) in results {
        for (v, force) in forces {
            field.accumulate(v, force);
            let slot = &mut defect[v.slot()];
            *slot = f64::max(*slot, ratio);
        }
    }

    ShapeForces { field, defect }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::{hex_board, square_board};

    #[test]
    fn test_regular_polygon_edge_length() {
        for n in 3..9 {
            let corners = regular_polygon(n, 1.5);
            for i in 0..n {
                let side = (corners[(i + 1) % n] - corners[i]).norm();
                assert!((side - 1.5).abs() < 1e-12, "n = {}", n);
            }
        }
    }

    #[test]
    fn test_unit_squares_need_no_correction() {
        let board = square_board(2, 2).unwrap();
        let shape = shape_forces(&board, 1.0, &ShapeOptions::default(), false);
        assert!(shape.field.max_norm() < 1e-9);
        assert!(shape.defect.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_hex_cells_match_regular_hexagons() {
        let board = hex_board(2).unwrap();
        let edge = board.average_edge_length();
        let shape = shape_forces(&board, edge, &ShapeOptions::default(), true);
        assert!(shape.field.max_norm() < 1e-9);
    }

    #[test]
    fn test_targets_keep_rotation() {
        // A square turned by 30 degrees stays turned
        let angle = PI / 6.0;
        let points: Vec<Point2<f64>> = (0..4)
            .map(|i| {
                let a = angle + PI / 2.0 * i as f64;
                Point2::new(a.cos(), a.sin()) * 2.0_f64.sqrt() / 2.0 * 2.0
            })
            .collect();
        let targets = regular_polygon_targets(&points, 2.0);
        for (p, t) in points.iter().zip(&targets) {
            assert!((p - t).norm() < 1e-9);
        }
    }

    #[test]
    fn test_bow_tie_is_a_full_defect() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert_eq!(defect_ratio(&points, 0.1), 1.0);
    }

    #[test]
    fn test_near_contact_raises_ratio() {
        // A thin U shape whose arms nearly touch
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.05),
            Point2::new(0.0, 0.05),
        ];
        let ratio = defect_ratio(&points, 0.1);
        assert!(ratio > 0.4 && ratio < 0.6, "ratio = {}", ratio);

        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert_eq!(defect_ratio(&square, 0.1), 0.0);
    }
}
