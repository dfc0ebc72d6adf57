//! Angular order preservation around high-degree vertices.
//!
//! The edges leaving a vertex of degree `n >= 3` are pushed toward `n`
//! evenly spaced directions, rotated to best fit their current directions.
//! The force only engages while the geometric order of the edges around the
//! vertex still matches the board's rotation, and while the fit is already
//! good enough; it ramps in smoothly above the similarity threshold. The fit
//! is measured as the smallest cosine between a rotated slot and the edge
//! it was matched to.

use std::f64::consts::TAU;

use nalgebra::Vector2;

use super::{gather, AngularOptions, ForceField};
use crate::algo::procrustes::optimal_rotation;
use crate::mesh::{Board, VertexId};

/// Smoothstep easing of `t` clamped to `[0, 1]`.
#[inline]
pub fn ease(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Whether `directions` wind exactly once counter-clockwise, in order.
pub fn is_counter_clockwise_order(directions: &[Vector2<f64>]) -> bool {
    let n = directions.len();
    if n < 3 {
        return true;
    }
    let angles: Vec<f64> = directions.iter().map(|d| d.y.atan2(d.x)).collect();
    let mut total = 0.0;
    for i in 0..n {
        let gap = (angles[(i + 1) % n] - angles[i]).rem_euclid(TAU);
        if gap == 0.0 {
            return false;
        }
        total += gap;
    }
    (total - TAU).abs() < 1e-6
}

/// Angular forces for every vertex of degree three or more.
pub fn angular_forces(board: &Board, options: &AngularOptions, parallel: bool) -> ForceField {
    let ids: Vec<VertexId> = board
        .vertices()
        .filter(|(_, vertex)| vertex.degree() >= 3)
        .map(|(id, _)| id)
        .collect();
    gather(board, &ids, parallel, |v| vertex_forces(board, v, options))
}

fn vertex_forces(board: &Board, v: VertexId, options: &AngularOptions) -> Vec<(VertexId, Vector2<f64>)> {
    let centre = board.position(v);
    let neighbors: Vec<VertexId> = board
        .vertex(v)
        .outgoing
        .iter()
        .map(|&he| board.end(he))
        .collect();
    let n = neighbors.len();

    let mut lengths = Vec::with_capacity(n);
    let mut directions = Vec::with_capacity(n);
    for &u in &neighbors {
        let delta = board.position(u) - centre;
        let length = delta.norm();
        if length < f64::EPSILON {
            return Vec::new();
        }
        lengths.push(length);
        directions.push(delta / length);
    }

    if !is_counter_clockwise_order(&directions) {
        return Vec::new();
    }

    let slots: Vec<Vector2<f64>> = (0..n)
        .map(|i| {
            let angle = TAU * i as f64 / n as f64;
            Vector2::new(angle.cos(), angle.sin())
        })
        .collect();
    let rotation = optimal_rotation(&slots, &directions);

    let similarity = slots
        .iter()
        .zip(&directions)
        .map(|(s, d)| (rotation * s).dot(d))
        .fold(f64::INFINITY, f64::min);
    let threshold = options.similarity_threshold;
    if similarity <= threshold {
        return Vec::new();
    }
    let weight = options.strength * ease((similarity - threshold) / (1.0 - threshold).max(f64::EPSILON));

    let mut forces = Vec::with_capacity(n + 1);
    let mut total = Vector2::zeros();
    for ((&u, s), &length) in neighbors.iter().zip(&slots).zip(&lengths) {
        let target = centre + rotation * s * length;
        let force = (target - board.position(u)) * weight;
        total += force;
        forces.push((u, force));
    }
    forces.push((v, -total));
    forces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::{hex_board, square_board};
    use crate::mesh::LatticeCoord;

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease(-1.0), 0.0);
        assert_eq!(ease(0.0), 0.0);
        assert!((ease(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(ease(1.0), 1.0);
        assert_eq!(ease(2.0), 1.0);
    }

    #[test]
    fn test_order_detection() {
        let ccw = vec![
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(-1.0, 0.0),
        ];
        assert!(is_counter_clockwise_order(&ccw));

        let swapped = vec![
            Vector2::new(1.0, 0.0),
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(0.0, -1.0),
        ];
        assert!(!is_counter_clockwise_order(&swapped));
    }

    #[test]
    fn test_grid_interior_is_balanced() {
        let board = square_board(2, 2).unwrap();
        let centre = board.find_vertex(LatticeCoord::new(1, 1)).unwrap();
        let forces = vertex_forces(&board, centre, &AngularOptions::default());
        assert_eq!(forces.len(), 5);
        for (_, f) in forces {
            assert!(f.norm() < 1e-9);
        }
    }

    #[test]
    fn test_hex_corners_are_balanced() {
        let board = hex_board(2).unwrap();
        let field = angular_forces(&board, &AngularOptions::default(), true);
        assert!(field.max_norm() < 1e-9);
    }

    #[test]
    fn test_boundary_t_junction_is_pushed_and_conserved() {
        // (1, 0) on a 2x2 grid has edges at 0, 90 and 180 degrees
        let board = square_board(2, 2).unwrap();
        let junction = board.find_vertex(LatticeCoord::new(1, 0)).unwrap();
        let forces = vertex_forces(&board, junction, &AngularOptions::default());
        assert_eq!(forces.len(), 4);

        let total: Vector2<f64> = forces.iter().map(|(_, f)| *f).sum();
        assert!(total.norm() < 1e-9);
        assert!(forces.iter().any(|(_, f)| f.norm() > 1e-3));
    }

    #[test]
    fn test_gate_uses_smallest_slot_cosine() {
        // Best fit of three even slots to 0, 90 and 180 degrees leaves two
        // edges 30 degrees off their slots
        let board = square_board(2, 2).unwrap();
        let junction = board.find_vertex(LatticeCoord::new(1, 0)).unwrap();
        let gate = |threshold: f64| AngularOptions {
            similarity_threshold: threshold,
            ..AngularOptions::default()
        };

        let cos30 = 3f64.sqrt() / 2.0;
        let below = vertex_forces(&board, junction, &gate(cos30 - 0.01));
        assert!(below.iter().any(|(_, f)| f.norm() > 1e-6));
        assert!(vertex_forces(&board, junction, &gate(cos30 + 0.01)).is_empty());
    }

    #[test]
    fn test_flipped_neighbour_disengages() {
        let mut board = square_board(2, 2).unwrap();
        let centre = board.find_vertex(LatticeCoord::new(1, 1)).unwrap();
        let right = board.find_vertex(LatticeCoord::new(2, 1)).unwrap();
        // Drag the right neighbour past the top one
        board.set_position(right, nalgebra::Point2::new(0.5, 2.0));
        let forces = vertex_forces(&board, centre, &AngularOptions::default());
        assert!(forces.is_empty());
    }
}
