//! Edge springs and barycentric smoothing.

use nalgebra::Vector2;

use super::{gather, ForceField};
use crate::mesh::{Board, EdgeId, VertexId};

/// Hooke spring force on every edge toward `ideal_length`.
///
/// Each edge contributes half of `(length - ideal) * direction` to either
/// endpoint, with opposite signs, so the field sums to zero.
pub fn hooke_forces(board: &Board, ideal_length: f64, parallel: bool) -> ForceField {
    let ids: Vec<EdgeId> = board.edge_ids().collect();
    gather(board, &ids, parallel, |e| {
        let edge = board.edge(e);
        let delta = board.position(edge.end) - board.position(edge.start);
        let length = delta.norm();
        if length < f64::EPSILON {
            return Vec::new();
        }
        let pull = delta * (0.5 * (length - ideal_length) / length);
        vec![(edge.start, pull), (edge.end, -pull)]
    })
}

/// Pull every vertex toward the mean position of its neighbours.
pub fn barycentric_forces(board: &Board, parallel: bool) -> ForceField {
    let ids: Vec<VertexId> = board.vertex_ids().collect();
    gather(board, &ids, parallel, |v| {
        let position = board.position(v);
        let mut sum = Vector2::zeros();
        let mut count = 0usize;
        for u in board.vertex_neighbors(v) {
            sum += board.position(u) - position;
            count += 1;
        }
        if count == 0 {
            return Vec::new();
        }
        vec![(v, sum / count as f64)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::square_board;
    use nalgebra::Point2;

    #[test]
    fn test_ideal_grid_has_no_spring_force() {
        let board = square_board(3, 3).unwrap();
        let field = hooke_forces(&board, 1.0, false);
        assert!(field.max_norm() < 1e-12);
    }

    #[test]
    fn test_stretched_edge_pulls_endpoints_together() {
        let board = square_board(1, 1).unwrap();
        let field = hooke_forces(&board, 0.5, false);

        // Every corner is pulled toward the centre
        for v in board.vertex_ids() {
            let to_centre = Point2::new(0.5, 0.5) - board.position(v);
            assert!(field.get(v).dot(&to_centre) > 0.0);
        }

        let total: Vector2<f64> = field.iter().map(|(_, f)| f).sum();
        assert!(total.norm() < 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let board = square_board(4, 3).unwrap();
        let a = hooke_forces(&board, 0.8, false);
        let b = hooke_forces(&board, 0.8, true);
        assert!((a - b).max_norm() < 1e-15);
    }

    #[test]
    fn test_barycentric_interior_vertex_is_balanced() {
        let board = square_board(2, 2).unwrap();
        let field = barycentric_forces(&board, false);
        let centre = board.find_vertex(crate::mesh::LatticeCoord::new(1, 1)).unwrap();
        assert!(field.get(centre).norm() < 1e-12);

        let corner = board.find_vertex(crate::mesh::LatticeCoord::new(0, 0)).unwrap();
        let f = field.get(corner);
        assert!((f - Vector2::new(0.5, 0.5)).norm() < 1e-12);
    }
}
