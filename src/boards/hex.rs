//! Hexagonal boards in axial coordinates.
//!
//! Faces are flat-top hexagons with unit circumradius, identified by their
//! axial coordinate `(q, r)`. Corners live on a lattice three times finer:
//! each corner is the centroid of three mutually adjacent cells, so its
//! logical coordinate is `3 * (q, r)` plus one of six fixed offsets, and cells
//! sharing a corner agree on its identity exactly.

use nalgebra::Point2;

use crate::error::{BoardError, Result};
use crate::mesh::{build_board, Board, FaceDescriptor, LatticeCoord, VertexDescriptor};

/// Corner offsets on the tripled axial lattice, counter-clockwise from east.
const CORNER_OFFSETS: [(i64, i64); 6] = [(2, -1), (1, 1), (-1, 2), (-2, 1), (-1, -1), (1, -2)];

/// Position of a point given in thirds of axial units.
fn tripled_axial_to_point(q3: i64, r3: i64) -> Point2<f64> {
    let q = q3 as f64 / 3.0;
    let r = r3 as f64 / 3.0;
    Point2::new(1.5 * q, 3f64.sqrt() * (r + q / 2.0))
}

/// Face descriptors for all cells within `radius - 1` steps of the origin.
pub fn hex_descriptors(radius: usize) -> Vec<FaceDescriptor> {
    let n = radius as i64 - 1;
    let mut faces = Vec::new();
    for q in -n..=n {
        let r_min = (-n).max(-q - n);
        let r_max = n.min(-q + n);
        for r in r_min..=r_max {
            let vertices = CORNER_OFFSETS
                .iter()
                .map(|&(dq, dr)| {
                    let (q3, r3) = (3 * q + dq, 3 * r + dr);
                    VertexDescriptor::new(LatticeCoord::new(q3, r3), tripled_axial_to_point(q3, r3))
                })
                .collect();
            faces.push(FaceDescriptor::new(LatticeCoord::new(q, r), vertices));
        }
    }
    faces
}

/// Build a hexagon-shaped board of hexagonal cells.
///
/// `radius` 1 is a single cell, `radius` 2 adds the six neighbours, and so on.
pub fn hex_board(radius: usize) -> Result<Board> {
    if radius == 0 {
        return Err(BoardError::invalid_param("radius", radius, "must be at least 1"));
    }
    build_board(&hex_descriptors(radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cell_is_regular() {
        let board = hex_board(1).unwrap();
        assert_eq!(board.num_faces(), 1);
        assert_eq!(board.num_vertices(), 6);
        for e in board.edge_ids() {
            assert!((board.edge_length(e) - 1.0).abs() < 1e-12);
        }
        let expected_area = 1.5 * 3f64.sqrt();
        assert!((board.signed_area() - expected_area).abs() < 1e-9);
    }

    #[test]
    fn test_counts_follow_hexagon_formula() {
        for n in 1..5usize {
            let board = hex_board(n).unwrap();
            assert_eq!(board.num_faces(), 3 * n * n - 3 * n + 1);
            assert_eq!(board.num_vertices(), 6 * n * n);
            assert_eq!(board.num_edges(), 9 * n * n - 3 * n);
            assert_eq!(board.outer_boundary().len(), 12 * n - 6);
            assert!(board.is_valid());
        }
    }

    #[test]
    fn test_interior_corners_have_degree_three() {
        let board = hex_board(2).unwrap();
        let interior = board
            .vertex_ids()
            .filter(|&v| !board.is_boundary_vertex(v))
            .collect::<Vec<_>>();
        assert_eq!(interior.len(), 6);
        for v in interior {
            assert_eq!(board.degree(v), 3);
            assert_eq!(board.vertex(v).faces.len(), 3);
        }
    }
}
