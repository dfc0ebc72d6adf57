//! Board construction from face descriptors.
//!
//! Every board flavour (square grid, hex grid, polygon list, tiling) is just a
//! different way of producing a list of [`FaceDescriptor`]s; this module turns
//! such a list into a fully linked [`Board`].

use std::collections::HashMap;

use log::debug;
use nalgebra::Point2;

use super::board::{Board, Face, LatticeCoord, Vertex};
use super::boundary::{collect_boundary_loops, link_boundary_loops};
use super::geometry;
use super::index::{EdgeId, FaceId, HalfEdgeId, VertexId};
use super::validate::debug_validate;
use crate::error::{BoardError, Result};

/// A face corner: lattice identity plus drawing position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexDescriptor {
    /// Lattice identity; corners with equal identity become one vertex.
    pub logical: LatticeCoord,
    /// Drawing position.
    pub position: Point2<f64>,
}

impl VertexDescriptor {
    /// Create a vertex descriptor.
    pub fn new(logical: LatticeCoord, position: Point2<f64>) -> Self {
        Self { logical, position }
    }
}

/// A face: its lattice identity and its corners in either winding.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDescriptor {
    /// Lattice identity of the face.
    pub logical: LatticeCoord,
    /// Corners in order; clockwise input is reversed during construction.
    pub vertices: Vec<VertexDescriptor>,
}

impl FaceDescriptor {
    /// Create a face descriptor.
    pub fn new(logical: LatticeCoord, vertices: Vec<VertexDescriptor>) -> Self {
        Self { logical, vertices }
    }
}

/// Build a board from face descriptors.
///
/// # Arguments
/// * `faces` - Face descriptors; each needs at least three distinct corners and
///   every edge may be shared by at most two faces
///
/// # Returns
/// A fully linked board, or the first precondition violation found.
///
/// # Algorithm
///
/// 1. Orient every face counter-clockwise in view space (shoelace sign)
/// 2. Register one edge per unordered pair of consecutive logical coordinates
/// 3. Instantiate vertices, faces, edges and half-edges
/// 4. Link half-edges face by face
/// 5. Discover and classify the boundary loops
/// 6. Derive every vertex's rotation order from the `previous` links
///
/// # Example
/// ```
/// use trellis::mesh::{build_board, FaceDescriptor, LatticeCoord, VertexDescriptor};
/// use nalgebra::Point2;
///
/// let corner = |x: i64, y: i64| {
///     VertexDescriptor::new(LatticeCoord::new(x, y), Point2::new(x as f64, y as f64))
/// };
/// let face = FaceDescriptor::new(
///     LatticeCoord::new(0, 0),
///     vec![corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)],
/// );
///
/// let board = build_board(&[face]).unwrap();
/// assert_eq!(board.num_vertices(), 4);
/// assert_eq!(board.num_edges(), 4);
/// assert_eq!(board.outer_boundary().len(), 4);
/// ```
pub fn build_board(faces: &[FaceDescriptor]) -> Result<Board> {
    if faces.is_empty() {
        return Err(BoardError::EmptyBoard);
    }

    let oriented = orient_faces(faces)?;

    let total_corners: usize = oriented.iter().map(|f| f.vertices.len()).sum();
    let mut board = Board::new();

    // Vertices, in order of first appearance
    let mut vertex_ids: HashMap<LatticeCoord, VertexId> = HashMap::with_capacity(total_corners);
    for face in &oriented {
        for corner in &face.vertices {
            vertex_ids
                .entry(corner.logical)
                .or_insert_with(|| board.vertices.insert(Vertex::new(corner.logical, corner.position)));
        }
    }

    // Edges keyed by the unordered logical pair; duplicates from the
    // neighbouring face are skipped
    let mut edge_ids: HashMap<(LatticeCoord, LatticeCoord), EdgeId> = HashMap::new();
    let mut directed: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::new();
    for face in &oriented {
        let n = face.vertices.len();
        for i in 0..n {
            let a = face.vertices[i].logical;
            let b = face.vertices[(i + 1) % n].logical;
            let key = if a < b { (a, b) } else { (b, a) };
            if edge_ids.contains_key(&key) {
                continue;
            }
            let (va, vb) = (vertex_ids[&a], vertex_ids[&b]);
            let (edge, ab, ba) = board.add_edge(va, vb);
            edge_ids.insert(key, edge);
            directed.insert((va, vb), ab);
            directed.insert((vb, va), ba);
        }
    }

    // Faces: walk vertex triples, claim half-edges and chain next/previous
    for face in &oriented {
        let face_id = board.faces.insert(Face::new(face.logical));
        link_face(&mut board, face_id, face, &vertex_ids, &directed)?;
    }

    link_boundary_loops(&mut board)?;
    collect_boundary_loops(&mut board)?;

    // Rotation order, seeded with any incoming half-edge
    let mut seeds: HashMap<VertexId, HalfEdgeId> = HashMap::with_capacity(board.num_vertices());
    for (he, half) in board.half_edges() {
        seeds.entry(half.end).or_insert(he);
    }
    let vertices: Vec<VertexId> = board.vertex_ids().collect();
    for v in vertices {
        if let Some(&seed) = seeds.get(&v) {
            board.rebuild_rotation(v, seed);
        }
    }

    debug!(
        "built board: {} vertices, {} edges, {} faces, outer boundary {} half-edges, {} holes",
        board.num_vertices(),
        board.num_edges(),
        board.num_faces(),
        board.outer_boundary.len(),
        board.inner_boundaries.len()
    );

    debug_validate(&board);
    Ok(board)
}

/// Check every face for degeneracy and make it wind counter-clockwise.
fn orient_faces(faces: &[FaceDescriptor]) -> Result<Vec<FaceDescriptor>> {
    faces
        .iter()
        .enumerate()
        .map(|(fi, face)| {
            let mut distinct: Vec<LatticeCoord> = face.vertices.iter().map(|c| c.logical).collect();
            distinct.sort();
            distinct.dedup();
            if face.vertices.len() < 3 || distinct.len() != face.vertices.len() {
                return Err(BoardError::DegenerateFace {
                    face: fi,
                    vertices: distinct.len(),
                });
            }

            let positions: Vec<Point2<f64>> = face.vertices.iter().map(|c| c.position).collect();
            let mut oriented = face.clone();
            if geometry::signed_area(&positions) <= 0.0 {
                oriented.vertices.reverse();
            }
            Ok(oriented)
        })
        .collect()
}

fn link_face(
    board: &mut Board,
    face_id: FaceId,
    face: &FaceDescriptor,
    vertex_ids: &HashMap<LatticeCoord, VertexId>,
    directed: &HashMap<(VertexId, VertexId), HalfEdgeId>,
) -> Result<()> {
    let corners: Vec<VertexId> = face.vertices.iter().map(|c| vertex_ids[&c.logical]).collect();
    let n = corners.len();

    let mut half_edges = Vec::with_capacity(n);
    for i in 0..n {
        let (start, middle, end) = (corners[i], corners[(i + 1) % n], corners[(i + 2) % n]);
        let incoming = directed[&(start, middle)];
        let outgoing = directed[&(middle, end)];

        if board.face_of(incoming).is_some() {
            return Err(BoardError::NonManifoldEdge {
                start: board.vertex(start).logical,
                end: board.vertex(middle).logical,
            });
        }
        board.assign_face(incoming, Some(face_id));
        board.link(incoming, outgoing);
        half_edges.push(incoming);
    }

    let edges = half_edges.iter().map(|&he| board.half_edge(he).edge).collect();
    let record = board.face_mut(face_id);
    record.half_edges = half_edges;
    record.edges = edges;
    record.vertices = corners;
    board.update_centroid(face_id);
    Ok(())
}

/// Convert a board back into face descriptors (counter-clockwise corners).
pub fn to_descriptors(board: &Board) -> Vec<FaceDescriptor> {
    board
        .faces()
        .map(|(_, face)| FaceDescriptor {
            logical: face.logical,
            vertices: face
                .vertices
                .iter()
                .map(|&v| {
                    let vertex = board.vertex(v);
                    VertexDescriptor::new(vertex.logical, vertex.position)
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(x: i64, y: i64) -> VertexDescriptor {
        VertexDescriptor::new(LatticeCoord::new(x, y), Point2::new(x as f64, y as f64))
    }

    fn unit_square(x: i64, y: i64) -> FaceDescriptor {
        FaceDescriptor::new(
            LatticeCoord::new(x, y),
            vec![
                corner(x, y),
                corner(x + 1, y),
                corner(x + 1, y + 1),
                corner(x, y + 1),
            ],
        )
    }

    fn triangle() -> FaceDescriptor {
        FaceDescriptor::new(
            LatticeCoord::new(0, 0),
            vec![corner(0, 0), corner(2, 0), corner(0, 2)],
        )
    }

    #[test]
    fn test_single_triangle() {
        let board = build_board(&[triangle()]).unwrap();

        assert_eq!(board.num_vertices(), 3);
        assert_eq!(board.num_faces(), 1);
        // 3 face half-edges + 3 boundary half-edges
        assert_eq!(board.num_half_edges(), 6);
        assert!(board.is_valid());

        for v in board.vertex_ids() {
            assert!(board.is_boundary_vertex(v));
            assert_eq!(board.degree(v), 2);
        }
    }

    #[test]
    fn test_clockwise_input_is_reoriented() {
        let mut face = unit_square(0, 0);
        face.vertices.reverse();
        let board = build_board(&[face]).unwrap();

        let f = board.face_ids().next().unwrap();
        assert!(board.face_signed_area(f) > 0.0);
        assert!((board.signed_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_squares_share_an_edge() {
        let board = build_board(&[unit_square(0, 0), unit_square(1, 0)]).unwrap();

        assert_eq!(board.num_vertices(), 6);
        assert_eq!(board.num_edges(), 7);
        assert_eq!(board.num_faces(), 2);
        assert_eq!(board.outer_boundary().len(), 6);
        assert!(board.is_valid());

        let shared = board
            .edges()
            .filter(|(_, e)| e.forward_face.is_some() && e.reversed_face.is_some())
            .count();
        assert_eq!(shared, 1);
    }

    #[test]
    fn test_canonical_direction_follows_logical_order() {
        let board = build_board(&[unit_square(0, 0), unit_square(1, 0)]).unwrap();
        for (_, edge) in board.edges() {
            assert!(board.vertex(edge.start).logical < board.vertex(edge.end).logical);
            assert!(!board.half_edge(edge.forward_half).is_reversed);
            assert!(board.half_edge(edge.reversed_half).is_reversed);
        }
    }

    #[test]
    fn test_face_lists_are_index_aligned() {
        let board = build_board(&[unit_square(0, 0), unit_square(0, 1)]).unwrap();
        for (_, face) in board.faces() {
            for (i, &he) in face.half_edges.iter().enumerate() {
                assert_eq!(board.start(he), face.vertices[i]);
                assert_eq!(board.half_edge(he).edge, face.edges[i]);
                assert_eq!(board.next(he), face.half_edges[(i + 1) % face.len()]);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(build_board(&[]).unwrap_err(), BoardError::EmptyBoard);
    }

    #[test]
    fn test_degenerate_face() {
        let face = FaceDescriptor::new(
            LatticeCoord::new(0, 0),
            vec![corner(0, 0), corner(1, 0), corner(0, 0)],
        );
        assert_eq!(
            build_board(&[face]).unwrap_err(),
            BoardError::DegenerateFace { face: 0, vertices: 2 }
        );
    }

    #[test]
    fn test_edge_shared_by_three_faces() {
        // Three triangles hinged on the edge (0,0)-(1,0)
        let fan = |apex: VertexDescriptor, logical: i64| {
            FaceDescriptor::new(LatticeCoord::new(logical, 0), vec![corner(0, 0), corner(1, 0), apex])
        };
        let faces = vec![
            fan(corner(0, 1), 0),
            fan(corner(0, -1), 1),
            fan(VertexDescriptor::new(LatticeCoord::new(5, 5), Point2::new(0.5, 2.0)), 2),
        ];
        assert!(matches!(
            build_board(&faces),
            Err(BoardError::NonManifoldEdge { .. })
        ));
    }

    #[test]
    fn test_descriptor_round_trip() {
        let faces = vec![unit_square(0, 0), unit_square(1, 0), unit_square(0, 1)];
        let board = build_board(&faces).unwrap();
        let rebuilt = build_board(&to_descriptors(&board)).unwrap();

        assert_eq!(rebuilt.num_vertices(), board.num_vertices());
        assert_eq!(rebuilt.num_edges(), board.num_edges());
        assert_eq!(rebuilt.num_faces(), board.num_faces());
        assert_eq!(rebuilt.outer_boundary().len(), board.outer_boundary().len());
    }
}
