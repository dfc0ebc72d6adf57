//! Structural invariant checks.
//!
//! [`validate`] walks every entity of a board and reports the first broken
//! cross-reference. It never aggregates: the first violation is the most
//! useful one for pinning down which step of a mutation went wrong.
//! [`debug_validate`] turns a violation into a panic in builds with debug
//! assertions and does nothing in release builds.

use std::collections::HashSet;

use thiserror::Error;

use super::board::Board;
use super::index::{EdgeId, FaceId, HalfEdgeId, VertexId};

/// The first structural invariant found broken on a board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A link points at an entity that is no longer part of the board.
    #[error("{from} references removed or unknown {what} {to}")]
    DanglingReference {
        /// Entity holding the reference.
        from: String,
        /// Kind of the missing entity.
        what: &'static str,
        /// The missing id.
        to: String,
    },

    /// `reversed(reversed(h)) != h`, or the pair disagrees on edge/endpoints.
    #[error("half-edge {0:?} is not mirrored by its reverse")]
    ReversedMismatch(HalfEdgeId),

    /// `next(previous(h)) != h` or `previous(next(h)) != h`, or a self link.
    #[error("half-edge {0:?} has inconsistent next/previous links")]
    ChainMismatch(HalfEdgeId),

    /// `next(h)` does not start where `h` ends.
    #[error("half-edge {0:?} is not continued by its next half-edge")]
    ChainGap(HalfEdgeId),

    /// `next(h)`, `previous(h)` and `h` disagree on their face.
    #[error("half-edge {0:?} shares a chain with a half-edge of another face")]
    FaceChainMismatch(HalfEdgeId),

    /// An edge's face pointers or endpoints disagree with its half-edges.
    #[error("edge {0:?} disagrees with its half-edges")]
    EdgeMismatch(EdgeId),

    /// A vertex's incoming/outgoing lists are not a closed CCW rotation.
    #[error("vertex {0:?} rotation order is not closed")]
    RotationMismatch(VertexId),

    /// A vertex's derived edge/face lists disagree with its half-edges.
    #[error("vertex {0:?} edge or face list is inconsistent")]
    VertexIncidence(VertexId),

    /// A vertex's incoming list misses some half-edges ending at it.
    #[error("vertex {vertex:?} lists {listed} incoming half-edges, board has {actual}")]
    IncompleteRotation {
        /// The vertex.
        vertex: VertexId,
        /// Incoming half-edges listed on the vertex.
        listed: usize,
        /// Half-edges on the board ending at the vertex.
        actual: usize,
    },

    /// A face's arrays are not index-aligned with its half-edge loop.
    #[error("face {0:?} half-edge, edge and vertex lists disagree")]
    FaceMismatch(FaceId),

    /// A vertex lists a face which does not list the vertex, or vice versa.
    #[error("vertex {vertex:?} and face {face:?} disagree on incidence")]
    FaceIncidence {
        /// The vertex.
        vertex: VertexId,
        /// The face.
        face: FaceId,
    },

    /// The boundary loops do not cover the boundary half-edges exactly once,
    /// or the outer boundary does not wind clockwise.
    #[error("boundary loops are inconsistent at half-edge {0:?}")]
    BoundaryMismatch(HalfEdgeId),

    /// The board has faces but no outer boundary loop.
    #[error("board has no outer boundary loop")]
    MissingOuterBoundary,
}

/// Panic on the first invariant violation (debug builds only).
#[inline]
pub fn debug_validate(board: &Board) {
    if cfg!(debug_assertions) {
        if let Err(violation) = validate(board) {
            panic!("board invariant violated: {}", violation);
        }
    }
}

/// Check every structural invariant of a board.
pub fn validate(board: &Board) -> Result<(), InvariantViolation> {
    check_half_edges(board)?;
    check_edges(board)?;
    check_vertices(board)?;
    check_faces(board)?;
    check_boundaries(board)?;
    Ok(())
}

fn dangling(from: impl std::fmt::Debug, what: &'static str, to: impl std::fmt::Debug) -> InvariantViolation {
    InvariantViolation::DanglingReference {
        from: format!("{:?}", from),
        what,
        to: format!("{:?}", to),
    }
}

fn check_half_edges(board: &Board) -> Result<(), InvariantViolation> {
    for (id, he) in board.half_edges() {
        if board.try_vertex(he.start).is_none() {
            return Err(dangling(id, "vertex", he.start));
        }
        if board.try_vertex(he.end).is_none() {
            return Err(dangling(id, "vertex", he.end));
        }
        if board.try_edge(he.edge).is_none() {
            return Err(dangling(id, "edge", he.edge));
        }
        if let Some(f) = he.face {
            if board.try_face(f).is_none() {
                return Err(dangling(id, "face", f));
            }
        }
        let reversed = board
            .try_half_edge(he.reversed)
            .ok_or_else(|| dangling(id, "half-edge", he.reversed))?;
        let next = board
            .try_half_edge(he.next)
            .ok_or_else(|| dangling(id, "half-edge", he.next))?;
        let previous = board
            .try_half_edge(he.previous)
            .ok_or_else(|| dangling(id, "half-edge", he.previous))?;

        // 1. reversed pairing
        if reversed.reversed != id
            || reversed.edge != he.edge
            || reversed.start != he.end
            || reversed.end != he.start
            || reversed.is_reversed == he.is_reversed
        {
            return Err(InvariantViolation::ReversedMismatch(id));
        }

        // 2. next/previous pairing
        if next.previous != id || previous.next != id || he.next == id || he.previous == id {
            return Err(InvariantViolation::ChainMismatch(id));
        }
        if next.start != he.end {
            return Err(InvariantViolation::ChainGap(id));
        }

        // 3. chains stay within one face
        if next.face != he.face || previous.face != he.face {
            return Err(InvariantViolation::FaceChainMismatch(id));
        }
    }
    Ok(())
}

fn check_edges(board: &Board) -> Result<(), InvariantViolation> {
    for (id, edge) in board.edges() {
        let forward = board
            .try_half_edge(edge.forward_half)
            .ok_or_else(|| dangling(id, "half-edge", edge.forward_half))?;
        let reversed = board
            .try_half_edge(edge.reversed_half)
            .ok_or_else(|| dangling(id, "half-edge", edge.reversed_half))?;

        // 4. face pointers mirror the half-edges
        let consistent = forward.edge == id
            && reversed.edge == id
            && !forward.is_reversed
            && reversed.is_reversed
            && forward.reversed == edge.reversed_half
            && forward.start == edge.start
            && forward.end == edge.end
            && edge.forward_face == forward.face
            && edge.reversed_face == reversed.face;
        if !consistent {
            return Err(InvariantViolation::EdgeMismatch(id));
        }
        if board.vertex(edge.start).logical >= board.vertex(edge.end).logical {
            return Err(InvariantViolation::EdgeMismatch(id));
        }
    }
    Ok(())
}

fn check_vertices(board: &Board) -> Result<(), InvariantViolation> {
    let mut ending_at = vec![0usize; board.vertex_index_bound()];
    for (_, he) in board.half_edges() {
        ending_at[he.end.index()] += 1;
    }

    for (id, vertex) in board.vertices() {
        let n = vertex.incoming.len();
        if n != ending_at[id.index()] {
            return Err(InvariantViolation::IncompleteRotation {
                vertex: id,
                listed: n,
                actual: ending_at[id.index()],
            });
        }
        if vertex.outgoing.len() != n || vertex.edges.len() != n {
            return Err(InvariantViolation::RotationMismatch(id));
        }

        // 5. incoming[i] -> reversed -> previous == incoming[i + 1]
        for i in 0..n {
            let incoming = vertex.incoming[i];
            let half = board
                .try_half_edge(incoming)
                .ok_or_else(|| dangling(id, "half-edge", incoming))?;
            if half.end != id || vertex.outgoing[i] != half.reversed {
                return Err(InvariantViolation::RotationMismatch(id));
            }
            if board.previous(half.reversed) != vertex.incoming[(i + 1) % n] {
                return Err(InvariantViolation::RotationMismatch(id));
            }
            if vertex.edges[i] != half.edge {
                return Err(InvariantViolation::VertexIncidence(id));
            }
        }

        // 6. face list is the set of faces around the rotation
        let around: HashSet<FaceId> = vertex
            .incoming
            .iter()
            .filter_map(|&he| board.face_of(he))
            .collect();
        let listed: HashSet<FaceId> = vertex.faces.iter().copied().collect();
        if around != listed || listed.len() != vertex.faces.len() {
            return Err(InvariantViolation::VertexIncidence(id));
        }
        for &f in &vertex.faces {
            if !board.face(f).vertices.contains(&id) {
                return Err(InvariantViolation::FaceIncidence { vertex: id, face: f });
            }
        }
    }
    Ok(())
}

fn check_faces(board: &Board) -> Result<(), InvariantViolation> {
    for (id, face) in board.faces() {
        let n = face.half_edges.len();
        if n < 3 || face.edges.len() != n || face.vertices.len() != n {
            return Err(InvariantViolation::FaceMismatch(id));
        }
        for i in 0..n {
            let he = face.half_edges[i];
            let half = board
                .try_half_edge(he)
                .ok_or_else(|| dangling(id, "half-edge", he))?;
            if half.face != Some(id)
                || half.edge != face.edges[i]
                || half.start != face.vertices[i]
                || half.next != face.half_edges[(i + 1) % n]
            {
                return Err(InvariantViolation::FaceMismatch(id));
            }
            let v = face.vertices[i];
            if !board.vertex(v).faces.contains(&id) {
                return Err(InvariantViolation::FaceIncidence { vertex: v, face: id });
            }
        }
    }
    Ok(())
}

fn check_boundaries(board: &Board) -> Result<(), InvariantViolation> {
    if board.num_faces() == 0 {
        return Ok(());
    }
    if board.outer_boundary().is_empty() {
        return Err(InvariantViolation::MissingOuterBoundary);
    }

    let mut seen: HashSet<HalfEdgeId> = HashSet::new();
    let loops = std::iter::once(board.outer_boundary()).chain(board.inner_boundaries().iter().map(Vec::as_slice));
    for (index, boundary) in loops.enumerate() {
        let n = boundary.len();
        for i in 0..n {
            let he = boundary[i];
            let half = board
                .try_half_edge(he)
                .ok_or_else(|| dangling("boundary loop", "half-edge", he))?;
            if !half.is_boundary() || half.next != boundary[(i + 1) % n] || !seen.insert(he) {
                return Err(InvariantViolation::BoundaryMismatch(he));
            }
        }
        let is_outer = index == 0;
        if is_outer != (board.loop_signed_area(boundary) < 0.0) {
            return Err(InvariantViolation::BoundaryMismatch(boundary[0]));
        }
    }

    for (he, half) in board.half_edges() {
        if half.is_boundary() && !seen.contains(&he) {
            return Err(InvariantViolation::BoundaryMismatch(he));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::square_board;

    #[test]
    fn test_fresh_board_is_valid() {
        let board = square_board(3, 3).unwrap();
        assert_eq!(validate(&board), Ok(()));
        debug_validate(&board);
    }

    #[test]
    fn test_detects_broken_next_link() {
        let mut board = square_board(2, 2).unwrap();
        let f = board.face_ids().next().unwrap();
        let he = board.face(f).half_edges[0];
        let skip = board.next(board.next(he));
        board.half_edge_mut(he).next = skip;

        assert!(validate(&board).is_err());
    }

    #[test]
    fn test_detects_stale_face_pointer() {
        let mut board = square_board(2, 1).unwrap();
        let e = board
            .edges()
            .find(|(_, edge)| edge.forward_face.is_some() && edge.reversed_face.is_some())
            .map(|(id, _)| id)
            .unwrap();
        board.edge_mut(e).forward_face = None;

        assert_eq!(validate(&board), Err(InvariantViolation::EdgeMismatch(e)));
    }

    #[test]
    fn test_detects_shuffled_rotation() {
        let mut board = square_board(2, 2).unwrap();
        let centre = board.find_vertex(crate::mesh::LatticeCoord::new(1, 1)).unwrap();
        let vertex = board.vertex_mut(centre);
        vertex.incoming.swap(0, 1);
        vertex.outgoing.swap(0, 1);
        vertex.edges.swap(0, 1);

        assert_eq!(
            validate(&board),
            Err(InvariantViolation::RotationMismatch(centre))
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "board invariant violated")]
    fn test_debug_validate_panics() {
        let mut board = square_board(1, 1).unwrap();
        let he = board
            .half_edges()
            .find(|(_, half)| half.face.is_some())
            .map(|(id, _)| id)
            .unwrap();
        board.half_edge_mut(he).face = None;
        debug_validate(&board);
    }
}
