//! Degree-2 vertex merging.

use log::trace;

use super::LayoutBoard;
use crate::error::Result;
use crate::mesh::{debug_validate, geometry, VertexId};

impl LayoutBoard {
    /// Replace a degree-2 vertex and its two edges by one edge between its
    /// neighbours.
    ///
    /// Returns `Ok(false)` without touching the board unless all of these hold:
    /// both edges share a state, every face around the vertex is
    /// unconstrained, the neighbours are distinct and not already adjacent,
    /// neither side of the vertex would drop below three sides, and neither
    /// side's loop would change the sign of its area.
    pub fn merge_degree_two(&mut self, v: VertexId) -> Result<bool> {
        let board = &self.board;
        let Some(vertex) = board.try_vertex(v) else {
            return Ok(false);
        };
        if vertex.degree() != 2 {
            return Ok(false);
        }
        if !vertex.faces.iter().all(|&f| self.is_unconstrained(Some(f))) {
            return Ok(false);
        }

        let (e1, e2) = (vertex.edges[0], vertex.edges[1]);
        let state = self.edge_state(e1);
        if self.edge_state(e2) != state {
            return Ok(false);
        }

        // in1: a -> v, in2: b -> v
        let (in1, in2) = (vertex.incoming[0], vertex.incoming[1]);
        let (a, b) = (board.start(in1), board.start(in2));
        if a == b || board.half_edge_between(a, b).is_some() {
            return Ok(false);
        }
        let (loop_ab, loop_ba) = (board.walk_loop(in1), board.walk_loop(in2));
        if loop_ab.len() < 4 || loop_ba.len() < 4 {
            return Ok(false);
        }

        // Cutting the corner must not flatten or fold either side
        let corner = geometry::signed_area(&[board.position(a), board.position(v), board.position(b)]);
        let (area_ab, area_ba) = (board.loop_signed_area(&loop_ab), board.loop_signed_area(&loop_ba));
        if !keeps_orientation(area_ab, area_ab - corner) || !keeps_orientation(area_ba, area_ba + corner) {
            return Ok(false);
        }

        let (out1, out2) = (board.reversed(in1), board.reversed(in2));
        // Side of in1 runs a -> v -> b, side of in2 runs b -> v -> a
        let (before_ab, after_ab) = (board.previous(in1), board.next(out2));
        let (before_ba, after_ba) = (board.previous(in2), board.next(out1));
        let (face_ab, face_ba) = (board.face_of(in1), board.face_of(in2));

        let board = &mut self.board;
        let (edge, ab, ba) = board.add_edge(a, b);
        board.link(before_ab, ab);
        board.link(ab, after_ab);
        board.link(before_ba, ba);
        board.link(ba, after_ba);
        board.assign_face(ab, face_ab);
        board.assign_face(ba, face_ba);

        board.remove_edge(e1);
        board.remove_edge(e2);
        board.vertices.remove(v);

        for (face, start) in [(face_ab, ab), (face_ba, ba)] {
            if let Some(f) = face {
                board.rebuild_face(f, start);
            }
        }
        board.rebuild_rotation(a, ba);
        board.rebuild_rotation(b, ab);

        self.edge_states.insert(edge, state);
        self.forget_removed();
        if face_ab.is_none() || face_ba.is_none() {
            self.rederive_boundaries()?;
        }

        trace!("merged degree-2 vertex {:?} into edge {:?}", v, edge);
        debug_validate(&self.board);
        Ok(true)
    }

    /// Try [`merge_degree_two`](Self::merge_degree_two) on every vertex once.
    /// Returns the number of vertices merged away.
    pub fn merge_degree_two_vertices(&mut self) -> Result<usize> {
        let candidates: Vec<VertexId> = self
            .board
            .vertices()
            .filter(|(_, vertex)| vertex.degree() == 2)
            .map(|(id, _)| id)
            .collect();

        let mut merged = 0;
        for v in candidates {
            if self.merge_degree_two(v)? {
                merged += 1;
            }
        }
        Ok(merged)
    }
}

fn keeps_orientation(before: f64, after: f64) -> bool {
    before != 0.0 && after * before.signum() > before.abs() * 1e-9
}
