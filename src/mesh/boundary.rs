//! Boundary loop discovery.
//!
//! Two entry points share one classification rule. During construction,
//! [`link_boundary_loops`] decides each boundary half-edge's successor
//! combinatorially and wires `next`/`previous`; afterwards (and after every
//! topology edit) [`collect_boundary_loops`] walks the existing `next` links
//! and sorts the loops into the single outer boundary and the holes.

use std::collections::{HashMap, HashSet};

use super::board::Board;
use super::index::{HalfEdgeId, VertexId};
use crate::error::{BoardError, Result};

/// Wire `next`/`previous` between boundary half-edges.
///
/// The successor of a boundary half-edge is the unique other boundary
/// half-edge leaving its end vertex that is not its own reverse. Anything but
/// exactly one candidate means the input had a bridge, a dangling edge or a
/// pinch vertex.
pub(crate) fn link_boundary_loops(board: &mut Board) -> Result<()> {
    let boundary: Vec<HalfEdgeId> = board
        .half_edge_ids()
        .filter(|&he| board.is_boundary_half_edge(he))
        .collect();

    let mut leaving: HashMap<VertexId, Vec<HalfEdgeId>> = HashMap::new();
    for &he in &boundary {
        leaving.entry(board.start(he)).or_default().push(he);
    }

    let mut links = Vec::with_capacity(boundary.len());
    for &he in &boundary {
        let end = board.end(he);
        let reverse = board.reversed(he);
        let candidates: Vec<HalfEdgeId> = leaving
            .get(&end)
            .map(|hes| hes.iter().copied().filter(|&c| c != reverse).collect())
            .unwrap_or_default();

        if candidates.len() != 1 {
            return Err(BoardError::AmbiguousBoundary {
                vertex: board.vertex(end).logical,
                candidates: candidates.len(),
            });
        }
        links.push((he, candidates[0]));
    }

    for (he, next) in links {
        board.link(he, next);
    }
    Ok(())
}

/// Collect the boundary loops by following `next` links and classify them.
///
/// A loop with negative signed area (over its start points) is the outer
/// boundary; any other loop is a hole. Exactly one outer boundary must exist.
pub(crate) fn collect_boundary_loops(board: &mut Board) -> Result<()> {
    let mut visited: HashSet<HalfEdgeId> = HashSet::new();
    let mut outer: Vec<Vec<HalfEdgeId>> = Vec::new();
    let mut inner: Vec<Vec<HalfEdgeId>> = Vec::new();

    let boundary: Vec<HalfEdgeId> = board
        .half_edge_ids()
        .filter(|&he| board.is_boundary_half_edge(he))
        .collect();

    for start in boundary {
        if visited.contains(&start) {
            continue;
        }

        let mut loop_hes = Vec::new();
        let mut current = start;
        loop {
            if !board.is_boundary_half_edge(current) || !visited.insert(current) {
                return Err(BoardError::CorruptBoundary { half_edge: current });
            }
            loop_hes.push(current);
            current = board.next(current);
            if current == start {
                break;
            }
        }

        if board.loop_signed_area(&loop_hes) < 0.0 {
            outer.push(loop_hes);
        } else {
            inner.push(loop_hes);
        }
    }

    match outer.len() {
        0 => Err(BoardError::NoOuterBoundary),
        1 => {
            board.outer_boundary = outer.pop().unwrap_or_default();
            board.inner_boundaries = inner;
            Ok(())
        }
        count => Err(BoardError::MultipleOuterBoundaries { count }),
    }
}
