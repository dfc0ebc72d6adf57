//! Mutable layout boards: puzzle classification plus topology simplification.
//!
//! A [`LayoutBoard`] is a private copy of a [`Board`] carrying a per-edge
//! [`EdgeState`] and a per-face clue value. As a puzzle gets solved, parts of
//! the board stop carrying information; the operations here collapse that
//! topology away while keeping the board a valid half-edge structure after
//! every single operation.
//!
//! # Operations
//!
//! - [`LayoutBoard::clear_satisfied_faces`]: drop clues whose edges are all decided
//! - [`LayoutBoard::collapse_dead_zones`]: merge or open groups of faces joined
//!   by dead edges
//! - [`LayoutBoard::merge_degree_two`]: replace a degree-2 vertex and its two
//!   equally classified edges by a single edge
//! - [`LayoutBoard::simplify`]: run all of the above to a fixpoint
//!
//! # Example
//!
//! ```
//! use trellis::boards::square_board;
//! use trellis::layout::{EdgeState, LayoutBoard, SimplifyOptions};
//!
//! let board = square_board(2, 2).unwrap();
//! let mut layout = LayoutBoard::new(
//!     &board,
//!     |e| if board.edge(e).is_boundary() { EdgeState::Black } else { EdgeState::Red },
//!     |_| None,
//! );
//!
//! let report = layout.simplify(&SimplifyOptions::default()).unwrap();
//! assert_eq!(report.interior_zones, 1);
//! assert_eq!(layout.board().num_faces(), 1);
//! ```

mod merge;
mod zones;

use std::collections::HashMap;

use log::debug;

use crate::algo::relax::{relax, RelaxOptions, RelaxReport};
use crate::error::Result;
use crate::mesh::{collect_boundary_loops, debug_validate, Board, EdgeId, FaceId, VertexId};

pub use zones::ZoneReport;

/// Classification of an edge in an edge-state puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeState {
    /// Undecided.
    #[default]
    White,
    /// Part of the solution path.
    Black,
    /// Known not to be part of the solution path.
    Red,
}

impl EdgeState {
    /// Whether the state is decided (not [`EdgeState::White`]).
    #[inline]
    pub fn is_decided(self) -> bool {
        self != EdgeState::White
    }
}

/// Options for [`LayoutBoard::simplify`].
#[derive(Debug, Clone)]
pub struct SimplifyOptions {
    /// Clear clues of faces whose edges are all decided.
    pub clear_faces: bool,

    /// Collapse zones of faces joined by dead edges.
    pub collapse_dead_zones: bool,

    /// Merge degree-2 vertices whose edges share a state.
    pub merge_degree_two: bool,

    /// Upper bound on simplification passes.
    pub max_passes: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            clear_faces: true,
            collapse_dead_zones: true,
            merge_degree_two: true,
            max_passes: 64,
        }
    }
}

impl SimplifyOptions {
    /// Enable or disable clue clearing.
    pub fn with_clear_faces(mut self, enabled: bool) -> Self {
        self.clear_faces = enabled;
        self
    }

    /// Enable or disable dead-zone collapse.
    pub fn with_collapse_dead_zones(mut self, enabled: bool) -> Self {
        self.collapse_dead_zones = enabled;
        self
    }

    /// Enable or disable degree-2 merging.
    pub fn with_merge_degree_two(mut self, enabled: bool) -> Self {
        self.merge_degree_two = enabled;
        self
    }

    /// Set the maximum number of passes.
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }
}

/// What a [`LayoutBoard::simplify`] run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimplifyReport {
    /// Passes executed.
    pub passes: usize,
    /// Clues cleared.
    pub faces_cleared: usize,
    /// Zones merged into a single face.
    pub interior_zones: usize,
    /// Zones opened to the exterior.
    pub exterior_zones: usize,
    /// Zones left untouched in the final pass because collapsing them would
    /// break the board.
    pub skipped_zones_last_pass: usize,
    /// Degree-2 vertices merged away.
    pub vertices_merged: usize,
}

/// A board under simplification, with its puzzle classification.
#[derive(Debug, Clone)]
pub struct LayoutBoard {
    board: Board,
    edge_states: HashMap<EdgeId, EdgeState>,
    face_values: HashMap<FaceId, u32>,
}

impl LayoutBoard {
    /// Clone a board and attach a classification to it.
    ///
    /// `face_value` returns the face's clue, or `None` for an unconstrained face.
    pub fn new<E, F>(board: &Board, edge_state: E, face_value: F) -> Self
    where
        E: Fn(EdgeId) -> EdgeState,
        F: Fn(FaceId) -> Option<u32>,
    {
        let edge_states = board.edge_ids().map(|e| (e, edge_state(e))).collect();
        let face_values = board
            .face_ids()
            .filter_map(|f| face_value(f).map(|value| (f, value)))
            .collect();
        Self {
            board: board.clone(),
            edge_states,
            face_values,
        }
    }

    /// Take ownership of a board with every edge undecided and no clues.
    pub fn from_board(board: Board) -> Self {
        let edge_states = board.edge_ids().map(|e| (e, EdgeState::White)).collect();
        Self {
            board,
            edge_states,
            face_values: HashMap::new(),
        }
    }

    /// The current board.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable access for position edits; topology stays crate-private.
    #[inline]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Give up the classification and return the board.
    pub fn into_board(self) -> Board {
        self.board
    }

    /// State of an edge (undecided if never set).
    #[inline]
    pub fn edge_state(&self, e: EdgeId) -> EdgeState {
        self.edge_states.get(&e).copied().unwrap_or_default()
    }

    /// Set the state of an edge.
    pub fn set_edge_state(&mut self, e: EdgeId, state: EdgeState) {
        self.edge_states.insert(e, state);
    }

    /// Clue of a face, `None` when unconstrained.
    #[inline]
    pub fn face_value(&self, f: FaceId) -> Option<u32> {
        self.face_values.get(&f).copied()
    }

    /// Set or clear the clue of a face.
    pub fn set_face_value(&mut self, f: FaceId, value: Option<u32>) {
        match value {
            Some(value) => self.face_values.insert(f, value),
            None => self.face_values.remove(&f),
        };
    }

    /// Whether a face carries no clue. The exterior (`None`) counts as unconstrained.
    #[inline]
    pub fn is_unconstrained(&self, f: Option<FaceId>) -> bool {
        f.map_or(true, |f| !self.face_values.contains_key(&f))
    }

    /// An edge is dead when it is known absent and no neighbouring face has a clue.
    pub fn is_dead_edge(&self, e: EdgeId) -> bool {
        let edge = self.board.edge(e);
        self.edge_state(e) == EdgeState::Red
            && self.is_unconstrained(edge.forward_face)
            && self.is_unconstrained(edge.reversed_face)
    }

    /// Whether every edge of a face is decided.
    pub fn is_face_resolved(&self, f: FaceId) -> bool {
        self.board
            .face(f)
            .edges
            .iter()
            .all(|&e| self.edge_state(e).is_decided())
    }

    /// Clear the clue of every face whose edges are all decided.
    ///
    /// A label change only; topology is untouched. Returns the number of clues
    /// cleared.
    pub fn clear_satisfied_faces(&mut self) -> usize {
        let resolved: Vec<FaceId> = self
            .face_values
            .keys()
            .copied()
            .filter(|&f| self.is_face_resolved(f))
            .collect();
        for f in &resolved {
            self.face_values.remove(f);
        }
        if !resolved.is_empty() {
            debug!("cleared {} resolved clues", resolved.len());
        }
        resolved.len()
    }

    /// Recompute the outer boundary and holes from the current `next` links.
    pub fn rederive_boundaries(&mut self) -> Result<()> {
        collect_boundary_loops(&mut self.board)
    }

    /// Run clue clearing, zone collapse and degree-2 merging until nothing
    /// changes (or `max_passes` is reached).
    pub fn simplify(&mut self, options: &SimplifyOptions) -> Result<SimplifyReport> {
        let mut report = SimplifyReport::default();

        while report.passes < options.max_passes {
            report.passes += 1;
            let mut changed = 0;

            if options.clear_faces {
                let cleared = self.clear_satisfied_faces();
                report.faces_cleared += cleared;
                changed += cleared;
            }

            if options.collapse_dead_zones {
                let zones = self.collapse_dead_zones()?;
                report.interior_zones += zones.interior;
                report.exterior_zones += zones.exterior;
                report.skipped_zones_last_pass = zones.skipped;
                changed += zones.interior + zones.exterior;
            }

            if options.merge_degree_two {
                let merged = self.merge_degree_two_vertices()?;
                report.vertices_merged += merged;
                changed += merged;
            }

            if changed == 0 {
                break;
            }
        }

        debug!(
            "simplified in {} passes: {} clues cleared, {} zones merged, {} opened, {} skipped in the last pass, {} vertices merged",
            report.passes,
            report.faces_cleared,
            report.interior_zones,
            report.exterior_zones,
            report.skipped_zones_last_pass,
            report.vertices_merged
        );
        debug_validate(&self.board);
        Ok(report)
    }

    /// Re-embed the board after simplification; see [`crate::algo::relax`].
    pub fn relax(&mut self, options: &RelaxOptions) -> RelaxReport {
        relax(&mut self.board, options)
    }

    /// Drop the classification of removed entities.
    fn forget_removed(&mut self) {
        let board = &self.board;
        self.edge_states.retain(|&e, _| board.try_edge(e).is_some());
        self.face_values.retain(|&f, _| board.try_face(f).is_some());
    }

    /// Rebuild the rotation of a vertex after some of its edges were removed,
    /// or remove the vertex if none remain. Returns whether it survived.
    fn refresh_vertex(&mut self, v: VertexId) -> bool {
        let seed = self
            .board
            .vertex(v)
            .incoming
            .iter()
            .copied()
            .find(|&he| self.board.try_half_edge(he).is_some());
        match seed {
            Some(seed) => {
                self.board.rebuild_rotation(v, seed);
                true
            }
            None => {
                self.board.vertices.remove(v);
                false
            }
        }
    }
}
