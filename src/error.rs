//! Error types for trellis.
//!
//! Board construction reports malformed input through [`BoardError`]. These
//! are precondition violations on the caller's side: a generator that produced
//! a bridge or a non-manifold edge has a bug, and there is nothing to retry.
//! Structural invariant failures are reported separately through
//! [`InvariantViolation`](crate::mesh::InvariantViolation).

use thiserror::Error;

use crate::mesh::{HalfEdgeId, LatticeCoord};

/// Result type alias using [`BoardError`].
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur while building or re-deriving a board.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    /// The descriptor list has no faces.
    #[error("board has no faces")]
    EmptyBoard,

    /// A face descriptor has fewer than three distinct vertices.
    #[error("face {face} is degenerate ({vertices} distinct vertices)")]
    DegenerateFace {
        /// The face descriptor index.
        face: usize,
        /// Number of distinct vertices found.
        vertices: usize,
    },

    /// A directed edge is claimed by two faces: the edge is shared by more
    /// than two faces, or two neighbours wind inconsistently.
    #[error("edge {start} -> {end} is used by more than one face in the same direction")]
    NonManifoldEdge {
        /// Start of the directed edge.
        start: LatticeCoord,
        /// End of the directed edge.
        end: LatticeCoord,
    },

    /// A boundary half-edge does not have exactly one boundary successor
    /// (bridges, dangling edges or faces touching at a single vertex).
    #[error("boundary at vertex {vertex} has {candidates} continuation candidates, expected 1")]
    AmbiguousBoundary {
        /// The vertex where the boundary walk is ambiguous.
        vertex: LatticeCoord,
        /// Number of candidate successors found.
        candidates: usize,
    },

    /// A boundary loop walk left the set of boundary half-edges.
    #[error("boundary loop through {half_edge:?} is not closed over boundary half-edges")]
    CorruptBoundary {
        /// The first half-edge found off the loop.
        half_edge: HalfEdgeId,
    },

    /// No boundary loop winds clockwise.
    #[error("board has no outer boundary")]
    NoOuterBoundary,

    /// More than one boundary loop winds clockwise.
    #[error("board has {count} outer boundaries, expected exactly 1")]
    MultipleOuterBoundaries {
        /// Number of clockwise loops found.
        count: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl BoardError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        BoardError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
