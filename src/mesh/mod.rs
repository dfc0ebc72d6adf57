//! Core board data structures.
//!
//! This module provides the half-edge board representation, the builder that
//! turns face descriptors into a linked board, and the invariant validator.
//!
//! # Overview
//!
//! The primary type is [`Board`], which represents a planar subdivision using
//! a half-edge (doubly-connected edge list) data structure. Every cyclic
//! reference (next, previous, reversed, edge, face) is stored as a typed index
//! into one of the board's arenas, so traversal stays O(1) without any
//! ownership cycles.
//!
//! # Index Types
//!
//! Board elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`EdgeId`] - Identifies a full edge
//! - [`FaceId`] - Identifies a face
//!
//! # Construction
//!
//! Boards are built from face descriptors, usually produced by one of the
//! generators in [`crate::boards`]:
//!
//! ```
//! use trellis::boards::square_board;
//!
//! let board = square_board(2, 2).unwrap();
//! assert_eq!(board.num_vertices(), 9);
//! assert_eq!(board.num_edges(), 12);
//! assert_eq!(board.outer_boundary().len(), 8);
//! ```

mod arena;
mod board;
mod boundary;
mod builder;
pub mod geometry;
mod index;
mod validate;

pub use arena::Arena;
pub use board::{Board, Edge, Face, HalfEdge, LatticeCoord, Vertex};
pub use builder::{build_board, to_descriptors, FaceDescriptor, VertexDescriptor};
pub use index::{EdgeId, ElementId, FaceId, HalfEdgeId, VertexId};
pub use validate::{debug_validate, validate, InvariantViolation};

pub(crate) use boundary::collect_boundary_loops;
