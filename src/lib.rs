//! # Trellis
//!
//! A planar mesh engine for grid-logic puzzle boards.
//!
//! Trellis represents every board (square grids, hexagonal grids, arbitrary
//! polygon tilings) as a half-edge structure built deterministically from
//! face descriptors, checks it against a full set of structural invariants,
//! and lets a solver collapse solved regions at run time before re-embedding
//! the result with a force-based relaxation.
//!
//! ## Features
//!
//! - **Half-edge boards**: O(1) adjacency queries with typed, stable ids
//! - **Combinatorial construction**: boundary loops and vertex rotations are
//!   recovered from links alone, without angle heuristics
//! - **Invariant validator**: reports the first broken invariant by entity
//! - **Simplification**: clue clearing, dead-zone collapse, degree-2 merging
//! - **Relaxation**: springs, Procrustes shape matching, angular order
//!   preservation and area correction
//!
//! ## Quick Start
//!
//! ```
//! use trellis::prelude::*;
//!
//! let board = square_board(2, 2).unwrap();
//! assert_eq!(board.num_vertices(), 9);
//! assert_eq!(board.num_edges(), 12);
//! assert_eq!(board.num_faces(), 4);
//! assert_eq!(board.outer_boundary().len(), 8);
//! assert!(board.inner_boundaries().is_empty());
//! assert!(validate(&board).is_ok());
//! ```
//!
//! ## Building From Descriptors
//!
//! ```
//! use trellis::prelude::*;
//! use nalgebra::Point2;
//!
//! let corner = |x: i64, y: i64| VertexDescriptor::new(LatticeCoord::new(x, y), Point2::new(x as f64, y as f64));
//! let faces = vec![
//!     FaceDescriptor::new(LatticeCoord::new(0, 0), vec![corner(0, 0), corner(1, 0), corner(0, 1)]),
//!     FaceDescriptor::new(LatticeCoord::new(1, 0), vec![corner(1, 0), corner(1, 1), corner(0, 1)]),
//! ];
//!
//! let board = build_board(&faces).unwrap();
//! assert_eq!(board.num_edges(), 5);
//! assert!((board.signed_area() - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Simplify and Relax
//!
//! ```
//! use trellis::prelude::*;
//!
//! let board = square_board(3, 3).unwrap();
//! let mut layout = LayoutBoard::new(
//!     &board,
//!     |e| if board.edge(e).is_boundary() { EdgeState::Black } else { EdgeState::Red },
//!     |_| None,
//! );
//!
//! layout.simplify(&SimplifyOptions::default()).unwrap();
//! assert_eq!(layout.board().num_faces(), 1);
//!
//! let area = layout.board().signed_area();
//! layout.relax(&RelaxOptions::default().with_iterations(50));
//! assert!((layout.board().signed_area() - area).abs() < 1e-9 * area);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod boards;
pub mod error;
pub mod layout;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::relax::{relax, RelaxOptions, RelaxReport};
    pub use crate::boards::{hex_board, polygon_board, square_board, tiling_board, PolygonBoardOptions, TilingUnit};
    pub use crate::error::{BoardError, Result};
    pub use crate::layout::{EdgeState, LayoutBoard, SimplifyOptions, SimplifyReport};
    pub use crate::mesh::{
        build_board, to_descriptors, validate, Board, EdgeId, FaceDescriptor, FaceId, HalfEdgeId,
        InvariantViolation, LatticeCoord, VertexDescriptor, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
