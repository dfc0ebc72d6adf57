//! Board generators.
//!
//! Each generator is a pure function that produces face descriptors from some
//! geometric input and hands them to [`build_board`](crate::mesh::build_board).
//! The board flavour is purely a construction-time choice; every generator
//! returns the same [`Board`](crate::mesh::Board) type.
//!
//! # Generators
//!
//! - [`square_board`]: rectangular grid of unit squares
//! - [`hex_board`]: hexagon of flat-top hexagons in axial coordinates
//! - [`polygon_board`]: arbitrary polygon soup with quantised vertex identity
//! - [`tiling_board`]: a periodic [`TilingUnit`] repeated over a window
//!
//! # Example
//!
//! ```
//! use trellis::boards::{hex_board, tiling_board, PolygonBoardOptions, TilingUnit};
//!
//! let hex = hex_board(2).unwrap();
//! assert_eq!(hex.num_faces(), 7);
//!
//! let triangles = tiling_board(&TilingUnit::triangular(), 3, &PolygonBoardOptions::default()).unwrap();
//! assert_eq!(triangles.num_faces(), 18);
//! ```

mod hex;
mod polygon;
mod square;
mod tiling;

pub use hex::{hex_board, hex_descriptors};
pub use polygon::{polygon_board, polygon_descriptors, PolygonBoardOptions};
pub use square::{square_board, square_descriptors};
pub use tiling::{tiling_board, TilingUnit};
