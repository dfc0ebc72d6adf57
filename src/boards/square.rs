//! Rectangular grids of unit squares.

use nalgebra::Point2;

use crate::error::{BoardError, Result};
use crate::mesh::{build_board, Board, FaceDescriptor, LatticeCoord, VertexDescriptor};

/// Face descriptors for a `width` x `height` grid of unit squares.
///
/// Vertex `(x, y)` has logical coordinate `(x, y)` and sits at `(x, y)`;
/// face `(x, y)` is the square whose lower-left corner is vertex `(x, y)`.
pub fn square_descriptors(width: usize, height: usize) -> Vec<FaceDescriptor> {
    let corner = |x: usize, y: usize| {
        VertexDescriptor::new(
            LatticeCoord::new(x as i64, y as i64),
            Point2::new(x as f64, y as f64),
        )
    };

    let mut faces = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            faces.push(FaceDescriptor::new(
                LatticeCoord::new(x as i64, y as i64),
                vec![corner(x, y), corner(x + 1, y), corner(x + 1, y + 1), corner(x, y + 1)],
            ));
        }
    }
    faces
}

/// Build a `width` x `height` square grid board.
pub fn square_board(width: usize, height: usize) -> Result<Board> {
    if width == 0 {
        return Err(BoardError::invalid_param("width", width, "must be at least 1"));
    }
    if height == 0 {
        return Err(BoardError::invalid_param("height", height, "must be at least 1"));
    }
    build_board(&square_descriptors(width, height))
}
