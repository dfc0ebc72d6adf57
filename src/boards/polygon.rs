//! Boards from arbitrary polygon lists.
//!
//! Vertex identity is recovered by quantising positions onto an integer
//! lattice, so corners that coincide up to floating-point noise become the same
//! vertex.

use nalgebra::Point2;

use crate::error::{BoardError, Result};
use crate::mesh::{build_board, geometry, Board, FaceDescriptor, LatticeCoord, VertexDescriptor};

/// Options for polygon-list boards.
#[derive(Debug, Clone)]
pub struct PolygonBoardOptions {
    /// Lattice cells per unit length used to quantise positions into logical
    /// coordinates. Corners closer than `0.5 / precision` merge.
    pub precision: f64,
}

impl Default for PolygonBoardOptions {
    fn default() -> Self {
        Self { precision: 1e4 }
    }
}

impl PolygonBoardOptions {
    /// Set the quantisation precision.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    fn quantize(&self, p: &Point2<f64>) -> LatticeCoord {
        LatticeCoord::new(
            (p.x * self.precision).round() as i64,
            (p.y * self.precision).round() as i64,
        )
    }
}

/// Face descriptors for a polygon list.
///
/// Face identity is the quantised area centroid of the polygon.
pub fn polygon_descriptors(polygons: &[Vec<Point2<f64>>], options: &PolygonBoardOptions) -> Vec<FaceDescriptor> {
    polygons
        .iter()
        .map(|polygon| {
            let vertices = polygon
                .iter()
                .map(|p| VertexDescriptor::new(options.quantize(p), *p))
                .collect();
            FaceDescriptor::new(options.quantize(&geometry::centroid(polygon)), vertices)
        })
        .collect()
}

/// Build a board from polygons given in either winding.
pub fn polygon_board(polygons: &[Vec<Point2<f64>>], options: &PolygonBoardOptions) -> Result<Board> {
    if !(options.precision.is_finite() && options.precision > 0.0) {
        return Err(BoardError::invalid_param(
            "precision",
            options.precision,
            "must be positive and finite",
        ));
    }
    if let Some(bad) = polygons.iter().flatten().find(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Err(BoardError::invalid_param(
            "polygon vertex",
            format!("({}, {})", bad.x, bad.y),
            "coordinates must be finite",
        ));
    }
    build_board(&polygon_descriptors(polygons, options))
}
