//! Periodic tilings.
//!
//! A [`TilingUnit`] is a translational unit of a periodic tiling: a handful of
//! polygons plus the two lattice vectors that repeat them. [`tiling_board`]
//! stamps the unit over an `extent` x `extent` window of the lattice and builds
//! the result as a polygon board.

use nalgebra::{Point2, Vector2};

use super::polygon::{polygon_board, PolygonBoardOptions};
use crate::error::{BoardError, Result};
use crate::mesh::Board;

/// One translational unit of a periodic tiling.
#[derive(Debug, Clone)]
pub struct TilingUnit {
    /// Polygons of the unit, in either winding.
    pub polygons: Vec<Vec<Point2<f64>>>,
    /// The two lattice vectors the unit repeats along.
    pub basis: [Vector2<f64>; 2],
}

impl TilingUnit {
    /// Create a unit from polygons and lattice vectors.
    pub fn new(polygons: Vec<Vec<Point2<f64>>>, a: Vector2<f64>, b: Vector2<f64>) -> Self {
        Self {
            polygons,
            basis: [a, b],
        }
    }

    /// The square tiling: one unit square per cell.
    pub fn square() -> Self {
        Self::new(
            vec![vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ]],
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        )
    }

    /// The triangular tiling: an up and a down unit triangle per cell.
    pub fn triangular() -> Self {
        let h = 3f64.sqrt() / 2.0;
        Self::new(
            vec![
                vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.5, h)],
                vec![Point2::new(1.0, 0.0), Point2::new(1.5, h), Point2::new(0.5, h)],
            ],
            Vector2::new(1.0, 0.0),
            Vector2::new(0.5, h),
        )
    }

    /// The rhombille tiling: each flat-top hexagon split into three rhombi
    /// meeting at its centre.
    pub fn rhombille() -> Self {
        let corner = |k: usize| {
            let angle = std::f64::consts::FRAC_PI_3 * k as f64;
            Point2::new(angle.cos(), angle.sin())
        };
        let centre = Point2::origin();
        Self::new(
            vec![
                vec![centre, corner(0), corner(1), corner(2)],
                vec![centre, corner(2), corner(3), corner(4)],
                vec![centre, corner(4), corner(5), corner(0)],
            ],
            Vector2::new(1.5, 3f64.sqrt() / 2.0),
            Vector2::new(0.0, 3f64.sqrt()),
        )
    }

    /// The unit's polygons translated to lattice cell `(i, j)`.
    pub fn cell(&self, i: i64, j: i64) -> impl Iterator<Item = Vec<Point2<f64>>> + '_ {
        let offset = self.basis[0] * i as f64 + self.basis[1] * j as f64;
        self.polygons
            .iter()
            .map(move |polygon| polygon.iter().map(|p| p + offset).collect())
    }
}

/// Build a board covering `extent` x `extent` cells of a periodic tiling.
pub fn tiling_board(unit: &TilingUnit, extent: usize, options: &PolygonBoardOptions) -> Result<Board> {
    if extent == 0 {
        return Err(BoardError::invalid_param("extent", extent, "must be at least 1"));
    }
    if unit.polygons.is_empty() {
        return Err(BoardError::invalid_param("polygons", 0, "tiling unit needs at least one polygon"));
    }

    let extent = extent as i64;
    let mut polygons = Vec::with_capacity(unit.polygons.len() * (extent * extent) as usize);
    for j in 0..extent {
        for i in 0..extent {
            polygons.extend(unit.cell(i, j));
        }
    }
    polygon_board(&polygons, options)
}
