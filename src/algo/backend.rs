//! Interchangeable layout backends.
//!
//! The built-in [`ForceRelaxation`] works on the board directly. Any other
//! force-directed layout can be plugged in through [`GraphLayout`], which
//! only sees a [`LayoutGraph`]: vertex positions, edge adjacency, and
//! repulsion hints between corners of the same face that are not joined by
//! an edge.
//!
//! ```
//! use trellis::algo::backend::{GraphLayout, LayoutBackend, LayoutGraph};
//! use trellis::boards::square_board;
//!
//! let mut board = square_board(2, 2).unwrap();
//! let shift = GraphLayout(|graph: &mut LayoutGraph| {
//!     for p in &mut graph.positions {
//!         p.x += 1.0;
//!     }
//! });
//! shift.relayout(&mut board);
//! assert_eq!(board.bounding_box().unwrap().0.x, 1.0);
//! ```

use std::collections::{BTreeSet, HashMap};

use nalgebra::Point2;

use super::relax::{relax, RelaxOptions, RelaxReport};
use crate::mesh::{Board, VertexId};

/// A board flattened to an indexed graph for external layout code.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGraph {
    /// Board vertex behind each graph node.
    pub vertices: Vec<VertexId>,
    /// Node positions; read back by [`LayoutGraph::apply`].
    pub positions: Vec<Point2<f64>>,
    /// Edges as node index pairs, smaller index first.
    pub edges: Vec<(usize, usize)>,
    /// Non-consecutive corner pairs of each face, smaller index first,
    /// without duplicates.
    pub repulsions: Vec<(usize, usize)>,
}

impl LayoutGraph {
    /// Export a board's vertices, edges and repulsion hints.
    pub fn from_board(board: &Board) -> Self {
        let vertices: Vec<VertexId> = board.vertex_ids().collect();
        let node: HashMap<VertexId, usize> = vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let positions = vertices.iter().map(|&v| board.position(v)).collect();
        let ordered = |a: usize, b: usize| if a < b { (a, b) } else { (b, a) };

        let edges: Vec<(usize, usize)> = board
            .edges()
            .map(|(_, edge)| ordered(node[&edge.start], node[&edge.end]))
            .collect();
        let adjacent: BTreeSet<(usize, usize)> = edges.iter().copied().collect();

        let mut repulsions = BTreeSet::new();
        for (_, face) in board.faces() {
            let corners: Vec<usize> = face.vertices.iter().map(|v| node[v]).collect();
            let n = corners.len();
            for i in 0..n {
                for j in (i + 2)..n {
                    if i == 0 && j == n - 1 {
                        continue;
                    }
                    let pair = ordered(corners[i], corners[j]);
                    if !adjacent.contains(&pair) {
                        repulsions.insert(pair);
                    }
                }
            }
        }

        Self {
            vertices,
            positions,
            edges,
            repulsions: repulsions.into_iter().collect(),
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Write node positions back to the board.
    ///
    /// # Panics
    /// Panics if a position is not finite.
    pub fn apply(&self, board: &mut Board) {
        for (&v, &p) in self.vertices.iter().zip(&self.positions) {
            assert!(p.x.is_finite() && p.y.is_finite(), "non-finite position for {:?}", v);
            board.set_position(v, p);
        }
        board.update_centroids();
    }
}

/// Something that can re-embed a board's vertices.
pub trait LayoutBackend {
    /// Move the board's vertices; topology is untouched.
    fn relayout(&self, board: &mut Board);
}

/// The built-in relaxation engine as a backend.
#[derive(Debug, Clone, Default)]
pub struct ForceRelaxation {
    /// Relaxation parameters.
    pub options: RelaxOptions,
}

impl ForceRelaxation {
    /// Create a backend with the given options.
    pub fn new(options: RelaxOptions) -> Self {
        Self { options }
    }

    /// Relax and return the run summary.
    pub fn run(&self, board: &mut Board) -> RelaxReport {
        relax(board, &self.options)
    }
}

impl LayoutBackend for ForceRelaxation {
    fn relayout(&self, board: &mut Board) {
        self.run(board);
    }
}

/// Adapter for layout code that works on a [`LayoutGraph`].
pub struct GraphLayout<F>(pub F);

impl<F> LayoutBackend for GraphLayout<F>
where
    F: Fn(&mut LayoutGraph),
{
    fn relayout(&self, board: &mut Board) {
        let mut graph = LayoutGraph::from_board(board);
        (self.0)(&mut graph);
        graph.apply(board);
    }
}
