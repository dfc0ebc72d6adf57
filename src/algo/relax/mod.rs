//! Force-based re-embedding of a board.
//!
//! Topology edits leave vertex positions that no longer draw the board well:
//! merged faces become long thin polygons, removed vertices leave kinks. The
//! relaxation engine moves vertices (never topology) toward a legible layout
//! by summing several independent force fields and integrating them with a
//! decaying step size.
//!
//! # Force generators
//!
//! - [`hooke_forces`]: springs toward the ideal edge length
//! - [`barycentric_forces`]: pull toward the neighbour average
//! - [`shape_forces`]: regular-polygon shape matching by Procrustes alignment,
//!   with a defect ratio that prioritises un-crossing self-intersecting faces
//! - [`angular_forces`]: even angular spacing around vertices of degree three
//!   or more, gated on the rotation order still being intact
//! - [`area_correction`]: a radial field that keeps the total board area fixed
//!
//! # Example
//!
//! ```
//! use trellis::algo::relax::{relax, RelaxOptions};
//! use trellis::boards::hex_board;
//!
//! let mut board = hex_board(2).unwrap();
//! let area = board.signed_area();
//! let report = relax(&mut board, &RelaxOptions::default().with_iterations(20));
//! assert!(report.iterations <= 20);
//! assert!((board.signed_area() - area).abs() < 1e-9 * area);
//! ```

mod angular;
mod area;
mod field;
mod shape;
mod springs;

use log::{info, trace};
use nalgebra::Vector2;
use rayon::prelude::*;

use super::Progress;
use crate::mesh::{Board, VertexId};

pub use angular::{angular_forces, ease, is_counter_clockwise_order};
pub use area::{area_correction, AREA_CORRECTION_ITERATIONS};
pub use field::ForceField;
pub use shape::{defect_ratio, regular_polygon, regular_polygon_targets, shape_forces, ShapeForces};
pub use springs::{barycentric_forces, hooke_forces};

/// Options for regular-polygon shape matching.
#[derive(Debug, Clone)]
pub struct ShapeOptions {
    /// Scale of the corrective force.
    pub strength: f64,

    /// Distance between non-adjacent sides below which a face counts as
    /// partly defective.
    pub defect_distance: f64,

    /// Extra weight of the shape force on a fully defective face.
    pub defect_boost: f64,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            strength: 1.0,
            defect_distance: 0.1,
            defect_boost: 4.0,
        }
    }
}

/// Options for angular order preservation.
#[derive(Debug, Clone)]
pub struct AngularOptions {
    /// Scale of the corrective force.
    pub strength: f64,

    /// Cosine gate on the fit.
    ///
    /// After the evenly spaced slots are rotated onto the edges, the force
    /// engages only while the smallest cosine between a slot and its edge
    /// direction exceeds this value. Alignment is checked per edge, not as
    /// a ratio of pairwise dot products.
    pub similarity_threshold: f64,
}

impl Default for AngularOptions {
    fn default() -> Self {
        Self {
            strength: 1.0,
            similarity_threshold: 0.5,
        }
    }
}

/// Attempts at fitting an area-corrected step under the distance bound.
const CLAMP_REFINEMENTS: usize = 8;

/// Options for [`relax`].
#[derive(Debug, Clone)]
pub struct RelaxOptions {
    /// Maximum number of iterations.
    pub iterations: usize,

    /// Target edge length for springs and shape matching.
    pub ideal_edge_length: f64,

    /// Step size of the first iteration.
    pub initial_step: f64,

    /// Factor applied to the step size every `decay_interval` iterations.
    pub step_decay: f64,

    /// Iterations between step decays.
    pub decay_interval: usize,

    /// Largest distance any vertex may move in one iteration, area
    /// correction included.
    pub max_step_distance: f64,

    /// Stop once the largest force falls below this.
    pub convergence_threshold: f64,

    /// Weight of the Hooke springs.
    pub hooke_weight: f64,

    /// Weight of regular-polygon shape matching.
    pub polygon_weight: f64,

    /// Weight of angular order preservation.
    pub angular_weight: f64,

    /// Weight of barycentric smoothing.
    pub barycentric_weight: f64,

    /// Keep the total board area fixed.
    pub preserve_area: bool,

    /// Whether to use parallel execution (default: false).
    pub parallel: bool,

    /// Shape matching parameters.
    pub shape: ShapeOptions,

    /// Angular parameters.
    pub angular: AngularOptions,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            iterations: 400,
            ideal_edge_length: 1.0,
            initial_step: 0.1,
            step_decay: 0.95,
            decay_interval: 25,
            max_step_distance: 0.1,
            convergence_threshold: 1e-4,
            hooke_weight: 1.0,
            polygon_weight: 1.0,
            angular_weight: 0.5,
            barycentric_weight: 0.0,
            preserve_area: true,
            parallel: false,
            shape: ShapeOptions::default(),
            angular: AngularOptions::default(),
        }
    }
}

impl RelaxOptions {
    /// Set the maximum number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the ideal edge length, scaling the defect distance with it.
    pub fn with_ideal_edge_length(mut self, length: f64) -> Self {
        self.shape.defect_distance *= length / self.ideal_edge_length;
        self.ideal_edge_length = length;
        self
    }

    /// Set the initial step size.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Set the convergence threshold.
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Set the weights of the Hooke, polygon and angular generators.
    pub fn with_weights(mut self, hooke: f64, polygon: f64, angular: f64) -> Self {
        self.hooke_weight = hooke;
        self.polygon_weight = polygon;
        self.angular_weight = angular;
        self
    }

    /// Set the weight of barycentric smoothing.
    pub fn with_barycentric_weight(mut self, weight: f64) -> Self {
        self.barycentric_weight = weight;
        self
    }

    /// Set whether the total area is held fixed.
    pub fn with_preserve_area(mut self, preserve: bool) -> Self {
        self.preserve_area = preserve;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Step size at a given iteration.
    pub fn step_size(&self, iteration: usize) -> f64 {
        let decays = iteration / self.decay_interval.max(1);
        self.initial_step * self.step_decay.powi(decays.min(i32::MAX as usize) as i32)
    }
}

/// Result of a relaxation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxReport {
    /// Iterations applied.
    pub iterations: usize,
    /// Whether the run stopped on the convergence threshold.
    pub converged: bool,
    /// Largest force of the last evaluation.
    pub max_force: f64,
}

/// Collect per-item contributions into a field, optionally in parallel.
///
/// Contributions are summed in item order either way, so the result does not
/// depend on `parallel`.
pub(crate) fn gather<T, F>(board: &Board, items: &[T], parallel: bool, contribute: F) -> ForceField
where
    T: Copy + Send + Sync,
    F: Fn(T) -> Vec<(VertexId, Vector2<f64>)> + Send + Sync,
{
    let contributions: Vec<Vec<(VertexId, Vector2<f64>)>> = if parallel {
        items.par_iter().map(|&item| contribute(item)).collect()
    } else {
        items.iter().map(|&item| contribute(item)).collect()
    };

    let mut field = ForceField::for_board(board);
    for (v, force) in contributions.into_iter().flatten() {
        field.accumulate(v, force);
    }
    field
}

/// The weighted sum of all force generators, before step scaling.
///
/// Where a face is defective its shape force is boosted and the other
/// generators fade out for its vertices, so un-crossing takes priority.
pub fn combined_forces(board: &Board, options: &RelaxOptions) -> ForceField {
    let mut others = ForceField::for_board(board);
    if options.hooke_weight != 0.0 {
        others += hooke_forces(board, options.ideal_edge_length, options.parallel) * options.hooke_weight;
    }
    if options.barycentric_weight != 0.0 {
        others += barycentric_forces(board, options.parallel) * options.barycentric_weight;
    }
    if options.angular_weight != 0.0 {
        others += angular_forces(board, &options.angular, options.parallel) * options.angular_weight;
    }
    if options.polygon_weight == 0.0 {
        return others;
    }

    let shape = shape_forces(board, options.ideal_edge_length, &options.shape, options.parallel);
    let mut total = ForceField::for_board(board);
    for v in board.vertex_ids() {
        let ratio = shape.defect[v.index()];
        let polygon = shape.field.get(v) * options.polygon_weight;
        total.set(
            v,
            others.get(v) * (1.0 - ratio) + polygon * (1.0 + ratio * options.shape.defect_boost),
        );
    }
    total
}

/// An in-progress relaxation, advanced one iteration at a time.
///
/// Every completed [`step`](Self::step) leaves the board in a consistent
/// state, so a caller may stop between any two steps.
pub struct Relaxation<'a> {
    board: &'a mut Board,
    options: &'a RelaxOptions,
    iteration: usize,
    max_force: f64,
    converged: bool,
}

impl<'a> Relaxation<'a> {
    /// Start relaxing `board`.
    pub fn new(board: &'a mut Board, options: &'a RelaxOptions) -> Self {
        Self {
            board,
            options,
            iteration: 0,
            max_force: f64::INFINITY,
            converged: false,
        }
    }

    /// Iterations applied so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Whether the convergence threshold has been reached.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Whether no further step will be taken.
    pub fn is_finished(&self) -> bool {
        self.converged || self.iteration >= self.options.iterations
    }

    /// The board being relaxed.
    pub fn board(&self) -> &Board {
        &*self.board
    }

    /// Evaluate the forces and, unless converged, apply one iteration.
    ///
    /// Returns whether positions changed.
    ///
    /// # Panics
    /// Panics if a force or position becomes non-finite.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }

        let forces = combined_forces(self.board, self.options);
        assert!(forces.is_finite(), "non-finite force at iteration {}", self.iteration);
        self.max_force = forces.max_norm();
        if self.max_force < self.options.convergence_threshold {
            self.converged = true;
            return false;
        }

        let step = self.options.step_size(self.iteration);
        let delta = self.bounded_displacement(forces * step);

        delta.apply(self.board);
        self.board.update_centroids();
        self.iteration += 1;

        trace!(
            "relax iteration {}: max force {:.3e}, step {:.3e}",
            self.iteration,
            self.max_force,
            step
        );
        true
    }

    /// Clamp `delta` to the per-step distance, with the area correction
    /// included in the bound.
    ///
    /// The correction grows with the displacement, so the uncorrected part
    /// is shrunk until the corrected field fits.
    fn bounded_displacement(&self, mut delta: ForceField) -> ForceField {
        let limit = self.options.max_step_distance;
        delta.clamp_norm(limit);
        if !self.options.preserve_area {
            return delta;
        }

        let corrected = |delta: &ForceField| {
            delta.clone() + area_correction(self.board, delta, AREA_CORRECTION_ITERATIONS)
        };
        let mut total = corrected(&delta);
        for _ in 0..CLAMP_REFINEMENTS {
            let largest = total.max_norm();
            if largest <= limit {
                return total;
            }
            delta = delta * (limit / largest);
            total = corrected(&delta);
        }
        // Out of refinements: the distance bound wins over exact area
        total.clamp_norm(limit);
        total
    }

    /// Step until finished, reporting each iteration.
    pub fn run(mut self, progress: &Progress) -> RelaxReport {
        let total = self.options.iterations;
        while self.step() {
            progress.report(self.iteration, total, "Relaxing");
        }
        progress.report(total, total, "Relaxed");
        self.report()
    }

    /// Summary of the run so far.
    pub fn report(&self) -> RelaxReport {
        RelaxReport {
            iterations: self.iteration,
            converged: self.converged,
            max_force: self.max_force,
        }
    }
}

/// Relax a board's vertex positions; topology is untouched.
pub fn relax(board: &mut Board, options: &RelaxOptions) -> RelaxReport {
    relax_with_progress(board, options, &Progress::none())
}

/// Relax a board's vertex positions, reporting progress per iteration.
pub fn relax_with_progress(board: &mut Board, options: &RelaxOptions, progress: &Progress) -> RelaxReport {
    let report = Relaxation::new(board, options).run(progress);
    info!(
        "relaxation {} after {} iterations (max force {:.3e})",
        if report.converged { "converged" } else { "stopped" },
        report.iterations,
        report.max_force
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::square_board;
    use crate::mesh::LatticeCoord;
    use nalgebra::Point2;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn perturbed_grid() -> Board {
        let mut board = square_board(3, 3).unwrap();
        let offsets = [(1, 1, 0.2, -0.1), (2, 1, -0.15, 0.2), (1, 2, 0.1, 0.15), (2, 2, -0.2, -0.2)];
        for (x, y, dx, dy) in offsets {
            let v = board.find_vertex(LatticeCoord::new(x, y)).unwrap();
            board.set_position(v, Point2::new(x as f64 + dx, y as f64 + dy));
        }
        board.update_centroids();
        board
    }

    #[test]
    fn test_step_schedule() {
        let options = RelaxOptions::default();
        assert_eq!(options.step_size(0), 0.1);
        assert_eq!(options.step_size(24), 0.1);
        assert!((options.step_size(25) - 0.095).abs() < 1e-15);
        assert!((options.step_size(50) - 0.09025).abs() < 1e-15);
    }

    #[test]
    fn test_regular_square_converges_immediately() {
        let mut board = square_board(1, 1).unwrap();
        let report = relax(&mut board, &RelaxOptions::default());
        assert!(report.converged);
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn test_perturbed_grid_settles() {
        let mut board = perturbed_grid();
        let options = RelaxOptions::default().with_weights(1.0, 1.0, 0.0);
        let before = combined_forces(&board, &options).max_norm();
        let area = board.signed_area();

        let report = relax(&mut board, &options);
        assert!(report.max_force < 0.5 * before);
        assert!((board.signed_area() - area).abs() < 1e-9 * area);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_step_never_exceeds_max_distance_without_area_correction() {
        let mut board = perturbed_grid();
        let options = RelaxOptions::default()
            .with_initial_step(10.0)
            .with_preserve_area(false);
        let before: Vec<Point2<f64>> = board.vertex_ids().map(|v| board.position(v)).collect();

        let mut relaxation = Relaxation::new(&mut board, &options);
        assert!(relaxation.step());
        assert_eq!(relaxation.iteration(), 1);

        for (v, old) in board.vertex_ids().zip(before) {
            assert!((board.position(v) - old).norm() <= options.max_step_distance + 1e-12);
        }
    }

    #[test]
    fn test_area_corrected_step_stays_within_max_distance() {
        let mut board = square_board(3, 3).unwrap();
        let v = board.find_vertex(LatticeCoord::new(1, 1)).unwrap();
        board.set_position(v, Point2::new(2.6, 2.7));
        board.update_centroids();

        let options = RelaxOptions::default().with_initial_step(10.0);
        assert!(options.preserve_area);
        let before: Vec<Point2<f64>> = board.vertex_ids().map(|v| board.position(v)).collect();

        let mut relaxation = Relaxation::new(&mut board, &options);
        assert!(relaxation.step());

        let mut largest: f64 = 0.0;
        for (v, old) in board.vertex_ids().zip(before) {
            largest = largest.max((board.position(v) - old).norm());
        }
        assert!(largest > 0.0);
        assert!(largest <= options.max_step_distance + 1e-12, "moved {}", largest);
    }

    #[test]
    fn test_folded_face_is_driven_by_shape_alone() {
        // Swapping two corners of the left square folds it into a bow-tie
        let mut board = square_board(2, 1).unwrap();
        let a = board.find_vertex(LatticeCoord::new(0, 0)).unwrap();
        let b = board.find_vertex(LatticeCoord::new(0, 1)).unwrap();
        let (pa, pb) = (board.position(a), board.position(b));
        board.set_position(a, pb);
        board.set_position(b, pa);
        board.update_centroids();

        let folded = board.find_face(LatticeCoord::new(0, 0)).unwrap();
        let points = board.face_positions(folded);
        assert_eq!(defect_ratio(&points, 0.1), 1.0);

        let options = RelaxOptions::default().with_barycentric_weight(0.5);
        let shape = shape_forces(&board, options.ideal_edge_length, &options.shape, false);
        let others = hooke_forces(&board, options.ideal_edge_length, false) * options.hooke_weight
            + barycentric_forces(&board, false) * options.barycentric_weight
            + angular_forces(&board, &options.angular, false) * options.angular_weight;
        let total = combined_forces(&board, &options);

        let boost = options.polygon_weight * (1.0 + options.shape.defect_boost);
        for &v in &board.face(folded).vertices {
            assert_eq!(shape.defect[v.index()], 1.0);
            assert!(others.get(v).norm() > 1e-6);
            let expected = shape.field.get(v) * boost;
            assert!((total.get(v) - expected).norm() < 1e-12, "{:?}", v);
        }

        // The untouched square keeps the plain weighted sum
        for coord in [LatticeCoord::new(2, 0), LatticeCoord::new(2, 1)] {
            let v = board.find_vertex(coord).unwrap();
            assert_eq!(shape.defect[v.index()], 0.0);
            let expected = others.get(v) + shape.field.get(v) * options.polygon_weight;
            assert!((total.get(v) - expected).norm() < 1e-12, "{:?}", coord);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let board = perturbed_grid();
        let sequential = combined_forces(&board, &RelaxOptions::default());
        let parallel = combined_forces(&board, &RelaxOptions::default().with_parallel(true));
        assert!((sequential - parallel).max_norm() < 1e-15);
    }

    #[test]
    fn test_progress_is_reported() {
        let mut board = perturbed_grid();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let options = RelaxOptions::default().with_iterations(5);
        let report = relax_with_progress(&mut board, &options, &progress);
        assert_eq!(report.iterations, 5);
        assert_eq!(calls.load(Ordering::Relaxed), 6);
    }
}
