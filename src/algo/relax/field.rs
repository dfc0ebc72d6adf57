//! Per-vertex displacement fields.

use std::ops::{Add, AddAssign, Mul, Sub};

use nalgebra::Vector2;

use crate::mesh::{Board, ElementId, VertexId};

/// A 2D displacement for every vertex slot of a board.
///
/// Indexed by vertex slot, so removed vertices keep a (zero) entry. Fields of
/// equal length add, subtract and scale component-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceField {
    forces: Vec<Vector2<f64>>,
}

impl ForceField {
    /// A zero field with `len` slots.
    pub fn zeros(len: usize) -> Self {
        Self {
            forces: vec![Vector2::zeros(); len],
        }
    }

    /// A zero field sized for `board`.
    pub fn for_board(board: &Board) -> Self {
        Self::zeros(board.vertex_index_bound())
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.forces.len()
    }

    /// Whether the field has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Force on a vertex.
    #[inline]
    pub fn get(&self, v: VertexId) -> Vector2<f64> {
        self.forces[v.slot()]
    }

    /// Overwrite the force on a vertex.
    #[inline]
    pub fn set(&mut self, v: VertexId, force: Vector2<f64>) {
        self.forces[v.slot()] = force;
    }

    /// Accumulate a force on a vertex.
    #[inline]
    pub fn accumulate(&mut self, v: VertexId, force: Vector2<f64>) {
        self.forces[v.slot()] += force;
    }

    /// Iterate over `(vertex, force)` for every slot.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, Vector2<f64>)> + '_ {
        self.forces
            .iter()
            .enumerate()
            .map(|(i, f)| (VertexId::from_slot(i), *f))
    }

    /// Largest force magnitude.
    pub fn max_norm(&self) -> f64 {
        self.forces.iter().map(|f| f.norm()).fold(0.0, f64::max)
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.forces.iter().all(|f| f.x.is_finite() && f.y.is_finite())
    }

    /// Shorten every force longer than `max` to length `max`.
    pub fn clamp_norm(&mut self, max: f64) {
        for f in &mut self.forces {
            let norm = f.norm();
            if norm > max {
                *f *= max / norm;
            }
        }
    }

    /// Move every live vertex of `board` by its force.
    ///
    /// # Panics
    /// Panics if a resulting position is not finite.
    pub fn apply(&self, board: &mut Board) {
        let ids: Vec<VertexId> = board.vertex_ids().collect();
        for v in ids {
            let position = board.position(v) + self.get(v);
            assert!(
                position.x.is_finite() && position.y.is_finite(),
                "non-finite position for {:?}",
                v
            );
            board.set_position(v, position);
        }
    }
}

impl Add for ForceField {
    type Output = ForceField;

    fn add(mut self, rhs: ForceField) -> ForceField {
        self += rhs;
        self
    }
}

impl AddAssign for ForceField {
    fn add_assign(&mut self, rhs: ForceField) {
        debug_assert_eq!(self.len(), rhs.len());
        for (a, b) in self.forces.iter_mut().zip(rhs.forces) {
            *a += b;
        }
    }
}

impl Sub for ForceField {
    type Output = ForceField;

    fn sub(mut self, rhs: ForceField) -> ForceField {
        debug_assert_eq!(self.len(), rhs.len());
        for (a, b) in self.forces.iter_mut().zip(rhs.forces) {
            *a -= b;
        }
        self
    }
}

impl Mul<f64> for ForceField {
    type Output = ForceField;

    fn mul(mut self, scale: f64) -> ForceField {
        for f in &mut self.forces {
            *f *= scale;
        }
        self
    }
}
