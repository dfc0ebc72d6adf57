//! Half-edge board data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for arbitrary planar subdivisions: square grids, hexagonal grids, general
//! polygonal and non-periodic tilings.
//!
//! # Structure
//!
//! - Each [`Edge`] owns exactly two **half-edges**: the forward half, running
//!   from the lexicographically smaller logical coordinate to the larger one,
//!   and its reversed half
//! - Each half-edge knows its **reversed** partner, the **next** and **previous**
//!   half-edge around its face, its start/end vertices and its face
//! - Each vertex stores its incoming and outgoing half-edges in counter-clockwise
//!   order, index-aligned so that `outgoing[i] == reversed(incoming[i])`
//! - Each face stores its half-edges, edges and vertices in counter-clockwise order
//!
//! # Boundary Handling
//!
//! Boundary half-edges have no face. Their `next`/`previous` links run along
//! the boundary loop they belong to; the board keeps exactly one outer boundary
//! loop (clockwise, negative signed area) and zero or more inner boundaries
//! (holes, counter-clockwise).

use std::cmp::Ordering;
use std::fmt;

use nalgebra::Point2;

use super::arena::Arena;
use super::geometry;
use super::index::{EdgeId, FaceId, HalfEdgeId, VertexId};
use super::validate::{validate, InvariantViolation};

/// A discrete lattice key identifying a vertex or a face.
///
/// Ordered lexicographically, first by `x` then by `y`. That order fixes the
/// canonical direction of every edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LatticeCoord {
    /// First lattice axis.
    pub x: i64,
    /// Second lattice axis.
    pub y: i64,
}

impl LatticeCoord {
    /// Create a lattice coordinate.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl Ord for LatticeCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x.cmp(&other.x).then(self.y.cmp(&other.y))
    }
}

impl PartialOrd for LatticeCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LatticeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A vertex of the board.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Lattice identity of this vertex.
    pub logical: LatticeCoord,

    /// Drawing position. The only field the relaxation engine changes.
    pub position: Point2<f64>,

    /// Half-edges ending at this vertex, counter-clockwise.
    pub incoming: Vec<HalfEdgeId>,

    /// Half-edges leaving this vertex; `outgoing[i]` reverses `incoming[i]`.
    pub outgoing: Vec<HalfEdgeId>,

    /// Edges of `incoming`, index-aligned.
    pub edges: Vec<EdgeId>,

    /// Faces around the vertex, in rotation order.
    pub faces: Vec<FaceId>,
}

impl Vertex {
    /// Create an unlinked vertex.
    pub fn new(logical: LatticeCoord, position: Point2<f64>) -> Self {
        Self {
            logical,
            position,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Number of incident edges.
    #[inline]
    pub fn degree(&self) -> usize {
        self.incoming.len()
    }
}

/// An undirected edge, owning its two half-edges.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// Canonical start (smaller logical coordinate).
    pub start: VertexId,

    /// Canonical end (larger logical coordinate).
    pub end: VertexId,

    /// Half-edge running `start -> end`.
    pub forward_half: HalfEdgeId,

    /// Half-edge running `end -> start`.
    pub reversed_half: HalfEdgeId,

    /// Face of `forward_half`; `None` on the board boundary.
    pub forward_face: Option<FaceId>,

    /// Face of `reversed_half`; `None` on the board boundary.
    pub reversed_face: Option<FaceId>,
}

impl Edge {
    /// The endpoint opposite to `v`.
    #[inline]
    pub fn other_vertex(&self, v: VertexId) -> VertexId {
        if self.start == v {
            self.end
        } else {
            self.start
        }
    }

    /// Whether either side of the edge is the exterior (or a hole).
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.forward_face.is_none() || self.reversed_face.is_none()
    }

    /// Faces on either side, skipping the exterior.
    pub fn faces(&self) -> impl Iterator<Item = FaceId> {
        self.forward_face.into_iter().chain(self.reversed_face)
    }
}

/// A directed half-edge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// Vertex this half-edge leaves.
    pub start: VertexId,

    /// Vertex this half-edge enters.
    pub end: VertexId,

    /// Owning edge.
    pub edge: EdgeId,

    /// The opposite half-edge of the same edge.
    pub reversed: HalfEdgeId,

    /// Next half-edge around the face (or boundary loop).
    pub next: HalfEdgeId,

    /// Previous half-edge around the face (or boundary loop).
    pub previous: HalfEdgeId,

    /// Face to the left; `None` for boundary half-edges.
    pub face: Option<FaceId>,

    /// Whether this half-edge runs against the edge's canonical direction.
    pub is_reversed: bool,
}

impl HalfEdge {
    /// Create an unlinked half-edge.
    pub fn new(start: VertexId, end: VertexId, edge: EdgeId, is_reversed: bool) -> Self {
        Self {
            start,
            end,
            edge,
            reversed: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            previous: HalfEdgeId::invalid(),
            face: None,
            is_reversed,
        }
    }

    /// Check if this half-edge is on a boundary loop.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.face.is_none()
    }
}

/// A face of the board.
#[derive(Debug, Clone)]
pub struct Face {
    /// Lattice identity of this face.
    pub logical: LatticeCoord,

    /// Area centroid of the face, recomputed after edits.
    pub centroid: Point2<f64>,

    /// Half-edges around the face, counter-clockwise.
    pub half_edges: Vec<HalfEdgeId>,

    /// Edges of `half_edges`, index-aligned.
    pub edges: Vec<EdgeId>,

    /// Start vertices of `half_edges`, index-aligned.
    pub vertices: Vec<VertexId>,
}

impl Face {
    /// Create an empty face.
    pub fn new(logical: LatticeCoord) -> Self {
        Self {
            logical,
            centroid: Point2::origin(),
            half_edges: Vec::new(),
            edges: Vec::new(),
            vertices: Vec::new(),
        }
    }

    /// Number of sides.
    #[inline]
    pub fn len(&self) -> usize {
        self.half_edges.len()
    }

    /// Whether the face has no half-edges yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.half_edges.is_empty()
    }
}

/// A planar board: a half-edge subdivision with its boundary loops.
///
/// Boards are built with [`build_board`](super::build_board) (usually through one
/// of the generators in [`crate::boards`]) and are then read-only apart from
/// vertex positions; topology edits go through [`crate::layout::LayoutBoard`].
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub(crate) vertices: Arena<VertexId, Vertex>,
    pub(crate) edges: Arena<EdgeId, Edge>,
    pub(crate) half_edges: Arena<HalfEdgeId, HalfEdge>,
    pub(crate) faces: Arena<FaceId, Face>,
    pub(crate) outer_boundary: Vec<HalfEdgeId>,
    pub(crate) inner_boundaries: Vec<Vec<HalfEdgeId>>,
}

impl Board {
    /// Create an empty board.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // ==================== Accessors ====================

    /// Number of live vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of live half-edges (always twice the edge count).
    #[inline]
    pub fn num_half_edges(&self) -> usize {
        self.half_edges.len()
    }

    /// Number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Upper bound on vertex indices, for dense per-vertex storage.
    #[inline]
    pub fn vertex_index_bound(&self) -> usize {
        self.vertices.capacity_bound()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id]
    }

    /// Get a vertex if it is still part of the board.
    #[inline]
    pub fn try_vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Get an edge if it is still part of the board.
    #[inline]
    pub fn try_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Get a half-edge if it is still part of the board.
    #[inline]
    pub fn try_half_edge(&self, id: HalfEdgeId) -> Option<&HalfEdge> {
        self.half_edges.get(id)
    }

    /// Get a face if it is still part of the board.
    #[inline]
    pub fn try_face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id)
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id]
    }

    #[inline]
    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    #[inline]
    pub(crate) fn half_edge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.half_edges[id]
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> Point2<f64> {
        self.vertex(v).position
    }

    /// Set the position of a vertex.
    ///
    /// Face centroids are not refreshed; call [`Board::update_centroids`] once
    /// all positions of a step have been written.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point2<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// The outer boundary loop (clockwise).
    #[inline]
    pub fn outer_boundary(&self) -> &[HalfEdgeId] {
        &self.outer_boundary
    }

    /// The hole loops (counter-clockwise).
    #[inline]
    pub fn inner_boundaries(&self) -> &[Vec<HalfEdgeId>] {
        &self.inner_boundaries
    }

    /// Find a vertex by lattice identity.
    pub fn find_vertex(&self, logical: LatticeCoord) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, v)| v.logical == logical)
            .map(|(id, _)| id)
    }

    /// Find a face by lattice identity.
    pub fn find_face(&self, logical: LatticeCoord) -> Option<FaceId> {
        self.faces
            .iter()
            .find(|(_, f)| f.logical == logical)
            .map(|(id, _)| id)
    }

    // ==================== Topology Queries ====================

    /// Get the opposite half-edge.
    #[inline]
    pub fn reversed(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edge(he).reversed
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn previous(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edge(he).previous
    }

    /// Get the start vertex of a half-edge.
    #[inline]
    pub fn start(&self, he: HalfEdgeId) -> VertexId {
        self.half_edge(he).start
    }

    /// Get the end vertex of a half-edge.
    #[inline]
    pub fn end(&self, he: HalfEdgeId) -> VertexId {
        self.half_edge(he).end
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> Option<FaceId> {
        self.half_edge(he).face
    }

    /// Check if a half-edge is on a boundary loop.
    #[inline]
    pub fn is_boundary_half_edge(&self, he: HalfEdgeId) -> bool {
        self.half_edge(he).is_boundary()
    }

    /// Check if a vertex touches a boundary loop.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.vertex(v)
            .outgoing
            .iter()
            .any(|&he| self.is_boundary_half_edge(he))
    }

    /// The half-edge running from `from` to `to`, if the two are adjacent.
    pub fn half_edge_between(&self, from: VertexId, to: VertexId) -> Option<HalfEdgeId> {
        self.vertex(from)
            .outgoing
            .iter()
            .copied()
            .find(|&he| self.end(he) == to)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.ids()
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter()
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.ids()
    }

    /// Iterate over all edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter()
    }

    /// Iterate over all half-edge IDs.
    pub fn half_edge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.half_edges.ids()
    }

    /// Iterate over all half-edges with their IDs.
    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + '_ {
        self.half_edges.iter()
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.ids()
    }

    /// Iterate over all faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces.iter()
    }

    /// Iterate over vertices adjacent to a vertex, counter-clockwise.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex(v).outgoing.iter().map(move |&he| self.end(he))
    }

    /// Number of edges at a vertex.
    #[inline]
    pub fn degree(&self, v: VertexId) -> usize {
        self.vertex(v).degree()
    }

    /// Walk `next` pointers from `start` until the loop closes.
    ///
    /// # Panics
    /// Panics if the walk does not return to `start`, which means the
    /// next/previous links are corrupt.
    pub fn walk_loop(&self, start: HalfEdgeId) -> Vec<HalfEdgeId> {
        let mut result = vec![start];
        let mut current = self.next(start);
        while current != start {
            assert!(
                result.len() <= self.num_half_edges(),
                "next-chain from {:?} never closes",
                start
            );
            result.push(current);
            current = self.next(current);
        }
        result
    }

    // ==================== Geometry ====================

    /// Positions of a face's vertices, counter-clockwise.
    pub fn face_positions(&self, f: FaceId) -> Vec<Point2<f64>> {
        self.face(f)
            .vertices
            .iter()
            .map(|&v| self.position(v))
            .collect()
    }

    /// Signed area of a face (positive for a well-embedded board).
    pub fn face_signed_area(&self, f: FaceId) -> f64 {
        geometry::signed_area(&self.face_positions(f))
    }

    /// Signed area of a half-edge loop, measured over its start points.
    pub fn loop_signed_area(&self, half_edges: &[HalfEdgeId]) -> f64 {
        let points: Vec<Point2<f64>> = half_edges
            .iter()
            .map(|&he| self.position(self.start(he)))
            .collect();
        geometry::signed_area(&points)
    }

    /// Total signed area of the board (sum over faces).
    pub fn signed_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_signed_area(f)).sum()
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let edge = self.edge(e);
        (self.position(edge.end) - self.position(edge.start)).norm()
    }

    /// Mean edge length, or zero for an empty board.
    pub fn average_edge_length(&self) -> f64 {
        if self.num_edges() == 0 {
            return 0.0;
        }
        let total: f64 = self.edge_ids().map(|e| self.edge_length(e)).sum();
        total / self.num_edges() as f64
    }

    /// Mean position of all vertices.
    pub fn vertex_centroid(&self) -> Point2<f64> {
        let points: Vec<Point2<f64>> = self.vertices.iter().map(|(_, v)| v.position).collect();
        geometry::vertex_average(&points)
    }

    /// Compute the bounding box of the board.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let mut iter = self.vertices.iter().map(|(_, v)| v.position);
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// Recompute the centroid of every face from current vertex positions.
    pub fn update_centroids(&mut self) {
        let ids: Vec<FaceId> = self.face_ids().collect();
        for f in ids {
            self.update_centroid(f);
        }
    }

    pub(crate) fn update_centroid(&mut self, f: FaceId) {
        let centroid = geometry::centroid(&self.face_positions(f));
        self.face_mut(f).centroid = centroid;
    }

    // ==================== Linking ====================

    /// Derive a vertex's counter-clockwise incoming order from the
    /// next/previous links alone, starting at `seed`.
    ///
    /// Repeatedly applies `current = previous(reversed(current))`. No
    /// coordinates are consulted.
    pub(crate) fn derive_rotation(&self, seed: HalfEdgeId) -> Vec<HalfEdgeId> {
        let mut incoming = vec![seed];
        let mut current = self.previous(self.reversed(seed));
        while current != seed {
            assert!(
                incoming.len() <= self.num_half_edges(),
                "rotation around {:?} never closes",
                self.end(seed)
            );
            incoming.push(current);
            current = self.previous(self.reversed(current));
        }
        incoming
    }

    /// Rebuild a vertex's incoming/outgoing/edges/faces lists from `seed`.
    pub(crate) fn rebuild_rotation(&mut self, v: VertexId, seed: HalfEdgeId) {
        debug_assert_eq!(self.end(seed), v);
        let incoming = self.derive_rotation(seed);
        let outgoing: Vec<HalfEdgeId> = incoming.iter().map(|&he| self.reversed(he)).collect();
        let edges: Vec<EdgeId> = incoming.iter().map(|&he| self.half_edge(he).edge).collect();
        let mut faces: Vec<FaceId> = Vec::new();
        for f in incoming.iter().filter_map(|&he| self.face_of(he)) {
            if !faces.contains(&f) {
                faces.push(f);
            }
        }

        let vertex = self.vertex_mut(v);
        vertex.incoming = incoming;
        vertex.outgoing = outgoing;
        vertex.edges = edges;
        vertex.faces = faces;
    }

    /// Rebuild a face's half-edge/edge/vertex lists by walking from `start`,
    /// assigning the face to every half-edge on the way.
    pub(crate) fn rebuild_face(&mut self, f: FaceId, start: HalfEdgeId) {
        let half_edges = self.walk_loop(start);
        for &he in &half_edges {
            self.assign_face(he, Some(f));
        }
        let edges = half_edges.iter().map(|&he| self.half_edge(he).edge).collect();
        let vertices = half_edges.iter().map(|&he| self.start(he)).collect();

        let face = self.face_mut(f);
        face.half_edges = half_edges;
        face.edges = edges;
        face.vertices = vertices;
        self.update_centroid(f);
    }

    /// Set a half-edge's face and mirror it onto the owning edge.
    pub(crate) fn assign_face(&mut self, he: HalfEdgeId, face: Option<FaceId>) {
        let (edge_id, is_reversed) = {
            let half = self.half_edge_mut(he);
            half.face = face;
            (half.edge, half.is_reversed)
        };
        let edge = self.edge_mut(edge_id);
        if is_reversed {
            edge.reversed_face = face;
        } else {
            edge.forward_face = face;
        }
    }

    /// Link `a.next = b` and `b.previous = a`.
    #[inline]
    pub(crate) fn link(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.half_edge_mut(a).next = b;
        self.half_edge_mut(b).previous = a;
    }

    /// Create an edge between two vertices with its two unlinked half-edges.
    ///
    /// The forward half runs from the endpoint with the smaller logical
    /// coordinate. Returns `(edge, half a->b, half b->a)`.
    pub(crate) fn add_edge(&mut self, a: VertexId, b: VertexId) -> (EdgeId, HalfEdgeId, HalfEdgeId) {
        let a_first = self.vertex(a).logical < self.vertex(b).logical;
        let (start, end) = if a_first { (a, b) } else { (b, a) };

        let edge_id = EdgeId::new(self.edges.capacity_bound());
        let forward = self.half_edges.insert(HalfEdge::new(start, end, edge_id, false));
        let reversed = self.half_edges.insert(HalfEdge::new(end, start, edge_id, true));
        self.half_edge_mut(forward).reversed = reversed;
        self.half_edge_mut(reversed).reversed = forward;

        let inserted = self.edges.insert(Edge {
            start,
            end,
            forward_half: forward,
            reversed_half: reversed,
            forward_face: None,
            reversed_face: None,
        });
        debug_assert_eq!(inserted, edge_id);

        if a_first {
            (edge_id, forward, reversed)
        } else {
            (edge_id, reversed, forward)
        }
    }

    /// Drop an edge and both of its half-edges from the board.
    pub(crate) fn remove_edge(&mut self, e: EdgeId) {
        if let Some(edge) = self.edges.remove(e) {
            self.half_edges.remove(edge.forward_half);
            self.half_edges.remove(edge.reversed_half);
        }
    }

    // ==================== Validation ====================

    /// Check every structural invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        validate(self)
    }

    /// Check if the board is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
