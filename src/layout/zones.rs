//! Dead-zone collapse.
//!
//! A zone is a maximal group of faces connected through dead edges. A zone
//! whose perimeter lies entirely against live faces is merged into one face;
//! a zone touching the exterior through dead edges is removed, opening the
//! board there. A zone covering the whole board is merged rather than
//! removed.

use std::collections::{HashSet, VecDeque};

use log::{debug, trace};

use super::LayoutBoard;
use crate::error::Result;
use crate::mesh::{debug_validate, EdgeId, Face, FaceId, HalfEdgeId, VertexId};

/// Outcome of one [`LayoutBoard::collapse_dead_zones`] sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneReport {
    /// Zones merged into a single face.
    pub interior: usize,
    /// Zones removed to open the board.
    pub exterior: usize,
    /// Zones left as they were.
    pub skipped: usize,
}

/// Why a zone cannot be collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    /// An edge inside the zone is still live.
    LiveInterior,
    /// The perimeter splits into more than one loop.
    SeveralLoops,
    /// The perimeter touches itself at a vertex.
    Pinched,
    /// A live edge lies on the board boundary.
    LiveBoundary,
    /// Removing the zone would disconnect or empty the board.
    Disconnects,
    /// The boundary around the zone is not a single run.
    SplitBoundary,
}

/// A planned collapse.
#[derive(Debug)]
enum Plan {
    /// Merge the zone into one face bounded by `perimeter`.
    Merge { perimeter: Vec<HalfEdgeId> },
    /// Remove the zone. `kept` are the perimeter half-edges facing live
    /// faces, in loop order; `opened` are the zone-side half-edges of dead
    /// boundary edges, in loop order.
    Open {
        kept: Vec<HalfEdgeId>,
        opened: Vec<HalfEdgeId>,
    },
    /// The zone is already a single face with nothing to remove.
    Settled,
    Skip(SkipReason),
}

impl LayoutBoard {
    /// Collapse every zone of faces joined by dead edges.
    ///
    /// Zones that cannot be collapsed without breaking the board are skipped.
    /// The board is valid after each zone.
    pub fn collapse_dead_zones(&mut self) -> Result<ZoneReport> {
        let mut report = ZoneReport::default();

        for zone in self.find_zones() {
            if zone.iter().any(|&f| self.board.try_face(f).is_none()) {
                continue;
            }
            match self.plan_zone(&zone) {
                Plan::Merge { perimeter } => {
                    self.merge_zone(&zone, &perimeter)?;
                    report.interior += 1;
                }
                Plan::Open { kept, opened } => {
                    self.open_zone(&zone, &kept, &opened)?;
                    report.exterior += 1;
                }
                Plan::Settled => {}
                Plan::Skip(reason) => {
                    debug!("skipping zone of {} faces: {:?}", zone.len(), reason);
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }

    /// Group unconstrained faces through dead edges. Only groups touching at
    /// least one dead edge are returned.
    fn find_zones(&self) -> Vec<Vec<FaceId>> {
        let mut seen: HashSet<FaceId> = HashSet::new();
        let mut zones = Vec::new();

        for start in self.board.face_ids() {
            if seen.contains(&start) || !self.is_unconstrained(Some(start)) {
                continue;
            }

            let mut zone = Vec::new();
            let mut has_dead = false;
            let mut queue = VecDeque::from([start]);
            seen.insert(start);

            while let Some(f) = queue.pop_front() {
                zone.push(f);
                for &e in &self.board.face(f).edges {
                    if !self.is_dead_edge(e) {
                        continue;
                    }
                    has_dead = true;
                    for neighbor in self.board.edge(e).faces() {
                        if seen.insert(neighbor) {
                            queue.push_back(neighbor);
                        }
                    }
                }
            }

            if has_dead {
                zones.push(zone);
            }
        }

        zones
    }

    fn plan_zone(&self, zone: &[FaceId]) -> Plan {
        let board = &self.board;
        let members: HashSet<HalfEdgeId> = zone
            .iter()
            .flat_map(|&f| board.face(f).half_edges.iter().copied())
            .collect();

        // Perimeter half-edges in a stable order
        let mut perimeter = Vec::new();
        for &f in zone {
            for &he in &board.face(f).half_edges {
                let reverse = board.reversed(he);
                if members.contains(&reverse) {
                    if !self.is_dead_edge(board.half_edge(he).edge) {
                        return Plan::Skip(SkipReason::LiveInterior);
                    }
                } else {
                    perimeter.push(he);
                }
            }
        }
        let on_perimeter: HashSet<HalfEdgeId> = perimeter.iter().copied().collect();

        // Walk the perimeter, stepping across internal edges
        let Some(&start) = perimeter.first() else {
            return Plan::Skip(SkipReason::Disconnects);
        };
        let mut ordered = Vec::with_capacity(perimeter.len());
        let mut current = start;
        loop {
            ordered.push(current);
            let mut next = board.next(current);
            let mut guard = 0;
            while !on_perimeter.contains(&next) {
                next = board.next(board.reversed(next));
                guard += 1;
                if guard > members.len() {
                    return Plan::Skip(SkipReason::Pinched);
                }
            }
            current = next;
            if current == start {
                break;
            }
            if ordered.len() > perimeter.len() {
                return Plan::Skip(SkipReason::Pinched);
            }
        }

        if ordered.len() != perimeter.len() {
            return Plan::Skip(SkipReason::SeveralLoops);
        }
        let mut corners: HashSet<VertexId> = HashSet::new();
        if !ordered.iter().all(|&he| corners.insert(board.start(he))) {
            return Plan::Skip(SkipReason::Pinched);
        }

        let outside = |he: HalfEdgeId| board.is_boundary_half_edge(board.reversed(he));
        let opens = |he: HalfEdgeId| outside(he) && self.is_dead_edge(board.half_edge(he).edge);
        if !ordered.iter().any(|&he| opens(he)) {
            return Plan::Merge { perimeter: ordered };
        }

        if ordered.iter().any(|&he| outside(he) && !opens(he)) {
            return Plan::Skip(SkipReason::LiveBoundary);
        }

        // Rotate so the loop begins with the first kept half-edge after an
        // opened one; a single kept run then sits at the front.
        let n = ordered.len();
        let Some(first_kept) = (0..n).find(|&i| !opens(ordered[i]) && opens(ordered[(i + n - 1) % n]))
        else {
            // Every side faces the exterior: the zone is the whole board
            if zone.len() == 1 {
                return Plan::Settled;
            }
            return Plan::Merge { perimeter: ordered };
        };
        ordered.rotate_left(first_kept);
        let kept_len = ordered.iter().take_while(|&&he| !opens(he)).count();
        let (kept, opened) = ordered.split_at(kept_len);
        if opened.iter().any(|&he| !opens(he)) {
            return Plan::Skip(SkipReason::Disconnects);
        }
        // Inner corners of the kept run become boundary corners
        if kept.iter().skip(1).any(|&he| board.is_boundary_vertex(board.start(he))) {
            return Plan::Skip(SkipReason::Pinched);
        }

        // The reverses of the opened run must be consecutive on the old boundary
        for pair in opened.windows(2) {
            if board.next(board.reversed(pair[1])) != board.reversed(pair[0]) {
                return Plan::Skip(SkipReason::SplitBoundary);
            }
        }

        Plan::Open {
            kept: kept.to_vec(),
            opened: opened.to_vec(),
        }
    }

    /// Replace the zone by one face bounded by `perimeter`.
    fn merge_zone(&mut self, zone: &[FaceId], perimeter: &[HalfEdgeId]) -> Result<()> {
        let logical = zone
            .iter()
            .map(|&f| self.board.face(f).logical)
            .min()
            .unwrap_or_default();
        let corners = self.zone_vertices(zone);
        let internal = self.internal_edges(zone);

        for (i, &he) in perimeter.iter().enumerate() {
            self.board.link(he, perimeter[(i + 1) % perimeter.len()]);
        }
        for &f in zone {
            self.board.faces.remove(f);
        }
        for &e in &internal {
            self.board.remove_edge(e);
        }

        let merged = self.board.faces.insert(Face::new(logical));
        self.board.rebuild_face(merged, perimeter[0]);

        let removed = corners.iter().filter(|&&v| !self.refresh_vertex(v)).count();
        self.forget_removed();

        trace!(
            "merged {} faces into {:?}, dropping {} edges and {} vertices",
            zone.len(),
            merged,
            internal.len(),
            removed
        );
        debug_validate(&self.board);
        Ok(())
    }

    /// Remove the zone, turning `kept` into boundary half-edges.
    fn open_zone(
        &mut self,
        zone: &[FaceId],
        kept: &[HalfEdgeId],
        opened: &[HalfEdgeId],
    ) -> Result<()> {
        let corners = self.zone_vertices(zone);
        let mut doomed = self.internal_edges(zone);
        doomed.extend(opened.iter().map(|&he| self.board.half_edge(he).edge));

        let (Some(&first), Some(&last)) = (kept.first(), kept.last()) else {
            return Ok(());
        };
        let (Some(&first_opened), Some(&last_opened)) = (opened.first(), opened.last()) else {
            return Ok(());
        };

        // Old boundary neighbours of the opened run
        let before = self.board.previous(self.board.reversed(last_opened));
        let after = self.board.next(self.board.reversed(first_opened));
        let doomed_halves: HashSet<HalfEdgeId> = opened.iter().map(|&he| self.board.reversed(he)).collect();

        for &he in kept {
            self.board.assign_face(he, None);
        }
        for pair in kept.windows(2) {
            self.board.link(pair[0], pair[1]);
        }
        if doomed_halves.contains(&before) {
            self.board.link(last, first);
        } else {
            self.board.link(before, first);
            self.board.link(last, after);
        }

        for &f in zone {
            self.board.faces.remove(f);
        }
        for &e in &doomed {
            self.board.remove_edge(e);
        }

        let removed = corners.iter().filter(|&&v| !self.refresh_vertex(v)).count();
        self.forget_removed();
        self.rederive_boundaries()?;

        trace!(
            "opened zone of {} faces, dropping {} edges and {} vertices",
            zone.len(),
            doomed.len(),
            removed
        );
        debug_validate(&self.board);
        Ok(())
    }

    /// Distinct vertices of the zone's faces.
    fn zone_vertices(&self, zone: &[FaceId]) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        zone.iter()
            .flat_map(|&f| self.board.face(f).vertices.iter().copied())
            .filter(|&v| seen.insert(v))
            .collect()
    }

    /// Edges with a zone face on both sides.
    fn internal_edges(&self, zone: &[FaceId]) -> Vec<EdgeId> {
        let members: HashSet<FaceId> = zone.iter().copied().collect();
        let mut seen = HashSet::new();
        zone.iter()
            .flat_map(|&f| self.board.face(f).edges.iter().copied())
            .filter(|&e| {
                let edge = self.board.edge(e);
                let inside = |face: Option<FaceId>| face.map_or(false, |f| members.contains(&f));
                inside(edge.forward_face) && inside(edge.reversed_face) && seen.insert(e)
            })
            .collect()
    }
}
