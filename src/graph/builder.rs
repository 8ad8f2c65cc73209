use std::collections::{BTreeMap, HashMap};
use std::f64::consts::TAU;

use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use crate::error::{GraphError, Result};
use crate::flatten::FlatEdge;
use crate::math::distance_2d::project_onto_segment;
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::Point2;

use super::{
    winding, EdgeData, EdgeId, EdgeOrigin, Operand, OperandRole, PlanarGraph, PointData, PointId,
};

/// Upper bound on intersection passes before giving up.
const MAX_SPLIT_PASSES: usize = 32;

/// Incrementally fills a [`PlanarGraph`] and makes it planar.
pub(super) struct GraphBuilder {
    graph: PlanarGraph,
    merger: PointMerger,
}

impl GraphBuilder {
    pub(super) fn new(snap: f64) -> Self {
        Self {
            graph: PlanarGraph::empty(snap),
            merger: PointMerger::new(snap),
        }
    }

    /// Continues building on an existing graph.
    pub(super) fn from_graph(mut graph: PlanarGraph, snap: f64) -> Self {
        graph.snap = snap;
        let mut merger = PointMerger::new(snap);
        for (id, point) in &graph.points {
            merger.register(id, point.position);
        }
        Self { graph, merger }
    }

    pub(super) fn set_role(&mut self, operand: Operand, role: OperandRole) {
        self.graph.roles[operand.index()] = Some(role);
    }

    pub(super) fn insert_flat(&mut self, operand: Operand, edges: &[FlatEdge]) {
        for edge in edges {
            self.insert_segment(edge.start, edge.end, |start, end| {
                EdgeData::new(start, end, operand, EdgeOrigin::new(edge.back))
            });
        }
    }

    /// Copies every edge of `other`, re-snapping its points.
    pub(super) fn insert_graph(&mut self, other: &PlanarGraph) {
        for edge in other.edges.values() {
            let (Some(start), Some(end)) = (other.points.get(edge.start), other.points.get(edge.end))
            else {
                continue;
            };
            self.insert_segment(start.position, end.position, |s, e| EdgeData {
                start: s,
                end: e,
                ..edge.clone()
            });
        }
    }

    fn insert_segment<F>(&mut self, start: Point2, end: Point2, make: F)
    where
        F: FnOnce(PointId, PointId) -> EdgeData,
    {
        let s = self.merger.get_or_create(&mut self.graph.points, start);
        let e = self.merger.get_or_create(&mut self.graph.points, end);
        if s != e {
            self.graph.edges.insert(make(s, e));
        }
    }

    /// Resolves crossings, coalesces duplicates, links points and resolves
    /// winding.
    ///
    /// With `skip_same_operand`, pairs of edges from the same single operand
    /// are not intersected.
    pub(super) fn finish(mut self, skip_same_operand: bool) -> Result<PlanarGraph> {
        self.resolve_crossings(skip_same_operand)?;
        self.coalesce();
        self.link();
        self.check_balance()?;
        winding::resolve(&mut self.graph)?;
        debug!(
            points = self.graph.points.len(),
            edges = self.graph.edges.len(),
            "planar graph built"
        );
        Ok(self.graph)
    }

    fn resolve_crossings(&mut self, skip_same_operand: bool) -> Result<()> {
        for pass in 0..MAX_SPLIT_PASSES {
            let splits = self.find_splits(skip_same_operand);
            if splits.is_empty() {
                debug!(passes = pass, "crossings resolved");
                return Ok(());
            }
            trace!(pass, edges = splits.len(), "splitting edges");
            self.apply_splits(splits);
        }
        warn!(passes = MAX_SPLIT_PASSES, "edge splitting did not converge");
        Err(GraphError::NotConverged {
            passes: MAX_SPLIT_PASSES,
        }
        .into())
    }

    /// Sweeps the edges along `x` and collects the points every edge must be
    /// split at.
    fn find_splits(&mut self, skip_same_operand: bool) -> BTreeMap<EdgeId, Vec<(f64, PointId)>> {
        let snap = self.graph.snap;
        let mut items: Vec<SweepItem> = self
            .graph
            .edges
            .iter()
            .filter_map(|(id, edge)| {
                let a = self.graph.points.get(edge.start)?.position;
                let b = self.graph.points.get(edge.end)?.position;
                let mask = u8::from(edge.has(Operand::A)) | (u8::from(edge.has(Operand::B)) << 1);
                Some(SweepItem {
                    id,
                    start: edge.start,
                    end: edge.end,
                    a,
                    b,
                    min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
                    max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
                    mask,
                })
            })
            .collect();
        items.sort_by(|p, q| p.min.x.total_cmp(&q.min.x));

        let mut splits = BTreeMap::new();
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                let (e, f) = (&items[i], &items[j]);
                if f.min.x > e.max.x + snap {
                    break;
                }
                if f.min.y > e.max.y + snap || f.max.y < e.min.y - snap {
                    continue;
                }
                if skip_same_operand && (e.mask | f.mask).count_ones() == 1 {
                    continue;
                }
                self.intersect_pair(e, f, &mut splits);
            }
        }
        splits
    }

    fn intersect_pair(
        &mut self,
        e: &SweepItem,
        f: &SweepItem,
        splits: &mut BTreeMap<EdgeId, Vec<(f64, PointId)>>,
    ) {
        // Endpoints lying on the other edge (T-junctions and overlaps).
        for (point, position) in [(f.start, f.a), (f.end, f.b)] {
            self.split_if_near(e, point, position, splits);
        }
        for (point, position) in [(e.start, e.a), (e.end, e.b)] {
            self.split_if_near(f, point, position, splits);
        }

        let shares_point = e.start == f.start || e.start == f.end || e.end == f.start || e.end == f.end;
        if shares_point {
            return;
        }
        if let Some((x, _, _)) = segment_segment_intersect_2d(&e.a, &e.b, &f.a, &f.b) {
            let point = self.merger.get_or_create(&mut self.graph.points, x);
            let position = self.graph.points.get(point).map_or(x, |p| p.position);
            for item in [e, f] {
                if point == item.start || point == item.end {
                    continue;
                }
                let (s, _) = project_onto_segment(&position, &item.a, &item.b);
                if s > 0.0 && s < 1.0 {
                    splits.entry(item.id).or_default().push((s, point));
                }
            }
        }
    }

    fn split_if_near(
        &self,
        item: &SweepItem,
        point: PointId,
        position: Point2,
        splits: &mut BTreeMap<EdgeId, Vec<(f64, PointId)>>,
    ) {
        if point == item.start || point == item.end {
            return;
        }
        let (s, distance) = project_onto_segment(&position, &item.a, &item.b);
        if distance < self.graph.snap && s > 0.0 && s < 1.0 {
            splits.entry(item.id).or_default().push((s, point));
        }
    }

    /// Replaces every split edge by the chain through its split points.
    fn apply_splits(&mut self, splits: BTreeMap<EdgeId, Vec<(f64, PointId)>>) {
        for (id, mut cuts) in splits {
            let Some(edge) = self.graph.edges.remove(id) else {
                continue;
            };
            cuts.sort_by(|p, q| p.0.total_cmp(&q.0));
            cuts.dedup_by_key(|c| c.1);

            let mut previous = (0.0, edge.start);
            for (s, point) in cuts.into_iter().chain(std::iter::once((1.0, edge.end))) {
                if point == previous.1 {
                    continue;
                }
                let piece = edge.sub_edge(previous.1, point, previous.0, s);
                self.graph.edges.insert(piece);
                previous = (s, point);
            }
        }
    }

    /// Folds duplicate and anti-parallel duplicate edges together and drops
    /// edges that no longer separate anything.
    fn coalesce(&mut self) {
        let mut seen: HashMap<(PointId, PointId), EdgeId> = HashMap::new();
        let ids: Vec<EdgeId> = self.graph.edges.keys().collect();
        for id in ids {
            let Some(edge) = self.graph.edges.get(id) else {
                continue;
            };
            let key = if edge.start < edge.end {
                (edge.start, edge.end)
            } else {
                (edge.end, edge.start)
            };
            match seen.get(&key) {
                None => {
                    seen.insert(key, id);
                }
                Some(&kept) => {
                    if let Some(duplicate) = self.graph.edges.remove(id) {
                        if let Some(target) = self.graph.edges.get_mut(kept) {
                            target.absorb(&duplicate);
                        }
                    }
                }
            }
        }

        let roles = self.graph.roles;
        let before = self.graph.edges.len();
        self.graph.edges.retain(|_, edge| {
            Operand::ALL.iter().any(|op| {
                let k = op.index();
                match roles[k] {
                    Some(OperandRole::Filled(_)) => edge.weights[k] != 0,
                    Some(OperandRole::Cutter) => edge.origins[k].is_some(),
                    None => false,
                }
            })
        });
        trace!(removed = before - self.graph.edges.len(), "dropped cancelled edges");
    }

    /// Rebuilds the incidence lists in angular order and drops isolated
    /// points.
    fn link(&mut self) {
        for point in self.graph.points.values_mut() {
            point.incident.clear();
        }
        for (id, edge) in &self.graph.edges {
            for end in [edge.start, edge.end] {
                if let Some(point) = self.graph.points.get_mut(end) {
                    point.incident.push(id);
                }
            }
        }
        self.graph.points.retain(|_, p| !p.incident.is_empty());

        let points = &self.graph.points;
        let edges = &self.graph.edges;
        let sorted: Vec<(PointId, Vec<EdgeId>)> = points
            .iter()
            .map(|(id, point)| {
                let mut keyed: Vec<(f64, EdgeId)> = point
                    .incident
                    .iter()
                    .filter_map(|&e| {
                        let other = points.get(edges.get(e)?.opposite(id))?;
                        Some((leaving_angle(&point.position, &other.position), e))
                    })
                    .collect();
                keyed.sort_by(|p, q| p.0.total_cmp(&q.0));
                (id, keyed.into_iter().map(|(_, e)| e).collect())
            })
            .collect();
        for (id, incident) in sorted {
            if let Some(point) = self.graph.points.get_mut(id) {
                point.incident = incident;
            }
        }
    }

    /// Every point of a filled operand must have as much weight leaving as
    /// arriving.
    fn check_balance(&self) -> Result<()> {
        let mut unbalanced = 0;
        for op in Operand::ALL {
            let k = op.index();
            if !matches!(self.graph.roles[k], Some(OperandRole::Filled(_))) {
                continue;
            }
            for (id, point) in &self.graph.points {
                let flow: i32 = point
                    .incident
                    .iter()
                    .filter_map(|&e| self.graph.edges.get(e))
                    .map(|edge| {
                        if edge.start == id {
                            edge.weights[k]
                        } else {
                            -edge.weights[k]
                        }
                    })
                    .sum();
                if flow != 0 {
                    unbalanced += 1;
                }
            }
        }
        if unbalanced > 0 {
            warn!(points = unbalanced, "unbalanced planar graph");
            return Err(GraphError::NonEulerianGraph { points: unbalanced }.into());
        }
        Ok(())
    }
}

/// Angle of the direction `from → to` in `[0, 2π)`.
pub(super) fn leaving_angle(from: &Point2, to: &Point2) -> f64 {
    let d = to - from;
    d.y.atan2(d.x).rem_euclid(TAU)
}

/// An edge prepared for the sweep.
struct SweepItem {
    id: EdgeId,
    start: PointId,
    end: PointId,
    a: Point2,
    b: Point2,
    min: Point2,
    max: Point2,
    /// Bit 0: operand A, bit 1: operand B.
    mask: u8,
}

/// Spatial hash that merges points closer than the snap distance.
///
/// Groups points by grid cell and searches the 3x3 neighborhood, so any
/// earlier point within `cell_size` is found.
struct PointMerger {
    cell_size: f64,
    map: HashMap<(i64, i64), Vec<(PointId, Point2)>>,
}

impl PointMerger {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            map: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(&self, p: &Point2) -> (i64, i64) {
        let inv = 1.0 / self.cell_size;
        ((p.x * inv).floor() as i64, (p.y * inv).floor() as i64)
    }

    fn register(&mut self, id: PointId, position: Point2) {
        let key = self.cell_key(&position);
        self.map.entry(key).or_default().push((id, position));
    }

    fn get_or_create(&mut self, points: &mut SlotMap<PointId, PointData>, position: Point2) -> PointId {
        let key = self.cell_key(&position);

        let mut best: Option<(f64, PointId)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(entries) = self.map.get(&(key.0 + dx, key.1 + dy)) {
                    for &(id, ref existing) in entries {
                        let distance = (position - existing).norm();
                        if distance < self.cell_size && best.map_or(true, |(d, _)| distance < d) {
                            best = Some((distance, id));
                        }
                    }
                }
            }
        }
        if let Some((_, id)) = best {
            return id;
        }

        let id = points.insert(PointData::new(position));
        self.register(id, position);
        id
    }
}
