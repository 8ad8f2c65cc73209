//! Walking kept edges back into path loops.
//!
//! Loops are traced face by face: at each point the walk continues on the
//! first kept edge clockwise from the edge it arrived on, so every loop has
//! its kept region on the left and never crosses itself. Runs of edges that
//! came from the same piece of a source path are re-emitted as a single
//! segment of that piece, which restores lines and curves exactly where the
//! boundary was not cut.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use tracing::{debug, warn};

use crate::geometry::path::{Path, Piece, PieceGeometry, Segment, SubPath};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;

use super::builder::leaving_angle;
use super::{EdgeId, KeepDecision, Operand, PlanarGraph, PointId};

/// Parameter gap under which two runs on one piece are contiguous.
const T_EPSILON: f64 = 1e-9;

/// A closed loop of the result.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub subpath: SubPath,
    /// Flattened vertices of the loop, as walked.
    pub polygon: Vec<Point2>,
    /// Signed area of `polygon`: positive for outer boundaries, negative
    /// for holes.
    pub area: f64,
}

impl Loop {
    #[must_use]
    pub fn is_hole(&self) -> bool {
        self.area < 0.0
    }
}

/// Collects the loops into a single path.
#[must_use]
pub fn loops_to_path(loops: Vec<Loop>) -> Path {
    Path::from_subpaths(loops.into_iter().map(|l| l.subpath).collect())
}

#[derive(Debug, Clone, Copy)]
struct HalfEdge {
    edge: EdgeId,
    forward: bool,
    from: PointId,
    to: PointId,
    angle: f64,
}

/// One walked half-edge with its position on a source path.
#[derive(Debug, Clone, Copy)]
struct Step {
    from: Point2,
    to: Point2,
    origin: Option<(usize, Piece, f64, f64)>,
}

impl Step {
    fn continues_into(&self, next: &Step) -> bool {
        match (self.origin, next.origin) {
            (Some((src, piece, t0, t1)), Some((next_src, next_piece, u0, u1))) => {
                src == next_src
                    && piece == next_piece
                    && (t1 - u0).abs() < T_EPSILON
                    && (t1 > t0) == (u1 > u0)
            }
            _ => false,
        }
    }
}

/// Traces every kept edge of `graph` into closed loops.
///
/// `sources[i]` is the path with `source_path_id == i`; it supplies the
/// original segments for the back-mapped runs. Loops of fewer than two edges
/// are dropped.
#[must_use]
pub fn reconstruct(graph: &PlanarGraph, sources: &[&Path]) -> Vec<Loop> {
    let half_edges = collect_half_edges(graph);
    let mut outgoing: HashMap<PointId, Vec<usize>> = HashMap::new();
    for (index, half) in half_edges.iter().enumerate() {
        outgoing.entry(half.from).or_default().push(index);
    }
    for list in outgoing.values_mut() {
        list.sort_by(|&i, &j| half_edges[i].angle.total_cmp(&half_edges[j].angle));
    }

    let mut visited = vec![false; half_edges.len()];
    let mut loops = Vec::new();
    for first in 0..half_edges.len() {
        if visited[first] {
            continue;
        }
        let mut cycle = Vec::new();
        let mut current = first;
        let closed = loop {
            visited[current] = true;
            cycle.push(current);
            match next_half_edge(&half_edges, &outgoing, current) {
                Some(next) if next == first => break true,
                Some(next) if !visited[next] => current = next,
                _ => break false,
            }
        };
        if !closed {
            warn!(edges = cycle.len(), "discarding an unclosed walk");
            continue;
        }
        if cycle.len() < 2 {
            continue;
        }
        if let Some(l) = build_loop(graph, &half_edges, &cycle, sources) {
            loops.push(l);
        }
    }
    debug!(loops = loops.len(), half_edges = half_edges.len(), "reconstructed loops");
    loops
}

fn collect_half_edges(graph: &PlanarGraph) -> Vec<HalfEdge> {
    let mut half_edges = Vec::new();
    for (id, edge) in graph.edges() {
        let (Ok(a), Ok(b)) = (graph.point(edge.start), graph.point(edge.end)) else {
            continue;
        };
        let forward = HalfEdge {
            edge: id,
            forward: true,
            from: edge.start,
            to: edge.end,
            angle: leaving_angle(&a.position, &b.position),
        };
        let backward = HalfEdge {
            edge: id,
            forward: false,
            from: edge.end,
            to: edge.start,
            angle: leaving_angle(&b.position, &a.position),
        };
        match edge.keep {
            KeepDecision::Keep => half_edges.push(forward),
            KeepDecision::KeepFlipped => half_edges.push(backward),
            KeepDecision::KeepBoth => {
                half_edges.push(forward);
                half_edges.push(backward);
            }
            KeepDecision::Discard => {}
        }
    }
    half_edges
}

/// The first outgoing half-edge clockwise from the reverse of `current`.
fn next_half_edge(half_edges: &[HalfEdge], outgoing: &HashMap<PointId, Vec<usize>>, current: usize) -> Option<usize> {
    let arriving = &half_edges[current];
    let back_angle = (arriving.angle + PI).rem_euclid(TAU);
    outgoing
        .get(&arriving.to)?
        .iter()
        .map(|&candidate| {
            let delta = if half_edges[candidate].edge == arriving.edge {
                TAU
            } else {
                let d = (back_angle - half_edges[candidate].angle).rem_euclid(TAU);
                if d == 0.0 {
                    TAU
                } else {
                    d
                }
            };
            (delta, candidate)
        })
        .min_by(|p, q| p.0.total_cmp(&q.0))
        .map(|(_, candidate)| candidate)
}

fn build_loop(graph: &PlanarGraph, half_edges: &[HalfEdge], cycle: &[usize], sources: &[&Path]) -> Option<Loop> {
    let mut steps = Vec::with_capacity(cycle.len());
    for &index in cycle {
        let half = &half_edges[index];
        let edge = graph.edge(half.edge).ok()?;
        let from = graph.point(half.from).ok()?.position;
        let to = graph.point(half.to).ok()?.position;
        // Edges shared by both operands map back onto operand A.
        let origin = edge
            .origin(Operand::A)
            .or_else(|| edge.origin(Operand::B))
            .map(|o| {
                let (t0, t1) = if half.forward {
                    (o.t_at_start(), o.t_at_end())
                } else {
                    (o.t_at_end(), o.t_at_start())
                };
                (o.back.source_path_id, o.back.piece, t0, t1)
            });
        steps.push(Step { from, to, origin });
    }

    // Start at a run boundary so no run straddles the loop start.
    let n = steps.len();
    if let Some(start) = (0..n).find(|&i| !steps[(i + n - 1) % n].continues_into(&steps[i])) {
        steps.rotate_left(start);
    }

    let polygon: Vec<Point2> = steps.iter().map(|s| s.from).collect();
    let area = signed_area_2d(&polygon);

    let mut subpath = SubPath::new(steps[0].from);
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && steps[j - 1].continues_into(&steps[j]) {
            j += 1;
        }
        subpath.push_segment(run_segment(&steps[i], &steps[j - 1], sources));
        i = j;
    }
    subpath.close();

    Some(Loop {
        subpath,
        polygon,
        area,
    })
}

/// The segment covering the run from `first` to `last`.
///
/// Curves are cut from the source piece and nudged so they start and end
/// exactly on the graph points.
fn run_segment(first: &Step, last: &Step, sources: &[&Path]) -> Segment {
    let (Some((src, piece, t0, _)), Some((_, _, _, t1))) = (first.origin, last.origin) else {
        return Segment::LineTo(last.to);
    };
    match sources.get(src).and_then(|path| path.piece(piece)) {
        Some(geometry @ PieceGeometry::Cubic(_)) => {
            let Segment::CubicTo { ctrl1, ctrl2, end } = geometry.segment_between(t0, t1) else {
                return Segment::LineTo(last.to);
            };
            let start_shift = first.from - geometry.point_at(t0);
            let end_shift = last.to - end;
            Segment::CubicTo {
                ctrl1: ctrl1 + start_shift,
                ctrl2: ctrl2 + end_shift,
                end: last.to,
            }
        }
        _ => Segment::LineTo(last.to),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::flatten::Flattener;
    use crate::geometry::fill_rule::FillRule;
    use crate::graph::{EdgeData, OperandRole};
    use approx::assert_relative_eq;

    fn uncrossed(path: &Path, rule: FillRule) -> PlanarGraph {
        let edges = Flattener::new(1e-3).flatten(path, 0, true);
        let mut graph = PlanarGraph::build(Operand::A, &edges, OperandRole::Filled(rule), 1e-9).unwrap();
        graph.select(boundary_of_a);
        graph
    }

    fn boundary_of_a(edge: &EdgeData) -> KeepDecision {
        match (edge.inside_left[0], edge.inside_right[0]) {
            (true, false) => KeepDecision::Keep,
            (false, true) => KeepDecision::KeepFlipped,
            _ => KeepDecision::Discard,
        }
    }

    #[test]
    fn square_round_trips_exactly() {
        let square = Path::rectangle(0.0, 0.0, 2.0, 1.0);
        let graph = uncrossed(&square, FillRule::NonZero);
        let loops = reconstruct(&graph, &[&square]);
        assert_eq!(loops.len(), 1);
        assert_relative_eq!(loops[0].area, 2.0);
        // MoveTo plus four sides.
        assert_eq!(loops[0].subpath.segments().len(), 5);
    }

    #[test]
    fn clockwise_input_comes_back_counter_clockwise() {
        let square = Path::rectangle(0.0, 0.0, 1.0, 1.0).reversed();
        let graph = uncrossed(&square, FillRule::NonZero);
        let loops = reconstruct(&graph, &[&square]);
        assert_eq!(loops.len(), 1);
        assert!(!loops[0].is_hole());
        assert_relative_eq!(loops[0].subpath.signed_area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn circle_keeps_its_curves() {
        let circle = Path::circle(Point2::new(1.0, 1.0), 1.0);
        let graph = uncrossed(&circle, FillRule::NonZero);
        let loops = reconstruct(&graph, &[&circle]);
        assert_eq!(loops.len(), 1);
        let segments = loops[0].subpath.segments();
        assert_eq!(segments.len(), 5);
        assert!(segments[1..].iter().all(|s| matches!(s, Segment::CubicTo { .. })));
        assert_relative_eq!(
            loops[0].subpath.signed_area(),
            circle.signed_area(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn bowtie_splits_into_two_loops() {
        let bowtie = Path::polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ])
        .unwrap();
        let graph = uncrossed(&bowtie, FillRule::NonZero);
        let loops = reconstruct(&graph, &[&bowtie]);
        assert_eq!(loops.len(), 2);
        for l in &loops {
            assert!(!l.is_hole());
            assert_relative_eq!(l.area, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn even_odd_ring_has_a_hole() {
        let mut ring = Path::rectangle(0.0, 0.0, 4.0, 4.0);
        ring.append(Path::rectangle(1.0, 1.0, 2.0, 2.0));
        let graph = uncrossed(&ring, FillRule::EvenOdd);
        let loops = reconstruct(&graph, &[&ring]);
        assert_eq!(loops.len(), 2);
        assert_eq!(loops.iter().filter(|l| l.is_hole()).count(), 1);
        let total: f64 = loops.iter().map(|l| l.area).sum();
        assert_relative_eq!(total, 12.0, epsilon = 1e-12);
        assert_relative_eq!(loops_to_path(loops).signed_area(), 12.0, epsilon = 1e-12);
    }
}
