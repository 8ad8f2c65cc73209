use tracing::trace;

use crate::geometry::cut::{sorted_cuts, CutPosition};
use crate::graph::{Operand, PlanarGraph};

/// Collects the positions on operand A where the cutter B crosses it.
///
/// A point qualifies when more than two edges meet there, at least one of
/// them from A and at least one from B; high-degree points of A alone are
/// self-crossings and are ignored. The parameter is read from A's own back
/// data. When several A edges meet at a qualifying point, the first one in
/// the point's angular order (counter-clockwise from `+x`) supplies it.
///
/// The result is sorted by `(piece, t)` with near-duplicates removed.
#[must_use]
pub fn cut_positions(graph: &PlanarGraph) -> Vec<CutPosition> {
    let mut cuts = Vec::new();
    for (id, point) in graph.points() {
        if point.incident.len() <= 2 {
            continue;
        }
        let incident: Vec<_> = point
            .incident
            .iter()
            .filter_map(|&e| graph.edge(e).ok())
            .collect();
        if !incident.iter().any(|e| e.has(Operand::B)) {
            continue;
        }
        let Some((edge, origin)) = incident
            .iter()
            .find_map(|e| e.origin(Operand::A).map(|o| (e, o)))
        else {
            continue;
        };
        let t = if edge.start == id {
            origin.t_at_start()
        } else {
            origin.t_at_end()
        };
        trace!(x = point.position.x, y = point.position.y, t, "cut position");
        cuts.push(CutPosition::new(origin.back.piece, t));
    }
    sorted_cuts(&cuts)
}
