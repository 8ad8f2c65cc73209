use crate::error::Result;
use crate::math::Point2;

use super::{EdgeId, Operand, OperandRole, PlanarGraph};

/// Edge geometry with the weights it contributes to crossings.
struct Crossing {
    id: EdgeId,
    a: Point2,
    b: Point2,
    weights: [i32; 2],
}

/// Edges binned into parallel strips by their span along one axis.
///
/// Every edge sits in each strip its span touches, so a ray along the
/// other axis only meets edges of the strip it starts in.
struct Strips {
    low: f64,
    width: f64,
    bins: Vec<Vec<usize>>,
}

impl Strips {
    fn new(spans: &[(f64, f64)]) -> Self {
        let low = spans.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
        let high = spans.iter().map(|s| s.1).fold(f64::NEG_INFINITY, f64::max);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let count = ((spans.len() as f64).sqrt().ceil() as usize).max(1);
        #[allow(clippy::cast_precision_loss)]
        let width = if high > low { (high - low) / count as f64 } else { 1.0 };
        let mut strips = Self {
            low,
            width,
            bins: vec![Vec::new(); count],
        };
        for (index, &(min, max)) in spans.iter().enumerate() {
            for bin in strips.bin(min)..=strips.bin(max) {
                strips.bins[bin].push(index);
            }
        }
        strips
    }

    fn bin(&self, v: f64) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bin = ((v - self.low) / self.width).floor().max(0.0) as usize;
        bin.min(self.bins.len() - 1)
    }

    /// Edges whose span may contain `v`.
    fn near(&self, v: f64) -> &[usize] {
        &self.bins[self.bin(v)]
    }
}

/// Resolves the winding number on both sides of every edge for each filled
/// operand, and classifies the sides with the operand's fill rule.
///
/// A ray is cast from the edge midpoint, along `+x` for steep edges and
/// along `+y` for flat ones, and crossings with the other edges of the
/// ray's strip are counted with the half-open rule. The edge's own weight
/// gives the step to the other side.
pub(super) fn resolve(graph: &mut PlanarGraph) -> Result<()> {
    let crossings: Vec<Crossing> = graph
        .edges
        .iter()
        .filter_map(|(id, edge)| {
            Some(Crossing {
                id,
                a: graph.points.get(edge.start)?.position,
                b: graph.points.get(edge.end)?.position,
                weights: edge.weights,
            })
        })
        .collect();
    if crossings.is_empty() {
        return Ok(());
    }
    let rows = Strips::new(&crossings.iter().map(|c| (c.a.y.min(c.b.y), c.a.y.max(c.b.y))).collect::<Vec<_>>());
    let columns = Strips::new(&crossings.iter().map(|c| (c.a.x.min(c.b.x), c.a.x.max(c.b.x))).collect::<Vec<_>>());

    for op in Operand::ALL {
        let k = op.index();
        let Some(OperandRole::Filled(rule)) = graph.roles[k] else {
            continue;
        };
        for (index, crossing) in crossings.iter().enumerate() {
            let (left, right) = side_windings(&crossings, &rows, &columns, index, k);
            if let Some(edge) = graph.edges.get_mut(crossing.id) {
                edge.winding_left[k] = left;
                edge.winding_right[k] = right;
                edge.inside_left[k] = rule.is_inside(left)?;
                edge.inside_right[k] = rule.is_inside(right)?;
            }
        }
    }
    Ok(())
}

/// Winding numbers `(left, right)` of operand `k` beside edge `index`.
fn side_windings(crossings: &[Crossing], rows: &Strips, columns: &Strips, index: usize, k: usize) -> (i32, i32) {
    let this = &crossings[index];
    let m = nalgebra::center(&this.a, &this.b);
    let d = this.b - this.a;
    let w = this.weights[k];
    let others = |strip: &[usize]| {
        strip
            .iter()
            .filter(move |&&i| i != index && crossings[i].weights[k] != 0)
            .map(|&i| &crossings[i])
            .collect::<Vec<_>>()
    };

    if d.y.abs() >= d.x.abs() {
        // Ray towards +x: the east side.
        let mut east = 0;
        for c in others(rows.near(m.y)) {
            if (c.a.y > m.y) == (c.b.y > m.y) {
                continue;
            }
            let x = c.a.x + (m.y - c.a.y) * (c.b.x - c.a.x) / (c.b.y - c.a.y);
            if x > m.x {
                east += if c.b.y > c.a.y { c.weights[k] } else { -c.weights[k] };
            }
        }
        let upward = d.y > 0.0;
        let west = east + if upward { w } else { -w };
        if upward {
            (west, east)
        } else {
            (east, west)
        }
    } else {
        // Ray towards +y: the north side.
        let mut north = 0;
        for c in others(columns.near(m.x)) {
            if (c.a.x > m.x) == (c.b.x > m.x) {
                continue;
            }
            let y = c.a.y + (m.x - c.a.x) * (c.b.y - c.a.y) / (c.b.x - c.a.x);
            if y > m.y {
                north += if c.b.x < c.a.x { c.weights[k] } else { -c.weights[k] };
            }
        }
        let leftward = d.x < 0.0;
        let south = north + if leftward { w } else { -w };
        if leftward {
            (south, north)
        } else {
            (north, south)
        }
    }
}
