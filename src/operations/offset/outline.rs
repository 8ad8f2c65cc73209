//! Stroke-to-fill outlining.
//!
//! Every flattened edge of the stroked path becomes a quad of the stroke's
//! width, every vertex a join wedge on the outer side of the turn, and every
//! open end a cap. The pieces all wind counter-clockwise, so their union is
//! the region with a positive winding number; uncrossing under
//! [`FillRule::Positive`] removes the overlaps.

use std::borrow::Cow;

use tracing::{debug, debug_span};

use crate::error::Result;
use crate::flatten::{FlatEdge, Flattener, QuantizeParams};
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::{Path, SubPath};
use crate::math::arc_2d::{arc_point_at, arc_to_cubics};
use crate::math::polygon_2d::left_normal;
use crate::math::{cross, Point2, Vector2, TOLERANCE};
use crate::operations::boolean::Uncross;

use super::stroke_style::{LineCap, LineJoin, StrokeStyle};

/// Miter limit at the vertices a curve was flattened into.
const FLATTENED_MITER_LIMIT: f64 = 16.0;

/// Turns below this angle (radians) need no join.
const STRAIGHT_TURN: f64 = 1e-9;

/// Converts the stroke of a path into the filled region it covers.
#[derive(Debug, Clone)]
pub struct Outline<'a> {
    path: Cow<'a, Path>,
    style: StrokeStyle,
    params: QuantizeParams,
}

impl<'a> Outline<'a> {
    #[must_use]
    pub fn new(path: &'a Path, style: StrokeStyle) -> Self {
        Self {
            path: Cow::Borrowed(path),
            style,
            params: QuantizeParams::default(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: QuantizeParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the operation.
    ///
    /// An empty path comes back for an empty input, or when nothing but
    /// zero-length sub-paths with butt caps is stroked.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidParameter` for invalid quantization
    /// parameters, and the graph errors of [`crate::graph::PlanarGraph::build`].
    pub fn execute(&self) -> Result<Path> {
        let _span = debug_span!("outline", width = self.style.width()).entered();
        let bounds = self.path.bounds().inflated(self.style.half_width());
        let quantization = self.params.quantize(&bounds)?;
        let edges = Flattener::new(quantization.flatten).flatten(&self.path, 0, false);
        let mut pieces = Pieces {
            path: Path::new(),
            min_area: quantization.snap * quantization.snap,
        };
        stroke_pieces(&mut pieces, &self.path, &edges, &self.style);
        let pieces = pieces.path;
        debug!(pieces = pieces.subpaths().len(), "stroke pieces");
        if pieces.is_empty() {
            return Ok(Path::new());
        }
        Uncross::new(&pieces)
            .with_fill_rule(FillRule::Positive)
            .with_params(self.params)
            .execute()
    }
}

/// Counter-clockwise stroke pieces collected so far.
struct Pieces {
    path: Path,
    /// Pieces with less area than this are slivers and dropped.
    min_area: f64,
}

impl Pieces {
    fn push_polygon(&mut self, points: &[Point2]) {
        if let Ok(sub) = SubPath::polygon(points) {
            self.push_ccw(sub);
        }
    }

    /// Adds `sub` counter-clockwise, skipping pieces without area.
    fn push_ccw(&mut self, sub: SubPath) {
        let area = sub.signed_area();
        if area.abs() <= self.min_area {
            return;
        }
        self.path.push(if area < 0.0 { sub.reversed() } else { sub });
    }
}

/// Adds all counter-clockwise pieces covering the stroke of `path`.
fn stroke_pieces(out: &mut Pieces, path: &Path, edges: &[FlatEdge], style: &StrokeStyle) {
    for (index, sub) in path.subpaths().iter().enumerate() {
        let run: Vec<&FlatEdge> = edges
            .iter()
            .filter(|e| e.back.piece.subpath == index)
            .collect();
        if run.is_empty() {
            push_dot(out, sub.start(), style);
        } else {
            stroke_run(out, &run, sub.is_closed(), style);
        }
    }
}

fn stroke_run(out: &mut Pieces, run: &[&FlatEdge], closed: bool, style: &StrokeStyle) {
    let hw = style.half_width();
    let dirs: Vec<Vector2> = run.iter().map(|e| (e.end - e.start) / e.length()).collect();

    for (edge, dir) in run.iter().zip(&dirs) {
        let n = left_normal(*dir) * hw;
        out.push_polygon(&[edge.start - n, edge.end - n, edge.end + n, edge.start + n]);
    }

    let count = run.len();
    let joints = if closed { count } else { count - 1 };
    for i in 0..joints {
        let j = (i + 1) % count;
        let (join, limit) = if run[i].back.piece == run[j].back.piece {
            (LineJoin::Miter, FLATTENED_MITER_LIMIT)
        } else {
            (style.join(), style.miter_limit())
        };
        push_join(out, run[i].end, dirs[i], dirs[j], join, limit, hw);
    }

    if !closed {
        push_cap(out, run[0].start, -dirs[0], style);
        push_cap(out, run[count - 1].end, dirs[count - 1], style);
    }
}

/// Fills the gap on the outer side of the turn from `d0` to `d1` at `v`.
fn push_join(out: &mut Pieces, v: Point2, d0: Vector2, d1: Vector2, join: LineJoin, miter_limit: f64, hw: f64) {
    let turn = cross(&d0, &d1).atan2(d0.dot(&d1));
    if turn.abs() < STRAIGHT_TURN {
        return;
    }
    // The outer side is right of a left turn and left of a right turn.
    let side = if turn > 0.0 { -1.0 } else { 1.0 };
    let o0 = left_normal(d0) * side;
    let o1 = left_normal(d1) * side;
    let (a, b) = (v + o0 * hw, v + o1 * hw);

    match join {
        LineJoin::Round => {
            let start = o0.y.atan2(o0.x);
            let mut sub = SubPath::new(v);
            sub.line_to(arc_point_at(&v, hw, start, turn, 0.0));
            for [c1, c2, end] in arc_to_cubics(&v, hw, start, turn) {
                sub.cubic_to(c1, c2, end);
            }
            sub.close();
            out.push_ccw(sub);
        }
        LineJoin::Miter => {
            let ratio = 1.0 / (turn * 0.5).cos();
            let bisector = o0 + o1;
            if ratio <= miter_limit && bisector.norm() > TOLERANCE {
                let tip = v + bisector.normalize() * (hw * ratio);
                out.push_polygon(&[v, a, tip, b]);
            } else {
                out.push_polygon(&[v, a, b]);
            }
        }
        LineJoin::Bevel => out.push_polygon(&[v, a, b]),
    }
}

/// Caps the end at `p`, `u` pointing away from the stroke.
fn push_cap(out: &mut Pieces, p: Point2, u: Vector2, style: &StrokeStyle) {
    let hw = style.half_width();
    let n = left_normal(u) * hw;
    match style.cap() {
        LineCap::Butt => {}
        LineCap::Square => {
            let ext = u * hw;
            out.push_polygon(&[p - n, p - n + ext, p + n + ext, p + n]);
        }
        LineCap::Round => {
            let start = u.y.atan2(u.x) - std::f64::consts::FRAC_PI_2;
            let mut sub = SubPath::new(arc_point_at(&p, hw, start, std::f64::consts::PI, 0.0));
            for [c1, c2, end] in arc_to_cubics(&p, hw, start, std::f64::consts::PI) {
                sub.cubic_to(c1, c2, end);
            }
            sub.close();
            out.push_ccw(sub);
        }
    }
}

/// A zero-length sub-path: a disc or an axis-aligned square, or nothing.
fn push_dot(out: &mut Pieces, p: Point2, style: &StrokeStyle) {
    let hw = style.half_width();
    match style.cap() {
        LineCap::Butt => {}
        LineCap::Square => out.path.append(Path::rectangle(p.x - hw, p.y - hw, 2.0 * hw, 2.0 * hw)),
        LineCap::Round => out.path.append(Path::circle(p, hw)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn horizontal_line() -> Path {
        let mut sub = SubPath::new(Point2::new(0.0, 0.0));
        sub.line_to(Point2::new(4.0, 0.0));
        Path::from_subpaths(vec![sub])
    }

    fn outline(path: &Path, style: StrokeStyle) -> Path {
        Outline::new(path, style).execute().unwrap()
    }

    #[test]
    fn butt_line_is_a_rectangle() {
        let result = outline(&horizontal_line(), StrokeStyle::new(2.0).unwrap());
        assert_eq!(result.subpaths().len(), 1);
        assert_relative_eq!(result.signed_area(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn square_cap_extends_both_ends() {
        let style = StrokeStyle::new(2.0).unwrap().with_cap(LineCap::Square);
        assert_relative_eq!(outline(&horizontal_line(), style).area(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn round_cap_adds_a_disc() {
        let style = StrokeStyle::new(2.0).unwrap().with_cap(LineCap::Round);
        let result = outline(&horizontal_line(), style);
        assert_eq!(result.subpaths().len(), 1);
        assert_relative_eq!(result.area(), 8.0 + PI, epsilon = 1e-3);
    }

    #[test]
    fn closed_square_stroke_is_a_frame() {
        let square = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        let result = outline(&square, StrokeStyle::new(0.5).unwrap());
        assert_eq!(result.subpaths().len(), 2);
        // 2.5² outside minus 1.5² hole.
        assert_relative_eq!(result.signed_area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn bevel_clips_the_outer_corners() {
        let square = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        let style = StrokeStyle::new(0.5).unwrap().with_join(LineJoin::Bevel);
        let result = outline(&square, style);
        // Each corner loses a right triangle with legs 0.25.
        assert_relative_eq!(result.signed_area(), 4.0 - 4.0 * 0.03125, epsilon = 1e-9);
    }

    #[test]
    fn sharp_turn_beyond_miter_limit_is_beveled() {
        let mut sub = SubPath::new(Point2::new(0.0, 0.0));
        sub.line_to(Point2::new(4.0, 0.0)).line_to(Point2::new(0.0, 0.4));
        let spike = Path::from_subpaths(vec![sub]);
        let mitered = outline(&spike, StrokeStyle::new(0.2).unwrap().with_miter_limit(100.0).unwrap());
        let limited = outline(&spike, StrokeStyle::new(0.2).unwrap());
        assert!(limited.area() < mitered.area());
        assert!(limited.bounds().max.x < 4.5);
    }

    #[test]
    fn micro_scale_stroke_is_kept() {
        let mut sub = SubPath::new(Point2::new(0.0, 0.0));
        sub.line_to(Point2::new(4e-6, 0.0));
        let line = Path::from_subpaths(vec![sub]);
        let result = outline(&line, StrokeStyle::new(2e-6).unwrap().with_cap(LineCap::Square));
        assert_eq!(result.subpaths().len(), 1);
        assert_relative_eq!(result.signed_area(), 12e-12, max_relative = 1e-6);
    }

    #[test]
    fn micro_scale_dot_is_a_disc() {
        let dot = Path::from_subpaths(vec![SubPath::new(Point2::new(1e-6, 1e-6))]);
        let round = outline(&dot, StrokeStyle::new(2e-6).unwrap().with_cap(LineCap::Round));
        assert_relative_eq!(round.area(), PI * 1e-12, max_relative = 2e-3);
    }

    #[test]
    fn zero_length_subpath_becomes_a_dot() {
        let dot = Path::from_subpaths(vec![SubPath::new(Point2::new(1.0, 1.0))]);
        let round = outline(&dot, StrokeStyle::new(2.0).unwrap().with_cap(LineCap::Round));
        assert_relative_eq!(round.area(), PI, epsilon = 1e-3);
        let square = outline(&dot, StrokeStyle::new(2.0).unwrap().with_cap(LineCap::Square));
        assert_relative_eq!(square.area(), 4.0, epsilon = 1e-9);
        let butt = outline(&dot, StrokeStyle::new(2.0).unwrap());
        assert!(butt.is_empty());
    }
}
