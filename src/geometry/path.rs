use crate::error::{GeometryError, Result};
use crate::math::arc_2d::arc_to_cubics;
use crate::math::cubic_2d::{cubic_point_at, sub_cubic};
use crate::math::{lerp, Bounds, Point2, TOLERANCE};

/// A single drawing command of a sub-path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point2),
    LineTo(Point2),
    CubicTo {
        ctrl1: Point2,
        ctrl2: Point2,
        end: Point2,
    },
}

impl Segment {
    /// The point the pen rests on after this command.
    #[must_use]
    pub fn end(&self) -> Point2 {
        match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) => p,
            Segment::CubicTo { end, .. } => end,
        }
    }
}

/// Identifies one drawing segment of a path: `segment` indexes the
/// sub-path's segment list, and `segment == len` names the implicit closing
/// line of a closed (or implicitly closed) sub-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Piece {
    pub subpath: usize,
    pub segment: usize,
}

impl Piece {
    #[must_use]
    pub fn new(subpath: usize, segment: usize) -> Self {
        Self { subpath, segment }
    }
}

/// Resolved geometry of a [`Piece`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PieceGeometry {
    Line(Point2, Point2),
    Cubic([Point2; 4]),
}

impl PieceGeometry {
    #[must_use]
    pub fn start(&self) -> Point2 {
        match self {
            PieceGeometry::Line(a, _) => *a,
            PieceGeometry::Cubic(p) => p[0],
        }
    }

    #[must_use]
    pub fn end(&self) -> Point2 {
        match self {
            PieceGeometry::Line(_, b) => *b,
            PieceGeometry::Cubic(p) => p[3],
        }
    }

    /// Evaluates the piece at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        match self {
            PieceGeometry::Line(a, b) => lerp(a, b, t),
            PieceGeometry::Cubic(p) => cubic_point_at(&p[0], &p[1], &p[2], &p[3], t),
        }
    }

    /// Returns the part of the piece between `t0` and `t1` as a segment
    /// (runs backwards when `t0 > t1`).
    #[must_use]
    pub fn segment_between(&self, t0: f64, t1: f64) -> Segment {
        match self {
            PieceGeometry::Line(..) => Segment::LineTo(self.point_at(t1)),
            PieceGeometry::Cubic(p) => {
                let [_, ctrl1, ctrl2, end] = sub_cubic(p, t0, t1);
                Segment::CubicTo { ctrl1, ctrl2, end }
            }
        }
    }

    /// Returns `true` if every control point coincides with the start.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        match self {
            PieceGeometry::Line(a, b) => (b - a).norm() < TOLERANCE,
            PieceGeometry::Cubic(p) => p[1..].iter().all(|q| (q - p[0]).norm() < TOLERANCE),
        }
    }

    /// Signed area contribution of this piece (Green's theorem).
    #[must_use]
    pub fn area_contribution(&self) -> f64 {
        let x = |a: &Point2, b: &Point2| a.x * b.y - a.y * b.x;
        match self {
            PieceGeometry::Line(a, b) => 0.5 * x(a, b),
            PieceGeometry::Cubic([p0, p1, p2, p3]) => {
                0.3 * x(p0, p1)
                    + 0.15 * x(p0, p2)
                    + 0.05 * x(p0, p3)
                    + 0.15 * x(p1, p2)
                    + 0.15 * x(p1, p3)
                    + 0.3 * x(p2, p3)
            }
        }
    }
}

/// An ordered list of segments starting with a `MoveTo`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    segments: Vec<Segment>,
    closed: bool,
}

impl SubPath {
    /// Starts a new open sub-path at `start`.
    #[must_use]
    pub fn new(start: Point2) -> Self {
        Self {
            segments: vec![Segment::MoveTo(start)],
            closed: false,
        }
    }

    /// Builds a sub-path from raw segments.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the list is empty, does not
    /// start with `MoveTo`, or contains another `MoveTo`.
    pub fn from_segments(segments: Vec<Segment>, closed: bool) -> Result<Self> {
        match segments.first() {
            Some(Segment::MoveTo(_)) => {}
            _ => {
                return Err(GeometryError::Degenerate(
                    "sub-path must start with MoveTo".to_owned(),
                )
                .into())
            }
        }
        if segments[1..].iter().any(|s| matches!(s, Segment::MoveTo(_))) {
            return Err(GeometryError::Degenerate(
                "MoveTo is only allowed as the first segment".to_owned(),
            )
            .into());
        }
        Ok(Self { segments, closed })
    }

    /// Builds a closed polygon sub-path.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if `points` is empty.
    pub fn polygon(points: &[Point2]) -> Result<Self> {
        let (first, rest) = points.split_first().ok_or_else(|| {
            GeometryError::Degenerate("polygon needs at least one point".to_owned())
        })?;
        let mut sub = Self::new(*first);
        for p in rest {
            sub.line_to(*p);
        }
        sub.close();
        Ok(sub)
    }

    pub fn line_to(&mut self, p: Point2) -> &mut Self {
        self.segments.push(Segment::LineTo(p));
        self
    }

    pub fn cubic_to(&mut self, ctrl1: Point2, ctrl2: Point2, end: Point2) -> &mut Self {
        self.segments.push(Segment::CubicTo { ctrl1, ctrl2, end });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.closed = true;
        self
    }

    pub(crate) fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn start(&self) -> Point2 {
        self.segments[0].end()
    }

    #[must_use]
    pub fn end(&self) -> Point2 {
        self.segments[self.segments.len() - 1].end()
    }

    /// Returns the geometry of segment `index`, where `index == len` is the
    /// closing line back to the start.
    #[must_use]
    pub fn piece(&self, index: usize) -> Option<PieceGeometry> {
        if index == 0 || index > self.segments.len() {
            return None;
        }
        if index == self.segments.len() {
            return Some(PieceGeometry::Line(self.end(), self.start()));
        }
        let from = self.segments[index - 1].end();
        match self.segments[index] {
            Segment::MoveTo(_) => None,
            Segment::LineTo(p) => Some(PieceGeometry::Line(from, p)),
            Segment::CubicTo { ctrl1, ctrl2, end } => {
                Some(PieceGeometry::Cubic([from, ctrl1, ctrl2, end]))
            }
        }
    }

    /// Iterates the drawing pieces, adding the closing line when the
    /// sub-path is closed (or `implicit_close` is set) and does not already
    /// end at its start.
    pub fn pieces(&self, implicit_close: bool) -> impl Iterator<Item = (usize, PieceGeometry)> + '_ {
        let needs_close =
            (self.closed || implicit_close) && (self.end() - self.start()).norm() > TOLERANCE;
        let last = if needs_close {
            self.segments.len()
        } else {
            self.segments.len() - 1
        };
        (1..=last).filter_map(move |i| self.piece(i).map(|g| (i, g)))
    }

    /// Signed area enclosed by the sub-path, treating it as closed.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.pieces(true).map(|(_, g)| g.area_contribution()).sum()
    }

    /// Returns `true` if all drawing pieces have zero length.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.pieces(false).all(|(_, g)| g.is_degenerate())
    }

    /// Returns the same sub-path traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut out = Self::new(self.end());
        for i in (1..self.segments.len()).rev() {
            let from = self.segments[i - 1].end();
            match self.segments[i] {
                Segment::MoveTo(_) => {}
                Segment::LineTo(_) => {
                    out.line_to(from);
                }
                Segment::CubicTo { ctrl1, ctrl2, .. } => {
                    out.cubic_to(ctrl2, ctrl1, from);
                }
            }
        }
        out.closed = self.closed;
        out
    }

    fn extend_bounds(&self, bounds: &mut Bounds) {
        for seg in &self.segments {
            match seg {
                Segment::MoveTo(p) | Segment::LineTo(p) => bounds.extend(p),
                Segment::CubicTo { ctrl1, ctrl2, end } => {
                    bounds.extend(ctrl1);
                    bounds.extend(ctrl2);
                    bounds.extend(end);
                }
            }
        }
    }
}

/// An ordered list of sub-paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    subpaths: Vec<SubPath>,
}

impl Path {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_subpaths(subpaths: Vec<SubPath>) -> Self {
        Self { subpaths }
    }

    /// Builds a path from a single closed polygon.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if `points` is empty.
    pub fn polygon(points: &[Point2]) -> Result<Self> {
        Ok(Self::from_subpaths(vec![SubPath::polygon(points)?]))
    }

    /// Counter-clockwise axis-aligned rectangle.
    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        let mut sub = SubPath::new(Point2::new(x, y));
        sub.line_to(Point2::new(x + width, y))
            .line_to(Point2::new(x + width, y + height))
            .line_to(Point2::new(x, y + height))
            .close();
        Self::from_subpaths(vec![sub])
    }

    /// Counter-clockwise circle made of four cubic quarter arcs.
    #[must_use]
    pub fn circle(center: Point2, radius: f64) -> Self {
        let mut sub = SubPath::new(Point2::new(center.x + radius, center.y));
        let start = sub.start();
        let arcs = arc_to_cubics(&center, radius, 0.0, std::f64::consts::TAU);
        let last = arcs.len().saturating_sub(1);
        for (i, [c1, c2, end]) in arcs.into_iter().enumerate() {
            // Land exactly on the start so the closing line vanishes.
            sub.cubic_to(c1, c2, if i == last { start } else { end });
        }
        sub.close();
        Self::from_subpaths(vec![sub])
    }

    pub fn push(&mut self, subpath: SubPath) {
        self.subpaths.push(subpath);
    }

    /// Appends every sub-path of `other`.
    pub fn append(&mut self, other: Path) {
        self.subpaths.extend(other.subpaths);
    }

    #[must_use]
    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    #[must_use]
    pub fn into_subpaths(self) -> Vec<SubPath> {
        self.subpaths
    }

    /// Returns `true` if the path has no sub-paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    /// Returns the geometry of `piece`, or `None` if it does not exist.
    #[must_use]
    pub fn piece(&self, piece: Piece) -> Option<PieceGeometry> {
        self.subpaths.get(piece.subpath)?.piece(piece.segment)
    }

    /// Control-point bounding box (contains the curve).
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        for sub in &self.subpaths {
            sub.extend_bounds(&mut bounds);
        }
        bounds
    }

    /// Sum of the signed areas of all sub-paths, each treated as closed.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.subpaths.iter().map(SubPath::signed_area).sum()
    }

    /// Absolute value of [`Path::signed_area`].
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Returns the path with every sub-path reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::from_subpaths(self.subpaths.iter().map(SubPath::reversed).collect())
    }

    /// Returns `true` if every sub-path has zero length.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.subpaths.iter().all(SubPath::is_degenerate)
    }
}

/// Incremental path construction in the style of a drawing API.
#[derive(Debug, Default)]
pub struct PathBuilder {
    path: Path,
    current: Option<SubPath>,
}

impl PathBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new sub-path, finishing the current one.
    pub fn move_to(&mut self, p: Point2) -> &mut Self {
        self.flush();
        self.current = Some(SubPath::new(p));
        self
    }

    /// Adds a line; starts a sub-path at `p` if none is open.
    pub fn line_to(&mut self, p: Point2) -> &mut Self {
        match self.current.as_mut() {
            Some(sub) => {
                sub.line_to(p);
            }
            None => self.current = Some(SubPath::new(p)),
        }
        self
    }

    /// Adds a cubic; starts a sub-path at `end` if none is open.
    pub fn cubic_to(&mut self, ctrl1: Point2, ctrl2: Point2, end: Point2) -> &mut Self {
        match self.current.as_mut() {
            Some(sub) => {
                sub.cubic_to(ctrl1, ctrl2, end);
            }
            None => self.current = Some(SubPath::new(end)),
        }
        self
    }

    /// Closes the current sub-path.
    pub fn close(&mut self) -> &mut Self {
        if let Some(mut sub) = self.current.take() {
            sub.close();
            self.path.push(sub);
        }
        self
    }

    #[must_use]
    pub fn build(mut self) -> Path {
        self.flush();
        self.path
    }

    fn flush(&mut self) {
        if let Some(sub) = self.current.take() {
            self.path.push(sub);
        }
    }
}
