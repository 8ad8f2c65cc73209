use std::borrow::Cow;

use tracing::{debug, debug_span};

use crate::error::{GeometryError, Result};
use crate::flatten::QuantizeParams;
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;
use crate::math::TOLERANCE;
use crate::operations::boolean::{boolean_execute, BoolOp, Uncross};

use super::outline::Outline;
use super::stroke_style::{LineCap, LineJoin, StrokeStyle};

/// Grows or shrinks the region of a path by a signed distance.
///
/// Closed sub-paths form the region, filled with the path's fill rule. A
/// positive `distance` adds the band of that half width around the region's
/// boundary, a negative one removes it; holes shrink and grow accordingly.
/// Open sub-paths have no region of their own: with a positive distance
/// their stroke (with caps) is added, with a negative one they are dropped.
#[derive(Debug, Clone)]
pub struct Offset<'a> {
    path: Cow<'a, Path>,
    distance: f64,
    join: LineJoin,
    cap: LineCap,
    miter_limit: f64,
    fill_rule: FillRule,
    params: QuantizeParams,
}

impl<'a> Offset<'a> {
    /// Creates a new `Offset` with miter joins, butt caps, a miter limit of
    /// 4 and `NonZero` fill.
    #[must_use]
    pub fn new(path: &'a Path, distance: f64) -> Self {
        Self {
            path: Cow::Borrowed(path),
            distance,
            join: LineJoin::Miter,
            cap: LineCap::Butt,
            miter_limit: 4.0,
            fill_rule: FillRule::NonZero,
            params: QuantizeParams::default(),
        }
    }

    #[must_use]
    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    #[must_use]
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    #[must_use]
    pub fn with_miter_limit(mut self, miter_limit: f64) -> Self {
        self.miter_limit = miter_limit;
        self
    }

    #[must_use]
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: QuantizeParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the operation.
    ///
    /// A zero distance returns the input unchanged; shrinking a region away
    /// entirely gives an empty path.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidParameter` for a non-finite distance
    /// or a miter limit below 1, `OperationError::UnresolvedFillRule` for
    /// `FromStyle`, and the graph errors of
    /// [`crate::graph::PlanarGraph::build`].
    pub fn execute(&self) -> Result<Path> {
        let _span = debug_span!("offset", distance = self.distance).entered();
        if !self.distance.is_finite() {
            return Err(GeometryError::InvalidParameter {
                parameter: "distance",
                value: self.distance,
                reason: "offset distance must be finite",
            }
            .into());
        }
        if self.distance.abs() < TOLERANCE {
            return Ok(self.path.as_ref().clone());
        }
        let style = StrokeStyle::new(2.0 * self.distance.abs())?
            .with_join(self.join)
            .with_miter_limit(self.miter_limit)?;

        let (closed, open) = split_closed(&self.path);
        debug!(
            closed = closed.subpaths().len(),
            open = open.subpaths().len(),
            "offsetting"
        );

        let mut result = Path::new();
        if !closed.is_empty() {
            // Only the region's boundary moves; edges buried inside the
            // fill must not carve into it.
            let region = Uncross::new(&closed)
                .with_fill_rule(self.fill_rule)
                .with_params(self.params)
                .execute()?;
            let band = Outline::new(&region, style.with_cap(LineCap::Butt))
                .with_params(self.params)
                .execute()?;
            result = if band.is_empty() || region.is_empty() {
                region
            } else {
                let op = if self.distance > 0.0 {
                    BoolOp::Union
                } else {
                    BoolOp::Difference
                };
                boolean_execute(&region, FillRule::NonZero, &band, FillRule::NonZero, op, &self.params)?
            };
        }

        if self.distance > 0.0 && !open.is_empty() {
            let stroke = Outline::new(&open, style.with_cap(self.cap))
                .with_params(self.params)
                .execute()?;
            if result.is_empty() {
                result = stroke;
            } else if !stroke.is_empty() {
                result = boolean_execute(
                    &result,
                    FillRule::NonZero,
                    &stroke,
                    FillRule::NonZero,
                    BoolOp::Union,
                    &self.params,
                )?;
            }
        }
        Ok(result)
    }
}

/// Separates the closed sub-paths that enclose area from the open ones.
fn split_closed(path: &Path) -> (Path, Path) {
    let mut closed = Path::new();
    let mut open = Path::new();
    for sub in path.subpaths() {
        if !sub.is_closed() {
            open.push(sub.clone());
        } else if !sub.is_degenerate() {
            closed.push(sub.clone());
        }
    }
    (closed, open)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::path::SubPath;
    use crate::math::Point2;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn mitered_square_grows_and_shrinks() {
        let square = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        let grown = Offset::new(&square, 0.5).execute().unwrap();
        assert_eq!(grown.subpaths().len(), 1);
        assert_relative_eq!(grown.signed_area(), 9.0, epsilon = 1e-9);
        let shrunk = Offset::new(&square, -0.5).execute().unwrap();
        assert_relative_eq!(shrunk.signed_area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn round_join_rounds_the_corners() {
        let square = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        let grown = Offset::new(&square, 0.5)
            .with_join(LineJoin::Round)
            .execute()
            .unwrap();
        assert_relative_eq!(grown.area(), 4.0 + 4.0 + PI * 0.25, epsilon = 1e-3);
    }

    #[test]
    fn circle_offset_changes_the_radius() {
        let circle = Path::circle(Point2::new(0.0, 0.0), 1.0);
        let grown = Offset::new(&circle, 0.25).execute().unwrap();
        assert_relative_eq!(grown.area(), PI * 1.25 * 1.25, epsilon = 1e-2);
        let shrunk = Offset::new(&circle, -0.25).execute().unwrap();
        assert_relative_eq!(shrunk.area(), PI * 0.75 * 0.75, epsilon = 1e-2);
    }

    #[test]
    fn zero_distance_is_identity() {
        let square = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        assert_eq!(Offset::new(&square, 0.0).execute().unwrap(), square);
    }

    #[test]
    fn shrinking_past_the_middle_is_empty() {
        let square = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        assert!(Offset::new(&square, -1.5).execute().unwrap().is_empty());
    }

    #[test]
    fn open_path_is_stroked_when_growing() {
        let mut sub = SubPath::new(Point2::new(0.0, 0.0));
        sub.line_to(Point2::new(4.0, 0.0));
        let line = Path::from_subpaths(vec![sub]);
        let capsule = Offset::new(&line, 1.0)
            .with_cap(LineCap::Round)
            .execute()
            .unwrap();
        assert_relative_eq!(capsule.area(), 8.0 + PI, epsilon = 1e-3);
        assert!(Offset::new(&line, -1.0).execute().unwrap().is_empty());
    }

    #[test]
    fn overlapping_subpaths_shrink_as_one_region() {
        let mut overlapping = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        overlapping.append(Path::rectangle(1.0, 0.0, 2.0, 2.0));
        let shrunk = Offset::new(&overlapping, -0.25).execute().unwrap();
        assert_eq!(shrunk.subpaths().len(), 1);
        // The 3x2 union loses a quarter on every side.
        assert_relative_eq!(shrunk.signed_area(), 2.5 * 1.5, epsilon = 1e-9);
        let grown = Offset::new(&overlapping, 0.25).execute().unwrap();
        assert_relative_eq!(grown.signed_area(), 3.5 * 2.5, epsilon = 1e-9);
    }

    #[test]
    fn even_odd_overlap_keeps_its_gap() {
        let mut overlapping = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        overlapping.append(Path::rectangle(1.0, 0.0, 2.0, 2.0));
        // Two 1x2 strips with the overlap between them left empty.
        let shrunk = Offset::new(&overlapping, -0.25)
            .with_fill_rule(FillRule::EvenOdd)
            .execute()
            .unwrap();
        assert_eq!(shrunk.subpaths().len(), 2);
        assert_relative_eq!(shrunk.signed_area(), 2.0 * 0.5 * 1.5, epsilon = 1e-9);
    }

    #[test]
    fn micro_scale_square_still_grows() {
        let square = Path::rectangle(0.0, 0.0, 2e-6, 2e-6);
        let grown = Offset::new(&square, 0.5e-6).execute().unwrap();
        assert_relative_eq!(grown.signed_area(), 9e-12, max_relative = 1e-4);
        let shrunk = Offset::new(&square, -0.5e-6).execute().unwrap();
        assert_relative_eq!(shrunk.signed_area(), 1e-12, max_relative = 1e-4);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let square = Path::rectangle(0.0, 0.0, 2.0, 2.0);
        assert!(Offset::new(&square, f64::NAN).execute().is_err());
        assert!(Offset::new(&square, 1.0)
            .with_miter_limit(0.5)
            .execute()
            .is_err());
    }
}
