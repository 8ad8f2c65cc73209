use std::borrow::Cow;

use tracing::{debug, debug_span};

use crate::error::Result;
use crate::flatten::{Flattener, QuantizeParams};
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;
use crate::geometry::source::PathSource;
use crate::graph::Operand;
use crate::math::polygon_2d::{interior_sample_where, polygon_winding, winding_number};
use crate::math::Point2;

use super::division::divide_paths;

/// Which pieces of a slice are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceSide {
    Inside,
    Outside,
    #[default]
    Both,
}

impl SliceSide {
    fn keeps(self, inside: bool) -> bool {
        match self {
            SliceSide::Inside => inside,
            SliceSide::Outside => !inside,
            SliceSide::Both => true,
        }
    }
}

/// Pieces of a sliced path, sorted by the side of the cutter they lie on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceResult {
    pub inside: Vec<Path>,
    pub outside: Vec<Path>,
}

impl SliceResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inside.is_empty() && self.outside.is_empty()
    }
}

/// Divides a path along a cutter and sorts the pieces into those inside and
/// those outside the cutter's own region.
///
/// The cutter's region is its outline implicitly closed, filled with the
/// cutter's fill rule. A piece is classified by one point strictly inside it
/// (and outside its holes).
#[derive(Debug, Clone)]
pub struct Slice<'a> {
    path: Cow<'a, Path>,
    cutter: Cow<'a, Path>,
    fill_rule: FillRule,
    cutter_fill_rule: FillRule,
    side: SliceSide,
    params: QuantizeParams,
}

impl<'a> Slice<'a> {
    /// Creates a new `Slice` operation with `NonZero` fill for both paths.
    #[must_use]
    pub fn new(path: &'a Path, cutter: &'a Path, side: SliceSide) -> Self {
        Self {
            path: Cow::Borrowed(path),
            cutter: Cow::Borrowed(cutter),
            fill_rule: FillRule::NonZero,
            cutter_fill_rule: FillRule::NonZero,
            side,
            params: QuantizeParams::default(),
        }
    }

    /// Takes both paths and their fill rules from path sources.
    #[must_use]
    pub fn from_sources<S, T>(path: &'a S, cutter: &'a T, side: SliceSide) -> Self
    where
        S: PathSource + ?Sized,
        T: PathSource + ?Sized,
    {
        Self {
            path: path.path(),
            cutter: cutter.path(),
            fill_rule: path.fill_rule(),
            cutter_fill_rule: cutter.fill_rule(),
            side,
            params: QuantizeParams::default(),
        }
    }

    #[must_use]
    pub fn with_fill_rules(mut self, fill_rule: FillRule, cutter_fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self.cutter_fill_rule = cutter_fill_rule;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: QuantizeParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Same as [`super::Divide::execute`], plus
    /// `OperationError::UnresolvedFillRule` if the cutter's rule is
    /// `FromStyle`.
    pub fn execute(&self) -> Result<SliceResult> {
        let _span = debug_span!("slice", side = ?self.side).entered();
        let cutter_rule = self.cutter_fill_rule.concrete()?;
        let division = divide_paths(&self.path, self.fill_rule, &self.cutter, &self.params)?;

        let quantization = self.params.quantize(&self.path.bounds().union(&self.cutter.bounds()))?;
        let outline: Vec<(Point2, Point2)> = Flattener::new(quantization.flatten)
            .flatten(&self.cutter, Operand::B.index(), true)
            .iter()
            .map(|e| (e.start, e.end))
            .collect();

        let mut result = SliceResult::default();
        for (piece, polygons) in division.pieces.into_iter().zip(division.polygons) {
            let inside = piece_inside(&polygons, &outline, cutter_rule)?;
            if !self.side.keeps(inside) {
                continue;
            }
            if inside {
                result.inside.push(piece);
            } else {
                result.outside.push(piece);
            }
        }
        debug!(
            inside = result.inside.len(),
            outside = result.outside.len(),
            "sliced"
        );
        Ok(result)
    }
}

/// Tests a piece, given as its outer loop followed by its holes.
fn piece_inside(polygons: &[Vec<Point2>], outline: &[(Point2, Point2)], rule: FillRule) -> Result<bool> {
    let Some((outer, holes)) = polygons.split_first() else {
        return Ok(false);
    };
    let Some(sample) = interior_sample_where(outer, |p| holes.iter().all(|h| polygon_winding(p, h) == 0))
    else {
        return Ok(false);
    };
    rule.is_inside(winding_number(&sample, outline.iter().copied()))
}
