use std::borrow::Cow;

use tracing::debug_span;

use crate::error::Result;
use crate::flatten::{Flattener, QuantizeParams};
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;
use crate::geometry::source::PathSource;
use crate::graph::{loops_to_path, reconstruct, EdgeData, KeepDecision, Operand, OperandRole, PlanarGraph};

use super::engine::flatten_operand;

/// Removes self-intersections and overlaps from a single path.
///
/// The result covers the same area under the given fill rule, made of
/// simple loops: outer boundaries counter-clockwise, holes clockwise.
#[derive(Debug, Clone)]
pub struct Uncross<'a> {
    path: Cow<'a, Path>,
    fill_rule: FillRule,
    params: QuantizeParams,
}

impl<'a> Uncross<'a> {
    /// Creates a new `Uncross` operation with `NonZero` fill.
    #[must_use]
    pub fn new(path: &'a Path) -> Self {
        Self {
            path: Cow::Borrowed(path),
            fill_rule: FillRule::NonZero,
            params: QuantizeParams::default(),
        }
    }

    #[must_use]
    pub fn from_source<S: PathSource + ?Sized>(source: &'a S) -> Self {
        Self {
            path: source.path(),
            fill_rule: source.fill_rule(),
            params: QuantizeParams::default(),
        }
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
    /// # Errors
    ///
    /// Returns `OperationError::DegenerateOperand` for a path without area,
    /// `OperationError::UnresolvedFillRule` for `FromStyle`, and the graph
    /// errors of [`PlanarGraph::build`].
    pub fn execute(&self) -> Result<Path> {
        let _span = debug_span!("uncross").entered();
        let quantization = self.params.quantize(&self.path.bounds())?;
        let flattener = Flattener::new(quantization.flatten);
        let edges = flatten_operand(&flattener, &self.path, Operand::A, true)?;
        let mut graph = PlanarGraph::build(
            Operand::A,
            &edges,
            OperandRole::Filled(self.fill_rule),
            quantization.snap,
        )?;
        graph.select(region_boundary);
        Ok(loops_to_path(reconstruct(&graph, &[&self.path])))
    }
}

/// Keeps the boundary of operand A's region, region on the left.
pub(crate) fn region_boundary(edge: &EdgeData) -> KeepDecision {
    let k = Operand::A.index();
    match (edge.inside_left[k], edge.inside_right[k]) {
        (true, false) => KeepDecision::Keep,
        (false, true) => KeepDecision::KeepFlipped,
        _ => KeepDecision::Discard,
    }
}
