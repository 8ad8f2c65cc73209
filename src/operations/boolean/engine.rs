use std::borrow::Cow;

use tracing::{debug, debug_span, warn};

use crate::error::{OperationError, Result};
use crate::flatten::{FlatEdge, Flattener, QuantizeParams};
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;
use crate::geometry::source::PathSource;
use crate::graph::{loops_to_path, reconstruct, Operand, OperandRole, PlanarGraph};

use super::select::{keep_decision, BoolOp};

/// Flattens one operand and rejects it if nothing meaningful is left.
///
/// # Errors
///
/// Returns `OperationError::DegenerateOperand` if the operand flattens to
/// fewer than two edges.
pub(crate) fn flatten_operand(
    flattener: &Flattener,
    path: &Path,
    operand: Operand,
    implicit_close: bool,
) -> Result<Vec<FlatEdge>> {
    let edges = flattener.flatten(path, operand.index(), implicit_close);
    if edges.len() < 2 {
        warn!(operand = operand.index(), edges = edges.len(), "degenerate operand");
        return Err(OperationError::DegenerateOperand {
            operand: operand.index(),
        }
        .into());
    }
    Ok(edges)
}

/// Merges two uncrossed operands and marks the edges of the result of `op`.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` for `Divide` and `Slice`, which
/// are not decided edge by edge, plus the errors of [`PlanarGraph::merge`].
pub fn combine(a: PlanarGraph, b: &PlanarGraph, op: BoolOp) -> Result<PlanarGraph> {
    if !op.is_truth_table() {
        warn!(?op, "operator is not a truth-table boolean");
        return Err(OperationError::InvalidInput(format!(
            "{op:?} needs its dedicated operation"
        ))
        .into());
    }
    let mut graph = PlanarGraph::merge(a, b)?;
    graph.select(|edge| keep_decision(op, edge));
    Ok(graph)
}

/// Runs the full pipeline: quantize, flatten, uncross each operand, combine
/// and reconstruct.
///
/// An empty path is the well-formed "no geometric result".
pub(crate) fn boolean_execute(
    a: &Path,
    rule_a: FillRule,
    b: &Path,
    rule_b: FillRule,
    op: BoolOp,
    params: &QuantizeParams,
) -> Result<Path> {
    if !op.is_truth_table() {
        return Err(OperationError::InvalidInput(format!(
            "{op:?} needs its dedicated operation"
        ))
        .into());
    }
    let rule_a = rule_a.concrete()?;
    let rule_b = rule_b.concrete()?;

    let quantization = params.quantize(&a.bounds().union(&b.bounds()))?;
    let flattener = Flattener::new(quantization.flatten);
    let flat_a = flatten_operand(&flattener, a, Operand::A, true)?;
    let flat_b = flatten_operand(&flattener, b, Operand::B, true)?;

    let graph_a = PlanarGraph::build(Operand::A, &flat_a, OperandRole::Filled(rule_a), quantization.snap)?;
    let graph_b = PlanarGraph::build(Operand::B, &flat_b, OperandRole::Filled(rule_b), quantization.snap)?;
    let graph = combine(graph_a, &graph_b, op)?;

    let loops = reconstruct(&graph, &[a, b]);
    if loops.is_empty() {
        debug!(?op, "no geometric result");
    }
    Ok(loops_to_path(loops))
}

/// A boolean operation on two paths, each with its own fill rule.
#[derive(Debug, Clone)]
pub struct Boolean<'a> {
    a: Cow<'a, Path>,
    b: Cow<'a, Path>,
    rule_a: FillRule,
    rule_b: FillRule,
    op: BoolOp,
    params: QuantizeParams,
}

impl<'a> Boolean<'a> {
    /// Creates a new `Boolean` operation with `NonZero` fill for both paths.
    #[must_use]
    pub fn new(a: &'a Path, b: &'a Path, op: BoolOp) -> Self {
        Self {
            a: Cow::Borrowed(a),
            b: Cow::Borrowed(b),
            rule_a: FillRule::NonZero,
            rule_b: FillRule::NonZero,
            op,
            params: QuantizeParams::default(),
        }
    }

    /// Takes paths and fill rules from two path sources.
    #[must_use]
    pub fn from_sources<S, T>(a: &'a S, b: &'a T, op: BoolOp) -> Self
    where
        S: PathSource + ?Sized,
        T: PathSource + ?Sized,
    {
        Self {
            a: a.path(),
            b: b.path(),
            rule_a: a.fill_rule(),
            rule_b: b.fill_rule(),
            op,
            params: QuantizeParams::default(),
        }
    }

    #[must_use]
    pub fn with_fill_rules(mut self, rule_a: FillRule, rule_b: FillRule) -> Self {
        self.rule_a = rule_a;
        self.rule_b = rule_b;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: QuantizeParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn op(&self) -> BoolOp {
        self.op
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for `Divide`/`Slice`,
    /// `OperationError::DegenerateOperand` if an operand has no area-forming
    /// edges, `OperationError::UnresolvedFillRule` for `FromStyle`, and the
    /// graph errors of [`PlanarGraph::build`].
    pub fn execute(&self) -> Result<Path> {
        let _span = debug_span!("boolean", op = ?self.op).entered();
        boolean_execute(&self.a, self.rule_a, &self.b, self.rule_b, self.op, &self.params)
    }
}
