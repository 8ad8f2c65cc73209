use tracing::{debug, debug_span, warn};

use crate::error::{OperationError, Result};
use crate::flatten::QuantizeParams;
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;

use super::engine::boolean_execute;
use super::select::BoolOp;

/// Computes the union of any number of paths.
///
/// Degenerate inputs (no area-forming segments) are skipped; at least two
/// paths must remain. Inputs share one fill rule; intermediate results are
/// already uncrossed and are read with `NonZero`.
#[derive(Debug, Clone)]
pub struct UnionAll<'a> {
    paths: Vec<&'a Path>,
    fill_rule: FillRule,
    params: QuantizeParams,
}

impl<'a> UnionAll<'a> {
    /// Creates a new `UnionAll` operation.
    #[must_use]
    pub fn new(paths: Vec<&'a Path>) -> Self {
        Self {
            paths,
            fill_rule: FillRule::NonZero,
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

    /// Executes the union.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InsufficientOperands` if fewer than two
    /// non-degenerate paths were given, plus the errors of the pairwise
    /// union.
    pub fn execute(&self) -> Result<Path> {
        let _span = debug_span!("union_all", inputs = self.paths.len()).entered();
        let operands: Vec<&Path> = self
            .paths
            .iter()
            .copied()
            .filter(|p| area_forming_pieces(p) >= 2)
            .collect();
        if operands.len() < 2 {
            warn!(found = operands.len(), "not enough operands for union");
            return Err(OperationError::InsufficientOperands {
                found: operands.len(),
            }
            .into());
        }

        let mut result = boolean_execute(
            operands[0],
            self.fill_rule,
            operands[1],
            self.fill_rule,
            BoolOp::Union,
            &self.params,
        )?;
        for next in &operands[2..] {
            result = boolean_execute(
                &result,
                FillRule::NonZero,
                next,
                self.fill_rule,
                BoolOp::Union,
                &self.params,
            )?;
        }
        debug!(subpaths = result.subpaths().len(), "union of all done");
        Ok(result)
    }
}

/// Number of non-degenerate pieces, counting implicit closing lines.
fn area_forming_pieces(path: &Path) -> usize {
    path.subpaths()
        .iter()
        .map(|sub| sub.pieces(true).filter(|(_, g)| !g.is_degenerate()).count())
        .sum()
}
