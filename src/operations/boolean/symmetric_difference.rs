use crate::error::Result;
use crate::flatten::QuantizeParams;
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;
use crate::geometry::source::PathSource;

use super::engine::Boolean;
use super::select::BoolOp;

/// Computes the region covered by exactly one of two paths.
#[derive(Debug, Clone)]
pub struct SymmetricDifference<'a> {
    inner: Boolean<'a>,
}

impl<'a> SymmetricDifference<'a> {
    /// Creates a new `SymmetricDifference` operation.
    #[must_use]
    pub fn new(a: &'a Path, b: &'a Path) -> Self {
        Self {
            inner: Boolean::new(a, b, BoolOp::SymmetricDifference),
        }
    }

    /// Takes both operands from path sources, fill rules included.
    #[must_use]
    pub fn from_sources<S, T>(a: &'a S, b: &'a T) -> Self
    where
        S: PathSource + ?Sized,
        T: PathSource + ?Sized,
    {
        Self {
            inner: Boolean::from_sources(a, b, BoolOp::SymmetricDifference),
        }
    }

    #[must_use]
    pub fn with_fill_rules(self, rule_a: FillRule, rule_b: FillRule) -> Self {
        Self {
            inner: self.inner.with_fill_rules(rule_a, rule_b),
        }
    }

    #[must_use]
    pub fn with_params(self, params: QuantizeParams) -> Self {
        Self {
            inner: self.inner.with_params(params),
        }
    }

    /// Executes the symmetric difference.
    ///
    /// # Errors
    ///
    /// Returns an error if an operand is degenerate, a fill rule is
    /// unresolved, or the planar graph cannot be built.
    pub fn execute(&self) -> Result<Path> {
        self.inner.execute()
    }
}
