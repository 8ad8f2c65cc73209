use crate::error::Result;
use crate::flatten::QuantizeParams;
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;
use crate::geometry::source::PathSource;

use super::engine::Boolean;
use super::select::BoolOp;

/// Computes the difference A minus B; B's boundary inside A comes out reversed.
#[derive(Debug, Clone)]
pub struct Difference<'a> {
    inner: Boolean<'a>,
}

impl<'a> Difference<'a> {
    /// Creates a new `Difference` operation.
    #[must_use]
    pub fn new(a: &'a Path, b: &'a Path) -> Self {
        Self {
            inner: Boolean::new(a, b, BoolOp::Difference),
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
            inner: Boolean::from_sources(a, b, BoolOp::Difference),
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

    /// Executes the difference.
    ///
    /// # Errors
    ///
    /// Returns an error if an operand is degenerate, a fill rule is
    /// unresolved, or the planar graph cannot be built.
    pub fn execute(&self) -> Result<Path> {
        self.inner.execute()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_is_directional() {
        let a = Path::rectangle(0.0, 0.0, 2.0, 1.0);
        let b = Path::rectangle(1.0, 0.0, 2.0, 1.0);
        let ab = Difference::new(&a, &b).execute().unwrap();
        let ba = Difference::new(&b, &a).execute().unwrap();
        assert_relative_eq!(ab.area(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(ba.area(), 1.0, epsilon = 1e-9);
        assert!(ab.bounds().max.x <= 1.0 + 1e-9);
        assert!(ba.bounds().min.x >= 2.0 - 1e-9);
    }

    #[test]
    fn subtracting_a_cover_leaves_nothing() {
        let a = Path::rectangle(1.0, 1.0, 1.0, 1.0);
        let b = Path::rectangle(0.0, 0.0, 3.0, 3.0);
        assert!(Difference::new(&a, &b).execute().unwrap().is_empty());
    }
}
