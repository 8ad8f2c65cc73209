use crate::error::{OperationError, Result};

/// Policy mapping a winding number to inside/outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Nonzero winding is inside.
    #[default]
    NonZero,
    /// Odd winding is inside.
    EvenOdd,
    /// Strictly positive winding is inside.
    Positive,
    /// Take the rule from the object's own style; must be resolved with
    /// [`FillRule::resolve`] before it reaches the engine.
    FromStyle,
}

impl FillRule {
    /// Substitutes `style` for [`FillRule::FromStyle`].
    #[must_use]
    pub fn resolve(self, style: FillRule) -> FillRule {
        match self {
            FillRule::FromStyle => style,
            rule => rule,
        }
    }

    /// Classifies a winding number.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::UnresolvedFillRule` for `FromStyle`.
    pub fn is_inside(self, winding: i32) -> Result<bool> {
        match self {
            FillRule::NonZero => Ok(winding != 0),
            FillRule::EvenOdd => Ok(winding % 2 != 0),
            FillRule::Positive => Ok(winding > 0),
            FillRule::FromStyle => Err(OperationError::UnresolvedFillRule.into()),
        }
    }

    /// Returns the rule itself if it is concrete.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::UnresolvedFillRule` for `FromStyle`.
    pub fn concrete(self) -> Result<Self> {
        if self == FillRule::FromStyle {
            return Err(OperationError::UnresolvedFillRule.into());
        }
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn nonzero_classification() {
        assert!(!FillRule::NonZero.is_inside(0).unwrap());
        assert!(FillRule::NonZero.is_inside(2).unwrap());
        assert!(FillRule::NonZero.is_inside(-1).unwrap());
    }

    #[test]
    fn even_odd_classification() {
        assert!(FillRule::EvenOdd.is_inside(1).unwrap());
        assert!(!FillRule::EvenOdd.is_inside(2).unwrap());
        assert!(FillRule::EvenOdd.is_inside(-3).unwrap());
    }

    #[test]
    fn positive_classification() {
        assert!(FillRule::Positive.is_inside(1).unwrap());
        assert!(!FillRule::Positive.is_inside(-1).unwrap());
        assert!(!FillRule::Positive.is_inside(0).unwrap());
    }

    #[test]
    fn from_style_must_be_resolved() {
        assert!(FillRule::FromStyle.is_inside(1).is_err());
        let rule = FillRule::FromStyle.resolve(FillRule::EvenOdd);
        assert_eq!(rule, FillRule::EvenOdd);
        assert_eq!(FillRule::Positive.resolve(FillRule::EvenOdd), FillRule::Positive);
    }
}
