use std::borrow::Cow;

use super::fill_rule::FillRule;
use super::path::Path;

/// Anything that can hand the engine a path and the fill rule it is
/// rendered with.
///
/// Implemented by the surrounding object layer for each item kind; the
/// engine itself only sees the path and a concrete rule.
pub trait PathSource {
    /// Outline geometry of the item.
    fn path(&self) -> Cow<'_, Path>;

    /// Fill rule from the item's style. May be [`FillRule::FromStyle`]
    /// only if the caller resolves it before calling in.
    fn fill_rule(&self) -> FillRule;
}

impl PathSource for Path {
    fn path(&self) -> Cow<'_, Path> {
        Cow::Borrowed(self)
    }

    fn fill_rule(&self) -> FillRule {
        FillRule::NonZero
    }
}

/// A path paired with the fill rule of its style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledPath {
    pub path: Path,
    pub fill_rule: FillRule,
}

impl StyledPath {
    #[must_use]
    pub fn new(path: Path, fill_rule: FillRule) -> Self {
        Self { path, fill_rule }
    }
}

impl PathSource for StyledPath {
    fn path(&self) -> Cow<'_, Path> {
        Cow::Borrowed(&self.path)
    }

    fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path_fills_nonzero() {
        let path = Path::rectangle(0.0, 0.0, 1.0, 1.0);
        assert_eq!(PathSource::fill_rule(&path), FillRule::NonZero);
        assert_eq!(*PathSource::path(&path), path);
    }

    #[test]
    fn styled_path_reports_its_rule() {
        let styled = StyledPath::new(Path::rectangle(0.0, 0.0, 1.0, 1.0), FillRule::EvenOdd);
        assert_eq!(styled.fill_rule(), FillRule::EvenOdd);
    }
}
