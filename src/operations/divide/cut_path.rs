use std::borrow::Cow;

use tracing::{debug, debug_span};

use crate::error::Result;
use crate::flatten::QuantizeParams;
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;

use super::cut_positions::cut_positions;
use super::division::{cut_graph, CutGraph};

/// Opens a path at every point where a cutter crosses it.
///
/// The outline of the path is kept exactly, curves included; each crossing
/// just starts a new sub-path. Closed sub-paths without crossings are
/// returned unchanged.
#[derive(Debug, Clone)]
pub struct CutPath<'a> {
    path: Cow<'a, Path>,
    cutter: Cow<'a, Path>,
    fill_rule: FillRule,
    params: QuantizeParams,
}

impl<'a> CutPath<'a> {
    #[must_use]
    pub fn new(path: &'a Path, cutter: &'a Path) -> Self {
        Self {
            path: Cow::Borrowed(path),
            cutter: Cow::Borrowed(cutter),
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

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Same as [`super::Divide::execute`].
    pub fn execute(&self) -> Result<Path> {
        let _span = debug_span!("cut_path").entered();
        let CutGraph { graph, .. } = cut_graph(&self.path, self.fill_rule, &self.cutter, &self.params)?;
        let cuts = cut_positions(&graph);
        debug!(cuts = cuts.len(), "cutting path");
        Ok(self.path.split_at(&cuts))
    }
}
