use std::borrow::Cow;
use std::collections::HashMap;

use tracing::{debug, debug_span, trace, warn};

use crate::error::{OperationError, Result};
use crate::flatten::{FlatEdge, Flattener, QuantizeParams};
use crate::geometry::fill_rule::FillRule;
use crate::geometry::path::Path;
use crate::geometry::source::PathSource;
use crate::graph::{
    reconstruct, EdgeData, EdgeId, KeepDecision, Loop, NestingInfo, Operand, OperandRole, PlanarGraph,
    PointId,
};
use crate::math::polygon_2d::winding_number;
use crate::math::Point2;
use crate::operations::boolean::{flatten_operand, region_boundary};

use super::cut_positions::cut_positions;

/// Region A and cutter B merged into one graph.
pub(crate) struct CutGraph {
    pub graph: PlanarGraph,
    pub flat_a: Vec<FlatEdge>,
}

/// Builds the graph of `a` filled under `rule_a` with `b` inserted as a
/// cutting curve. The cutter is uncrossed on its own first.
pub(crate) fn cut_graph(a: &Path, rule_a: FillRule, b: &Path, params: &QuantizeParams) -> Result<CutGraph> {
    let rule_a = rule_a.concrete()?;
    let quantization = params.quantize(&a.bounds().union(&b.bounds()))?;
    let flattener = Flattener::new(quantization.flatten);
    let flat_a = flatten_operand(&flattener, a, Operand::A, true)?;
    let flat_b = flattener.flatten(b, Operand::B.index(), false);
    if flat_b.is_empty() {
        warn!("cutter has no edges");
        return Err(OperationError::DegenerateOperand {
            operand: Operand::B.index(),
        }
        .into());
    }

    let graph_a = PlanarGraph::build(Operand::A, &flat_a, OperandRole::Filled(rule_a), quantization.snap)?;
    let graph_b = PlanarGraph::build(Operand::B, &flat_b, OperandRole::Cutter, quantization.snap)?;
    let graph = PlanarGraph::merge(graph_a, &graph_b)?;
    debug!(
        points = graph.point_count(),
        edges = graph.edge_count(),
        "cut graph"
    );
    Ok(CutGraph { graph, flat_a })
}

/// A's boundary keeps its orientation; cutter edges inside A separate two
/// pieces and are walked both ways.
fn division_decision(edge: &EdgeData) -> KeepDecision {
    let k = Operand::A.index();
    match region_boundary(edge) {
        KeepDecision::Discard if edge.has(Operand::B) && edge.inside_left[k] && edge.inside_right[k] => {
            KeepDecision::KeepBoth
        }
        decision => decision,
    }
}

/// Drops cutter edges that end inside A without reaching another kept edge.
fn prune_dangling(graph: &mut PlanarGraph) -> Result<()> {
    loop {
        let mut degree: HashMap<PointId, usize> = HashMap::new();
        for (_, edge) in graph.edges() {
            if edge.keep != KeepDecision::Discard {
                *degree.entry(edge.start).or_default() += 1;
                *degree.entry(edge.end).or_default() += 1;
            }
        }
        let degree_of = |p: PointId| degree.get(&p).copied().unwrap_or(0);
        let dangling: Vec<EdgeId> = graph
            .edges()
            .filter(|(_, e)| e.keep == KeepDecision::KeepBoth && (degree_of(e.start) < 2 || degree_of(e.end) < 2))
            .map(|(id, _)| id)
            .collect();
        if dangling.is_empty() {
            return Ok(());
        }
        trace!(edges = dangling.len(), "pruning dangling cutter edges");
        for id in dangling {
            graph.set_keep(id, KeepDecision::Discard)?;
        }
    }
}

/// Splits A into the pieces B cuts it into, without flattening A.
pub(crate) fn divide_paths(a: &Path, rule_a: FillRule, b: &Path, params: &QuantizeParams) -> Result<Division> {
    let CutGraph { mut graph, flat_a } = cut_graph(a, rule_a, b, params)?;
    if cut_positions(&graph).is_empty() {
        debug!("cutter does not cross the region");
        return Division::single(a, &flat_a, rule_a.concrete()?);
    }
    graph.select(division_decision);
    prune_dangling(&mut graph)?;
    let loops = reconstruct(&graph, &[a, b]);
    let division = Division::from_loops(loops);
    debug!(pieces = division.pieces.len(), "divided");
    Ok(division)
}

/// The pieces of a divided region.
///
/// Each piece is one outer boundary followed by its holes. `nesting`
/// indexes the loops of all pieces in order: the sub-paths of `pieces[0]`
/// first, then those of `pieces[1]`, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct Division {
    pub pieces: Vec<Path>,
    pub nesting: NestingInfo,
    /// Flattened loops of each piece, outer boundary first.
    pub(crate) polygons: Vec<Vec<Vec<Point2>>>,
}

impl Division {
    /// The whole region as a single piece.
    ///
    /// The sub-paths keep their own winding, so holes are told apart by
    /// `rule` instead of by orientation.
    fn single(a: &Path, flat_a: &[FlatEdge], rule: FillRule) -> Result<Self> {
        let mut polygons = vec![Vec::new(); a.subpaths().len()];
        for edge in flat_a {
            if let Some(polygon) = polygons.get_mut(edge.back.piece.subpath) {
                polygon.push(edge.start);
            }
        }
        polygons.retain(|p: &Vec<Point2>| !p.is_empty());
        let nesting = NestingInfo::from_region(&polygons, |p| {
            rule.is_inside(winding_number(p, flat_a.iter().map(|e| (e.start, e.end))))
        })?;

        // `nesting` follows the sub-paths; the polygons only need an outer
        // boundary in front.
        if let Some(root) = nesting.roots().next() {
            polygons.swap(0, root);
        }
        Ok(Self {
            pieces: vec![a.clone()],
            nesting,
            polygons: vec![polygons],
        })
    }

    /// Groups every outer loop with the holes nested directly in it.
    fn from_loops(loops: Vec<Loop>) -> Self {
        let polygons: Vec<Vec<Point2>> = loops.iter().map(|l| l.polygon.clone()).collect();
        let grouping = NestingInfo::from_polygons(&polygons);
        let mut loops: Vec<Option<Loop>> = loops.into_iter().map(Some).collect();

        let mut pieces = Vec::new();
        let mut piece_polygons = Vec::new();
        for root in grouping.roots() {
            let mut path = Path::new();
            let mut members = Vec::new();
            for index in std::iter::once(root).chain(grouping.children(root)) {
                if let Some(l) = loops[index].take() {
                    path.push(l.subpath);
                    members.push(l.polygon);
                }
            }
            pieces.push(path);
            piece_polygons.push(members);
        }

        let ordered: Vec<Vec<Point2>> = piece_polygons.iter().flatten().cloned().collect();
        Self {
            pieces,
            nesting: NestingInfo::from_polygons(&ordered),
            polygons: piece_polygons,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Total area of all pieces.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.pieces.iter().map(Path::signed_area).sum::<f64>().abs()
    }

    /// All pieces as the sub-paths of a single path.
    #[must_use]
    pub fn to_path(&self) -> Path {
        let mut path = Path::new();
        for piece in &self.pieces {
            path.append(piece.clone());
        }
        path
    }
}

/// Splits a filled path into the pieces a cutting path divides it into.
///
/// Pieces are closed regions: outer boundaries counter-clockwise, holes
/// clockwise. Parts of the cutter outside the region, and cutter branches
/// that end inside it, are ignored. A cutter that never crosses the
/// region's boundary leaves it whole and returns it unchanged as the only
/// piece.
#[derive(Debug, Clone)]
pub struct Divide<'a> {
    path: Cow<'a, Path>,
    cutter: Cow<'a, Path>,
    fill_rule: FillRule,
    params: QuantizeParams,
}

impl<'a> Divide<'a> {
    /// Creates a new `Divide` operation with `NonZero` fill.
    #[must_use]
    pub fn new(path: &'a Path, cutter: &'a Path) -> Self {
        Self {
            path: Cow::Borrowed(path),
            cutter: Cow::Borrowed(cutter),
            fill_rule: FillRule::NonZero,
            params: QuantizeParams::default(),
        }
    }

    /// Takes the divided path and its fill rule from a path source.
    #[must_use]
    pub fn from_source<S: PathSource + ?Sized>(source: &'a S, cutter: &'a Path) -> Self {
        Self {
            path: source.path(),
            cutter: Cow::Borrowed(cutter),
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
    /// Returns `OperationError::DegenerateOperand` if the path has no area
    /// or the cutter has no length, `OperationError::UnresolvedFillRule`
    /// for `FromStyle`, and the graph errors of [`PlanarGraph::build`].
    pub fn execute(&self) -> Result<Division> {
        let _span = debug_span!("divide").entered();
        divide_paths(&self.path, self.fill_rule, &self.cutter, &self.params)
    }
}
