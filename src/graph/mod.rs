//! Planar subdivision of flattened paths.
//!
//! Points and edges live in `slotmap` arenas owned by [`PlanarGraph`];
//! algorithms address them through [`PointId`] and [`EdgeId`] only, so edges
//! can be split and removed without invalidating anything else.

mod builder;
pub mod nesting;
pub mod reconstruct;
mod winding;

pub use nesting::NestingInfo;
pub use reconstruct::{loops_to_path, reconstruct, Loop};

use slotmap::{new_key_type, SlotMap};

use crate::error::{GraphError, OperationError, Result};
use crate::flatten::{BackData, FlatEdge};
use crate::geometry::fill_rule::FillRule;
use crate::math::Point2;

use builder::GraphBuilder;

new_key_type! {
    /// Key of a point in a [`PlanarGraph`].
    pub struct PointId;
    /// Key of an edge in a [`PlanarGraph`].
    pub struct EdgeId;
}

/// One of the (at most two) operands sharing a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    A,
    B,
}

impl Operand {
    pub const ALL: [Operand; 2] = [Operand::A, Operand::B];

    /// Slot of the operand in per-operand arrays.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Operand::A => 0,
            Operand::B => 1,
        }
    }

    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Operand::A => Operand::B,
            Operand::B => Operand::A,
        }
    }
}

/// How an operand's edges take part in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRole {
    /// A filled region; winding is resolved with the given rule.
    Filled(FillRule),
    /// A cutting curve; it splits topology but encloses nothing.
    Cutter,
}

/// What reconstruction does with an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepDecision {
    /// Walk the edge in its own direction.
    Keep,
    /// Walk the edge reversed.
    KeepFlipped,
    /// Walk the edge both ways; it separates two kept faces.
    KeepBoth,
    #[default]
    Discard,
}

/// Back-data of a graph edge for one operand.
///
/// `forward` tells whether the edge's start point sits at `back.t_start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOrigin {
    pub back: BackData,
    pub forward: bool,
}

impl EdgeOrigin {
    #[must_use]
    pub fn new(back: BackData) -> Self {
        Self {
            back,
            forward: true,
        }
    }

    /// Piece parameter at the edge's start point.
    #[must_use]
    pub fn t_at_start(&self) -> f64 {
        if self.forward {
            self.back.t_start
        } else {
            self.back.t_end
        }
    }

    /// Piece parameter at the edge's end point.
    #[must_use]
    pub fn t_at_end(&self) -> f64 {
        if self.forward {
            self.back.t_end
        } else {
            self.back.t_start
        }
    }

    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            forward: !self.forward,
            ..self
        }
    }

    /// Origin of the part of the edge between fractions `s0 < s1`.
    #[must_use]
    pub fn sub(&self, s0: f64, s1: f64) -> Self {
        let t0 = self.t_at_start() + (self.t_at_end() - self.t_at_start()) * s0;
        let t1 = self.t_at_start() + (self.t_at_end() - self.t_at_start()) * s1;
        Self {
            back: self.back.between(t0, t1),
            forward: self.forward,
        }
    }
}

/// A graph vertex.
#[derive(Debug, Clone)]
pub struct PointData {
    pub position: Point2,
    /// Incident edges sorted by the angle of the direction leaving this
    /// point, counter-clockwise from `+x`.
    pub incident: Vec<EdgeId>,
}

impl PointData {
    #[must_use]
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            incident: Vec::new(),
        }
    }
}

/// A graph edge with per-operand multiplicity, origin and winding.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: PointId,
    pub end: PointId,
    /// Signed multiplicity per operand (coalesced duplicates summed).
    pub weights: [i32; 2],
    pub origins: [Option<EdgeOrigin>; 2],
    pub winding_left: [i32; 2],
    pub winding_right: [i32; 2],
    pub inside_left: [bool; 2],
    pub inside_right: [bool; 2],
    pub keep: KeepDecision,
}

impl EdgeData {
    #[must_use]
    pub fn new(start: PointId, end: PointId, operand: Operand, origin: EdgeOrigin) -> Self {
        let mut weights = [0; 2];
        let mut origins = [None; 2];
        weights[operand.index()] = 1;
        origins[operand.index()] = Some(origin);
        Self {
            start,
            end,
            weights,
            origins,
            winding_left: [0; 2],
            winding_right: [0; 2],
            inside_left: [false; 2],
            inside_right: [false; 2],
            keep: KeepDecision::Discard,
        }
    }

    /// Returns `true` if the edge came (at least in part) from `operand`.
    #[must_use]
    pub fn has(&self, operand: Operand) -> bool {
        self.origins[operand.index()].is_some()
    }

    /// Returns `true` if the operand's region differs on the two sides.
    #[must_use]
    pub fn is_boundary_of(&self, operand: Operand) -> bool {
        let k = operand.index();
        self.inside_left[k] != self.inside_right[k]
    }

    #[must_use]
    pub fn origin(&self, operand: Operand) -> Option<&EdgeOrigin> {
        self.origins[operand.index()].as_ref()
    }

    /// The other endpoint of the edge.
    #[must_use]
    pub fn opposite(&self, point: PointId) -> PointId {
        if point == self.start {
            self.end
        } else {
            self.start
        }
    }

    /// The edge between `start` and `end`, `s0 < s1` being fractions of
    /// this edge.
    fn sub_edge(&self, start: PointId, end: PointId, s0: f64, s1: f64) -> Self {
        let mut origins = self.origins;
        for origin in origins.iter_mut().flatten() {
            *origin = origin.sub(s0, s1);
        }
        Self {
            start,
            end,
            origins,
            winding_left: [0; 2],
            winding_right: [0; 2],
            inside_left: [false; 2],
            inside_right: [false; 2],
            keep: KeepDecision::Discard,
            ..*self
        }
    }

    /// Folds a duplicate (or anti-parallel duplicate) into this edge.
    fn absorb(&mut self, other: &EdgeData) {
        let same_direction = self.start == other.start;
        for k in 0..2 {
            self.weights[k] += if same_direction {
                other.weights[k]
            } else {
                -other.weights[k]
            };
            if self.origins[k].is_none() {
                self.origins[k] = other.origins[k].map(|o| if same_direction { o } else { o.reversed() });
            }
        }
    }
}

/// A planar graph in which edges only meet at shared points.
#[derive(Debug, Clone)]
pub struct PlanarGraph {
    points: SlotMap<PointId, PointData>,
    edges: SlotMap<EdgeId, EdgeData>,
    roles: [Option<OperandRole>; 2],
    snap: f64,
}

impl PlanarGraph {
    fn empty(snap: f64) -> Self {
        Self {
            points: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            roles: [None; 2],
            snap,
        }
    }

    /// Uncrosses the flattened edges of one operand.
    ///
    /// Points closer than `snap` are merged, every crossing splits both
    /// edges, duplicates are coalesced and the winding of each edge's sides
    /// is resolved with the operand's fill rule.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NonEulerianGraph` if a filled operand does not
    /// balance at every point, `GraphError::NotConverged` if splitting does
    /// not settle, and `OperationError::UnresolvedFillRule` for
    /// [`FillRule::FromStyle`].
    pub fn build(operand: Operand, edges: &[FlatEdge], role: OperandRole, snap: f64) -> Result<Self> {
        if let OperandRole::Filled(rule) = role {
            rule.concrete()?;
        }
        let mut builder = GraphBuilder::new(snap);
        builder.set_role(operand, role);
        builder.insert_flat(operand, edges);
        builder.finish(false)
    }

    /// Merges two uncrossed graphs into one and resolves the crossings
    /// between them.
    ///
    /// `a` must only carry operand A and `b` only operand B. Crossings within
    /// each graph are already resolved and are not searched again.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the operands are mixed up,
    /// plus the errors of [`PlanarGraph::build`].
    pub fn merge(a: PlanarGraph, b: &PlanarGraph) -> Result<Self> {
        if a.roles[1].is_some() || b.roles[0].is_some() {
            return Err(OperationError::InvalidInput(
                "merge expects operand A on the left and operand B on the right".to_owned(),
            )
            .into());
        }
        let snap = a.snap.max(b.snap);
        let mut builder = GraphBuilder::from_graph(a, snap);
        if let Some(role) = b.roles[1] {
            builder.set_role(Operand::B, role);
        }
        builder.insert_graph(b);
        builder.finish(true)
    }

    /// Point merge distance of the graph.
    #[must_use]
    pub fn snap(&self) -> f64 {
        self.snap
    }

    #[must_use]
    pub fn role(&self, operand: Operand) -> Option<OperandRole> {
        self.roles[operand.index()]
    }

    /// Returns the point data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::EntityNotFound` if the point does not exist.
    pub fn point(&self, id: PointId) -> Result<&PointData> {
        self.points
            .get(id)
            .ok_or_else(|| GraphError::EntityNotFound("point").into())
    }

    /// Returns the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::EntityNotFound` if the edge does not exist.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData> {
        self.edges
            .get(id)
            .ok_or_else(|| GraphError::EntityNotFound("edge").into())
    }

    /// Positions of the edge's endpoints.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::EntityNotFound` if the edge or one of its points
    /// does not exist.
    pub fn edge_segment(&self, id: EdgeId) -> Result<(Point2, Point2)> {
        let edge = self.edge(id)?;
        Ok((self.point(edge.start)?.position, self.point(edge.end)?.position))
    }

    pub fn points(&self) -> impl Iterator<Item = (PointId, &PointData)> {
        self.points.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Assigns every edge the decision `decide` returns for it.
    pub fn select<F>(&mut self, decide: F)
    where
        F: Fn(&EdgeData) -> KeepDecision,
    {
        for edge in self.edges.values_mut() {
            edge.keep = decide(edge);
        }
    }

    /// Sets the decision of a single edge.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::EntityNotFound` if the edge does not exist.
    pub fn set_keep(&mut self, id: EdgeId, keep: KeepDecision) -> Result<()> {
        self.edges
            .get_mut(id)
            .ok_or(GraphError::EntityNotFound("edge"))?
            .keep = keep;
        Ok(())
    }
}
