use crate::graph::{EdgeData, KeepDecision, Operand};

/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Union,
    Intersection,
    /// A minus B.
    Difference,
    SymmetricDifference,
    /// Split A along B; see [`crate::operations::divide::Divide`].
    Divide,
    /// Split A along B and sort the pieces by side; see
    /// [`crate::operations::divide::Slice`].
    Slice,
}

impl BoolOp {
    /// Returns `true` for the operators decided by the inside/outside table.
    #[must_use]
    pub fn is_truth_table(self) -> bool {
        !matches!(self, BoolOp::Divide | BoolOp::Slice)
    }

    /// Whether a point inside A (`in_a`) and inside B (`in_b`) is in the
    /// result.
    ///
    /// | in A | in B | Union | Intersection | Difference | SymmetricDifference |
    /// |------|------|-------|--------------|------------|---------------------|
    /// | no   | no   | no    | no           | no         | no                  |
    /// | yes  | no   | yes   | no           | yes        | yes                 |
    /// | no   | yes  | yes   | no           | no         | yes                 |
    /// | yes  | yes  | yes   | yes          | no         | no                  |
    ///
    /// `Divide` and `Slice` keep A's region.
    #[allow(clippy::match_same_arms)]
    #[must_use]
    pub fn contains(self, in_a: bool, in_b: bool) -> bool {
        match self {
            BoolOp::Union => in_a || in_b,
            BoolOp::Intersection => in_a && in_b,
            BoolOp::Difference => in_a && !in_b,
            BoolOp::SymmetricDifference => in_a != in_b,
            BoolOp::Divide | BoolOp::Slice => in_a,
        }
    }
}

/// Decides what happens to an edge of a merged graph.
///
/// The edge is kept when the result region lies on exactly one of its
/// sides, oriented so that the region is on its left. An edge of B bounding
/// a hole carved out of A therefore comes out reversed.
#[must_use]
pub fn keep_decision(op: BoolOp, edge: &EdgeData) -> KeepDecision {
    let (a, b) = (Operand::A.index(), Operand::B.index());
    let left = op.contains(edge.inside_left[a], edge.inside_left[b]);
    let right = op.contains(edge.inside_right[a], edge.inside_right[b]);
    match (left, right) {
        (true, false) => KeepDecision::Keep,
        (false, true) => KeepDecision::KeepFlipped,
        _ => KeepDecision::Discard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::BackData;
    use crate::geometry::path::Piece;
    use crate::graph::{EdgeOrigin, PointId};
    use slotmap::SlotMap;

    fn edge_with_sides(left: [bool; 2], right: [bool; 2]) -> EdgeData {
        let mut points = SlotMap::<PointId, ()>::with_key();
        let (start, end) = (points.insert(()), points.insert(()));
        let origin = EdgeOrigin::new(BackData {
            source_path_id: 0,
            piece: Piece::new(0, 1),
            t_start: 0.0,
            t_end: 1.0,
        });
        let mut edge = EdgeData::new(start, end, Operand::A, origin);
        edge.inside_left = left;
        edge.inside_right = right;
        edge
    }

    #[test]
    fn union_keeps_outer_boundary() {
        let a_boundary = edge_with_sides([true, false], [false, false]);
        assert_eq!(keep_decision(BoolOp::Union, &a_boundary), KeepDecision::Keep);
        let a_inside_b = edge_with_sides([true, true], [false, true]);
        assert_eq!(keep_decision(BoolOp::Union, &a_inside_b), KeepDecision::Discard);
    }

    #[test]
    fn intersection_keeps_boundary_inside_other() {
        let a_inside_b = edge_with_sides([true, true], [false, true]);
        assert_eq!(keep_decision(BoolOp::Intersection, &a_inside_b), KeepDecision::Keep);
        let a_outside_b = edge_with_sides([true, false], [false, false]);
        assert_eq!(keep_decision(BoolOp::Intersection, &a_outside_b), KeepDecision::Discard);
    }

    #[test]
    fn difference_flips_b_inside_a() {
        let b_inside_a = edge_with_sides([true, true], [true, false]);
        assert_eq!(keep_decision(BoolOp::Difference, &b_inside_a), KeepDecision::KeepFlipped);
        let b_outside_a = edge_with_sides([false, true], [false, false]);
        assert_eq!(keep_decision(BoolOp::Difference, &b_outside_a), KeepDecision::Discard);
    }

    #[test]
    fn symmetric_difference_keeps_both_sides_of_overlap() {
        let b_inside_a = edge_with_sides([true, true], [true, false]);
        assert_eq!(
            keep_decision(BoolOp::SymmetricDifference, &b_inside_a),
            KeepDecision::KeepFlipped
        );
        let a_outside_b = edge_with_sides([true, false], [false, false]);
        assert_eq!(
            keep_decision(BoolOp::SymmetricDifference, &a_outside_b),
            KeepDecision::Keep
        );
    }

    #[test]
    fn coincident_same_direction_edges_keep_once() {
        // A and B share the edge with both regions on the left.
        let shared = edge_with_sides([true, true], [false, false]);
        assert_eq!(keep_decision(BoolOp::Union, &shared), KeepDecision::Keep);
        assert_eq!(keep_decision(BoolOp::Intersection, &shared), KeepDecision::Keep);
        assert_eq!(keep_decision(BoolOp::Difference, &shared), KeepDecision::Discard);
    }

    #[test]
    fn divide_and_slice_are_not_table_ops() {
        assert!(BoolOp::Union.is_truth_table());
        assert!(!BoolOp::Divide.is_truth_table());
        assert!(!BoolOp::Slice.is_truth_table());
    }
}
