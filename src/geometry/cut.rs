use std::cmp::Ordering;

use super::path::{Path, Piece, SubPath};
use crate::math::Point2;

/// Parameter distance under which two cuts on the same piece coincide.
const CUT_EPSILON: f64 = 1e-9;

/// A parametric location on a path: piece plus curve parameter `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPosition {
    pub piece: Piece,
    pub t: f64,
}

impl CutPosition {
    #[must_use]
    pub fn new(piece: Piece, t: f64) -> Self {
        Self { piece, t }
    }

    /// Orders by piece, then by parameter.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.piece
            .cmp(&other.piece)
            .then(self.t.total_cmp(&other.t))
    }
}

/// Sorts cut positions by `(piece, t)` and drops near-duplicates.
#[must_use]
pub fn sorted_cuts(cuts: &[CutPosition]) -> Vec<CutPosition> {
    let mut sorted = cuts.to_vec();
    sorted.sort_by(CutPosition::compare);
    sorted.dedup_by(|b, a| a.piece == b.piece && (a.t - b.t).abs() < CUT_EPSILON);
    sorted
}

impl Path {
    /// Starts a new sub-path at every cut position.
    ///
    /// Curves are split exactly at their parameter; a closed sub-path with
    /// cuts becomes open pieces, with the piece running through the original
    /// start point kept in one piece. Sub-paths without cuts are copied
    /// unchanged.
    #[must_use]
    pub fn split_at(&self, cuts: &[CutPosition]) -> Path {
        let cuts = sorted_cuts(cuts);
        let mut out = Path::new();

        for (index, sub) in self.subpaths().iter().enumerate() {
            let here: Vec<CutPosition> = cuts
                .iter()
                .filter(|c| c.piece.subpath == index)
                .copied()
                .collect();
            if here.is_empty() {
                out.push(sub.clone());
                continue;
            }
            for piece in split_subpath(sub, &here) {
                out.push(piece);
            }
        }
        out
    }
}

/// Accumulates output pieces while walking a sub-path.
struct PieceWriter {
    pieces: Vec<SubPath>,
    current: SubPath,
}

impl PieceWriter {
    fn flush_and_restart(&mut self, at: Point2) {
        let finished = std::mem::replace(&mut self.current, SubPath::new(at));
        if finished.segments().len() > 1 {
            self.pieces.push(finished);
        }
    }
}

fn split_subpath(sub: &SubPath, cuts: &[CutPosition]) -> Vec<SubPath> {
    let mut writer = PieceWriter {
        pieces: Vec::new(),
        current: SubPath::new(sub.start()),
    };
    let mut start_is_cut = false;
    let pieces: Vec<_> = sub.pieces(false).collect();
    let last_index = pieces.last().map(|(i, _)| *i);

    for &(index, geom) in &pieces {
        let mut t_prev = 0.0;
        for cut in cuts.iter().filter(|c| c.piece.segment == index) {
            let t = cut.t.clamp(0.0, 1.0);
            if t <= CUT_EPSILON {
                if writer.current.segments().len() == 1 {
                    start_is_cut |= writer.pieces.is_empty();
                }
                writer.flush_and_restart(geom.start());
            } else if t >= 1.0 - CUT_EPSILON {
                if t_prev < 1.0 {
                    writer.current.push_segment(geom.segment_between(t_prev, 1.0));
                }
                t_prev = 1.0;
                if Some(index) == last_index {
                    start_is_cut = true;
                }
                writer.flush_and_restart(geom.end());
            } else {
                writer.current.push_segment(geom.segment_between(t_prev, t));
                t_prev = t;
                writer.flush_and_restart(geom.point_at(t));
            }
        }
        if t_prev < 1.0 {
            writer.current.push_segment(geom.segment_between(t_prev, 1.0));
        }
    }
    let tail = std::mem::replace(&mut writer.current, SubPath::new(sub.start()));
    if tail.segments().len() > 1 {
        writer.pieces.push(tail);
    }

    // The piece ending at the closing point continues into the first piece.
    if sub.is_closed() && !start_is_cut && writer.pieces.len() > 1 {
        let first = writer.pieces.remove(0);
        if let Some(last) = writer.pieces.last_mut() {
            for seg in &first.segments()[1..] {
                last.push_segment(*seg);
            }
        }
    }
    writer.pieces
}
