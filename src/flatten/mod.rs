//! Curve flattening with back-mapping to the source path.
//!
//! Every generated [`FlatEdge`] remembers which path, which piece of that
//! path and which parameter range it approximates, so graph edges can be
//! mapped back onto the original curves after any number of splits.

use tracing::trace;

use crate::error::{GeometryError, Result};
use crate::geometry::path::{Path, Piece, PieceGeometry};
use crate::math::cubic_2d::{cubic_flatness, split_cubic};
use crate::math::{Bounds, Point2, TOLERANCE};

/// Maximum recursion depth when subdividing a cubic.
const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Quantization configuration of an operation.
///
/// Tolerances are derived from the bounding-box diagonal of all operands so
/// the same input behaves the same at any coordinate scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeParams {
    /// Flattening tolerance as a fraction of the bounding-box diagonal.
    pub relative_tolerance: f64,
    /// Absolute flattening tolerance; overrides `relative_tolerance`.
    pub tolerance: Option<f64>,
    /// Point-merge distance as a fraction of the flattening tolerance.
    pub snap_ratio: f64,
}

impl Default for QuantizeParams {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-4,
            tolerance: None,
            snap_ratio: 1e-4,
        }
    }
}

/// Tolerances in effect for one operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantization {
    /// Maximum deviation of a flattened curve from the original.
    pub flatten: f64,
    /// Distance under which two graph points are merged.
    pub snap: f64,
}

impl QuantizeParams {
    /// Sets an absolute flattening tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Derives the tolerances for geometry covering `bounds`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidParameter` if a tolerance or ratio is
    /// not a positive finite number, or `snap_ratio` exceeds 1.
    pub fn quantize(&self, bounds: &Bounds) -> Result<Quantization> {
        check_positive("relative_tolerance", self.relative_tolerance)?;
        check_positive("snap_ratio", self.snap_ratio)?;
        if self.snap_ratio > 1.0 {
            return Err(GeometryError::InvalidParameter {
                parameter: "snap_ratio",
                value: self.snap_ratio,
                reason: "must not exceed 1",
            }
            .into());
        }

        let flatten = if let Some(tolerance) = self.tolerance {
            check_positive("tolerance", tolerance)?;
            tolerance
        } else {
            // A point-sized input still needs a usable scale.
            let diagonal = bounds.diagonal();
            let scale = if diagonal > TOLERANCE { diagonal } else { 1.0 };
            self.relative_tolerance * scale
        };

        Ok(Quantization {
            flatten,
            snap: (flatten * self.snap_ratio).max(TOLERANCE),
        })
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidParameter {
            parameter,
            value,
            reason: "must be positive and finite",
        }
        .into())
    }
}

/// Location of a flat edge on its source path.
///
/// `t_start < t_end` always holds; both lie on the same piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackData {
    pub source_path_id: usize,
    pub piece: Piece,
    pub t_start: f64,
    pub t_end: f64,
}

impl BackData {
    /// Interpolates the piece parameter at fraction `s` of the range.
    #[must_use]
    pub fn t_at(&self, s: f64) -> f64 {
        self.t_start + (self.t_end - self.t_start) * s
    }

    /// Restricts the range to the parameters between `t0` and `t1`, in
    /// either order.
    #[must_use]
    pub fn between(&self, t0: f64, t1: f64) -> Self {
        Self {
            t_start: t0.min(t1),
            t_end: t0.max(t1),
            ..*self
        }
    }
}

/// A directed line segment approximating part of a source path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatEdge {
    pub start: Point2,
    pub end: Point2,
    pub back: BackData,
}

impl FlatEdge {
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Converts paths to polylines within a fixed tolerance.
#[derive(Debug, Clone, Copy)]
pub struct Flattener {
    tolerance: f64,
}

impl Flattener {
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Flattens every sub-path of `path`, tagging the edges with
    /// `source_path_id`.
    ///
    /// Closed sub-paths always get their closing line; with
    /// `implicit_close` open sub-paths get one too, as when they are
    /// filled. Degenerate pieces produce no edges.
    #[must_use]
    pub fn flatten(&self, path: &Path, source_path_id: usize, implicit_close: bool) -> Vec<FlatEdge> {
        let mut edges = Vec::new();
        for (sub_index, sub) in path.subpaths().iter().enumerate() {
            for (segment, geometry) in sub.pieces(implicit_close) {
                if geometry.is_degenerate() {
                    continue;
                }
                let back = BackData {
                    source_path_id,
                    piece: Piece::new(sub_index, segment),
                    t_start: 0.0,
                    t_end: 1.0,
                };
                self.flatten_piece(&geometry, back, &mut edges);
            }
        }
        trace!(source_path_id, edges = edges.len(), "flattened path");
        edges
    }

    fn flatten_piece(&self, geometry: &PieceGeometry, back: BackData, out: &mut Vec<FlatEdge>) {
        match geometry {
            PieceGeometry::Line(a, b) => out.push(FlatEdge {
                start: *a,
                end: *b,
                back,
            }),
            PieceGeometry::Cubic(p) => {
                let mut samples = vec![(p[0], 0.0)];
                self.subdivide(p, 0.0, 1.0, 0, &mut samples);
                for pair in samples.windows(2) {
                    let (start, t_start) = pair[0];
                    let (end, t_end) = pair[1];
                    if (end - start).norm() < TOLERANCE {
                        continue;
                    }
                    out.push(FlatEdge {
                        start,
                        end,
                        back: back.between(t_start, t_end),
                    });
                }
            }
        }
    }

    /// Appends the end point of every flat enough sub-curve, in order of
    /// increasing parameter.
    fn subdivide(&self, p: &[Point2; 4], t0: f64, t1: f64, depth: u32, out: &mut Vec<(Point2, f64)>) {
        if depth >= MAX_SUBDIVISION_DEPTH || cubic_flatness(&p[0], &p[1], &p[2], &p[3]) <= self.tolerance {
            out.push((p[3], t1));
            return;
        }
        let (left, right) = split_cubic(&p[0], &p[1], &p[2], &p[3], 0.5);
        let mid = 0.5 * (t0 + t1);
        self.subdivide(&left, t0, mid, depth + 1, out);
        self.subdivide(&right, mid, t1, depth + 1, out);
    }
}
