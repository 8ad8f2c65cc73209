//! Circular arc utilities.
//!
//! Arcs are described by center, radius, start angle and signed sweep
//! (positive = counter-clockwise) and converted to cubic Bézier pieces of at
//! most a quarter turn each.
use std::f64::consts::FRAC_PI_2;

use super::{Point2, Vector2};

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, start_angle: f64, sweep: f64, t: f64) -> Point2 {
    let angle = start_angle + sweep * t;
    center + Vector2::new(radius * angle.cos(), radius * angle.sin())
}

/// Approximates an arc by cubic Bézier pieces.
///
/// Returns `[control1, control2, end]` triples; the first piece starts at
/// `arc_point_at(.., 0.0)`. Each piece spans at most a quarter turn, which
/// keeps the radial error below `3e-4 * radius`.
#[must_use]
pub fn arc_to_cubics(
    center: &Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> Vec<[Point2; 3]> {
    if radius <= 0.0 || sweep == 0.0 {
        return Vec::new();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pieces = (sweep.abs() / FRAC_PI_2 - 1e-9).ceil().max(1.0) as u32;
    let step = sweep / f64::from(pieces);
    // Control arm length for a piece of angle `step`.
    let k = 4.0 / 3.0 * (step / 4.0).tan() * radius;

    let mut result = Vec::with_capacity(pieces as usize);
    for i in 0..pieces {
        let a0 = start_angle + step * f64::from(i);
        let a1 = a0 + step;
        let p0 = center + Vector2::new(radius * a0.cos(), radius * a0.sin());
        let p1 = center + Vector2::new(radius * a1.cos(), radius * a1.sin());
        let t0 = Vector2::new(-a0.sin(), a0.cos());
        let t1 = Vector2::new(-a1.sin(), a1.cos());
        result.push([p0 + t0 * k, p1 - t1 * k, p1]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::cubic_2d::cubic_point_at;
    use std::f64::consts::PI;

    #[test]
    fn arc_point_quarter() {
        let p = arc_point_at(&Point2::new(1.0, 1.0), 2.0, 0.0, PI, 0.5);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn full_circle_uses_four_pieces() {
        let pieces = arc_to_cubics(&Point2::origin(), 1.0, 0.0, 2.0 * PI);
        assert_eq!(pieces.len(), 4);
        let end = pieces[3][2];
        assert!((end.x - 1.0).abs() < 1e-12 && end.y.abs() < 1e-12);
    }

    #[test]
    fn cubic_pieces_stay_near_circle() {
        let center = Point2::new(2.0, -1.0);
        let pieces = arc_to_cubics(&center, 3.0, 0.3, -1.7 * PI);
        let mut start = arc_point_at(&center, 3.0, 0.3, -1.7 * PI, 0.0);
        for [c1, c2, end] in pieces {
            for i in 0..=10 {
                let t = f64::from(i) / 10.0;
                let p = cubic_point_at(&start, &c1, &c2, &end, t);
                let r = (p - center).norm();
                assert!((r - 3.0).abs() < 3.0 * 3e-4, "r={r}");
            }
            start = end;
        }
    }

    #[test]
    fn zero_sweep_is_empty() {
        assert!(arc_to_cubics(&Point2::origin(), 1.0, 0.0, 0.0).is_empty());
    }
}
