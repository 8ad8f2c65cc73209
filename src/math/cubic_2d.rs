use super::distance_2d::point_to_line_dist;
use super::{lerp, Point2};

/// Evaluates a cubic Bézier at parameter `t`.
#[must_use]
pub fn cubic_point_at(p0: &Point2, p1: &Point2, p2: &Point2, p3: &Point2, t: f64) -> Point2 {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point2::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Splits a cubic at `t` using de Casteljau's algorithm.
///
/// Returns the control polygons of the two halves.
#[must_use]
pub fn split_cubic(
    p0: &Point2,
    p1: &Point2,
    p2: &Point2,
    p3: &Point2,
    t: f64,
) -> ([Point2; 4], [Point2; 4]) {
    let p01 = lerp(p0, p1, t);
    let p12 = lerp(p1, p2, t);
    let p23 = lerp(p2, p3, t);
    let p012 = lerp(&p01, &p12, t);
    let p123 = lerp(&p12, &p23, t);
    let mid = lerp(&p012, &p123, t);
    ([*p0, p01, p012, mid], [mid, p123, p23, *p3])
}

/// Extracts the part of a cubic between parameters `t0` and `t1`.
///
/// When `t0 > t1` the extracted curve runs backwards.
#[must_use]
pub fn sub_cubic(p: &[Point2; 4], t0: f64, t1: f64) -> [Point2; 4] {
    if t0 > t1 {
        let [a, b, c, d] = sub_cubic(p, t1, t0);
        return [d, c, b, a];
    }
    let t0 = t0.clamp(0.0, 1.0);
    let t1 = t1.clamp(0.0, 1.0);
    let tail = if t0 <= 0.0 {
        *p
    } else {
        split_cubic(&p[0], &p[1], &p[2], &p[3], t0).1
    };
    if t1 >= 1.0 {
        return tail;
    }
    if t0 >= 1.0 {
        return [p[3]; 4];
    }
    // Remap t1 into the parameter range of the tail.
    let local = (t1 - t0) / (1.0 - t0);
    split_cubic(&tail[0], &tail[1], &tail[2], &tail[3], local).0
}

/// Maximum distance of the control points from the chord `p0 → p3`.
///
/// Bounds the deviation of the curve from its chord.
#[must_use]
pub fn cubic_flatness(p0: &Point2, p1: &Point2, p2: &Point2, p3: &Point2) -> f64 {
    if (p3 - p0).norm_squared() < 1e-24 {
        return (p1 - p0).norm().max((p2 - p0).norm());
    }
    point_to_line_dist(p1, p0, p3).max(point_to_line_dist(p2, p0, p3))
}
