use super::{Bounds, Point2, Vector2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Winding number of `p` with respect to a set of directed segments.
///
/// Casts a ray towards `+x` and counts signed crossings with the half-open
/// rule, so a ray through a shared vertex is counted once.
pub fn winding_number<I>(p: &Point2, segments: I) -> i32
where
    I: IntoIterator<Item = (Point2, Point2)>,
{
    let mut winding = 0;
    for (a, b) in segments {
        if (a.y > p.y) == (b.y > p.y) {
            continue;
        }
        let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
        if x > p.x {
            winding += if b.y > a.y { 1 } else { -1 };
        }
    }
    winding
}

/// Winding number of `p` with respect to a closed polygon.
#[must_use]
pub fn polygon_winding(p: &Point2, polygon: &[Point2]) -> i32 {
    let n = polygon.len();
    winding_number(p, (0..n).map(|i| (polygon[i], polygon[(i + 1) % n])))
}

/// Computes the normalized direction from point `a` to point `b`.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if the segment has zero length.
pub fn segment_direction(a: &Point2, b: &Point2) -> Result<Vector2> {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return Err(GeometryError::Degenerate(format!(
            "zero-length segment between ({}, {}) and ({}, {})",
            a.x, a.y, b.x, b.y
        ))
        .into());
    }
    Ok(d / len)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Returns a point strictly inside the polygon, or `None` for degenerate input.
#[must_use]
pub fn interior_sample(polygon: &[Point2]) -> Option<Point2> {
    interior_sample_where(polygon, |_| true)
}

/// Returns a point strictly inside the polygon that `accept` agrees with.
///
/// Tries the midpoints of the edges, longest first, nudged towards the side
/// the polygon winds around, and keeps the first one the polygon contains.
#[must_use]
pub fn interior_sample_where<F>(polygon: &[Point2], accept: F) -> Option<Point2>
where
    F: Fn(&Point2) -> bool,
{
    let n = polygon.len();
    let area = signed_area_2d(polygon);
    let mut bounds = Bounds::empty();
    for p in polygon {
        bounds.extend(p);
    }
    // Relative to the polygon's own size, so tiny loops still get a sample.
    let scale = bounds.diagonal();
    if n < 3 || area.abs() <= TOLERANCE * scale * scale {
        return None;
    }
    let side = area.signum();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        let li = (polygon[(i + 1) % n] - polygon[i]).norm_squared();
        let lj = (polygon[(j + 1) % n] - polygon[j]).norm_squared();
        lj.total_cmp(&li)
    });
    for i in order {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let Ok(dir) = segment_direction(&a, &b) else {
            continue;
        };
        let len = (b - a).norm();
        let mid = nalgebra::center(&a, &b);
        let mut step = len * 1e-3;
        for _ in 0..8 {
            let candidate = mid + left_normal(dir) * (step * side);
            if polygon_winding(&candidate, polygon) != 0 && accept(&candidate) {
                return Some(candidate);
            }
            step *= 0.1;
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&unit_square());
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let pts: Vec<Point2> = unit_square().into_iter().rev().collect();
        let area = signed_area_2d(&pts);
        assert!((area + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!((signed_area_2d(&[Point2::new(0.0, 0.0)])).abs() < TOLERANCE);
        assert!((signed_area_2d(&[])).abs() < TOLERANCE);
    }

    #[test]
    fn winding_inside_and_outside() {
        let square = unit_square();
        assert_eq!(polygon_winding(&Point2::new(0.5, 0.5), &square), 1);
        assert_eq!(polygon_winding(&Point2::new(1.5, 0.5), &square), 0);
        let reversed: Vec<Point2> = square.into_iter().rev().collect();
        assert_eq!(polygon_winding(&Point2::new(0.5, 0.5), &reversed), -1);
    }

    #[test]
    fn winding_ray_through_vertex_counts_once() {
        // Diamond with vertices exactly on the ray y = 0.
        let diamond = vec![
            Point2::new(0.0, -1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
        ];
        assert_eq!(polygon_winding(&Point2::new(0.0, 0.0), &diamond), 1);
    }

    #[test]
    fn segment_direction_basic() {
        let dir = segment_direction(&Point2::new(0.0, 0.0), &Point2::new(3.0, 4.0)).unwrap();
        assert!((dir.x - 0.6).abs() < TOLERANCE);
        assert!((dir.y - 0.8).abs() < TOLERANCE);
    }

    #[test]
    fn segment_direction_zero_length() {
        let a = Point2::new(1.0, 1.0);
        assert!(segment_direction(&a, &a).is_err());
    }

    #[test]
    fn left_normal_basic() {
        let n = left_normal(Vector2::new(1.0, 0.0));
        assert!((n.x).abs() < TOLERANCE);
        assert!((n.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn interior_sample_of_l_shape() {
        let l_shape = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let p = interior_sample(&l_shape).unwrap();
        assert_eq!(polygon_winding(&p, &l_shape), 1);
    }

    #[test]
    fn interior_sample_of_clockwise_polygon() {
        let square: Vec<Point2> = unit_square().into_iter().rev().collect();
        let p = interior_sample(&square).unwrap();
        assert_eq!(polygon_winding(&p, &square), -1);
    }

    #[test]
    fn interior_sample_of_tiny_polygon() {
        let tiny: Vec<Point2> = unit_square().iter().map(|p| Point2::new(p.x * 2e-6, p.y * 2e-6)).collect();
        let p = interior_sample(&tiny).unwrap();
        assert_eq!(polygon_winding(&p, &tiny), 1);
        let flat = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert!(interior_sample(&flat).is_none());
    }

    #[test]
    fn interior_sample_avoids_rejected_region() {
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let p = interior_sample_where(&outer, |q| q.y > 3.0).unwrap();
        assert!(p.y > 3.0);
        assert_eq!(polygon_winding(&p, &outer), 1);
    }
}
