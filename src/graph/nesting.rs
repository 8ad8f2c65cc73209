use crate::error::Result;
use crate::math::polygon_2d::{interior_sample, polygon_winding, signed_area_2d};
use crate::math::Point2;

/// Parent relation between the loops of a result.
///
/// Every hole is assigned the smallest outer loop that contains it. Outer
/// loops have no parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestingInfo {
    parents: Vec<Option<usize>>,
}

impl NestingInfo {
    /// Computes the nesting of oriented loops given as flattened polygons:
    /// positive area is an outer boundary, negative area a hole.
    #[must_use]
    pub fn from_polygons(polygons: &[Vec<Point2>]) -> Self {
        let outer: Vec<bool> = polygons.iter().map(|p| signed_area_2d(p) >= 0.0).collect();
        Self::with_outers(polygons, &outer)
    }

    /// Computes the nesting of loops wound either way, as they come in a
    /// filled path. A loop is a hole when the region just inside it is not
    /// `filled`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of `filled`.
    pub fn from_region<F>(polygons: &[Vec<Point2>], filled: F) -> Result<Self>
    where
        F: Fn(&Point2) -> Result<bool>,
    {
        let mut outer = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            outer.push(match interior_sample(polygon) {
                Some(sample) => filled(&sample)?,
                None => true,
            });
        }
        Ok(Self::with_outers(polygons, &outer))
    }

    fn with_outers(polygons: &[Vec<Point2>], outer: &[bool]) -> Self {
        let sizes: Vec<f64> = polygons.iter().map(|p| signed_area_2d(p).abs()).collect();
        let parents = polygons
            .iter()
            .enumerate()
            .map(|(i, polygon)| {
                if outer[i] {
                    return None;
                }
                let sample = interior_sample(polygon)?;
                (0..polygons.len())
                    .filter(|&j| {
                        j != i && outer[j] && sizes[j] > 0.0 && polygon_winding(&sample, &polygons[j]) != 0
                    })
                    .min_by(|&a, &b| sizes[a].total_cmp(&sizes[b]))
            })
            .collect();
        Self { parents }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    #[must_use]
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    #[must_use]
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Loops whose parent is `index`.
    #[must_use]
    pub fn children(&self, index: usize) -> Vec<usize> {
        (0..self.parents.len())
            .filter(|&i| self.parents[i] == Some(index))
            .collect()
    }

    /// Loops without a parent.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.parents.len()).filter(|&i| self.parents[i].is_none())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64, ccw: bool) -> Vec<Point2> {
        let mut points = vec![
            Point2::new(x, y),
            Point2::new(x + size, y),
            Point2::new(x + size, y + size),
            Point2::new(x, y + size),
        ];
        if !ccw {
            points.reverse();
        }
        points
    }

    #[test]
    fn hole_goes_to_smallest_enclosing_outer() {
        let polygons = vec![
            square(0.0, 0.0, 10.0, true),
            square(1.0, 1.0, 6.0, true),
            square(2.0, 2.0, 2.0, false),
            square(8.0, 8.0, 1.0, false),
        ];
        let nesting = NestingInfo::from_polygons(&polygons);
        assert_eq!(nesting.parent(0), None);
        assert_eq!(nesting.parent(1), None);
        assert_eq!(nesting.parent(2), Some(1));
        assert_eq!(nesting.parent(3), Some(0));
        assert_eq!(nesting.children(0), vec![3]);
        assert_eq!(nesting.roots().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn even_odd_hole_wound_like_its_outer() {
        let polygons = vec![square(0.0, 0.0, 10.0, true), square(3.0, 3.0, 4.0, true)];
        let nesting = NestingInfo::from_region(&polygons, |p| {
            let winding: i32 = polygons.iter().map(|q| polygon_winding(p, q)).sum();
            Ok(winding % 2 != 0)
        })
        .unwrap();
        assert_eq!(nesting.parents(), &[None, Some(0)]);
    }

    #[test]
    fn clockwise_outer_is_not_a_hole() {
        let polygons = vec![square(0.0, 0.0, 4.0, false), square(1.0, 1.0, 1.0, true)];
        let nesting = NestingInfo::from_region(&polygons, |p| {
            Ok(polygons.iter().map(|q| polygon_winding(p, q)).sum::<i32>() != 0)
        })
        .unwrap();
        // The inner square winds back to zero: a hole of the clockwise outer.
        assert_eq!(nesting.parents(), &[None, Some(0)]);
    }

    #[test]
    fn tiny_hole_finds_its_parent() {
        let polygons = vec![square(0.0, 0.0, 4e-6, true), square(1e-6, 1e-6, 1e-6, false)];
        let nesting = NestingInfo::from_polygons(&polygons);
        assert_eq!(nesting.parent(1), Some(0));
    }

    #[test]
    fn orphan_hole_has_no_parent() {
        let polygons = vec![square(0.0, 0.0, 1.0, false)];
        let nesting = NestingInfo::from_polygons(&polygons);
        assert_eq!(nesting.parent(0), None);
        assert_eq!(nesting.len(), 1);
    }
}
