//! Per-axis min-max normalization into `[0, 1]`.

use crate::point::{Point3, Positions};

/// Min-max normalize the first `dim` axes of `positions` in place.
///
/// An axis whose values are all equal maps to `0.0`. Axes at or beyond `dim`
/// are left untouched. Applying it twice changes nothing.
pub fn normalize_in_place(positions: &mut Positions, dim: usize) {
    let mut points: Vec<Point3> = positions.values().copied().collect();
    normalize_points(&mut points, dim);
    for (slot, p) in positions.values_mut().zip(points) {
        *slot = p;
    }
}

/// Normalized copy of `positions`.
pub fn normalize_positions(positions: &Positions, dim: usize) -> Positions {
    let mut out = positions.clone();
    normalize_in_place(&mut out, dim);
    out
}

/// Normalize a plain list of points (same rules as [`normalize_in_place`]).
pub fn normalize_points(points: &mut [Point3], dim: usize) {
    for axis in 0..dim.min(3) {
        let (min, max) = points
            .iter()
            .map(|p| p.axis(axis))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        for p in points.iter_mut() {
            let v = if range > 0.0 && range.is_finite() {
                (p.axis(axis) - min) / range
            } else {
                0.0
            };
            p.set_axis(axis, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn positions(points: &[(f64, f64, f64)]) -> Positions {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| (i.to_string(), Point3::new(x, y, z)))
            .collect()
    }

    #[test]
    fn maps_extremes_to_unit_interval() {
        let mut p = positions(&[(-2.0, 10.0, 1.0), (2.0, 20.0, 3.0), (0.0, 15.0, 2.0)]);
        normalize_in_place(&mut p, 3);
        assert_eq!(p["0"], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(p["1"], Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p["2"].x, 0.5);
        assert_relative_eq!(p["2"].y, 0.5);
    }

    #[test]
    fn constant_axis_maps_to_zero() {
        let mut p = positions(&[(3.0, 1.0, 7.0), (3.0, 2.0, 7.0)]);
        normalize_in_place(&mut p, 3);
        assert_eq!(p["0"].x, 0.0);
        assert_eq!(p["1"].x, 0.0);
        assert_eq!(p["1"].z, 0.0);
    }

    #[test]
    fn axes_beyond_dim_are_untouched() {
        let mut p = positions(&[(0.0, 0.0, 9.0), (4.0, 2.0, 9.0)]);
        normalize_in_place(&mut p, 2);
        assert_eq!(p["1"], Point3::new(1.0, 1.0, 9.0));
    }

    #[test]
    fn single_point_normalizes_to_origin() {
        let mut pts = vec![Point3::new(5.0, -1.0, 2.0)];
        normalize_points(&mut pts, 3);
        assert_eq!(pts[0], Point3::ORIGIN);
    }

    proptest! {
        #[test]
        fn output_is_in_unit_cube_and_idempotent(
            pts in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3, -1e3f64..1e3), 1..50)
        ) {
            let mut p = positions(&pts);
            normalize_in_place(&mut p, 3);
            for q in p.values() {
                for axis in 0..3 {
                    prop_assert!((0.0..=1.0).contains(&q.axis(axis)));
                }
            }
            let again = normalize_positions(&p, 3);
            for (id, q) in &again {
                for axis in 0..3 {
                    prop_assert!((q.axis(axis) - p[id].axis(axis)).abs() < 1e-12);
                }
            }
        }
    }
}
