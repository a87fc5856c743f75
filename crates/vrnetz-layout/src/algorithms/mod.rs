//! Embedding algorithms.
//!
//! Each algorithm works on dense local indices (a [`vrnetz_network::Subgraph`]
//! or a feature matrix) and returns one [`Point3`] per index. Two-dimensional
//! runs keep `z == 0`.

pub mod distance;
pub mod features;
pub mod kamada_kawai;
pub mod linalg;
pub mod spring;
pub mod tsne;
pub mod umap;

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::Rng;

use crate::point::{centroid, Point3};

/// Uniform positions in `[0, 1)` per axis.
pub fn random_layout(n: usize, dim: usize, rng: &mut StdRng) -> Vec<Point3> {
    (0..n)
        .map(|_| {
            let x = rng.random::<f64>();
            let y = rng.random::<f64>();
            let z = if dim >= 3 { rng.random::<f64>() } else { 0.0 };
            Point3::new(x, y, z)
        })
        .collect()
}

/// Standard normal sample (Box–Muller).
pub fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Centre on the mean and scale so the largest absolute coordinate is 1.
pub fn rescale(points: &mut [Point3]) {
    let Some(center) = centroid(points.iter()) else {
        return;
    };
    let mut lim: f64 = 0.0;
    for p in points.iter_mut() {
        *p -= center;
        lim = lim.max(p.x.abs()).max(p.y.abs()).max(p.z.abs());
    }
    if lim > 0.0 {
        for p in points.iter_mut() {
            *p = *p * (1.0 / lim);
        }
    }
}

/// Copy the first `dim` components of each row into points.
pub(crate) fn rows_to_points(rows: &[Vec<f64>], dim: usize) -> Vec<Point3> {
    rows.iter()
        .map(|r| {
            let mut p = Point3::ORIGIN;
            for (axis, v) in r.iter().take(dim.min(3)).enumerate() {
                p.set_axis(axis, *v);
            }
            p
        })
        .collect()
}
