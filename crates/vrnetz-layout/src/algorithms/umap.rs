//! UMAP over a precomputed distance matrix.
//!
//! 1. k-nearest-neighbour graph with per-node `rho` (nearest distance) and
//!    `sigma` (bandwidth for `log2(k)` effective neighbours)
//! 2. fuzzy union of the directed memberships
//! 3. curve parameters `a`, `b` fitted to `spread` and `min_dist`
//! 4. SGD over edges with negative sampling from a seeded uniform start

use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;

use super::linalg::SquareMatrix;
use crate::params::UmapParams;
use crate::point::Point3;

pub const EPOCHS: usize = 200;
pub const NEGATIVE_SAMPLE_RATE: usize = 5;
const SIGMA_STEPS: usize = 64;
const GRAD_CLIP: f64 = 4.0;
const INIT_EXTENT: f64 = 10.0;

/// Weighted undirected edge of the fuzzy graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyEdge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

fn smooth_knn(distances: &[f64], target: f64) -> (f64, f64) {
    let rho = distances
        .iter()
        .copied()
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min);
    let rho = if rho.is_finite() { rho } else { 0.0 };

    let (mut lo, mut hi, mut sigma) = (0.0, f64::INFINITY, 1.0);
    for _ in 0..SIGMA_STEPS {
        let psum: f64 = distances
            .iter()
            .map(|d| (-(d - rho).max(0.0) / sigma).exp())
            .sum();
        if (psum - target).abs() < 1e-5 {
            break;
        }
        if psum > target {
            hi = sigma;
            sigma = (lo + hi) / 2.0;
        } else {
            lo = sigma;
            sigma = if hi.is_finite() { (lo + hi) / 2.0 } else { sigma * 2.0 };
        }
    }
    let mean = distances.iter().sum::<f64>() / distances.len().max(1) as f64;
    (rho, sigma.max(1e-3 * mean).max(f64::MIN_POSITIVE))
}

/// Symmetrized fuzzy neighbour graph (`w = a + b - a·b`).
pub fn fuzzy_graph(distances: &SquareMatrix, n_neighbors: usize) -> Vec<FuzzyEdge> {
    let n = distances.n();
    if n < 2 {
        return Vec::new();
    }
    let k = n_neighbors.min(n - 1).max(1);
    let target = (k as f64).log2().max(1.0);

    let directed: Vec<Vec<(usize, f64)>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut order: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            order.sort_by(|&x, &y| {
                distances.get(i, x).total_cmp(&distances.get(i, y)).then(x.cmp(&y))
            });
            order.truncate(k);
            let knn: Vec<f64> = order.iter().map(|&j| distances.get(i, j)).collect();
            let (rho, sigma) = smooth_knn(&knn, target);
            order
                .into_iter()
                .zip(knn)
                .map(|(j, d)| (j, (-(d - rho).max(0.0) / sigma).exp()))
                .collect()
        })
        .collect();

    let mut weights = std::collections::BTreeMap::<(usize, usize), (f64, f64)>::new();
    for (i, row) in directed.iter().enumerate() {
        for &(j, w) in row {
            let entry = weights.entry((i.min(j), i.max(j))).or_insert((0.0, 0.0));
            if i < j {
                entry.0 = w;
            } else {
                entry.1 = w;
            }
        }
    }
    weights
        .into_iter()
        .map(|((a, b), (wa, wb))| FuzzyEdge {
            a,
            b,
            weight: wa + wb - wa * wb,
        })
        .filter(|e| e.weight > 0.0)
        .collect()
}

/// Fit `1 / (1 + a·x^(2b))` to the target membership curve by
/// Levenberg–Marquardt.
pub fn fit_ab(spread: f64, min_dist: f64) -> (f64, f64) {
    let xs: Vec<f64> = (0..300).map(|i| 3.0 * spread * i as f64 / 299.0).collect();
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| if x < min_dist { 1.0 } else { (-(x - min_dist) / spread).exp() })
        .collect();

    let residual = |a: f64, b: f64| -> f64 {
        xs.iter()
            .zip(&ys)
            .map(|(&x, &y)| (1.0 / (1.0 + a * x.powf(2.0 * b)) - y).powi(2))
            .sum()
    };

    let (mut a, mut b) = (1.0, 1.0);
    let mut lambda = 1e-3;
    let mut current = residual(a, b);
    for _ in 0..200 {
        let (mut jtj, mut jtr) = ([[0.0; 2]; 2], [0.0; 2]);
        for (&x, &y) in xs.iter().zip(&ys) {
            if x <= 0.0 {
                continue;
            }
            let u = x.powf(2.0 * b);
            let g = 1.0 / (1.0 + a * u);
            let r = g - y;
            let da = -u * g * g;
            let db = -a * u * 2.0 * x.ln() * g * g;
            jtj[0][0] += da * da;
            jtj[0][1] += da * db;
            jtj[1][1] += db * db;
            jtr[0] += da * r;
            jtr[1] += db * r;
        }
        jtj[1][0] = jtj[0][1];

        let m00 = jtj[0][0] * (1.0 + lambda);
        let m11 = jtj[1][1] * (1.0 + lambda);
        let det = m00 * m11 - jtj[0][1] * jtj[1][0];
        if det.abs() < f64::MIN_POSITIVE {
            break;
        }
        let step_a = -(m11 * jtr[0] - jtj[0][1] * jtr[1]) / det;
        let step_b = -(m00 * jtr[1] - jtj[1][0] * jtr[0]) / det;
        let (na, nb) = ((a + step_a).max(1e-6), (b + step_b).max(1e-6));
        let next = residual(na, nb);
        if next < current {
            let done = (current - next) < 1e-14;
            a = na;
            b = nb;
            current = next;
            lambda /= 10.0;
            if done {
                break;
            }
        } else {
            lambda *= 10.0;
            if lambda > 1e12 {
                break;
            }
        }
    }
    (a, b)
}

fn clip(v: f64) -> f64 {
    v.clamp(-GRAD_CLIP, GRAD_CLIP)
}

pub fn umap(
    distances: &SquareMatrix,
    params: &UmapParams,
    dim: usize,
    rng: &mut StdRng,
) -> Vec<Point3> {
    let n = distances.n();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![Point3::ORIGIN];
    }
    let axes = dim.min(3);

    let edges = fuzzy_graph(distances, params.n_neighbors);
    let (a, b) = fit_ab(params.spread, params.min_dist);

    let mut y: Vec<Point3> = (0..n)
        .map(|_| {
            let mut p = Point3::ORIGIN;
            for axis in 0..axes {
                p.set_axis(axis, rng.random_range(-INIT_EXTENT..INIT_EXTENT));
            }
            p
        })
        .collect();

    let max_weight = edges.iter().map(|e| e.weight).fold(0.0, f64::max);
    let epochs_per_sample: Vec<f64> = edges.iter().map(|e| max_weight / e.weight).collect();
    let mut next_sample = epochs_per_sample.clone();

    for epoch in 0..EPOCHS {
        let alpha = 1.0 - epoch as f64 / EPOCHS as f64;
        for (e, edge) in edges.iter().enumerate() {
            if next_sample[e] > epoch as f64 {
                continue;
            }
            let (i, j) = (edge.a, edge.b);

            let d = y[i] - y[j];
            let d2 = d.dot(d);
            let coeff = if d2 > 0.0 {
                -2.0 * a * b * d2.powf(b - 1.0) / (1.0 + a * d2.powf(b))
            } else {
                0.0
            };
            for axis in 0..axes {
                let g = clip(coeff * d.axis(axis)) * alpha;
                y[i].shift_axis(axis, g);
                y[j].shift_axis(axis, -g);
            }
            next_sample[e] += epochs_per_sample[e];

            for _ in 0..NEGATIVE_SAMPLE_RATE {
                let k = rng.random_range(0..n);
                if k == i {
                    continue;
                }
                let d = y[i] - y[k];
                let d2 = d.dot(d);
                let coeff = if d2 > 0.0 {
                    2.0 * b / ((0.001 + d2) * (1.0 + a * d2.powf(b)))
                } else {
                    0.0
                };
                for axis in 0..axes {
                    let g = if coeff > 0.0 {
                        clip(coeff * d.axis(axis))
                    } else {
                        GRAD_CLIP
                    };
                    y[i].shift_axis(axis, g * alpha);
                }
            }
        }
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::distance::{pairwise, Metric};
    use rand::SeedableRng;

    #[test]
    fn fitted_curve_matches_reference_values() {
        let (a, b) = fit_ab(1.0, 0.1);
        assert!((a - 1.58).abs() < 0.15, "a = {a}");
        assert!((b - 0.90).abs() < 0.08, "b = {b}");
    }

    #[test]
    fn fuzzy_graph_is_symmetric_union() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let d = pairwise(&rows, Metric::Euclidean);
        let edges = fuzzy_graph(&d, 2);
        assert!(edges.iter().all(|e| e.a < e.b));
        assert!(edges.iter().all(|e| e.weight > 0.0 && e.weight <= 1.0));
        assert!(edges.iter().any(|e| e.a == 0 && e.b == 1));
        assert!(!edges.iter().any(|e| e.a == 0 && e.b == 5));
    }

    #[test]
    fn embedding_is_finite_flat_and_seeded() {
        let rows: Vec<Vec<f64>> = (0..12).map(|i| vec![(i % 4) as f64, (i / 4) as f64]).collect();
        let d = pairwise(&rows, Metric::Euclidean);
        let params = UmapParams {
            n_neighbors: 4,
            ..UmapParams::default()
        };
        let a = umap(&d, &params, 2, &mut StdRng::seed_from_u64(17));
        let b = umap(&d, &params, 2, &mut StdRng::seed_from_u64(17));
        assert_eq!(a.len(), 12);
        assert!(a.iter().all(|p| p.is_finite() && p.z == 0.0));
        assert_eq!(a, b);
    }
}
