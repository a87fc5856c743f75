//! Exact t-SNE.
//!
//! Input affinities come from a per-row Gaussian kernel whose bandwidth is
//! found by bisection to hit the requested perplexity. The embedding starts
//! from a tiny Gaussian cloud and is optimized by gradient descent with
//! momentum and per-coordinate gains. The first quarter of the steps uses
//! early exaggeration (`density`).

use rand::rngs::StdRng;
use rayon::prelude::*;

use super::gaussian;
use super::linalg::SquareMatrix;
use crate::params::TsneParams;
use crate::point::Point3;

const BISECTION_STEPS: usize = 64;
const ENTROPY_TOLERANCE: f64 = 1e-5;
const MIN_GAIN: f64 = 0.01;
const MIN_PROBABILITY: f64 = 1e-12;

/// Symmetric joint probabilities `P` from a distance matrix.
pub fn joint_probabilities(distances: &SquareMatrix, perplexity: f64) -> SquareMatrix {
    let n = distances.n();
    let target = perplexity.ln();

    let conditional: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let sq: Vec<f64> = distances.row(i).iter().map(|d| d * d).collect();
            let base = sq
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, v)| *v)
                .fold(f64::INFINITY, f64::min);

            let (mut beta, mut lo, mut hi) = (1.0, 0.0, f64::INFINITY);
            let mut row = vec![0.0; n];
            for _ in 0..BISECTION_STEPS {
                let mut sum = 0.0;
                let mut weighted = 0.0;
                for j in 0..n {
                    if j == i {
                        row[j] = 0.0;
                        continue;
                    }
                    let shifted = sq[j] - base;
                    let p = (-shifted * beta).exp();
                    row[j] = p;
                    sum += p;
                    weighted += shifted * p;
                }
                if sum <= 0.0 {
                    break;
                }
                let entropy = sum.ln() + beta * weighted / sum;
                row.iter_mut().for_each(|p| *p /= sum);

                let gap = entropy - target;
                if gap.abs() < ENTROPY_TOLERANCE {
                    break;
                }
                if gap > 0.0 {
                    lo = beta;
                    beta = if hi.is_finite() { (beta + hi) / 2.0 } else { beta * 2.0 };
                } else {
                    hi = beta;
                    beta = (beta + lo) / 2.0;
                }
            }
            row
        })
        .collect();

    let scale = 1.0 / (2.0 * n as f64);
    SquareMatrix::from_fn(n, |i, j| {
        if i == j {
            0.0
        } else {
            ((conditional[i][j] + conditional[j][i]) * scale).max(MIN_PROBABILITY)
        }
    })
}

pub fn tsne(
    distances: &SquareMatrix,
    params: &TsneParams,
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

    let p = joint_probabilities(distances, params.perplexity);
    let mut y: Vec<Point3> = (0..n)
        .map(|_| {
            let mut pt = Point3::ORIGIN;
            for axis in 0..axes {
                pt.set_axis(axis, gaussian(rng) * 1e-4);
            }
            pt
        })
        .collect();
    let mut update = vec![Point3::ORIGIN; n];
    let mut gains = vec![Point3::new(1.0, 1.0, 1.0); n];
    let exaggeration_steps = (params.steps / 4).max(1);

    for step in 0..params.steps {
        let exaggeration = if step < exaggeration_steps { params.density } else { 1.0 };
        let momentum = if step < exaggeration_steps { 0.5 } else { 0.8 };

        // Row sums are collected first so the total is summed in a fixed order.
        let row_sums: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .filter(|&j| j != i)
                    .map(|j| {
                        let d = y[i] - y[j];
                        1.0 / (1.0 + d.dot(d))
                    })
                    .sum::<f64>()
            })
            .collect();
        let q_sum = row_sums.iter().sum::<f64>().max(f64::MIN_POSITIVE);

        let grad: Vec<Point3> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut g = Point3::ORIGIN;
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let d = y[i] - y[j];
                    let num = 1.0 / (1.0 + d.dot(d));
                    let coeff = (exaggeration * p.get(i, j) - num / q_sum) * num;
                    g += d * (4.0 * coeff);
                }
                g
            })
            .collect();

        for i in 0..n {
            for axis in 0..axes {
                let g = grad[i].axis(axis);
                let u = update[i].axis(axis);
                let gain = gains[i].axis(axis);
                let gain = if g * u < 0.0 { gain + 0.2 } else { gain * 0.8 };
                let gain = gain.max(MIN_GAIN);
                gains[i].set_axis(axis, gain);
                let u = momentum * u - params.learning_rate * gain * g;
                update[i].set_axis(axis, u);
                y[i].shift_axis(axis, u);
            }
        }

        if let Some(mean) = crate::point::centroid(y.iter()) {
            y.iter_mut().for_each(|pt| *pt -= mean);
        }
    }
    y
}
