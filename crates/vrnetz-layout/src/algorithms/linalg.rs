//! Small dense linear algebra: symmetric matrices, power-iteration
//! eigenpairs, classical MDS.

use rand::rngs::StdRng;
use rayon::prelude::*;

use super::{gaussian, rows_to_points};
use crate::point::Point3;

/// Dense square matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn from_fn(n: usize, f: impl Fn(usize, usize) -> f64 + Sync) -> Self {
        let mut data = vec![0.0; n * n];
        data.par_chunks_mut(n.max(1))
            .enumerate()
            .for_each(|(i, row)| {
                for (j, cell) in row.iter_mut().enumerate() {
                    *cell = f(i, j);
                }
            });
        Self { n, data }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        self.data[i * self.n + j] = v;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        (0..self.n)
            .into_par_iter()
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// Gershgorin bound on the spectral radius.
    fn spectral_bound(&self) -> f64 {
        (0..self.n)
            .map(|i| self.row(i).iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(v: &mut [f64]) -> f64 {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    norm
}

fn orthogonalize(v: &mut [f64], basis: &[(f64, Vec<f64>)]) {
    for (_, b) in basis {
        let proj = dot(v, b);
        v.iter_mut().zip(b).for_each(|(x, y)| *x -= proj * y);
    }
}

/// The `k` algebraically largest eigenpairs of a symmetric matrix, by
/// shifted power iteration with deflation. Eigenvalues come back descending.
pub fn top_eigenpairs(
    m: &SquareMatrix,
    k: usize,
    iterations: usize,
    rng: &mut StdRng,
) -> Vec<(f64, Vec<f64>)> {
    let n = m.n();
    let shift = m.spectral_bound();
    let mut pairs: Vec<(f64, Vec<f64>)> = Vec::with_capacity(k);

    for _ in 0..k.min(n) {
        let mut v: Vec<f64> = (0..n).map(|_| gaussian(rng)).collect();
        orthogonalize(&mut v, &pairs);
        normalize(&mut v);

        let mut lambda = 0.0;
        for _ in 0..iterations {
            let mut w = m.mul_vec(&v);
            w.iter_mut().zip(&v).for_each(|(wi, vi)| *wi += shift * vi);
            orthogonalize(&mut w, &pairs);
            let next_lambda = dot(&w, &v);
            if normalize(&mut w) == 0.0 {
                break;
            }
            let converged = (next_lambda - lambda).abs() <= 1e-10 * next_lambda.abs().max(1.0);
            lambda = next_lambda;
            v = w;
            if converged {
                break;
            }
        }
        pairs.push((lambda - shift, v));
    }
    pairs
}

/// Classical (Torgerson) MDS of a distance matrix into `dim` axes.
pub fn classical_mds(distances: &SquareMatrix, dim: usize, rng: &mut StdRng) -> Vec<Point3> {
    let n = distances.n();
    if n == 0 {
        return Vec::new();
    }
    let sq = SquareMatrix::from_fn(n, |i, j| distances.get(i, j).powi(2));
    let row_mean: Vec<f64> = (0..n).map(|i| sq.row(i).iter().sum::<f64>() / n as f64).collect();
    let grand = row_mean.iter().sum::<f64>() / n as f64;
    let b = SquareMatrix::from_fn(n, |i, j| {
        -0.5 * (sq.get(i, j) - row_mean[i] - row_mean[j] + grand)
    });

    let pairs = top_eigenpairs(&b, dim, 300, rng);
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            pairs
                .iter()
                .map(|(lambda, v)| v[i] * lambda.max(0.0).sqrt())
                .collect()
        })
        .collect();
    rows_to_points(&rows, dim)
}
