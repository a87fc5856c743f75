//! Shortest-path distance embedding ("kamada_kawai").
//!
//! Minimizes the weighted stress `Σ w_ij (|x_i - x_j| - d_ij)²` over hop
//! distances `d_ij` with weights `d_ij⁻²`, by stress majorization started
//! from classical MDS. Pairs in different components are given the largest
//! finite distance plus one.

use rand::rngs::StdRng;
use rayon::prelude::*;
use vrnetz_network::Subgraph;

use super::linalg::{classical_mds, SquareMatrix};
use super::{random_layout, rescale};
use crate::point::Point3;

const MAX_ITERATIONS: usize = 300;
const TOLERANCE: f64 = 1e-5;

/// All-pairs hop distances; unreachable pairs are `max + 1`.
pub fn hop_distances(graph: &Subgraph) -> SquareMatrix {
    let n = graph.len();
    let rows: Vec<Vec<Option<usize>>> = (0..n)
        .into_par_iter()
        .map(|s| graph.bfs_distances(s))
        .collect();
    let max = rows
        .iter()
        .flatten()
        .filter_map(|d| *d)
        .max()
        .unwrap_or(0);
    let mut m = SquareMatrix::zeros(n);
    for (i, row) in rows.iter().enumerate() {
        for (j, d) in row.iter().enumerate() {
            m.set(i, j, d.unwrap_or(max + 1) as f64);
        }
    }
    m
}

fn stress(pos: &[Point3], d: &SquareMatrix) -> f64 {
    let n = pos.len();
    let rows: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..n)
                .map(|j| {
                    let dij = d.get(i, j);
                    let diff = pos[i].distance(pos[j]) - dij;
                    diff * diff / (dij * dij)
                })
                .sum::<f64>()
        })
        .collect();
    rows.iter().sum()
}

pub fn kamada_kawai_layout(graph: &Subgraph, dim: usize, rng: &mut StdRng) -> Vec<Point3> {
    let n = graph.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![Point3::ORIGIN];
    }

    let d = hop_distances(graph);
    let mut pos = classical_mds(&d, dim, rng);
    let spread = pos.iter().map(|p| p.length()).fold(0.0, f64::max);
    if !(spread > 0.0 && spread.is_finite()) {
        pos = random_layout(n, dim, rng);
    }

    let mut current = stress(&pos, &d);
    for iteration in 0..MAX_ITERATIONS {
        pos = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut acc = Point3::ORIGIN;
                let mut weight = 0.0;
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dij = d.get(i, j);
                    let w = 1.0 / (dij * dij);
                    let delta = pos[i] - pos[j];
                    let len = delta.length();
                    let target = if len > 0.0 {
                        pos[j] + delta * (dij / len)
                    } else {
                        pos[j]
                    };
                    acc += target * w;
                    weight += w;
                }
                acc * (1.0 / weight)
            })
            .collect();

        let next = stress(&pos, &d);
        let improvement = (current - next) / current.max(f64::MIN_POSITIVE);
        current = next;
        if improvement.abs() < TOLERANCE {
            tracing::trace!(iteration, stress = current, "kamada_kawai converged");
            break;
        }
    }

    rescale(&mut pos);
    pos
}
