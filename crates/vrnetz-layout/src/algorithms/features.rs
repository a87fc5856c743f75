//! Structural feature vectors for the cartographs reductions.
//!
//! - local: adjacency row with the node itself set
//! - global: random-walk-with-restart visiting probabilities
//! - importance: standardized degree, closeness, betweenness and eigenvector
//!   centrality

use rayon::prelude::*;
use vrnetz_network::Subgraph;

/// Restart probability of the global random walk.
pub const RESTART: f64 = 0.1;
const RWR_ITERATIONS: usize = 100;
const RWR_TOLERANCE: f64 = 1e-9;
const EIGEN_ITERATIONS: usize = 200;

pub fn local_features(graph: &Subgraph) -> Vec<Vec<f64>> {
    let n = graph.len();
    (0..n)
        .map(|i| {
            let mut row = vec![0.0; n];
            row[i] = 1.0;
            for &j in graph.neighbors(i) {
                row[j] = 1.0;
            }
            row
        })
        .collect()
}

/// Row `s` is the stationary distribution of a walk from `s` that returns to
/// `s` with probability [`RESTART`] at every step.
pub fn global_features(graph: &Subgraph) -> Vec<Vec<f64>> {
    let n = graph.len();
    (0..n)
        .into_par_iter()
        .map(|source| {
            let mut p = vec![0.0; n];
            p[source] = 1.0;
            for _ in 0..RWR_ITERATIONS {
                let mut next = vec![0.0; n];
                for (i, mass) in p.iter().enumerate() {
                    if *mass == 0.0 {
                        continue;
                    }
                    let neighbors = graph.neighbors(i);
                    if neighbors.is_empty() {
                        next[i] += (1.0 - RESTART) * mass;
                        continue;
                    }
                    let share = (1.0 - RESTART) * mass / neighbors.len() as f64;
                    for &j in neighbors {
                        next[j] += share;
                    }
                }
                next[source] += RESTART;
                let delta: f64 = next.iter().zip(&p).map(|(a, b)| (a - b).abs()).sum();
                p = next;
                if delta < RWR_TOLERANCE {
                    break;
                }
            }
            p
        })
        .collect()
}

// ============================================================================
// Centralities
// ============================================================================

pub fn degree_centrality(graph: &Subgraph) -> Vec<f64> {
    let n = graph.len();
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| graph.degree(i) as f64 / (n - 1) as f64)
        .collect()
}

/// Closeness scaled by the reachable fraction (Wasserman–Faust), so nodes
/// in small components are not over-rated.
pub fn closeness_centrality(graph: &Subgraph) -> Vec<f64> {
    let n = graph.len();
    (0..n)
        .into_par_iter()
        .map(|s| {
            let dist = graph.bfs_distances(s);
            let (reached, total) = dist
                .iter()
                .flatten()
                .fold((0usize, 0usize), |(r, t), d| (r + 1, t + d));
            if total == 0 || n <= 1 {
                return 0.0;
            }
            let r = (reached - 1) as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        })
        .collect()
}

/// Brandes betweenness, normalized by `(n-1)(n-2)/2`.
pub fn betweenness_centrality(graph: &Subgraph) -> Vec<f64> {
    let n = graph.len();
    let partials: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|s| {
            let mut stack = Vec::with_capacity(n);
            let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
            let mut sigma = vec![0.0; n];
            let mut dist: Vec<Option<usize>> = vec![None; n];
            sigma[s] = 1.0;
            dist[s] = Some(0);
            let mut queue = std::collections::VecDeque::from([s]);
            while let Some(v) = queue.pop_front() {
                stack.push(v);
                let dv = dist[v].unwrap_or(0);
                for &w in graph.neighbors(v) {
                    if dist[w].is_none() {
                        dist[w] = Some(dv + 1);
                        queue.push_back(w);
                    }
                    if dist[w] == Some(dv + 1) {
                        sigma[w] += sigma[v];
                        preds[w].push(v);
                    }
                }
            }
            let mut delta = vec![0.0; n];
            let mut acc = vec![0.0; n];
            while let Some(w) = stack.pop() {
                for &v in &preds[w] {
                    delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                }
                if w != s {
                    acc[w] += delta[w];
                }
            }
            acc
        })
        .collect();

    let mut total = vec![0.0; n];
    for row in partials {
        total.iter_mut().zip(row).for_each(|(t, v)| *t += v);
    }
    let scale = if n > 2 {
        1.0 / ((n - 1) * (n - 2)) as f64
    } else {
        0.5
    };
    total.iter().map(|v| v * scale).collect()
}

/// Principal eigenvector of `A + I` (unit length, non-negative).
pub fn eigenvector_centrality(graph: &Subgraph) -> Vec<f64> {
    let n = graph.len();
    if n == 0 {
        return Vec::new();
    }
    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    for _ in 0..EIGEN_ITERATIONS {
        let mut next: Vec<f64> = (0..n)
            .map(|i| x[i] + graph.neighbors(i).iter().map(|&j| x[j]).sum::<f64>())
            .collect();
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            break;
        }
        next.iter_mut().for_each(|v| *v /= norm);
        let delta: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if delta < n as f64 * 1e-9 {
            break;
        }
    }
    x
}

/// Z-score each column; a constant column becomes zeros.
pub fn standardize_columns(rows: &mut [Vec<f64>]) {
    let Some(width) = rows.first().map(Vec::len) else {
        return;
    };
    let n = rows.len() as f64;
    for c in 0..width {
        let mean = rows.iter().map(|r| r[c]).sum::<f64>() / n;
        let var = rows.iter().map(|r| (r[c] - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        for r in rows.iter_mut() {
            r[c] = if std > 0.0 { (r[c] - mean) / std } else { 0.0 };
        }
    }
}

pub fn importance_features(graph: &Subgraph) -> Vec<Vec<f64>> {
    let columns = [
        degree_centrality(graph),
        closeness_centrality(graph),
        betweenness_centrality(graph),
        eigenvector_centrality(graph),
    ];
    let mut rows: Vec<Vec<f64>> = (0..graph.len())
        .map(|i| columns.iter().map(|c| c[i]).collect())
        .collect();
    standardize_columns(&mut rows);
    rows
}
