//! Fruchterman–Reingold force-directed layout.
//!
//! Every pair repels with `k²/d`, every edge attracts with `d²/k`. Node moves
//! are capped by a temperature that starts at a tenth of the widest axis of
//! the random start and cools linearly to zero. The run stops early when the
//! mean displacement of one step falls below `threshold`. The result is
//! centred and scaled into `[-1, 1]`.

use rand::rngs::StdRng;
use rayon::prelude::*;
use vrnetz_network::Subgraph;

use super::{random_layout, rescale};
use crate::params::SpringParams;
use crate::point::Point3;

/// Minimum pair distance used in the force terms.
const MIN_DISTANCE: f64 = 0.01;

pub fn spring_layout(
    graph: &Subgraph,
    params: &SpringParams,
    dim: usize,
    rng: &mut StdRng,
) -> Vec<Point3> {
    let n = graph.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![Point3::ORIGIN];
    }

    let mut pos = random_layout(n, dim, rng);
    let k = params
        .optimal_distance
        .unwrap_or_else(|| (1.0 / n as f64).sqrt());

    let mut t = (0..dim.min(3))
        .map(|axis| {
            let (lo, hi) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.axis(axis)), hi.max(p.axis(axis)))
            });
            hi - lo
        })
        .fold(0.0, f64::max)
        * 0.1;
    let dt = t / (params.iterations as f64 + 1.0);

    for iteration in 0..params.iterations {
        let displacement: Vec<Point3> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut disp = Point3::ORIGIN;
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let delta = pos[i] - pos[j];
                    let d = delta.length().max(MIN_DISTANCE);
                    let attraction = if graph.has_edge(i, j) { d / k } else { 0.0 };
                    disp += delta * (k * k / (d * d) - attraction);
                }
                disp
            })
            .collect();

        let mut moved_sq = 0.0;
        for (p, disp) in pos.iter_mut().zip(&displacement) {
            let len = disp.length().max(MIN_DISTANCE);
            let step = *disp * (t / len);
            moved_sq += step.dot(step);
            *p += step;
        }
        t -= dt;

        if moved_sq.sqrt() / (n as f64) < params.threshold {
            tracing::trace!(iteration, "spring layout converged");
            break;
        }
    }

    rescale(&mut pos);
    pos
}
