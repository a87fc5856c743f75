//! Spherical placement of nodes that cannot be embedded.
//!
//! Isolated nodes (and feature-less nodes of functional layouts) are spread
//! over a sphere around the centroid of the embedded nodes:
//! - the surface is an icosphere mesh, subdivided `subdivisions` times
//! - candidates are drawn area-weighted from the mesh faces and projected
//!   onto the exact sphere
//! - each output point is the best of several candidates (largest distance
//!   to the points already chosen), which keeps the sample even
//!
//! Exactly the requested number of points is returned.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::point::{centroid, Point3};

/// Candidates drawn per output point.
const CANDIDATES: usize = 10;

/// Above this many points the sampler skips best-candidate spreading.
const BEST_CANDIDATE_LIMIT: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub subdivisions: u32,
    pub radius: f64,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            subdivisions: 3,
            radius: 1.0,
        }
    }
}

// ============================================================================
// Mesh
// ============================================================================

/// Unit icosphere.
#[derive(Debug, Clone)]
pub struct Icosphere {
    vertices: Vec<Point3>,
    faces: Vec<[usize; 3]>,
}

impl Icosphere {
    pub fn new(subdivisions: u32) -> Self {
        let t = (1.0 + 5f64.sqrt()) / 2.0;
        let vertices = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Point3::new(x, y, z).normalized())
        .collect();
        let faces = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];
        let mut mesh = Self { vertices, faces };
        for _ in 0..subdivisions {
            mesh.subdivide();
        }
        mesh
    }

    fn subdivide(&mut self) {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut faces = Vec::with_capacity(self.faces.len() * 4);
        for [a, b, c] in std::mem::take(&mut self.faces) {
            let ab = self.midpoint(&mut midpoints, a, b);
            let bc = self.midpoint(&mut midpoints, b, c);
            let ca = self.midpoint(&mut midpoints, c, a);
            faces.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        self.faces = faces;
    }

    fn midpoint(
        &mut self,
        cache: &mut HashMap<(usize, usize), usize>,
        a: usize,
        b: usize,
    ) -> usize {
        let key = (a.min(b), a.max(b));
        *cache.entry(key).or_insert_with(|| {
            let mid = ((self.vertices[a] + self.vertices[b]) * 0.5).normalized();
            self.vertices.push(mid);
            self.vertices.len() - 1
        })
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    fn face_area(&self, face: [usize; 3]) -> f64 {
        let [a, b, c] = face.map(|i| self.vertices[i]);
        let (u, v) = (b - a, c - a);
        let cross = Point3::new(
            u.y * v.z - u.z * v.y,
            u.z * v.x - u.x * v.z,
            u.x * v.y - u.y * v.x,
        );
        cross.length() * 0.5
    }

    pub fn surface_area(&self) -> f64 {
        self.faces.iter().map(|f| self.face_area(*f)).sum()
    }
}

// ============================================================================
// Sampler
// ============================================================================

pub struct SphereSampler {
    mesh: Icosphere,
    cumulative_area: Vec<f64>,
    radius: f64,
}

impl SphereSampler {
    pub fn new(config: &SphereConfig) -> Self {
        let mesh = Icosphere::new(config.subdivisions);
        let mut total = 0.0;
        let cumulative_area = mesh
            .faces
            .iter()
            .map(|f| {
                total += mesh.face_area(*f);
                total
            })
            .collect();
        Self {
            mesh,
            cumulative_area,
            radius: config.radius,
        }
    }

    /// Uniform point on the unit sphere, drawn area-weighted from the mesh.
    fn surface_point(&self, rng: &mut StdRng) -> Point3 {
        let total = self.cumulative_area.last().copied().unwrap_or(0.0);
        let target = rng.random::<f64>() * total;
        let face_idx = self
            .cumulative_area
            .partition_point(|&c| c < target)
            .min(self.mesh.faces.len().saturating_sub(1));
        let [a, b, c] = self.mesh.faces[face_idx].map(|i| self.mesh.vertices[i]);

        let (mut r1, mut r2) = (rng.random::<f64>(), rng.random::<f64>());
        if r1 + r2 > 1.0 {
            r1 = 1.0 - r1;
            r2 = 1.0 - r2;
        }
        (a + (b - a) * r1 + (c - a) * r2).normalized()
    }

    /// `count` points on the sphere of the configured radius centred on the
    /// centroid of `around` (the origin when `around` is empty).
    pub fn sample(&self, count: usize, around: &[Point3], rng: &mut StdRng) -> Vec<Point3> {
        if count == 0 {
            return Vec::new();
        }
        let center = centroid(around).unwrap_or(Point3::ORIGIN);
        let spread = count <= BEST_CANDIDATE_LIMIT;

        let mut chosen: Vec<Point3> = Vec::with_capacity(count);
        while chosen.len() < count {
            let point = if spread && !chosen.is_empty() {
                self.best_candidate(&chosen, rng)
            } else {
                self.surface_point(rng)
            };
            chosen.push(point);
        }

        chosen
            .into_iter()
            .map(|p| center + p * self.radius)
            .collect()
    }

    fn best_candidate(&self, chosen: &[Point3], rng: &mut StdRng) -> Point3 {
        let mut best = self.surface_point(rng);
        let mut best_gap = nearest_distance(best, chosen);
        for _ in 1..CANDIDATES {
            let candidate = self.surface_point(rng);
            let gap = nearest_distance(candidate, chosen);
            if gap > best_gap {
                best = candidate;
                best_gap = gap;
            }
        }
        best
    }
}

fn nearest_distance(p: Point3, others: &[Point3]) -> f64 {
    others
        .iter()
        .map(|q| p.distance(*q))
        .fold(f64::INFINITY, f64::min)
}
