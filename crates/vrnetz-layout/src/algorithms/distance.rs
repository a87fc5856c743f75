//! Pairwise distances between feature rows.

use super::linalg::SquareMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Euclidean,
    /// `1 - cos θ`; a zero row is at distance 1 from everything but itself.
    Cosine,
}

impl Metric {
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Metric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            Metric::Cosine => {
                let (mut dot, mut na, mut nb) = (0.0, 0.0, 0.0);
                for (x, y) in a.iter().zip(b) {
                    dot += x * y;
                    na += x * x;
                    nb += y * y;
                }
                if na == 0.0 || nb == 0.0 {
                    return if a == b { 0.0 } else { 1.0 };
                }
                (1.0 - dot / (na.sqrt() * nb.sqrt())).max(0.0)
            }
        }
    }
}

pub fn pairwise(rows: &[Vec<f64>], metric: Metric) -> SquareMatrix {
    SquareMatrix::from_fn(rows.len(), |i, j| {
        if i == j {
            0.0
        } else {
            metric.distance(&rows[i], &rows[j])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cosine_ignores_magnitude() {
        assert_relative_eq!(
            Metric::Cosine.distance(&[1.0, 1.0], &[3.0, 3.0]),
            0.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(Metric::Cosine.distance(&[1.0, 0.0], &[0.0, 2.0]), 1.0);
        assert_eq!(Metric::Cosine.distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn pairwise_is_symmetric_with_zero_diagonal() {
        let rows = vec![vec![0.0, 0.0], vec![3.0, 4.0], vec![1.0, 1.0]];
        let d = pairwise(&rows, Metric::Euclidean);
        assert_eq!(d.get(0, 1), 5.0);
        assert_eq!(d.get(1, 0), 5.0);
        assert_eq!(d.get(2, 2), 0.0);
    }
}
