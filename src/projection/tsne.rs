//! Exact t-distributed stochastic neighbour embedding.

use log::debug;
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{Result, StylometerError};
use crate::projection::{Embedding2d, Projection, gaussian, squared_distances};

const EARLY_EXAGGERATION: f64 = 12.0;
const EXAGGERATION_ITERATIONS: usize = 250;
const MIN_GAIN: f64 = 0.01;
const PERPLEXITY_TOLERANCE: f64 = 1e-5;
const PERPLEXITY_STEPS: usize = 100;

/// t-SNE with exact O(n²) gradients, suitable for corpora of a few thousand
/// documents at most.
#[derive(Debug, Clone)]
pub struct Tsne {
    perplexity: f64,
    n_iter: usize,
    random_state: u64,
}

impl Tsne {
    pub fn new(perplexity: f64, random_state: u64) -> Self {
        Self {
            perplexity,
            n_iter: 1000,
            random_state,
        }
    }

    pub fn with_iterations(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter.max(EXAGGERATION_ITERATIONS + 1);
        self
    }

    pub fn perplexity(&self) -> f64 {
        self.perplexity
    }

    /// Symmetric joint probabilities from conditional Gaussians whose
    /// precisions are tuned so each row's entropy matches the perplexity.
    fn joint_probabilities(&self, distances: &DMatrix<f64>) -> DMatrix<f64> {
        let n = distances.nrows();
        let target_entropy = self.perplexity.ln();
        let mut conditional = DMatrix::<f64>::zeros(n, n);

        for i in 0..n {
            let mut beta = 1.0;
            let mut beta_min = f64::NEG_INFINITY;
            let mut beta_max = f64::INFINITY;
            let mut row = vec![0.0; n];

            for _ in 0..PERPLEXITY_STEPS {
                let mut sum = 0.0;
                let mut weighted = 0.0;
                for j in 0..n {
                    if i == j {
                        row[j] = 0.0;
                        continue;
                    }
                    let p = (-distances[(i, j)] * beta).exp();
                    row[j] = p;
                    sum += p;
                    weighted += distances[(i, j)] * p;
                }
                if sum <= f64::MIN_POSITIVE {
                    // All neighbours underflowed: widen the kernel.
                    beta_max = beta;
                    beta = if beta_min.is_finite() {
                        (beta + beta_min) / 2.0
                    } else {
                        beta / 2.0
                    };
                    continue;
                }

                for p in row.iter_mut() {
                    *p /= sum;
                }
                let entropy = sum.ln() + beta * weighted / sum;
                let diff = entropy - target_entropy;
                if diff.abs() < PERPLEXITY_TOLERANCE {
                    break;
                }
                if diff > 0.0 {
                    beta_min = beta;
                    beta = if beta_max.is_finite() {
                        (beta + beta_max) / 2.0
                    } else {
                        beta * 2.0
                    };
                } else {
                    beta_max = beta;
                    beta = if beta_min.is_finite() {
                        (beta + beta_min) / 2.0
                    } else {
                        beta / 2.0
                    };
                }
            }

            for j in 0..n {
                conditional[(i, j)] = row[j];
            }
        }

        let joint = (&conditional + conditional.transpose()) / (2.0 * n as f64);
        joint.map(|p| p.max(1e-12))
    }
}

impl Projection for Tsne {
    fn embed(&self, data: &DMatrix<f64>) -> Result<Embedding2d> {
        let n = data.nrows();
        if self.perplexity.is_nan() || self.perplexity <= 0.0 {
            return Err(StylometerError::invalid_config(format!(
                "perplexity must be positive, got {}",
                self.perplexity
            )));
        }
        if n < 2 {
            return Ok(Embedding2d::origin(n));
        }

        let p = self.joint_probabilities(&squared_distances(data));
        let learning_rate = (n as f64 / EARLY_EXAGGERATION / 4.0).max(50.0);

        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut y: Vec<[f64; 2]> = (0..n)
            .map(|_| [gaussian(&mut rng) * 1e-4, gaussian(&mut rng) * 1e-4])
            .collect();
        let mut update = vec![[0.0f64; 2]; n];
        let mut gains = vec![[1.0f64; 2]; n];
        let mut num = DMatrix::<f64>::zeros(n, n);

        for iter in 0..self.n_iter {
            let (exaggeration, momentum) = if iter < EXAGGERATION_ITERATIONS {
                (EARLY_EXAGGERATION, 0.5)
            } else {
                (1.0, 0.8)
            };

            // Student-t kernel in the embedding.
            let mut sum_num = 0.0;
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = y[i][0] - y[j][0];
                    let dy = y[i][1] - y[j][1];
                    let q = 1.0 / (1.0 + dx * dx + dy * dy);
                    num[(i, j)] = q;
                    num[(j, i)] = q;
                    sum_num += 2.0 * q;
                }
            }
            let sum_num = sum_num.max(f64::MIN_POSITIVE);

            for i in 0..n {
                let mut grad = [0.0; 2];
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let q = (num[(i, j)] / sum_num).max(1e-12);
                    let force = (exaggeration * p[(i, j)] - q) * num[(i, j)];
                    grad[0] += 4.0 * force * (y[i][0] - y[j][0]);
                    grad[1] += 4.0 * force * (y[i][1] - y[j][1]);
                }

                for d in 0..2 {
                    if update[i][d] * grad[d] < 0.0 {
                        gains[i][d] += 0.2;
                    } else {
                        gains[i][d] = (gains[i][d] * 0.8).max(MIN_GAIN);
                    }
                    update[i][d] = momentum * update[i][d] - learning_rate * gains[i][d] * grad[d];
                }
            }

            for i in 0..n {
                y[i][0] += update[i][0];
                y[i][1] += update[i][1];
            }
            center(&mut y);
        }

        debug!(
            "t-SNE embedded {n} points (perplexity {}, {} iterations)",
            self.perplexity, self.n_iter
        );
        Ok(Embedding2d { points: y })
    }

    fn name(&self) -> &'static str {
        "t-SNE"
    }
}

fn center(points: &mut [[f64; 2]]) {
    let n = points.len() as f64;
    let mean = points
        .iter()
        .fold([0.0; 2], |acc, p| [acc[0] + p[0] / n, acc[1] + p[1] / n]);
    for p in points.iter_mut() {
        p[0] -= mean[0];
        p[1] -= mean[1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_clusters() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            8,
            3,
            &[
                0.0, 0.0, 0.0, //
                0.1, 0.0, 0.1, //
                0.0, 0.1, 0.0, //
                0.1, 0.1, 0.1, //
                5.0, 5.0, 5.0, //
                5.1, 5.0, 5.1, //
                5.0, 5.1, 5.0, //
                5.1, 5.1, 5.1, //
            ],
        )
    }

    fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
    }

    #[test]
    fn test_joint_probabilities_are_normalised() {
        let tsne = Tsne::new(2.0, 42);
        let p = tsne.joint_probabilities(&squared_distances(&two_clusters()));
        let total: f64 = p.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!((p[(0, 1)] - p[(1, 0)]).abs() < 1e-15);
    }

    #[test]
    fn test_separates_clusters() {
        let embedding = Tsne::new(2.0, 42).embed(&two_clusters()).unwrap();
        assert_eq!(embedding.points.len(), 8);

        let within = dist(embedding.points[0], embedding.points[1]);
        let across = dist(embedding.points[0], embedding.points[4]);
        assert!(within < across);
    }

    #[test]
    fn test_seeded_runs_match() {
        let data = two_clusters();
        let a = Tsne::new(2.0, 7).with_iterations(300).embed(&data).unwrap();
        let b = Tsne::new(2.0, 7).with_iterations(300).embed(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tiny_inputs() {
        let one = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert_eq!(Tsne::new(2.0, 42).embed(&one).unwrap().points, vec![[0.0, 0.0]]);

        // Perplexity above n - 1 still converges to a uniform kernel.
        let two = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 1.0, 1.0]);
        let embedding = Tsne::new(2.0, 42).embed(&two).unwrap();
        assert!(embedding.points.iter().flatten().all(|v| v.is_finite()));
    }
}
