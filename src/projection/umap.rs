//! Uniform manifold approximation and projection.
//!
//! Small-corpus variant: exact k-nearest neighbours, a fuzzy simplicial set
//! built from smooth kNN distances, and SGD with negative sampling on a
//! random initial layout.

use log::debug;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, StylometerError};
use crate::projection::{Embedding2d, Projection};

/// Curve parameters fitted for `min_dist = 0.1`, `spread = 1.0`.
const CURVE_A: f64 = 1.577;
const CURVE_B: f64 = 0.895;
const NEGATIVE_SAMPLE_RATE: f64 = 5.0;
const GRADIENT_CLIP: f64 = 4.0;
const SMOOTH_K_STEPS: usize = 64;
const SMOOTH_K_TOLERANCE: f64 = 1e-5;
const MIN_K_DIST_SCALE: f64 = 1e-3;
const INIT_SPREAD: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
struct Edge {
    head: usize,
    tail: usize,
    weight: f64,
}

#[derive(Debug, Clone)]
pub struct Umap {
    n_neighbors: usize,
    n_epochs: usize,
    random_state: u64,
}

impl Umap {
    /// `n_neighbors` counts the point itself.
    pub fn new(n_neighbors: usize, random_state: u64) -> Self {
        Self {
            n_neighbors,
            n_epochs: 500,
            random_state,
        }
    }

    pub fn with_epochs(mut self, n_epochs: usize) -> Self {
        self.n_epochs = n_epochs.max(1);
        self
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Symmetrised membership strengths of the kNN graph.
    fn fuzzy_graph(&self, data: &DMatrix<f64>) -> Vec<Edge> {
        let n = data.nrows();
        let k = self.n_neighbors.min(n);
        let target = (k as f64).log2();

        let mut membership = DMatrix::<f64>::zeros(n, n);
        let mut mean_distance = 0.0;
        let mut neighbourhoods = Vec::with_capacity(n);
        for i in 0..n {
            let mut others: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, (data.row(i) - data.row(j)).norm()))
                .collect();
            others.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            others.truncate(k.saturating_sub(1));
            mean_distance += others.iter().map(|(_, d)| d).sum::<f64>();
            neighbourhoods.push(others);
        }
        let mean_distance = mean_distance / (n * k.saturating_sub(1)).max(1) as f64;

        for (i, neighbours) in neighbourhoods.iter().enumerate() {
            let rho = neighbours
                .iter()
                .map(|(_, d)| *d)
                .find(|d| *d > 0.0)
                .unwrap_or(0.0);
            let sigma = smooth_knn_sigma(neighbours, rho, target)
                .max(MIN_K_DIST_SCALE * mean_distance)
                .max(f64::MIN_POSITIVE);
            for &(j, d) in neighbours {
                membership[(i, j)] = (-(d - rho).max(0.0) / sigma).exp();
            }
        }

        // Fuzzy union: a + b - ab.
        let mut edges = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (a, b) = (membership[(i, j)], membership[(j, i)]);
                let weight = a + b - a * b;
                if weight > 0.0 {
                    edges.push(Edge {
                        head: i,
                        tail: j,
                        weight,
                    });
                }
            }
        }
        edges
    }
}

/// Bandwidth such that the neighbours' memberships sum to `target`.
fn smooth_knn_sigma(neighbours: &[(usize, f64)], rho: f64, target: f64) -> f64 {
    let (mut lo, mut hi, mut mid) = (0.0, f64::INFINITY, 1.0);
    for _ in 0..SMOOTH_K_STEPS {
        let psum: f64 = neighbours
            .iter()
            .map(|(_, d)| {
                let gap = d - rho;
                if gap > 0.0 { (-gap / mid).exp() } else { 1.0 }
            })
            .sum();
        if (psum - target).abs() < SMOOTH_K_TOLERANCE {
            break;
        }
        if psum > target {
            hi = mid;
            mid = (lo + hi) / 2.0;
        } else {
            lo = mid;
            mid = if hi.is_finite() { (lo + hi) / 2.0 } else { mid * 2.0 };
        }
    }
    mid
}

fn clip(value: f64) -> f64 {
    value.clamp(-GRADIENT_CLIP, GRADIENT_CLIP)
}

impl Projection for Umap {
    fn embed(&self, data: &DMatrix<f64>) -> Result<Embedding2d> {
        if self.n_neighbors < 2 {
            return Err(StylometerError::invalid_config(format!(
                "n_neighbors must be at least 2, got {}",
                self.n_neighbors
            )));
        }
        let n = data.nrows();
        if n < 2 {
            return Ok(Embedding2d::origin(n));
        }

        let mut edges = self.fuzzy_graph(data);
        let max_weight = edges.iter().map(|e| e.weight).fold(0.0, f64::max);
        edges.retain(|e| e.weight >= max_weight / self.n_epochs as f64);

        let epochs_per_sample: Vec<f64> = edges.iter().map(|e| max_weight / e.weight).collect();
        let epochs_per_negative: Vec<f64> = epochs_per_sample
            .iter()
            .map(|eps| eps / NEGATIVE_SAMPLE_RATE)
            .collect();
        let mut next_sample = epochs_per_sample.clone();
        let mut next_negative = epochs_per_negative.clone();

        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut y: Vec<[f64; 2]> = (0..n)
            .map(|_| {
                [
                    rng.random_range(-INIT_SPREAD..INIT_SPREAD),
                    rng.random_range(-INIT_SPREAD..INIT_SPREAD),
                ]
            })
            .collect();

        for epoch in 0..self.n_epochs {
            let alpha = 1.0 - epoch as f64 / self.n_epochs as f64;
            let epoch = epoch as f64;

            for (e, edge) in edges.iter().enumerate() {
                if next_sample[e] > epoch {
                    continue;
                }
                let (j, k) = (edge.head, edge.tail);

                let dist2 = squared(y[j], y[k]);
                let coeff = if dist2 > 0.0 {
                    -2.0 * CURVE_A * CURVE_B * dist2.powf(CURVE_B - 1.0)
                        / (CURVE_A * dist2.powf(CURVE_B) + 1.0)
                } else {
                    0.0
                };
                for d in 0..2 {
                    let grad = clip(coeff * (y[j][d] - y[k][d]));
                    y[j][d] += grad * alpha;
                    y[k][d] -= grad * alpha;
                }
                next_sample[e] += epochs_per_sample[e];

                let n_negative = ((epoch - next_negative[e]) / epochs_per_negative[e]).floor();
                for _ in 0..n_negative.max(0.0) as usize {
                    let k = rng.random_range(0..n);
                    if k == j {
                        continue;
                    }
                    let dist2 = squared(y[j], y[k]);
                    let coeff = if dist2 > 0.0 {
                        2.0 * CURVE_B / ((0.001 + dist2) * (CURVE_A * dist2.powf(CURVE_B) + 1.0))
                    } else {
                        0.0
                    };
                    for d in 0..2 {
                        let grad = if coeff > 0.0 {
                            clip(coeff * (y[j][d] - y[k][d]))
                        } else {
                            GRADIENT_CLIP
                        };
                        y[j][d] += grad * alpha;
                    }
                }
                next_negative[e] += n_negative.max(0.0) * epochs_per_negative[e];
            }
        }

        debug!(
            "UMAP embedded {n} points ({} edges, {} neighbours, {} epochs)",
            edges.len(),
            self.n_neighbors,
            self.n_epochs
        );
        Ok(Embedding2d { points: y })
    }

    fn name(&self) -> &'static str {
        "UMAP"
    }
}

fn squared(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}
