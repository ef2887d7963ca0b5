//! Two-dimensional projections of the dense document vectors.
//!
//! These embeddings are exploratory only and never feed back into
//! classification. Each technique's locality parameter scales with the corpus
//! size (see [`AnalysisConfig::perplexity_for`] and
//! [`AnalysisConfig::neighbors_for`]).

pub mod tsne;
pub mod umap;

pub use tsne::Tsne;
pub use umap::Umap;

use log::{info, warn};
use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::Result;

/// Trait for techniques that lay points out in the plane.
pub trait Projection {
    /// Embed each row of `data`; the output keeps row order.
    fn embed(&self, data: &DMatrix<f64>) -> Result<Embedding2d>;

    fn name(&self) -> &'static str;
}

/// Planar coordinates, one per input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding2d {
    pub points: Vec<[f64; 2]>,
}

impl Embedding2d {
    pub(crate) fn origin(n: usize) -> Self {
        Self {
            points: vec![[0.0, 0.0]; n],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(min, max)` of each axis, or `None` when empty.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                [lo[0].min(p[0]), lo[1].min(p[1])],
                [hi[0].max(p[0]), hi[1].max(p[1])],
            )
        }))
    }
}

/// Both projections with the parameters they ran with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projections {
    pub perplexity: f64,
    pub n_neighbors: usize,
    pub tsne: Embedding2d,
    pub umap: Embedding2d,
}

impl Projections {
    /// Run t-SNE and UMAP on `data` with locality scaled to its row count.
    pub fn compute(data: &DMatrix<f64>, config: &AnalysisConfig) -> Result<Self> {
        let n = data.nrows();
        let perplexity = config.perplexity_for(n);
        let n_neighbors = config.neighbors_for(n);
        if n > 0 && perplexity >= n as f64 {
            warn!("Perplexity {perplexity} is not below the corpus size {n}; t-SNE affinities will be near-uniform");
        }

        let tsne = Tsne::new(perplexity, config.random_state);
        let umap = Umap::new(n_neighbors, config.random_state);
        info!("Projecting {n} documents with {} and {}", tsne.name(), umap.name());

        Ok(Self {
            perplexity,
            n_neighbors,
            tsne: tsne.embed(data)?,
            umap: umap.embed(data)?,
        })
    }
}

/// Standard normal draw (Box-Muller).
pub(crate) fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Pairwise squared Euclidean distances between rows.
pub(crate) fn squared_distances(data: &DMatrix<f64>) -> DMatrix<f64> {
    let n = data.nrows();
    let mut distances = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (data.row(i) - data.row(j)).norm_squared();
            distances[(i, j)] = d;
            distances[(j, i)] = d;
        }
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_squared_distances() {
        let data = DMatrix::from_row_slice(3, 2, &[0.0, 0.0, 3.0, 4.0, 0.0, 1.0]);
        let d = squared_distances(&data);
        assert_eq!(d[(0, 1)], 25.0);
        assert_eq!(d[(1, 0)], 25.0);
        assert_eq!(d[(0, 2)], 1.0);
        assert_eq!(d[(2, 2)], 0.0);
    }

    #[test]
    fn test_gaussian_moments() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws: Vec<f64> = (0..20_000).map(|_| gaussian(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / draws.len() as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_bounds() {
        let embedding = Embedding2d {
            points: vec![[1.0, -2.0], [-3.0, 4.0]],
        };
        assert_eq!(embedding.bounds(), Some(([-3.0, -2.0], [1.0, 4.0])));
        assert_eq!(Embedding2d::origin(0).bounds(), None);
    }

    #[test]
    fn test_compute_scales_locality() {
        let data = DMatrix::from_fn(9, 3, |i, j| (i * 3 + j) as f64 * 0.1);
        let projections = Projections::compute(&data, &AnalysisConfig::default()).unwrap();
        assert_eq!(projections.perplexity, 3.0);
        assert_eq!(projections.n_neighbors, 3);
        assert_eq!(projections.tsne.len(), 9);
        assert_eq!(projections.umap.len(), 9);
    }

    #[test]
    fn test_compute_smallest_corpus() {
        let data = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        let projections = Projections::compute(&data, &AnalysisConfig::default()).unwrap();
        assert_eq!(projections.n_neighbors, 2);
        assert_eq!(projections.tsne.len(), 2);
        assert_eq!(projections.umap.len(), 2);
    }
}
