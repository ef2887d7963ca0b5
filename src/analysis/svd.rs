//! Truncated singular value decomposition of sparse TF-IDF rows.
//!
//! Corpora are short on documents and long on n-grams, so the decomposition
//! goes through the `n x n` Gram matrix `X Xᵀ = U Σ² Uᵀ` instead of the
//! `n x terms` matrix itself. The reduced coordinates are `U Σ`, which equal
//! `X V` for the right singular vectors `V`. The result is exact and does not
//! depend on any random state.

use log::{debug, warn};
use nalgebra::{DMatrix, SymmetricEigen};

use crate::analysis::tfidf::SparseRow;
use crate::error::{Result, StylometerError};

/// Output of [`TruncatedSvd::fit_transform`].
#[derive(Debug, Clone)]
pub struct SvdProjection {
    /// Reduced coordinates, one row per input row.
    pub coordinates: DMatrix<f64>,
    /// Singular values in decreasing order.
    pub singular_values: Vec<f64>,
    /// Share of the input variance captured by each component.
    pub explained_variance_ratio: Vec<f64>,
}

impl SvdProjection {
    pub fn rank(&self) -> usize {
        self.coordinates.ncols()
    }
}

/// Fixed-rank linear reduction.
#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    n_components: usize,
}

impl TruncatedSvd {
    pub fn new(n_components: usize) -> Self {
        Self { n_components }
    }

    /// Rank actually used for `n_rows` documents over `n_terms` columns.
    pub fn effective_rank(&self, n_rows: usize, n_terms: usize) -> usize {
        self.n_components.min(n_rows).min(n_terms)
    }

    pub fn fit_transform(&self, rows: &[SparseRow], n_terms: usize) -> Result<SvdProjection> {
        let n = rows.len();
        let rank = self.effective_rank(n, n_terms);
        if rank == 0 {
            return Err(StylometerError::dimensionality(format!(
                "cannot reduce {n} documents over {n_terms} n-gram features; \
                 texts may be shorter than the minimum n-gram length"
            )));
        }
        if rank < self.n_components {
            warn!(
                "Reducing to {rank} components instead of {} ({n} documents, {n_terms} features)",
                self.n_components
            );
        }

        let mut gram = DMatrix::<f64>::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let dot = rows[i].dot(&rows[j]);
                gram[(i, j)] = dot;
                gram[(j, i)] = dot;
            }
        }

        let eigen = SymmetricEigen::new(gram);
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let mut coordinates = DMatrix::<f64>::zeros(n, rank);
        let mut singular_values = Vec::with_capacity(rank);
        for (component, &idx) in order.iter().take(rank).enumerate() {
            let sigma = eigen.eigenvalues[idx].max(0.0).sqrt();
            let u = eigen.eigenvectors.column(idx);

            // Pin the sign: the largest-magnitude entry of each singular
            // vector is positive.
            let pivot = u
                .iter()
                .copied()
                .max_by(|a, b| a.abs().total_cmp(&b.abs()))
                .unwrap_or(0.0);
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };

            for i in 0..n {
                coordinates[(i, component)] = sign * u[i] * sigma;
            }
            singular_values.push(sigma);
        }

        let total_variance = column_variance_sum(rows, n_terms);
        let explained_variance_ratio = (0..rank)
            .map(|c| {
                if total_variance > 0.0 {
                    variance(coordinates.column(c).iter().copied()) / total_variance
                } else {
                    0.0
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "SVD kept {rank} components explaining {:.1}% of the variance",
            explained_variance_ratio.iter().sum::<f64>() * 100.0
        );

        Ok(SvdProjection {
            coordinates,
            singular_values,
            explained_variance_ratio,
        })
    }
}

fn variance<I: Iterator<Item = f64>>(values: I) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Sum of the per-column variances of the sparse matrix.
fn column_variance_sum(rows: &[SparseRow], n_terms: usize) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let n = rows.len() as f64;
    let mut sums = vec![0.0; n_terms];
    let mut squares = 0.0;
    for row in rows {
        for (&idx, &value) in row.indices.iter().zip(&row.values) {
            sums[idx] += value;
            squares += value * value;
        }
    }
    squares / n - sums.iter().map(|s| (s / n).powi(2)).sum::<f64>()
}
