//! Feature extraction: character n-gram TF-IDF followed by truncated SVD.
//!
//! # Architecture
//!
//! - `Analyzer` trait: turns a text into feature terms
//! - `CharNgramAnalyzer`: character n-grams over normalised text
//! - `TfIdfVectorizer`: sparse weighted rows
//! - `TruncatedSvd`: fixed-rank dense reduction
//! - `FeatureExtractor`: the three steps wired together
//!
//! # Example
//!
//! ```
//! use stylometer::analysis::FeatureExtractor;
//!
//! # fn main() -> stylometer::error::Result<()> {
//! let extractor = FeatureExtractor::new(2, 4, 50)?;
//! let features = extractor.extract(&["arma virumque cano", "gallia est omnis divisa"])?;
//! assert_eq!(features.matrix.nrows(), 2);
//! assert_eq!(features.matrix.ncols(), 2); // clamped to the corpus size
//! # Ok(())
//! # }
//! ```

pub mod ngram;
pub mod svd;
pub mod tfidf;

use std::sync::Arc;

use log::info;
use nalgebra::DMatrix;

use crate::config::AnalysisConfig;
use crate::error::Result;

pub use ngram::CharNgramAnalyzer;
pub use svd::{SvdProjection, TruncatedSvd};
pub use tfidf::{SparseRow, TfIdfVectorizer};

/// Trait for analyzers that convert text into feature terms.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<String>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Dense features for a corpus, rows in input order.
#[derive(Debug, Clone)]
pub struct Features {
    pub matrix: DMatrix<f64>,
    /// Number of distinct n-grams before reduction.
    pub vocabulary_size: usize,
    pub explained_variance_ratio: Vec<f64>,
}

/// Texts to dense vectors.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    analyzer: CharNgramAnalyzer,
    svd: TruncatedSvd,
}

impl FeatureExtractor {
    pub fn new(ngram_min: usize, ngram_max: usize, n_components: usize) -> Result<Self> {
        Ok(Self {
            analyzer: CharNgramAnalyzer::new(ngram_min, ngram_max)?,
            svd: TruncatedSvd::new(n_components),
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let mut extractor = Self::new(config.ngram_min, config.ngram_max, config.n_components)?;
        if !config.lowercase {
            extractor.analyzer = extractor.analyzer.preserve_case();
        }
        Ok(extractor)
    }

    pub fn extract(&self, texts: &[&str]) -> Result<Features> {
        let mut vectorizer = TfIdfVectorizer::new(Arc::new(self.analyzer.clone()));
        let rows = vectorizer.fit_transform(texts);
        let vocabulary_size = vectorizer.vocabulary_size();
        let (min, max) = self.analyzer.range();
        info!(
            "Vectorized {} texts into {vocabulary_size} character {min}-{max}-grams",
            texts.len()
        );

        let projection = self.svd.fit_transform(&rows, vocabulary_size)?;
        Ok(Features {
            matrix: projection.coordinates,
            vocabulary_size,
            explained_variance_ratio: projection.explained_variance_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StylometerError;

    #[test]
    fn test_extract_keeps_row_order() {
        let extractor = FeatureExtractor::new(2, 3, 50).unwrap();
        let texts = ["aaaa aaaa", "zzzz zzzz", "aaaa aaab"];
        let features = extractor.extract(&texts).unwrap();

        assert_eq!(features.matrix.nrows(), 3);
        let d01 = (features.matrix.row(0) - features.matrix.row(1)).norm();
        let d02 = (features.matrix.row(0) - features.matrix.row(2)).norm();
        assert!(d02 < d01);
    }

    #[test]
    fn test_texts_shorter_than_ngram() {
        let extractor = FeatureExtractor::new(5, 6, 50).unwrap();
        let err = extractor.extract(&["abc", "de"]).unwrap_err();
        assert!(matches!(err, StylometerError::Dimensionality(_)));
    }

    #[test]
    fn test_invalid_range() {
        assert!(FeatureExtractor::new(4, 2, 50).is_err());
    }
}
