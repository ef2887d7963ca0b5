//! Author classification over dense document vectors.
//!
//! A [`Sample`] carries a document's display name, label and vector together,
//! so no stage has to keep parallel lists aligned by position.

pub mod evaluation;
pub mod nearest_centroid;

pub use evaluation::{ConfusionMatrix, ConfusionRecord, Evaluation};
pub use nearest_centroid::NearestCentroid;

use nalgebra::{DMatrix, DVector};

use crate::corpus::Corpus;
use crate::error::{Result, StylometerError};

/// A labeled document vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub label: String,
    pub vector: DVector<f64>,
}

impl Sample {
    pub fn new<N: Into<String>, L: Into<String>>(name: N, label: L, vector: DVector<f64>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            vector,
        }
    }

    /// Pair each corpus document with its row of `features`.
    pub fn from_corpus(corpus: &Corpus, features: &DMatrix<f64>) -> Result<Vec<Sample>> {
        if corpus.len() != features.nrows() {
            return Err(StylometerError::other(format!(
                "{} documents but {} feature rows",
                corpus.len(),
                features.nrows()
            )));
        }
        Ok(corpus
            .documents()
            .iter()
            .zip(features.row_iter())
            .map(|(doc, row)| Sample::new(&doc.name, &doc.label, row.transpose()))
            .collect())
    }
}

/// Stack sample vectors back into a matrix, one row per sample.
pub fn to_matrix(samples: &[Sample]) -> DMatrix<f64> {
    let dim = samples.first().map_or(0, |s| s.vector.len());
    DMatrix::from_fn(samples.len(), dim, |i, j| samples[i].vector[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;

    #[test]
    fn test_from_corpus_aligns_rows() {
        let corpus = Corpus::from_documents(vec![
            Document::new("Seneca_A", "Seneca", "a"),
            Document::new("Cicero_C", "Cicero", "c"),
        ]);
        let features = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);

        let samples = Sample::from_corpus(&corpus, &features).unwrap();
        assert_eq!(samples[0].name, "Seneca_A");
        assert_eq!(samples[0].vector, DVector::from_row_slice(&[1.0, 2.0]));
        assert_eq!(samples[1].label, "Cicero");
        assert_eq!(to_matrix(&samples), features);
    }

    #[test]
    fn test_from_corpus_row_mismatch() {
        let corpus = Corpus::from_documents(vec![Document::new("a", "A", "x")]);
        let features = DMatrix::zeros(2, 3);
        assert!(Sample::from_corpus(&corpus, &features).is_err());
    }
}
