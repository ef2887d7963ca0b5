//! Nearest-centroid classifier.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StylometerError};
use crate::ml::Sample;

/// One mean vector per label, labels in sorted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestCentroid {
    classes: Vec<String>,
    /// Row `i` is the centroid of `classes[i]`.
    centroids: DMatrix<f64>,
}

impl NearestCentroid {
    /// Fit one centroid per distinct label as the mean of that label's vectors.
    pub fn fit(samples: &[Sample]) -> Result<Self> {
        let Some(first) = samples.first() else {
            return Err(StylometerError::empty_corpus("no samples to fit"));
        };
        let dim = first.vector.len();

        let mut sums: BTreeMap<&str, (DVector<f64>, usize)> = BTreeMap::new();
        for sample in samples {
            if sample.vector.len() != dim {
                return Err(StylometerError::dimensionality(format!(
                    "{} has {} features, expected {dim}",
                    sample.name,
                    sample.vector.len()
                )));
            }
            let entry = sums
                .entry(sample.label.as_str())
                .or_insert_with(|| (DVector::zeros(dim), 0));
            entry.0 += &sample.vector;
            entry.1 += 1;
        }

        if sums.len() < 2 {
            return Err(StylometerError::empty_corpus(format!(
                "nearest-centroid needs at least 2 labels, found {}",
                sums.len()
            )));
        }

        let mut classes = Vec::with_capacity(sums.len());
        let mut centroids = DMatrix::zeros(sums.len(), dim);
        for (row, (label, (sum, count))) in sums.into_iter().enumerate() {
            let mean = sum / count as f64;
            centroids.set_row(row, &mean.transpose());
            classes.push(label.to_string());
        }

        Ok(Self { classes, centroids })
    }

    /// Ordered label vocabulary.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn centroids(&self) -> &DMatrix<f64> {
        &self.centroids
    }

    pub fn centroid(&self, label: &str) -> Option<DVector<f64>> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|row| self.centroids.row(row).transpose())
    }

    pub fn dimension(&self) -> usize {
        self.centroids.ncols()
    }

    /// Euclidean distance from `vector` to every centroid, in class order.
    ///
    /// # Panics
    ///
    /// Panics if `vector.len()` differs from [`Self::dimension`]. Use
    /// [`Self::try_predict`] for vectors of unknown shape.
    pub fn distances(&self, vector: &DVector<f64>) -> Vec<f64> {
        self.centroids
            .row_iter()
            .map(|centroid| (centroid.transpose() - vector).norm())
            .collect()
    }

    /// Label of the nearest centroid. Ties go to the first class in order.
    ///
    /// # Panics
    ///
    /// Panics on a dimension mismatch, like [`Self::distances`].
    pub fn predict(&self, vector: &DVector<f64>) -> &str {
        let distances = self.distances(vector);
        &self.classes[argmin(&distances)]
    }

    /// [`Self::predict`] for vectors that may not live in the fitted space.
    pub fn try_predict(&self, vector: &DVector<f64>) -> Result<&str> {
        if vector.len() != self.dimension() {
            return Err(StylometerError::dimensionality(format!(
                "expected a vector of length {}, got {}",
                self.dimension(),
                vector.len()
            )));
        }
        Ok(self.predict(vector))
    }

    pub fn predict_all(&self, samples: &[Sample]) -> Vec<String> {
        samples
            .iter()
            .map(|s| self.predict(&s.vector).to_string())
            .collect()
    }
}

/// Index of the smallest value; the first one wins on ties.
pub(crate) fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v < values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, label: &str, values: &[f64]) -> Sample {
        Sample::new(name, label, DVector::from_row_slice(values))
    }

    fn training_set() -> Vec<Sample> {
        vec![
            sample("Seneca_A", "Seneca", &[1.0, 0.0]),
            sample("Seneca_B", "Seneca", &[3.0, 0.0]),
            sample("Cicero_C", "Cicero", &[0.0, 4.0]),
        ]
    }

    #[test]
    fn test_fit_centroids() {
        let model = NearestCentroid::fit(&training_set()).unwrap();

        assert_eq!(model.classes(), &["Cicero".to_string(), "Seneca".to_string()]);
        assert_eq!(model.dimension(), 2);
        assert_eq!(
            model.centroid("Seneca").unwrap(),
            DVector::from_row_slice(&[2.0, 0.0])
        );
        assert_eq!(
            model.centroid("Cicero").unwrap(),
            DVector::from_row_slice(&[0.0, 4.0])
        );
        assert!(model.centroid("Livy").is_none());
    }

    #[test]
    fn test_predict() {
        let model = NearestCentroid::fit(&training_set()).unwrap();
        assert_eq!(model.predict(&DVector::from_row_slice(&[2.5, 0.5])), "Seneca");
        assert_eq!(model.predict(&DVector::from_row_slice(&[0.0, 3.0])), "Cicero");
        assert_eq!(
            model.predict_all(&training_set()),
            vec!["Seneca", "Seneca", "Cicero"]
        );
    }

    #[test]
    fn test_try_predict_checks_dimension() {
        let model = NearestCentroid::fit(&training_set()).unwrap();
        assert_eq!(
            model.try_predict(&DVector::from_row_slice(&[2.5, 0.5])).unwrap(),
            "Seneca"
        );
        let err = model
            .try_predict(&DVector::from_row_slice(&[1.0, 0.0, 0.0]))
            .unwrap_err();
        assert!(matches!(err, StylometerError::Dimensionality(_)));
    }

    #[test]
    #[should_panic]
    fn test_predict_panics_on_dimension_mismatch() {
        let model = NearestCentroid::fit(&training_set()).unwrap();
        model.predict(&DVector::from_row_slice(&[1.0]));
    }

    #[test]
    fn test_centroids_predict_themselves() {
        let model = NearestCentroid::fit(&training_set()).unwrap();
        for label in model.classes() {
            let centroid = model.centroid(label).unwrap();
            assert_eq!(model.predict(&centroid), label);
        }
    }

    #[test]
    fn test_tie_breaks_to_first_class() {
        let model = NearestCentroid::fit(&[
            sample("b", "B", &[1.0, 0.0]),
            sample("a", "A", &[-1.0, 0.0]),
        ])
        .unwrap();
        assert_eq!(model.predict(&DVector::from_row_slice(&[0.0, 5.0])), "A");
    }

    #[test]
    fn test_single_label_rejected() {
        let err = NearestCentroid::fit(&[
            sample("a", "A", &[1.0]),
            sample("b", "A", &[2.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, StylometerError::EmptyCorpus(_)));

        assert!(NearestCentroid::fit(&[]).is_err());
    }

    #[test]
    fn test_mismatched_dimensions() {
        let err = NearestCentroid::fit(&[
            sample("a", "A", &[1.0, 2.0]),
            sample("b", "B", &[2.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, StylometerError::Dimensionality(_)));
    }
}
