//! Confusion matrix and misclassification records.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StylometerError};

/// True-label x predicted-label counts; both axes follow `labels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    /// `counts[t][p]` documents of label `t` predicted as `p`.
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Count (true, predicted) pairs. Labels outside `labels` are an error.
    pub fn compute<T, P>(labels: &[String], truth: &[T], predicted: &[P]) -> Result<Self>
    where
        T: AsRef<str>,
        P: AsRef<str>,
    {
        if truth.len() != predicted.len() {
            return Err(StylometerError::other(format!(
                "{} true labels but {} predictions",
                truth.len(),
                predicted.len()
            )));
        }

        let index_of = |label: &str| {
            labels.iter().position(|l| l == label).ok_or_else(|| {
                StylometerError::other(format!("label {label:?} is not in the vocabulary"))
            })
        };

        let mut counts = vec![vec![0; labels.len()]; labels.len()];
        for (t, p) in truth.iter().zip(predicted) {
            counts[index_of(t.as_ref())?][index_of(p.as_ref())?] += 1;
        }

        Ok(Self {
            labels: labels.to_vec(),
            counts,
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }

    pub fn off_diagonal(&self) -> usize {
        self.total() - self.correct()
    }

    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct() as f64 / total as f64,
        }
    }

    /// Documents per true label.
    pub fn support(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }
}

/// Documents of `true_label` that were predicted as `predicted_label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionRecord {
    pub true_label: String,
    pub predicted_label: String,
    pub documents: Vec<String>,
}

/// Classifier evaluation over its own training set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    pub misclassified: Vec<ConfusionRecord>,
    pub accuracy: f64,
}

impl Evaluation {
    /// Build the confusion matrix and one record per non-empty off-diagonal
    /// cell, walking the cells in vocabulary order.
    pub fn compute<T, P>(
        labels: &[String],
        truth: &[T],
        predicted: &[P],
        names: &[String],
    ) -> Result<Self>
    where
        T: AsRef<str>,
        P: AsRef<str>,
    {
        if names.len() != truth.len() {
            return Err(StylometerError::other(format!(
                "{} names but {} labels",
                names.len(),
                truth.len()
            )));
        }
        let truth: Vec<&str> = truth.iter().map(AsRef::as_ref).collect();
        let predicted: Vec<&str> = predicted.iter().map(AsRef::as_ref).collect();
        let confusion = ConfusionMatrix::compute(labels, &truth, &predicted)?;

        let mut misclassified = Vec::new();
        for (i, true_label) in labels.iter().enumerate() {
            for (j, predicted_label) in labels.iter().enumerate() {
                if i == j || confusion.counts[i][j] == 0 {
                    continue;
                }
                let documents = names
                    .iter()
                    .zip(truth.iter().zip(&predicted))
                    .filter(|(_, (t, p))| {
                        **t == true_label.as_str() && **p == predicted_label.as_str()
                    })
                    .map(|(name, _)| name.clone())
                    .collect();
                misclassified.push(ConfusionRecord {
                    true_label: true_label.clone(),
                    predicted_label: predicted_label.clone(),
                    documents,
                });
            }
        }

        let accuracy = confusion.accuracy();
        Ok(Self {
            confusion,
            misclassified,
            accuracy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_confusion_matrix() {
        let vocab = labels(&["Cicero", "Seneca"]);
        let cm = ConfusionMatrix::compute(
            &vocab,
            &["Seneca", "Seneca", "Cicero"],
            &["Seneca", "Cicero", "Cicero"],
        )
        .unwrap();

        assert_eq!(cm.counts, vec![vec![1, 0], vec![1, 1]]);
        assert_eq!(cm.total(), 3);
        assert_eq!(cm.off_diagonal(), 1);
        assert_eq!(cm.support(), vec![1, 2]);
        assert!((cm.accuracy() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_label_is_error() {
        let vocab = labels(&["A", "B"]);
        assert!(ConfusionMatrix::compute(&vocab, &["A"], &["C"]).is_err());
        assert!(ConfusionMatrix::compute(&vocab, &["A"], &["A", "B"]).is_err());
    }

    #[test]
    fn test_records_partition_errors() {
        let vocab = labels(&["A", "B", "C"]);
        let truth = ["A", "A", "B", "C", "C", "A"];
        let predicted = ["B", "A", "A", "A", "B", "B"];
        let names = labels(&["a1", "a2", "b1", "c1", "c2", "a3"]);

        let eval = Evaluation::compute(&vocab, &truth, &predicted, &names).unwrap();

        assert_eq!(
            eval.misclassified,
            vec![
                ConfusionRecord {
                    true_label: "A".into(),
                    predicted_label: "B".into(),
                    documents: labels(&["a1", "a3"]),
                },
                ConfusionRecord {
                    true_label: "B".into(),
                    predicted_label: "A".into(),
                    documents: labels(&["b1"]),
                },
                ConfusionRecord {
                    true_label: "C".into(),
                    predicted_label: "A".into(),
                    documents: labels(&["c1"]),
                },
                ConfusionRecord {
                    true_label: "C".into(),
                    predicted_label: "B".into(),
                    documents: labels(&["c2"]),
                },
            ]
        );

        let listed: usize = eval.misclassified.iter().map(|r| r.documents.len()).sum();
        assert_eq!(listed, eval.confusion.off_diagonal());
    }

    #[test]
    fn test_perfect_classification_has_no_records() {
        let vocab = labels(&["A", "B"]);
        let eval =
            Evaluation::compute(&vocab, &["A", "B"], &["A", "B"], &labels(&["x", "y"])).unwrap();
        assert!(eval.misclassified.is_empty());
        assert_eq!(eval.accuracy, 1.0);
    }
}
