//! TF-IDF vectorizer producing sparse, L2-normalised document rows.

use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::Analyzer;

/// A sparse row: column indices in increasing order with their weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseRow {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Dot product with another row, merging the sorted index lists.
    pub fn dot(&self, other: &SparseRow) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// TF-IDF vectorizer for text feature extraction.
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> column index, columns in lexicographic term order.
    vocabulary: AHashMap<String, usize>,
    /// Inverse document frequency for each column.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create a new TF-IDF vectorizer with the specified analyzer.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            vocabulary: AHashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            analyzer,
        }
    }

    /// Fit the vocabulary and IDF weights on `documents`, then return their
    /// weighted rows in input order.
    pub fn fit_transform(&mut self, documents: &[&str]) -> Vec<SparseRow> {
        self.n_documents = documents.len();

        let counts: Vec<AHashMap<String, usize>> = documents
            .iter()
            .map(|doc| self.count_terms(doc))
            .collect();

        let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();
        for doc_counts in &counts {
            for term in doc_counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<&str> = document_frequency.keys().copied().collect();
        terms.sort_unstable();

        // IDF = ln((N + 1) / (df + 1)) + 1
        let n = self.n_documents as f64;
        self.idf = terms
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((n + 1.0) / (df + 1.0)).ln() + 1.0
            })
            .collect();
        self.vocabulary = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        counts.iter().map(|c| self.weigh(c)).collect()
    }

    /// Weigh a document against the fitted vocabulary. Unknown terms are dropped.
    pub fn transform(&self, document: &str) -> SparseRow {
        self.weigh(&self.count_terms(document))
    }

    fn count_terms(&self, document: &str) -> AHashMap<String, usize> {
        let mut counts = AHashMap::new();
        for gram in self.analyzer.analyze(document) {
            *counts.entry(gram).or_insert(0) += 1;
        }
        counts
    }

    fn weigh(&self, counts: &AHashMap<String, usize>) -> SparseRow {
        let mut entries: Vec<(usize, f64)> = counts
            .iter()
            .filter_map(|(term, &tf)| {
                self.vocabulary
                    .get(term)
                    .map(|&idx| (idx, tf as f64 * self.idf[idx]))
            })
            .collect();
        entries.sort_unstable_by_key(|(idx, _)| *idx);

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut entries {
                *v /= norm;
            }
        }

        let (indices, values) = entries.into_iter().unzip();
        SparseRow { indices, values }
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&idx| self.idf[idx])
    }
}
