//! End-to-end analysis: corpus to features, classifier, evaluation,
//! distance table and projections, plus writing the report directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::FeatureExtractor;
use crate::config::AnalysisConfig;
use crate::corpus::{Corpus, Document};
use crate::error::Result;
use crate::ml::{Evaluation, NearestCentroid, Sample};
use crate::projection::Projections;
use crate::report::{DistanceTable, render_confusion_matrix, render_scatter};
use crate::session::Session;

pub const CONFUSION_MATRIX_FILE: &str = "confusion_matrix.svg";
pub const TSNE_FILE: &str = "tsne.svg";
pub const UMAP_FILE: &str = "umap.svg";
pub const DISTANCES_FILE: &str = "distances.csv";
pub const REPORT_FILE: &str = "report.json";

/// Runs the analysis stages in order with one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
    projections: bool,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            projections: true,
        })
    }

    /// Skip t-SNE and UMAP.
    pub fn without_projections(mut self) -> Self {
        self.projections = false;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the session's corpus and analyse it.
    pub fn run_session(&self, session: &Session) -> Result<AnalysisReport> {
        let corpus = session.load_corpus(&self.config)?;
        self.run(&corpus, Some(session.id()))
    }

    pub fn run(&self, corpus: &Corpus, session_id: Option<Uuid>) -> Result<AnalysisReport> {
        corpus.ensure_trainable()?;
        info!(
            "Analysing {} documents by {} authors",
            corpus.len(),
            corpus.labels().len()
        );

        let features = FeatureExtractor::from_config(&self.config)?.extract(&corpus.texts())?;
        let samples = Sample::from_corpus(corpus, &features.matrix)?;

        let model = NearestCentroid::fit(&samples)?;
        let predictions = model.predict_all(&samples);
        let truth: Vec<&str> = samples.iter().map(|s| s.label.as_str()).collect();
        let names: Vec<String> = samples.iter().map(|s| s.name.clone()).collect();
        let evaluation = Evaluation::compute(model.classes(), &truth, &predictions, &names)?;
        info!(
            "Training accuracy {:.3} ({} misclassified)",
            evaluation.accuracy,
            evaluation.confusion.off_diagonal()
        );

        let distances = DistanceTable::compute(&samples, &model);

        let projections = if self.projections {
            Some(Projections::compute(&features.matrix, &self.config)?)
        } else {
            None
        };

        Ok(AnalysisReport {
            generated_at: Utc::now(),
            session_id,
            config: self.config.clone(),
            documents: corpus.documents().to_vec(),
            label_counts: corpus.label_counts(),
            vocabulary_size: features.vocabulary_size,
            explained_variance_ratio: features.explained_variance_ratio,
            model,
            predictions,
            evaluation,
            distances,
            projections,
        })
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub session_id: Option<Uuid>,
    pub config: AnalysisConfig,
    pub documents: Vec<Document>,
    pub label_counts: BTreeMap<String, usize>,
    pub vocabulary_size: usize,
    pub explained_variance_ratio: Vec<f64>,
    pub model: NearestCentroid,
    /// Predicted label per document, in document order.
    pub predictions: Vec<String>,
    pub evaluation: Evaluation,
    pub distances: DistanceTable,
    pub projections: Option<Projections>,
}

impl AnalysisReport {
    pub fn names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.label.clone()).collect()
    }

    /// Write the report files into `dir`, creating it if needed, and return
    /// the paths written.
    pub fn write_outputs<P: AsRef<Path>>(&self, dir: P, render_plots: bool) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let csv = dir.join(DISTANCES_FILE);
        fs::write(&csv, self.distances.to_csv()?)?;
        written.push(csv);

        let json = dir.join(REPORT_FILE);
        fs::write(&json, serde_json::to_string_pretty(self)?)?;
        written.push(json);

        if render_plots {
            let confusion = dir.join(CONFUSION_MATRIX_FILE);
            render_confusion_matrix(&self.evaluation.confusion, &confusion)?;
            written.push(confusion);

            if let Some(projections) = &self.projections {
                let (labels, names) = (self.labels(), self.names());
                let point_size = self.config.point_size;

                let tsne = dir.join(TSNE_FILE);
                let title = format!("t-SNE (perplexity {})", projections.perplexity);
                render_scatter(&title, &projections.tsne, &labels, &names, point_size, &tsne)?;
                written.push(tsne);

                let umap = dir.join(UMAP_FILE);
                let title = format!("UMAP ({} neighbours)", projections.n_neighbors);
                render_scatter(&title, &projections.umap, &labels, &names, point_size, &umap)?;
                written.push(umap);
            }
        }

        info!("Wrote {} report files to {}", written.len(), dir.display());
        Ok(written)
    }
}
