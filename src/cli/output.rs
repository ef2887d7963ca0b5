//! Output formatting for CLI commands.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, StylometerArgs};
use crate::corpus::Document;
use crate::error::Result;
use crate::ml::{ConfusionMatrix, ConfusionRecord};
use crate::pipeline::AnalysisReport;
use crate::report::{DistanceTable, finish_csv};

/// A command result that can be printed in every [`OutputFormat`].
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_csv(&self) -> Result<String>;
}

/// Result structure for an analysis run.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub session_id: Option<String>,
    pub documents: usize,
    pub authors: usize,
    pub vocabulary_size: usize,
    pub components: usize,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub misclassified: Vec<ConfusionRecord>,
    pub distances: DistanceTable,
    pub perplexity: Option<f64>,
    pub n_neighbors: Option<usize>,
    pub files: Vec<String>,
}

impl AnalysisSummary {
    pub fn from_report(report: &AnalysisReport, files: Vec<String>) -> Self {
        Self {
            session_id: report.session_id.map(|id| id.to_string()),
            documents: report.documents.len(),
            authors: report.label_counts.len(),
            vocabulary_size: report.vocabulary_size,
            components: report.explained_variance_ratio.len(),
            accuracy: report.evaluation.accuracy,
            confusion: report.evaluation.confusion.clone(),
            misclassified: report.evaluation.misclassified.clone(),
            distances: report.distances.clone(),
            perplexity: report.projections.as_ref().map(|p| p.perplexity),
            n_neighbors: report.projections.as_ref().map(|p| p.n_neighbors),
            files,
        }
    }
}

impl CommandOutput for AnalysisSummary {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Documents: {}  Authors: {}  N-grams: {}  Components: {}",
            self.documents, self.authors, self.vocabulary_size, self.components
        );
        let _ = writeln!(out, "Accuracy: {:.3}", self.accuracy);
        if let (Some(perplexity), Some(k)) = (self.perplexity, self.n_neighbors) {
            let _ = writeln!(out, "t-SNE perplexity: {perplexity}  UMAP neighbours: {k}");
        }

        out.push_str("\nConfusion matrix (rows: true, columns: predicted)\n");
        out.push_str(&format_confusion(&self.confusion));

        out.push_str("\nMisclassified\n");
        if self.misclassified.is_empty() {
            out.push_str("  none\n");
        }
        for record in &self.misclassified {
            let _ = writeln!(
                out,
                "  {} -> {}: {}",
                record.true_label,
                record.predicted_label,
                record.documents.join(", ")
            );
        }

        out.push_str("\nDistance to each author centroid (* nearest)\n");
        out.push_str(&self.distances.to_text());

        if !self.files.is_empty() {
            out.push_str("\nWrote\n");
            for file in &self.files {
                let _ = writeln!(out, "  {file}");
            }
        }
        out
    }

    fn to_csv(&self) -> Result<String> {
        self.distances.to_csv()
    }
}

/// Result structure for input inspection.
#[derive(Debug, Serialize, Deserialize)]
pub struct InspectionResult {
    pub documents: Vec<Document>,
    pub label_counts: BTreeMap<String, usize>,
}

impl CommandOutput for InspectionResult {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} documents, {} authors",
            self.documents.len(),
            self.label_counts.len()
        );
        for (label, count) in &self.label_counts {
            let _ = writeln!(out, "  {label}: {count}");
        }
        out.push('\n');
        let width = self
            .documents
            .iter()
            .map(|d| d.name.chars().count())
            .max()
            .unwrap_or(0);
        for doc in &self.documents {
            let _ = writeln!(out, "{:<width$}  {}", doc.name, doc.label);
        }
        out
    }

    fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["text", "author"])?;
        for doc in &self.documents {
            writer.write_record([&doc.name, &doc.label])?;
        }
        finish_csv(writer)
    }
}

/// Output a result in the specified format.
pub fn output_result<T: CommandOutput>(
    message: &str,
    result: &T,
    args: &StylometerArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            print!("{}", result.to_human());
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{json}");
        }
        OutputFormat::Csv => print!("{}", result.to_csv()?),
    }
    Ok(())
}

/// Plain-text confusion matrix with right-aligned counts.
pub fn format_confusion(matrix: &ConfusionMatrix) -> String {
    let label_width = matrix
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let cell = matrix
        .labels
        .iter()
        .map(|l| l.chars().count())
        .chain(matrix.counts.iter().flatten().map(|c| c.to_string().len()))
        .max()
        .unwrap_or(1);

    let mut out = format!("{:label_width$}", "");
    for label in &matrix.labels {
        let _ = write!(out, "  {label:>cell$}");
    }
    out.push('\n');
    for (label, row) in matrix.labels.iter().zip(&matrix.counts) {
        let _ = write!(out, "{label:<label_width$}");
        for count in row {
            let _ = write!(out, "  {count:>cell$}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_confusion() {
        let matrix = ConfusionMatrix {
            labels: vec!["Cicero".to_string(), "Seneca".to_string()],
            counts: vec![vec![2, 1], vec![0, 3]],
        };
        let text = format_confusion(&matrix);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "        Cicero  Seneca");
        assert_eq!(lines[1], "Cicero       2       1");
        assert_eq!(lines[2], "Seneca       0       3");
    }

    #[test]
    fn test_inspection_csv() {
        let result = InspectionResult {
            documents: vec![
                Document::new("Cicero_1", "Cicero", "x"),
                Document::new("notes", "unknown", "y"),
            ],
            label_counts: BTreeMap::from([
                ("Cicero".to_string(), 1),
                ("unknown".to_string(), 1),
            ]),
        };
        assert_eq!(
            result.to_csv().unwrap(),
            "text,author\nCicero_1,Cicero\nnotes,unknown\n"
        );
        assert!(result.to_human().starts_with("2 documents, 2 authors"));
    }

    #[test]
    fn test_inspection_csv_quotes_commas() {
        let result = InspectionResult {
            documents: vec![Document::new("Cicero_In Verrem, II", "Cicero", "x")],
            label_counts: BTreeMap::from([("Cicero".to_string(), 1)]),
        };
        let csv = result.to_csv().unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(&rows[0][0], "Cicero_In Verrem, II");
        assert_eq!(&rows[0][1], "Cicero");
    }
}
