//! Distance of every document to every author centroid.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::nearest_centroid::argmin;
use crate::ml::{NearestCentroid, Sample};
use crate::report::finish_csv;

/// Decimal places shown for distances.
pub const DISPLAY_PRECISION: usize = 5;

/// One document's distances, aligned with [`DistanceTable::labels`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRow {
    pub name: String,
    pub label: String,
    pub nearest: String,
    pub distances: Vec<f64>,
}

impl DistanceRow {
    /// Column index of the smallest distance.
    pub fn nearest_index(&self) -> usize {
        argmin(&self.distances)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceTable {
    pub labels: Vec<String>,
    pub rows: Vec<DistanceRow>,
}

impl DistanceTable {
    /// One row per sample, in sample order.
    pub fn compute(samples: &[Sample], model: &NearestCentroid) -> Self {
        let labels = model.classes().to_vec();
        let rows = samples
            .iter()
            .map(|sample| {
                let distances = model.distances(&sample.vector);
                let nearest = labels[argmin(&distances)].clone();
                DistanceRow {
                    name: sample.name.clone(),
                    label: sample.label.clone(),
                    nearest,
                    distances,
                }
            })
            .collect();
        Self { labels, rows }
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = vec![
            "text".to_string(),
            "author".to_string(),
            "nearest".to_string(),
        ];
        header.extend(self.labels.iter().map(|l| format!("distance_{l}")));
        header
    }

    /// CSV export, distances rounded to [`DISPLAY_PRECISION`] places.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.header())?;
        for row in &self.rows {
            let mut record = vec![row.name.clone(), row.label.clone(), row.nearest.clone()];
            record.extend(
                row.distances
                    .iter()
                    .map(|d| format!("{d:.DISPLAY_PRECISION$}")),
            );
            writer.write_record(&record)?;
        }
        finish_csv(writer)
    }

    /// Aligned plain-text table; the row minimum is marked with `*`.
    pub fn to_text(&self) -> String {
        let header = self.header();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let best = row.nearest_index();
                let mut cells = vec![row.name.clone(), row.label.clone(), row.nearest.clone()];
                cells.extend(row.distances.iter().enumerate().map(|(i, d)| {
                    let marker = if i == best { "*" } else { " " };
                    format!("{d:.DISPLAY_PRECISION$}{marker}")
                }));
                cells
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|c| {
                cells
                    .iter()
                    .map(|row| row[c].chars().count())
                    .chain(std::iter::once(header[c].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let mut write_line = |values: &[String]| {
            let line: Vec<String> = values
                .iter()
                .zip(&widths)
                .map(|(v, &w)| format!("{v:<w$}"))
                .collect();
            let _ = writeln!(out, "{}", line.join("  ").trim_end());
        };
        write_line(header.as_slice());
        for row in &cells {
            write_line(row.as_slice());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn samples() -> Vec<Sample> {
        vec![
            Sample::new("Seneca_A", "Seneca", DVector::from_row_slice(&[1.0, 0.0])),
            Sample::new("Seneca_B", "Seneca", DVector::from_row_slice(&[3.0, 0.0])),
            Sample::new("Cicero_C", "Cicero", DVector::from_row_slice(&[0.0, 4.0])),
            Sample::new("Cicero_D", "Cicero", DVector::from_row_slice(&[1.5, 0.5])),
        ]
    }

    #[test]
    fn test_rows_follow_samples_and_match_predictions() {
        let samples = samples();
        let model = NearestCentroid::fit(&samples).unwrap();
        let table = DistanceTable::compute(&samples, &model);

        assert_eq!(table.labels, vec!["Cicero", "Seneca"]);
        assert_eq!(table.rows.len(), samples.len());
        for (row, sample) in table.rows.iter().zip(&samples) {
            assert_eq!(row.name, sample.name);
            assert_eq!(row.label, sample.label);
            assert_eq!(row.nearest, model.predict(&sample.vector));
            assert_eq!(row.nearest, table.labels[row.nearest_index()]);
        }
        assert_eq!(table.rows[3].nearest, "Seneca");
    }

    #[test]
    fn test_distances_are_euclidean() {
        let samples = samples();
        let model = NearestCentroid::fit(&samples).unwrap();
        let table = DistanceTable::compute(&samples, &model);

        // Seneca centroid is (2, 0).
        assert!((table.rows[0].distances[1] - 1.0).abs() < 1e-12);
        // Cicero centroid is (0.75, 2.25).
        let expected = ((1.0f64 - 0.75).powi(2) + 2.25f64.powi(2)).sqrt();
        assert!((table.rows[0].distances[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_csv_export() {
        let samples = samples();
        let model = NearestCentroid::fit(&samples).unwrap();
        let csv = DistanceTable::compute(&samples, &model).to_csv().unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "text,author,nearest,distance_Cicero,distance_Seneca"
        );
        let first: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(first[0], "Seneca_A");
        assert_eq!(first[2], "Seneca");
        assert_eq!(first[4], "1.00000");
        assert_eq!(csv.lines().count(), 5);
    }

    #[test]
    fn test_text_marks_minimum() {
        let samples = samples();
        let model = NearestCentroid::fit(&samples).unwrap();
        let text = DistanceTable::compute(&samples, &model).to_text();
        let seneca_a = text.lines().nth(1).unwrap();
        assert!(seneca_a.starts_with("Seneca_A"));
        assert!(seneca_a.ends_with("1.00000*"));
    }

    #[test]
    fn test_csv_quotes_names_with_commas() {
        let samples = vec![
            Sample::new("Cicero_In Verrem, II", "Cicero", DVector::from_row_slice(&[0.0])),
            Sample::new("Seneca_\"De ira\"", "Seneca", DVector::from_row_slice(&[1.0])),
        ];
        let model = NearestCentroid::fit(&samples).unwrap();
        let csv = DistanceTable::compute(&samples, &model).to_csv().unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), 5);
        assert_eq!(&records[0][0], "Cicero_In Verrem, II");
        assert_eq!(&records[1][0], "Seneca_\"De ira\"");
    }
}
