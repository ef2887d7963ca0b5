//! Analysis configuration.
//!
//! [`AnalysisConfig`] is collected once per run (from defaults, an optional
//! JSON file and CLI overrides) and applied to the whole pipeline.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StylometerError};

/// Bounds accepted for n-gram lengths.
pub const NGRAM_BOUNDS: (usize, usize) = (1, 10);

/// Bounds accepted for scatter point sizes.
pub const POINT_SIZE_BOUNDS: (u32, u32) = (1, 50);

/// What to do with a file whose name carries no author label.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPolicy {
    /// Map silently to the unknown label.
    Bucket,
    /// Map to the unknown label and log a warning per file.
    Warn,
    /// Fail the load.
    Reject,
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Shortest character n-gram.
    pub ngram_min: usize,
    /// Longest character n-gram (inclusive).
    pub ngram_max: usize,
    /// Scatter point radius in pixels.
    pub point_size: u32,
    /// Target rank of the truncated SVD.
    pub n_components: usize,
    /// Seed shared by every randomised step.
    pub random_state: u64,
    /// Upper bound for the t-SNE perplexity.
    pub perplexity_cap: f64,
    /// Upper bound for the UMAP neighbour count.
    pub neighbors_cap: usize,
    /// Handling of unlabeled file names.
    pub label_policy: LabelPolicy,
    /// Character separating the author from the rest of the file name.
    pub separator: char,
    /// Label assigned to unlabeled files.
    pub unknown_label: String,
    /// Lowercase texts before extracting n-grams.
    pub lowercase: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ngram_min: 2,
            ngram_max: 4,
            point_size: 12,
            n_components: 50,
            random_state: 42,
            perplexity_cap: 30.0,
            neighbors_cap: 15,
            label_policy: LabelPolicy::Warn,
            separator: '_',
            unknown_label: "unknown".to_string(),
            lowercase: true,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = NGRAM_BOUNDS;
        for (name, value) in [("ngram_min", self.ngram_min), ("ngram_max", self.ngram_max)] {
            if !(lo..=hi).contains(&value) {
                return Err(StylometerError::invalid_config(format!(
                    "{name} must be in [{lo}, {hi}], got {value}"
                )));
            }
        }
        if self.ngram_min > self.ngram_max {
            return Err(StylometerError::invalid_config(format!(
                "ngram_min ({}) must be <= ngram_max ({})",
                self.ngram_min, self.ngram_max
            )));
        }

        let (lo, hi) = POINT_SIZE_BOUNDS;
        if !(lo..=hi).contains(&self.point_size) {
            return Err(StylometerError::invalid_config(format!(
                "point_size must be in [{lo}, {hi}], got {}",
                self.point_size
            )));
        }
        if self.n_components == 0 {
            return Err(StylometerError::invalid_config(
                "n_components must be at least 1",
            ));
        }
        if self.perplexity_cap.is_nan() || self.perplexity_cap < 2.0 {
            return Err(StylometerError::invalid_config(
                "perplexity_cap must be at least 2",
            ));
        }
        if self.neighbors_cap < 2 {
            return Err(StylometerError::invalid_config(
                "neighbors_cap must be at least 2",
            ));
        }
        if self.unknown_label.is_empty() {
            return Err(StylometerError::invalid_config(
                "unknown_label must not be empty",
            ));
        }
        Ok(())
    }

    /// t-SNE perplexity for a corpus of `n` documents.
    pub fn perplexity_for(&self, n: usize) -> f64 {
        self.perplexity_cap.min((n / 3).max(2) as f64)
    }

    /// UMAP neighbour count for a corpus of `n` documents.
    pub fn neighbors_for(&self, n: usize) -> usize {
        self.neighbors_cap.min((n / 3).max(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ngram_min, 2);
        assert_eq!(config.ngram_max, 4);
        assert_eq!(config.point_size, 12);
    }

    #[test]
    fn test_inverted_ngram_range_rejected() {
        let config = AnalysisConfig {
            ngram_min: 5,
            ngram_max: 3,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, StylometerError::InvalidConfig(_)));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let config = AnalysisConfig {
            ngram_max: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            ngram_min: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            point_size: 51,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            n_components: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_locality_scaling() {
        let config = AnalysisConfig::default();

        assert_eq!(config.perplexity_for(2), 2.0);
        assert_eq!(config.perplexity_for(9), 3.0);
        assert_eq!(config.perplexity_for(300), 30.0);

        assert_eq!(config.neighbors_for(3), 2);
        assert_eq!(config.neighbors_for(30), 10);
        assert_eq!(config.neighbors_for(1000), 15);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"ngram_min": 3, "label_policy": "reject"}"#).unwrap();
        assert_eq!(config.ngram_min, 3);
        assert_eq!(config.ngram_max, 4);
        assert_eq!(config.label_policy, LabelPolicy::Reject);
        assert_eq!(config.unknown_label, "unknown");
    }
}
