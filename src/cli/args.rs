//! Command line argument parsing for the Stylometer CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, LabelPolicy};
use crate::error::Result;

/// Default directory for report files.
pub const DEFAULT_OUTPUT_DIR: &str = "stylometer-report";

/// Stylometer - author attribution from character n-gram profiles
#[derive(Parser, Debug, Clone)]
#[command(name = "stylometer")]
#[command(about = "Character n-gram stylometry over an archive of labeled texts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct StylometerArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl StylometerArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the full analysis and write the report directory
    Analyze(AnalyzeArgs),

    /// List the documents and labels found in an input
    Inspect(InspectArgs),
}

/// Arguments for a full analysis
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Zip archive of <Author>_<title>.txt files, or a directory of them
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Configuration file (JSON); flags below override its values
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Shortest character n-gram
    #[arg(long)]
    pub ngram_min: Option<usize>,

    /// Longest character n-gram
    #[arg(long)]
    pub ngram_max: Option<usize>,

    /// Scatter point radius in pixels
    #[arg(long)]
    pub point_size: Option<u32>,

    /// Number of SVD components
    #[arg(long)]
    pub components: Option<usize>,

    /// Random seed for the projections
    #[arg(long)]
    pub seed: Option<u64>,

    /// Handling of file names without an author label
    #[arg(long)]
    pub label_policy: Option<LabelPolicy>,

    /// Directory for the report files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Skip SVG rendering
    #[arg(long)]
    pub no_plots: bool,

    /// Skip t-SNE and UMAP
    #[arg(long)]
    pub no_projections: bool,
}

impl AnalyzeArgs {
    /// Defaults, then the config file, then flags; validated once.
    pub fn resolve_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(v) = self.ngram_min {
            config.ngram_min = v;
        }
        if let Some(v) = self.ngram_max {
            config.ngram_max = v;
        }
        if let Some(v) = self.point_size {
            config.point_size = v;
        }
        if let Some(v) = self.components {
            config.n_components = v;
        }
        if let Some(v) = self.seed {
            config.random_state = v;
        }
        if let Some(v) = self.label_policy {
            config.label_policy = v;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Arguments for inspecting an input
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Zip archive or directory
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Handling of file names without an author label
    #[arg(long, default_value = "warn")]
    pub label_policy: LabelPolicy,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}
