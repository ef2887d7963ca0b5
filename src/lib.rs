//! # Stylometer
//!
//! Author attribution from character n-gram profiles.
//!
//! ## Features
//!
//! - Zip archives of `<Author>_<title>.txt` files, extracted per session
//! - Character n-gram TF-IDF reduced with a truncated SVD
//! - Nearest-centroid classification with a confusion matrix
//! - t-SNE and UMAP projections rendered as SVG
//! - Distance of every text to every author centroid

pub mod analysis;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod ml;
pub mod pipeline;
pub mod projection;
pub mod report;
pub mod session;

pub mod prelude {
    pub use crate::config::{AnalysisConfig, LabelPolicy};
    pub use crate::corpus::{Corpus, Document};
    pub use crate::error::{Result, StylometerError};
    pub use crate::pipeline::{AnalysisReport, Pipeline};
    pub use crate::session::Session;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
