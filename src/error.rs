//! Error types for the Stylometer library.
//!
//! Every fallible operation in the crate returns [`Result`], whose error type
//! is [`StylometerError`]. None of these errors are transient: each one points
//! at malformed input or configuration, so callers abort the run and surface
//! the message instead of retrying.
//!
//! # Examples
//!
//! ```
//! use stylometer::error::{Result, StylometerError};
//!
//! fn check_corpus(documents: usize) -> Result<()> {
//!     if documents < 2 {
//!         return Err(StylometerError::empty_corpus("need at least 2 documents"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_corpus(1).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Stylometer operations.
#[derive(Error, Debug)]
pub enum StylometerError {
    /// I/O errors (reading texts, writing reports, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Archive could not be opened or decompressed.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// CSV writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is missing, not an archive, or holds no text files.
    #[error("Input format error: {0}")]
    InputFormat(String),

    /// A file name does not carry an author label.
    #[error("Labeling ambiguity: {0}")]
    LabelingAmbiguity(String),

    /// Requested reduction rank cannot be satisfied by the corpus.
    #[error("Dimensionality error: {0}")]
    Dimensionality(String),

    /// Not enough documents or labels to fit a classifier.
    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    /// Configuration values out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Plot rendering errors
    #[error("Render error: {0}")]
    Render(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with StylometerError.
pub type Result<T> = std::result::Result<T, StylometerError>;

impl StylometerError {
    /// Create a new input format error.
    pub fn input_format<S: Into<String>>(msg: S) -> Self {
        StylometerError::InputFormat(msg.into())
    }

    /// Create a new labeling ambiguity error.
    pub fn labeling_ambiguity<S: Into<String>>(msg: S) -> Self {
        StylometerError::LabelingAmbiguity(msg.into())
    }

    /// Create a new dimensionality error.
    pub fn dimensionality<S: Into<String>>(msg: S) -> Self {
        StylometerError::Dimensionality(msg.into())
    }

    /// Create a new empty corpus error.
    pub fn empty_corpus<S: Into<String>>(msg: S) -> Self {
        StylometerError::EmptyCorpus(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        StylometerError::InvalidConfig(msg.into())
    }

    /// Create a new render error.
    pub fn render<S: Into<String>>(msg: S) -> Self {
        StylometerError::Render(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        StylometerError::Other(msg.into())
    }
}
