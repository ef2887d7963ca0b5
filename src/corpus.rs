//! Corpus loading.
//!
//! A corpus is the ordered list of labeled [`Document`]s found in a working
//! directory. The author label is the part of the file name before the first
//! separator; the display name is the file name without its extension.
//! Documents are sorted by file name so every downstream structure sees the
//! same row order on every run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, LabelPolicy};
use crate::error::{Result, StylometerError};

/// Extension of the files loaded as documents.
pub const TEXT_EXTENSION: &str = "txt";

/// One labeled text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Display name (file name without extension).
    pub name: String,
    /// Author label.
    pub label: String,
    /// Full text contents.
    #[serde(skip)]
    pub text: String,
}

impl Document {
    pub fn new<N, L, T>(name: N, label: L, text: T) -> Self
    where
        N: Into<String>,
        L: Into<String>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Ordered collection of documents.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Build a corpus from documents already in the desired order.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Load every `.txt` file directly inside `dir`.
    ///
    /// An unreadable file or invalid UTF-8 fails the whole load rather than
    /// dropping the file, so labels and rows can never drift apart.
    pub fn load<P: AsRef<Path>>(dir: P, config: &AnalysisConfig) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(StylometerError::input_format(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_text_file(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        if paths.is_empty() {
            return Err(StylometerError::input_format(format!(
                "no .{TEXT_EXTENSION} files found in {}",
                dir.display()
            )));
        }

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    StylometerError::input_format(format!(
                        "file name is not valid UTF-8: {}",
                        path.display()
                    ))
                })?
                .to_string();

            let bytes = fs::read(&path)?;
            let text = String::from_utf8(bytes).map_err(|e| {
                StylometerError::input_format(format!("{file_name} is not valid UTF-8: {e}"))
            })?;

            let label = resolve_label(&file_name, config)?;
            let name = display_name(&file_name);
            debug!("Loaded {name} ({} bytes) as {label}", text.len());
            documents.push(Document { name, label, text });
        }

        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.text.as_str()).collect()
    }

    /// Sorted distinct labels.
    pub fn labels(&self) -> Vec<String> {
        self.label_counts().into_keys().collect()
    }

    /// Number of documents per label.
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for doc in &self.documents {
            *counts.entry(doc.label.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Fail unless there are at least two documents and two distinct labels.
    pub fn ensure_trainable(&self) -> Result<()> {
        if self.documents.len() < 2 {
            return Err(StylometerError::empty_corpus(format!(
                "at least 2 documents are required, found {}",
                self.documents.len()
            )));
        }
        let labels = self.labels();
        if labels.len() < 2 {
            return Err(StylometerError::empty_corpus(format!(
                "at least 2 distinct authors are required, found {labels:?}"
            )));
        }
        Ok(())
    }
}

pub(crate) fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(TEXT_EXTENSION))
}

/// Author label encoded in `file_name`, or `None` when the name has no
/// separator or an empty prefix.
pub fn extract_label(file_name: &str, separator: char) -> Option<&str> {
    match file_name.split_once(separator) {
        Some((prefix, _)) if !prefix.is_empty() => Some(prefix),
        _ => None,
    }
}

/// File name without its last extension.
pub fn display_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string()
}

fn resolve_label(file_name: &str, config: &AnalysisConfig) -> Result<String> {
    if let Some(label) = extract_label(file_name, config.separator) {
        return Ok(label.to_string());
    }
    match config.label_policy {
        LabelPolicy::Bucket => Ok(config.unknown_label.clone()),
        LabelPolicy::Warn => {
            warn!(
                "{file_name} has no '{}' separator; labeling it as '{}'",
                config.separator, config.unknown_label
            );
            Ok(config.unknown_label.clone())
        }
        LabelPolicy::Reject => Err(StylometerError::labeling_ambiguity(format!(
            "{file_name} has no author prefix before '{}'",
            config.separator
        ))),
    }
}
