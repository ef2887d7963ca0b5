//! Character n-gram analyzer.

use regex::Regex;

use crate::analysis::Analyzer;
use crate::error::{Result, StylometerError};

/// An analyzer that emits character n-grams.
///
/// Text is optionally lowercased and every run of two or more whitespace
/// characters collapses to a single space before n-grams are generated, so
/// line wrapping and indentation do not leak into the profile.
///
/// # Examples
///
/// ```
/// use stylometer::analysis::{Analyzer, CharNgramAnalyzer};
///
/// let analyzer = CharNgramAnalyzer::new(2, 3).unwrap();
/// assert_eq!(analyzer.analyze("abc"), vec!["ab", "abc", "bc"]);
/// ```
#[derive(Clone, Debug)]
pub struct CharNgramAnalyzer {
    /// Minimum n-gram size
    min_gram: usize,
    /// Maximum n-gram size
    max_gram: usize,
    lowercase: bool,
    whitespace: Regex,
}

impl CharNgramAnalyzer {
    /// Create a new lowercasing n-gram analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_gram` is 0 or `max_gram` is less than `min_gram`.
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self> {
        if min_gram == 0 {
            return Err(StylometerError::invalid_config(
                "min_gram must be at least 1",
            ));
        }
        if max_gram < min_gram {
            return Err(StylometerError::invalid_config(format!(
                "max_gram ({max_gram}) must be >= min_gram ({min_gram})"
            )));
        }
        let whitespace =
            Regex::new(r"\s\s+").map_err(|e| StylometerError::other(e.to_string()))?;
        Ok(Self {
            min_gram,
            max_gram,
            lowercase: true,
            whitespace,
        })
    }

    /// Keep the original casing.
    pub fn preserve_case(mut self) -> Self {
        self.lowercase = false;
        self
    }

    pub fn range(&self) -> (usize, usize) {
        (self.min_gram, self.max_gram)
    }

    fn normalize(&self, text: &str) -> String {
        let collapsed = self.whitespace.replace_all(text, " ");
        if self.lowercase {
            collapsed.to_lowercase()
        } else {
            collapsed.into_owned()
        }
    }
}

impl Analyzer for CharNgramAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        let normalized = self.normalize(text);
        let chars: Vec<char> = normalized.chars().collect();
        let mut grams = Vec::new();

        for start in 0..chars.len() {
            for gram_size in self.min_gram..=self.max_gram {
                let end = start + gram_size;
                if end > chars.len() {
                    break;
                }
                grams.push(chars[start..end].iter().collect());
            }
        }

        grams
    }

    fn name(&self) -> &'static str {
        "char_ngram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ngram_creation() {
        assert!(CharNgramAnalyzer::new(2, 3).is_ok());
        assert!(CharNgramAnalyzer::new(0, 2).is_err());
        assert!(CharNgramAnalyzer::new(3, 2).is_err());
    }

    #[test]
    fn test_bigram() {
        let analyzer = CharNgramAnalyzer::new(2, 2).unwrap();
        assert_eq!(analyzer.analyze("hello"), vec!["he", "el", "ll", "lo"]);
    }

    #[test]
    fn test_variable_ngram() {
        let analyzer = CharNgramAnalyzer::new(2, 3).unwrap();
        assert_eq!(analyzer.analyze("abc"), vec!["ab", "abc", "bc"]);
    }

    #[test]
    fn test_lowercase_and_whitespace() {
        let analyzer = CharNgramAnalyzer::new(3, 3).unwrap();
        assert_eq!(analyzer.analyze("A \n\t B"), vec!["a b"]);

        let analyzer = CharNgramAnalyzer::new(1, 1).unwrap().preserve_case();
        assert_eq!(analyzer.analyze("Ab"), vec!["A", "b"]);
    }

    #[test]
    fn test_unicode_support() {
        let analyzer = CharNgramAnalyzer::new(2, 2).unwrap();
        assert_eq!(analyzer.analyze("æther"), vec!["æt", "th", "he", "er"]);
    }

    #[test]
    fn test_short_text() {
        let analyzer = CharNgramAnalyzer::new(3, 5).unwrap();
        assert!(analyzer.analyze("ab").is_empty());
    }
}
