//! Core types shared across the dupe workspace.
//!
//! This crate holds the plain data that crosses crate boundaries:
//!
//! - **Records**: one social post with its optional category labels
//! - **Frequency rows**: `(token, count)` pairs with a ranking order
//! - **Configuration**: every policy constant the pipeline uses
//! - **Errors**: input-shape failures surfaced to the caller
//!
//! Statistical degeneracy (empty groups, non-identifiable regressions) is
//! deliberately *not* an error here; `dupe-core` models those as values.

#![warn(missing_docs)]

use core::cmp::Ordering;
use core::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A normalized word unit produced by segmentation.
///
/// Tokens are recomputed from text and never persisted on their own.
pub type Token = String;

/// One social post.
///
/// Every field is optional because the source table may carry empty cells.
/// An absent `text` normalizes to the empty string; absent labels exclude
/// the record from statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Raw post text.
    pub text: Option<String>,
    /// Group label (e.g. the motivation category).
    pub group: Option<String>,
    /// Outcome label (e.g. the purchase-intent category).
    pub outcome: Option<String>,
}

impl Record {
    /// Creates an unlabeled record carrying only text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Creates a record with labels but no text.
    pub fn labeled(group: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            text: None,
            group: Some(group.into()),
            outcome: Some(outcome.into()),
        }
    }

    /// Attaches group and outcome labels.
    #[must_use]
    pub fn with_labels(mut self, group: impl Into<String>, outcome: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self.outcome = Some(outcome.into());
        self
    }
}

/// A single row of the ranked frequency table.
///
/// Rows order by count (higher = greater). Equal counts fall back to the
/// token in *reverse* lexical order, so sorting descending lists equal
/// counts alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRow {
    /// The token text.
    pub token: Token,
    /// Number of occurrences across all records.
    pub count: u64,
}

impl FrequencyRow {
    /// Creates a new frequency row.
    pub fn new(token: impl Into<Token>, count: u64) -> Self {
        Self {
            token: token.into(),
            count,
        }
    }
}

impl PartialOrd for FrequencyRow {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrequencyRow {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        match self.count.cmp(&other.count) {
            Ordering::Equal => other.token.cmp(&self.token),
            ord => ord,
        }
    }
}

impl fmt::Display for FrequencyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.token, self.count)
    }
}

/// Stopwords used when no override is configured.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "的", "了", "是", "也", "在", "有", "和", "跟", "就", "會", "其實", "真的",
];

/// Domain terms forced atomic during segmentation, lowercase.
pub const DEFAULT_CUSTOM_TERMS: &[&str] = &["cp值", "dupe", "fomo", "平替"];

/// Analysis policy: thresholds, vocabularies and column names.
///
/// Deserializes from JSON; every field is optional and falls back to its
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Tokens with fewer occurrences are dropped from the frequency table.
    pub min_freq: u64,
    /// Tokens excluded after segmentation.
    pub stopwords: Vec<String>,
    /// Terms registered with the segmenter as atomic.
    pub custom_terms: Vec<String>,
    /// Significance threshold for the association test.
    pub alpha: f64,
    /// Column holding the post text.
    pub text_column: String,
    /// Column holding the group label.
    pub group_column: String,
    /// Column holding the outcome label.
    pub outcome_column: String,
    /// Group coded 0 in the regression.
    pub baseline_group: String,
    /// Group coded 1 in the regression.
    pub comparison_group: String,
    /// Outcome values recoded as positive.
    pub positive_outcomes: Vec<String>,
    /// Rows shown by console listings of the frequency table.
    pub top_n: usize,
    /// User dictionary loaded on top of the built-in ones.
    pub dictionary: Option<PathBuf>,
    /// Let the segmenter discover words missing from its dictionaries.
    pub hmm: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_freq: 3,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            custom_terms: DEFAULT_CUSTOM_TERMS.iter().map(|s| s.to_string()).collect(),
            alpha: 0.05,
            text_column: "text".to_string(),
            group_column: "motivation_type".to_string(),
            outcome_column: "purchase_intent".to_string(),
            baseline_group: "utilitarian".to_string(),
            comparison_group: "hedonic".to_string(),
            positive_outcomes: vec!["weak".to_string(), "strong".to_string()],
            top_n: 20,
            dictionary: None,
            hmm: true,
        }
    }
}

impl AnalysisConfig {
    /// Loads a configuration from a JSON file, filling absent fields with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the file cannot be read and
    /// `PipelineError::Json` if it is not a valid configuration object.
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io("read config", path, e))?;
        serde_json::from_str(&data).map_err(|e| PipelineError::json("parse config", e))
    }

    /// Checks that the policy values are usable.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfig` describing the first problem.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(PipelineError::invalid_config(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.min_freq == 0 {
            return Err(PipelineError::invalid_config("min_freq must be at least 1"));
        }
        let baseline = self.baseline_group.trim().to_lowercase();
        let comparison = self.comparison_group.trim().to_lowercase();
        if baseline.is_empty() || comparison.is_empty() {
            return Err(PipelineError::invalid_config("group labels must not be empty"));
        }
        if baseline == comparison {
            return Err(PipelineError::invalid_config(format!(
                "baseline and comparison groups are both '{baseline}'"
            )));
        }
        if self.positive_outcomes.iter().all(|o| o.trim().is_empty()) {
            return Err(PipelineError::invalid_config(
                "positive_outcomes must name at least one value",
            ));
        }
        Ok(())
    }
}

/// Failures that stop a run: unreadable sources and malformed inputs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Filesystem failure.
    #[error("I/O error while {context} ({}): {source}", path.display())]
    Io {
        /// What was being attempted.
        context: &'static str,
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// CSV read/write failure.
    #[error("CSV error while {context}: {source}")]
    Csv {
        /// What was being attempted.
        context: &'static str,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
    /// JSON encode/decode failure.
    #[error("JSON error while {context}: {source}")]
    Json {
        /// What was being attempted.
        context: &'static str,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A required column is absent from the table header.
    #[error("missing required column '{column}' (available: {})", available.join(", "))]
    MissingColumn {
        /// The column that was requested.
        column: String,
        /// Columns actually present.
        available: Vec<String>,
    },
    /// A dictionary line could not be parsed.
    #[error("dictionary line {line}: {message}")]
    Dictionary {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },
    /// A configuration value is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },
}

impl PipelineError {
    /// Wraps an I/O error with the attempted action and the file path.
    pub fn io(context: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wraps a CSV error.
    pub fn csv(context: &'static str, source: csv::Error) -> Self {
        Self::Csv { context, source }
    }

    /// Wraps a JSON error.
    pub fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    /// Builds a missing-column error from the requested name and the header.
    pub fn missing_column<'a>(
        column: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::MissingColumn {
            column: column.into(),
            available: available.into_iter().map(str::to_string).collect(),
        }
    }

    /// Builds a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_row_ordering() {
        let a = FrequencyRow::new("平替", 9);
        let b = FrequencyRow::new("好用", 4);
        let c = FrequencyRow::new("便宜", 9);

        assert!(a > b);
        assert_ne!(a, c);

        // Equal counts: earlier token ranks higher.
        assert!(c > a);
    }

    #[test]
    fn descending_sort_is_count_then_token() {
        let mut rows = vec![
            FrequencyRow::new("b", 2),
            FrequencyRow::new("c", 5),
            FrequencyRow::new("a", 2),
        ];
        rows.sort_by(|x, y| y.cmp(x));
        let tokens: Vec<&str> = rows.iter().map(|r| r.token.as_str()).collect();
        assert_eq!(tokens, ["c", "a", "b"]);
    }

    #[test]
    fn record_constructors() {
        let r = Record::new("hello").with_labels("hedonic", "weak");
        assert_eq!(r.text.as_deref(), Some("hello"));
        assert_eq!(r.group.as_deref(), Some("hedonic"));

        let l = Record::labeled("utilitarian", "none");
        assert!(l.text.is_none());
        assert_eq!(l.outcome.as_deref(), Some("none"));
    }

    #[test]
    fn default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_freq, 3);
        assert_eq!(config.alpha, 0.05);
        assert!(config.hmm);
        assert!(config.custom_terms.iter().any(|t| t == "cp值"));
        assert!(config.stopwords.iter().any(|t| t == "真的"));
    }

    #[test]
    fn config_rejects_bad_alpha() {
        let config = AnalysisConfig {
            alpha: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn config_rejects_identical_groups() {
        let config = AnalysisConfig {
            baseline_group: "Hedonic ".to_string(),
            comparison_group: "hedonic".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_zero_min_freq() {
        let config = AnalysisConfig {
            min_freq: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "min_freq": 1, "alpha": 0.01 }"#).unwrap();

        let config = AnalysisConfig::from_json_file(&path).unwrap();
        assert_eq!(config.min_freq, 1);
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.text_column, "text");
    }

    #[test]
    fn config_unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "min_frequency": 1 }"#).unwrap();

        assert!(matches!(
            AnalysisConfig::from_json_file(&path),
            Err(PipelineError::Json { .. })
        ));
    }

    #[test]
    fn config_missing_file_names_path() {
        let err = AnalysisConfig::from_json_file(Path::new("/no/such/config.json")).unwrap_err();
        assert!(err.to_string().contains("/no/such/config.json"));
    }

    #[test]
    fn missing_column_lists_header() {
        let err = PipelineError::missing_column("text", ["id", "body"]);
        let msg = err.to_string();
        assert!(msg.contains("'text'"));
        assert!(msg.contains("id, body"));
    }
}
