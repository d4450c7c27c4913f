//! Stopword set and word-list files.

use std::path::Path;

use dupe_types::{PipelineError, DEFAULT_STOPWORDS};
use rustc_hash::FxHashSet;

/// Immutable set of tokens excluded after segmentation.
///
/// Membership is exact string equality.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    words: FxHashSet<String>,
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS)
    }
}

impl StopwordSet {
    /// Builds a set from any list of words. Blank entries are skipped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// A set with no members.
    pub fn empty() -> Self {
        Self {
            words: FxHashSet::default(),
        }
    }

    /// Loads a word-list file.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        Ok(Self::new(read_word_list(path)?))
    }

    /// Whether `token` is a stopword.
    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Number of stopwords.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the set has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Reads one entry per line, skipping blanks and `#` comments.
///
/// # Errors
///
/// Returns `PipelineError::Io` if the file cannot be read.
pub fn read_word_list(path: &Path) -> Result<Vec<String>, PipelineError> {
    let text =
        std::fs::read_to_string(path).map_err(|e| PipelineError::io("read word list", path, e))?;
    Ok(text
        .lines()
        .map(|l| l.trim().trim_start_matches('\u{feff}'))
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_matches_constants() {
        let set = StopwordSet::default();
        assert_eq!(set.len(), DEFAULT_STOPWORDS.len());
        assert!(set.contains("的"));
        assert!(set.contains("其實"));
        assert!(!set.contains("平替"));
    }

    #[test]
    fn membership_is_exact() {
        let set = StopwordSet::new(["的"]);
        assert!(!set.contains("的的"));
        assert!(!set.contains(""));
    }

    #[test]
    fn blank_entries_skipped() {
        let set = StopwordSet::new(["", "  ", "了"]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn word_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        std::fs::write(&path, "\u{feff}的\n# particles\n\n了\n  嗎  \n").unwrap();

        let words = read_word_list(&path).unwrap();
        assert_eq!(words, ["的", "了", "嗎"]);

        let set = StopwordSet::from_file(&path).unwrap();
        assert!(set.contains("嗎"));
    }

    #[test]
    fn missing_word_list() {
        assert!(matches!(
            read_word_list(Path::new("/no/such/list.txt")),
            Err(PipelineError::Io { .. })
        ));
    }
}
