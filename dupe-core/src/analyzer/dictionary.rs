//! Word lists with frequencies for the segmentation engine.
//!
//! A [`Dictionary`] is an ordered set of entries. The segmenter either loads
//! it over its own vocabulary (user dictionaries) or uses it to fill words its
//! vocabulary lacks (the embedded Traditional Chinese lexicon).
//!
//! ## File Format
//!
//! One entry per line: `word [freq [tag]]`, separated by ASCII whitespace.
//! Blank lines and lines starting with `#` are ignored. An entry without a
//! frequency gets one suggested by the engine, just large enough to keep the
//! word whole. ASCII letters are folded to lowercase so entries line up with
//! normalized text.

use std::path::Path;

use dupe_types::PipelineError;
use rustc_hash::FxHashMap;

/// Lexicon compiled into the binary.
const EMBEDDED_LEXICON: &str = include_str!("../../data/base_dict.txt");

/// One dictionary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    /// The word, ASCII-lowercased.
    pub word: String,
    /// Corpus frequency; `None` asks the engine for a suggestion.
    pub freq: Option<u64>,
    /// Part-of-speech tag, kept for round trips.
    pub tag: Option<String>,
}

/// Word-frequency entries in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<DictEntry>,
    index: FxHashMap<String, usize>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the lexicon shipped with the crate.
    pub fn embedded() -> Self {
        let mut dict = Self::new();
        // Checked by `embedded_lexicon_parses`.
        if let Err(e) = dict.extend_from_str(EMBEDDED_LEXICON) {
            tracing::error!(error = %e, "embedded lexicon is malformed");
        }
        dict
    }

    /// Parses dictionary text into a new dictionary.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Dictionary` for the first malformed line.
    pub fn parse(text: &str) -> Result<Self, PipelineError> {
        let mut dict = Self::new();
        dict.extend_from_str(text)?;
        Ok(dict)
    }

    /// Reads a dictionary file.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the file cannot be read and
    /// `PipelineError::Dictionary` for malformed lines.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let mut dict = Self::new();
        dict.extend_from_file(path)?;
        Ok(dict)
    }

    /// Adds all entries of a dictionary file.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the file cannot be read and
    /// `PipelineError::Dictionary` for malformed lines.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<(), PipelineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io("read dictionary", path, e))?;
        self.extend_from_str(&text)?;
        tracing::debug!(path = %path.display(), words = self.len(), "loaded dictionary file");
        Ok(())
    }

    /// Adds all entries of dictionary text.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Dictionary` for the first malformed line.
    /// Entries before that line remain inserted.
    pub fn extend_from_str(&mut self, text: &str) -> Result<(), PipelineError> {
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim().trim_start_matches('\u{feff}');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_ascii_whitespace();
            let word = parts.next().unwrap_or_default();
            let freq = parts
                .next()
                .map(|f| {
                    f.parse::<u64>().map_err(|e| PipelineError::Dictionary {
                        line: idx + 1,
                        message: format!("'{word}' frequency '{f}': {e}"),
                    })
                })
                .transpose()?;

            self.insert(word, freq, parts.next());
        }
        Ok(())
    }

    /// Inserts a word, replacing an earlier entry for it.
    ///
    /// Empty words are ignored.
    pub fn insert(&mut self, word: &str, freq: Option<u64>, tag: Option<&str>) {
        let word = word.to_ascii_lowercase();
        if word.is_empty() {
            return;
        }

        let entry = DictEntry {
            word,
            freq,
            tag: tag.map(str::to_string),
        };
        match self.index.get(entry.word.as_str()) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.word.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// The entry for `word`.
    #[inline]
    pub fn get(&self, word: &str) -> Option<&DictEntry> {
        self.index.get(word).map(|&i| &self.entries[i])
    }

    /// Frequency of `word`, `None` if absent or left to the engine.
    #[inline]
    pub fn freq(&self, word: &str) -> Option<u64> {
        self.get(word).and_then(|e| e.freq)
    }

    /// Whether `word` has an entry.
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DictEntry> {
        self.entries.iter()
    }

    /// Number of words.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the dictionary holds no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
