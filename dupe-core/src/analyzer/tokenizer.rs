//! Post Tokenizer
//!
//! Turns raw post text into the ordered token list that frequency counting
//! consumes. It chains the three analysis stages:
//!
//! ```text
//! raw text ─► TextNormalizer ─► split on ' ' ─► Segmenter ─► stopword filter ─► tokens
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use dupe_core::analyzer::Tokenizer;
//!
//! let tokenizer = Tokenizer::default();
//! let tokens = tokenizer.tokenize("這個CP值超高！http://x.com");
//! assert!(tokens.iter().any(|t| t == "cp值"));
//! ```
//!
//! ## Output Contract
//!
//! - No token is empty
//! - No token is a stopword
//! - No token contains a space
//! - Order follows the text; repeated words are kept
//!
//! Whitespace runs in the normalized text are separators only. They are never
//! emitted.

use core::str;
use memchr::memchr_iter;

use dupe_types::{AnalysisConfig, PipelineError, Record, Token};

use crate::analyzer::dictionary::Dictionary;
use crate::analyzer::normalizer::TextNormalizer;
use crate::analyzer::segmenter::{JiebaSegmenter, Segmenter};
use crate::analyzer::stopwords::StopwordSet;

/// Normalize, segment and filter in one pass.
///
/// Generic over the segmentation engine so tests and callers can swap in
/// another implementation of [`Segmenter`]. All vocabularies are fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct Tokenizer<S: Segmenter = JiebaSegmenter> {
    normalizer: TextNormalizer,
    segmenter: S,
    stopwords: StopwordSet,
}

impl Default for Tokenizer<JiebaSegmenter> {
    /// Built-in dictionaries, default custom terms and default stopwords.
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default()).unwrap_or_else(|_| {
            Self::new(
                TextNormalizer::default(),
                JiebaSegmenter::default(),
                StopwordSet::default(),
            )
        })
    }
}

impl Tokenizer<JiebaSegmenter> {
    /// Builds the tokenizer described by an analysis configuration.
    ///
    /// Starts from the built-in dictionaries, loads the optional user
    /// dictionary over them, then registers the custom terms.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` or `PipelineError::Dictionary` when the
    /// user dictionary cannot be loaded.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, PipelineError> {
        let mut segmenter = JiebaSegmenter::new().with_hmm(config.hmm);
        if let Some(path) = &config.dictionary {
            let dict = Dictionary::from_file(path)?;
            segmenter.load_dictionary(&dict);
        }
        segmenter.register_terms(&config.custom_terms);
        let stopwords = StopwordSet::new(&config.stopwords);

        tracing::debug!(
            terms = segmenter.term_count(),
            stopwords = stopwords.len(),
            hmm = segmenter.hmm(),
            "tokenizer ready"
        );

        Ok(Self::new(TextNormalizer::default(), segmenter, stopwords))
    }
}

impl<S: Segmenter> Tokenizer<S> {
    /// Assembles a tokenizer from its stages.
    pub fn new(normalizer: TextNormalizer, segmenter: S, stopwords: StopwordSet) -> Self {
        Self {
            normalizer,
            segmenter,
            stopwords,
        }
    }

    /// The segmentation engine.
    #[inline]
    pub fn segmenter(&self) -> &S {
        &self.segmenter
    }

    /// The active stopword set.
    #[inline]
    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Tokenizes raw text and emits `(token, position)`.
    ///
    /// Position counts emitted tokens from 0. After emitting a token at
    /// position `u32::MAX`, further emissions stop.
    pub fn tokenize_with<F>(&self, text: &str, mut emit: F)
    where
        F: FnMut(&str, u32),
    {
        let mut normalized = String::new();
        self.normalizer.normalize_into(text, &mut normalized);

        let bytes = normalized.as_bytes();
        if bytes.is_empty() {
            return;
        }

        let mut pos = 0u32;
        let mut done = false;
        let mut on_segment = |seg: &str| {
            if done || seg.is_empty() || self.stopwords.contains(seg) {
                return;
            }
            emit(seg, pos);
            if pos == u32::MAX {
                done = true;
            } else {
                pos += 1;
            }
        };

        let mut start = 0usize;
        for i in memchr_iter(b' ', bytes) {
            if start < i {
                // SAFETY: `normalized` is valid UTF-8 and 0x20 is never a
                // continuation byte, so `bytes[start..i]` is a valid subslice.
                let chunk = unsafe { str::from_utf8_unchecked(&bytes[start..i]) };
                self.segmenter.segment(chunk, &mut on_segment);
            }
            start = i + 1;
        }

        if start < bytes.len() {
            // SAFETY: `start` follows an ASCII space byte.
            let chunk = unsafe { str::from_utf8_unchecked(&bytes[start..]) };
            self.segmenter.segment(chunk, &mut on_segment);
        }
    }

    /// Tokenizes raw text into owned tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut out = Vec::new();
        self.tokenize_with(text, |tok, _| out.push(tok.to_string()));
        out
    }

    /// Tokenizes a possibly absent cell. Absent values yield no tokens.
    #[inline]
    pub fn tokenize_value(&self, text: Option<&str>) -> Vec<Token> {
        text.map(|t| self.tokenize(t)).unwrap_or_default()
    }

    /// Tokenizes every record's text, preserving record order.
    pub fn tokenize_records(&self, records: &[Record]) -> Vec<Vec<Token>> {
        let lists: Vec<Vec<Token>> = records
            .iter()
            .map(|r| self.tokenize_value(r.text.as_deref()))
            .collect();
        tracing::debug!(
            records = records.len(),
            tokens = lists.iter().map(Vec::len).sum::<usize>(),
            "tokenized records"
        );
        lists
    }
}
