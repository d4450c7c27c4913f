//! Word segmentation.
//!
//! Chinese posts carry no whitespace between words, so the normalized text
//! has to be cut into words before anything can be counted. The engine is
//! [`jieba_rs`]:
//!
//! 1. Build a DAG of every dictionary word starting at each character.
//! 2. Pick the route with the highest summed log-probability.
//! 3. Runs of characters the route leaves single are handed to an HMM that
//!    discovers words missing from the dictionary (unless disabled).
//!
//! Its built-in dictionary is Simplified Chinese, so the embedded
//! Traditional lexicon fills the words it lacks.
//!
//! Custom terms are matched *before* the engine runs with a longest-match
//! scan, so a registered term is emitted as one segment no matter how its
//! neighbours score.
//!
//! ## Input Contract
//!
//! `segment` expects a single space-free chunk of normalized text. The
//! tokenizer splits on spaces before calling it.

use jieba_rs::Jieba;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::analyzer::dictionary::Dictionary;
use crate::analyzer::normalizer::TextNormalizer;

/// A word segmentation engine.
///
/// Terms are registered while the engine is still owned mutably; once it is
/// handed to a [`Tokenizer`](crate::analyzer::Tokenizer) only `segment` is
/// reachable.
pub trait Segmenter {
    /// Emits contiguous segments of `text`, left to right.
    ///
    /// The concatenation of all emitted segments equals `text`.
    fn segment<'t, F>(&self, text: &'t str, emit: F)
    where
        F: FnMut(&'t str);

    /// Registers terms that must never be split.
    fn register_terms<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    /// Collects the segments of `text`.
    fn segment_vec<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut out = Vec::new();
        self.segment(text, |s| out.push(s));
        out
    }
}

/// Byte offsets of every char start plus the end of the string.
type Bounds = SmallVec<[usize; 64]>;

#[inline]
fn char_bounds(text: &str) -> Bounds {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// Custom terms with a longest-match scanner.
#[derive(Debug, Clone, Default)]
struct TermSet {
    terms: FxHashSet<String>,
    max_chars: usize,
}

impl TermSet {
    fn insert(&mut self, term: String) -> bool {
        self.max_chars = self.max_chars.max(term.chars().count());
        self.terms.insert(term)
    }

    /// Length in chars of the longest term starting at char `i`.
    fn match_at(&self, text: &str, bounds: &[usize], i: usize) -> Option<usize> {
        let n = bounds.len() - 1;
        let longest = self.max_chars.min(n - i);
        (1..=longest)
            .rev()
            .find(|&len| self.terms.contains(&text[bounds[i]..bounds[i + len]]))
    }

    /// Splits `text` into term and non-term pieces, left to right.
    fn split<'t, F>(&self, text: &'t str, mut piece: F)
    where
        F: FnMut(&'t str, bool),
    {
        if self.terms.is_empty() {
            if !text.is_empty() {
                piece(text, false);
            }
            return;
        }

        let bounds = char_bounds(text);
        let n = bounds.len() - 1;
        let mut gap_start = 0usize;
        let mut i = 0usize;

        while i < n {
            match self.match_at(text, &bounds, i) {
                Some(len) => {
                    if gap_start < i {
                        piece(&text[bounds[gap_start]..bounds[i]], false);
                    }
                    piece(&text[bounds[i]..bounds[i + len]], true);
                    i += len;
                    gap_start = i;
                }
                None => i += 1,
            }
        }

        if gap_start < n {
            piece(&text[bounds[gap_start]..], false);
        }
    }
}

/// Largest frequency handed to the engine.
const MAX_FREQ: u64 = u32::MAX as u64;

/// Jieba segmenter with forced custom terms.
#[derive(Debug, Clone)]
pub struct JiebaSegmenter {
    jieba: Jieba,
    terms: TermSet,
    hmm: bool,
    // Engine suggestions divide by the total frequency.
    weighted: bool,
}

impl Default for JiebaSegmenter {
    /// Built-in dictionary, embedded lexicon, HMM on.
    fn default() -> Self {
        Self::new()
    }
}

impl JiebaSegmenter {
    /// Built-in dictionary filled with the embedded Traditional lexicon.
    pub fn new() -> Self {
        let mut segmenter = Self::from_engine(Jieba::new(), true);
        let added = segmenter.supplement(&Dictionary::embedded());
        tracing::debug!(added, "filled built-in dictionary from embedded lexicon");
        segmenter
    }

    /// A segmenter that knows only the words in `dict`.
    pub fn from_dictionary(dict: &Dictionary) -> Self {
        let mut segmenter = Self::from_engine(Jieba::empty(), false);
        segmenter.load_dictionary(dict);
        segmenter
    }

    /// Creates a segmenter from `dict` and registers `terms` in one step.
    pub fn with_terms<I, S>(dict: &Dictionary, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut segmenter = Self::from_dictionary(dict);
        segmenter.register_terms(terms);
        segmenter
    }

    fn from_engine(jieba: Jieba, weighted: bool) -> Self {
        Self {
            jieba,
            terms: TermSet::default(),
            hmm: true,
            weighted,
        }
    }

    /// Turns unknown-word discovery on or off.
    #[must_use]
    pub fn with_hmm(mut self, hmm: bool) -> Self {
        self.hmm = hmm;
        self
    }

    /// Whether unknown-word discovery is on.
    #[inline]
    pub fn hmm(&self) -> bool {
        self.hmm
    }

    fn add_word(&mut self, word: &str, freq: Option<u64>, tag: Option<&str>) -> usize {
        let freq = match freq {
            Some(f) => Some(f.min(MAX_FREQ) as usize),
            None if !self.weighted => Some(1),
            None => None,
        };
        let added = self.jieba.add_word(word, freq, tag);
        self.weighted |= added > 0;
        added
    }

    /// Loads every entry of `dict`, replacing frequencies of known words.
    pub fn load_dictionary(&mut self, dict: &Dictionary) {
        for entry in dict.iter() {
            self.add_word(&entry.word, entry.freq, entry.tag.as_deref());
        }
    }

    /// Adds the entries of `dict` the engine does not know yet. Returns how
    /// many were added.
    pub fn supplement(&mut self, dict: &Dictionary) -> usize {
        let mut added = 0;
        for entry in dict.iter() {
            if !self.jieba.has_word(&entry.word) {
                self.add_word(&entry.word, entry.freq, entry.tag.as_deref());
                added += 1;
            }
        }
        added
    }

    /// Whether the engine's dictionary holds `word`.
    #[inline]
    pub fn contains_word(&self, word: &str) -> bool {
        self.jieba.has_word(word)
    }

    /// Whether `word` is a registered custom term.
    #[inline]
    pub fn is_term(&self, word: &str) -> bool {
        self.terms.terms.contains(word)
    }

    /// Number of registered custom terms.
    #[inline]
    pub fn term_count(&self) -> usize {
        self.terms.terms.len()
    }
}

impl Segmenter for JiebaSegmenter {
    fn segment<'t, F>(&self, text: &'t str, mut emit: F)
    where
        F: FnMut(&'t str),
    {
        debug_assert!(
            !text.contains(' '),
            "segmenter: space in input, tokenizer contract violated"
        );

        self.terms.split(text, |piece, is_term| {
            if is_term {
                emit(piece);
            } else {
                for word in self.jieba.cut(piece, self.hmm) {
                    emit(word);
                }
            }
        });
    }

    fn register_terms<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalizer = TextNormalizer::default();

        for term in terms {
            let term = term.as_ref().trim().to_ascii_lowercase();
            if term.is_empty() {
                continue;
            }
            if term.contains(char::is_whitespace) {
                tracing::warn!(%term, "custom term contains whitespace and can never match");
                continue;
            }
            if normalizer.normalize(&term) != term {
                tracing::warn!(
                    %term,
                    "custom term contains characters removed by normalization and can never match"
                );
                continue;
            }

            let freq = self.add_word(&term, None, None);
            tracing::debug!(%term, freq, "registered custom term");
            self.terms.insert(term);
        }
    }
}
