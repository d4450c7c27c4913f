use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Scheme-prefixed or `www.` links, up to the next whitespace.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|ftp://|www\.)\S+").expect("URL pattern is valid")
});

#[inline(always)]
const fn is_cjk_unified(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}')
}

#[inline(always)]
const fn is_cjk_extended(c: char) -> bool {
    matches!(c, '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

/// Configuration options for text normalization.
#[derive(Debug, Clone, Copy)]
pub struct NormalizerConfig {
    /// Remove links before character filtering.
    pub strip_urls: bool,
    /// Also keep CJK Extension A and compatibility ideographs.
    /// Off by default: only U+4E00..=U+9FFF survives.
    pub extended_ideographs: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            strip_urls: true,
            extended_ideographs: false,
        }
    }
}

/// Post text normalizer.
///
/// Performs the following operations, in order:
/// - Removes links (`http://…`, `https://…`, `www.…`) up to the next whitespace
/// - Replaces every run of characters outside ASCII letters, ASCII digits and
///   CJK ideographs with a single space
/// - Lowercases ASCII letters
/// - Trims leading and trailing spaces
///
/// The output therefore never contains consecutive spaces, and normalizing it
/// again returns it unchanged.
///
/// # Examples
///
/// ```
/// use dupe_core::analyzer::TextNormalizer;
///
/// let normalizer = TextNormalizer::default();
/// assert_eq!(normalizer.normalize("這個CP值超高！http://x.com"), "這個cp值超高");
/// assert_eq!(normalizer.normalize_value(None), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    config: NormalizerConfig,
}

impl TextNormalizer {
    /// Creates a new normalizer with the specified configuration.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    #[inline(always)]
    fn keeps(&self, c: char) -> bool {
        c.is_ascii_alphanumeric()
            || is_cjk_unified(c)
            || (self.config.extended_ideographs && is_cjk_extended(c))
    }

    /// Normalizes text into an existing String buffer.
    ///
    /// Clears the buffer before writing and reuses its capacity.
    pub fn normalize_into(&self, input: &str, out: &mut String) {
        out.clear();

        let text: Cow<'_, str> = if self.config.strip_urls {
            URL_REGEX.replace_all(input, "")
        } else {
            Cow::Borrowed(input)
        };

        out.reserve(text.len());
        let mut pending_space = false;

        for c in text.chars() {
            if self.keeps(c) {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_space = true;
            }
        }
    }

    /// Normalizes text and returns a new String.
    #[inline]
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out);
        out
    }

    /// Normalizes a possibly absent cell. Absent values become `""`.
    #[inline]
    pub fn normalize_value(&self, input: Option<&str>) -> String {
        input.map(|s| self.normalize(s)).unwrap_or_default()
    }
}
