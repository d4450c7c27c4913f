use dupe_types::FrequencyRow;
use rustc_hash::FxHashMap;

use crate::freq::stats::FrequencyStats;
use crate::freq::types::FrequencyTable;

/// Incremental token counter.
///
/// Feed it token lists in record order, then call [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    counts: FxHashMap<String, u64>,
    total: u64,
}

impl FrequencyCounter {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `token`.
    #[inline]
    pub fn add(&mut self, token: &str) {
        self.total += 1;
        if let Some(count) = self.counts.get_mut(token) {
            *count += 1;
        } else {
            self.counts.insert(token.to_string(), 1);
        }
    }

    /// Counts every token of one record.
    pub fn add_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) {
        for token in tokens {
            self.add(token.as_ref());
        }
    }

    /// Number of tokens counted so far.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct tokens counted so far.
    #[inline]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Applies the threshold and ranks the surviving tokens.
    pub fn finish(self, min_freq: u64) -> FrequencyTable {
        let distinct = self.counts.len();
        let mut rows: Vec<FrequencyRow> = self
            .counts
            .into_iter()
            .filter(|&(_, count)| count >= min_freq)
            .map(|(token, count)| FrequencyRow { token, count })
            .collect();
        rows.sort_unstable_by(|a, b| b.cmp(a));

        let stats = FrequencyStats {
            total_tokens: self.total,
            distinct_tokens: distinct,
            retained: rows.len(),
            min_freq,
        };
        tracing::debug!(%stats, "aggregated token frequencies");

        FrequencyTable::new(rows, stats)
    }
}

/// Counts tokens across records and returns the ranked table of tokens
/// occurring at least `min_freq` times.
pub fn aggregate<S: AsRef<str>>(token_lists: &[Vec<S>], min_freq: u64) -> FrequencyTable {
    let mut counter = FrequencyCounter::new();
    for tokens in token_lists {
        counter.add_tokens(tokens);
    }
    counter.finish(min_freq)
}
