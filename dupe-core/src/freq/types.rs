use dupe_types::FrequencyRow;

use crate::freq::stats::FrequencyStats;

/// Ranked token counts: count descending, then token ascending.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    rows: Vec<FrequencyRow>,
    stats: FrequencyStats,
}

impl FrequencyTable {
    pub(crate) fn new(rows: Vec<FrequencyRow>, stats: FrequencyStats) -> Self {
        Self { rows, stats }
    }

    /// All retained rows in rank order.
    #[inline]
    pub fn rows(&self) -> &[FrequencyRow] {
        &self.rows
    }

    /// The first `n` rows, or all of them if there are fewer.
    #[inline]
    pub fn top(&self, n: usize) -> &[FrequencyRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Number of retained rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no token met the threshold.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count of a retained token.
    pub fn count_of(&self, token: &str) -> Option<u64> {
        self.rows.iter().find(|r| r.token == token).map(|r| r.count)
    }

    /// Summary of the aggregation run.
    #[inline]
    pub fn stats(&self) -> FrequencyStats {
        self.stats
    }

    /// Consumes the table, returning its rows.
    pub fn into_rows(self) -> Vec<FrequencyRow> {
        self.rows
    }
}
