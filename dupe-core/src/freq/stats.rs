//! Statistics and FrequencyStats.

/// A snapshot of one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyStats {
    /// Tokens counted, duplicates included.
    pub total_tokens: u64,
    /// Distinct tokens before thresholding.
    pub distinct_tokens: usize,
    /// Rows kept after thresholding.
    pub retained: usize,
    /// Threshold that was applied.
    pub min_freq: u64,
}

impl FrequencyStats {
    /// Distinct tokens removed by the threshold.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.distinct_tokens - self.retained
    }
}

impl core::fmt::Display for FrequencyStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} tokens, {} distinct, {} retained (min_freq {})",
            self.total_tokens, self.distinct_tokens, self.retained, self.min_freq
        )
    }
}
