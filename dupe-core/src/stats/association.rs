//! Pearson chi-square test of independence on the 2×2 group × outcome table.

use dupe_types::{AnalysisConfig, Record};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::stats::contingency::ContingencyTable;
use crate::stats::recode::{Group, RecodedSample, Recoder};

/// Degrees of freedom of a 2×2 table.
const DOF: u32 = 1;

/// Positive share of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRate {
    /// Normalized group label.
    pub label: String,
    /// Records with a positive outcome.
    pub positive: u64,
    /// Records in the group.
    pub total: u64,
    /// `positive / total`, `0.0` for an empty group.
    pub rate: f64,
}

impl GroupRate {
    fn from_table(table: &ContingencyTable, group: Group, label: &str) -> Self {
        Self {
            label: label.to_string(),
            positive: table.positive(group),
            total: table.total(group),
            rate: table.rate(group),
        }
    }
}

/// Outcome of the association test.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationResult {
    /// Records in the two analyzed groups.
    pub sample_size: u64,
    /// Records outside both groups.
    pub excluded: usize,
    /// Observed counts.
    pub table: ContingencyTable,
    /// Baseline group rate.
    pub baseline: GroupRate,
    /// Comparison group rate.
    pub comparison: GroupRate,
    /// Pearson chi-square statistic, `0.0` when degenerate.
    pub statistic: f64,
    /// Upper-tail probability, `1.0` when degenerate.
    pub p_value: f64,
    /// Degrees of freedom.
    pub dof: u32,
    /// Significance threshold applied.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub significant: bool,
    /// An expected count was zero; statistic and p-value are placeholders.
    pub degenerate: bool,
}

/// Chi-square association tester between two groups and a binary outcome.
#[derive(Debug, Clone)]
pub struct AssociationTester {
    recoder: Recoder,
    alpha: f64,
}

impl Default for AssociationTester {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl AssociationTester {
    /// Creates a tester with an explicit vocabulary and threshold.
    pub fn new(recoder: Recoder, alpha: f64) -> Self {
        Self { recoder, alpha }
    }

    /// Tester for the groups, vocabulary and alpha of a configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(Recoder::from_config(config), config.alpha)
    }

    /// The recoder shared with regression fitting.
    #[inline]
    pub fn recoder(&self) -> &Recoder {
        &self.recoder
    }

    /// Significance threshold.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Recodes `records` and tests them.
    pub fn test_association(&self, records: &[Record]) -> AssociationResult {
        self.test_sample(&self.recoder.recode_all(records))
    }

    /// Tests an already recoded sample.
    pub fn test_sample(&self, sample: &RecodedSample) -> AssociationResult {
        let mut result = self.test_table(ContingencyTable::from_sample(sample));
        result.excluded = sample.excluded;
        result
    }

    /// Tests a table of counts.
    pub fn test_table(&self, table: ContingencyTable) -> AssociationResult {
        let (statistic, p_value, degenerate) = match table.pearson_statistic() {
            Some(stat) => (stat, chi_square_sf(stat, DOF), false),
            None => {
                tracing::warn!(
                    cells = ?table.cells(),
                    "chi-square undefined: an expected count is zero"
                );
                (0.0, 1.0, true)
            }
        };

        let result = AssociationResult {
            sample_size: table.grand_total(),
            excluded: 0,
            table,
            baseline: GroupRate::from_table(
                &table,
                Group::Baseline,
                self.recoder.label(Group::Baseline),
            ),
            comparison: GroupRate::from_table(
                &table,
                Group::Comparison,
                self.recoder.label(Group::Comparison),
            ),
            statistic,
            p_value,
            dof: DOF,
            alpha: self.alpha,
            significant: !degenerate && p_value < self.alpha,
            degenerate,
        };

        tracing::debug!(
            n = result.sample_size,
            statistic = result.statistic,
            p_value = result.p_value,
            significant = result.significant,
            "association test"
        );
        result
    }
}

/// Chi-square upper-tail probability.
pub(crate) fn chi_square_sf(statistic: f64, dof: u32) -> f64 {
    ChiSquared::new(f64::from(dof)).map_or(1.0, |dist| dist.sf(statistic))
}
