//! Binary recoding of labeled records.
//!
//! Maps each record to a `(covariate, outcome)` pair of `{0, 1}` values:
//! covariate `1` for the comparison group, `0` for the baseline group;
//! outcome `1` if the outcome label is in the positive vocabulary. Records
//! whose group is anything else (or absent) are excluded entirely.
//!
//! Labels are compared after trimming and lowercasing.

use dupe_types::{AnalysisConfig, Record};

/// One of the two analyzed groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Group {
    /// Coded 0.
    Baseline = 0,
    /// Coded 1.
    Comparison = 1,
}

impl Group {
    /// Row index in a contingency table, also the covariate value.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Group for a covariate value.
    #[inline]
    pub const fn from_covariate(x: u8) -> Self {
        if x == 0 {
            Group::Baseline
        } else {
            Group::Comparison
        }
    }
}

#[inline]
fn clean(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Parallel `{0, 1}` arrays over the valid sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecodedSample {
    /// 1 = comparison group.
    pub covariate: Vec<u8>,
    /// 1 = positive outcome.
    pub outcome: Vec<u8>,
    /// Records dropped because their group was not recognized.
    pub excluded: usize,
}

impl RecodedSample {
    /// Number of valid records.
    #[inline]
    pub fn len(&self) -> usize {
        self.covariate.len()
    }

    /// Returns `true` if no record was valid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.covariate.is_empty()
    }
}

/// Label vocabulary used to recode records.
#[derive(Debug, Clone)]
pub struct Recoder {
    baseline: String,
    comparison: String,
    positives: Vec<String>,
}

impl Default for Recoder {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl Recoder {
    /// Creates a recoder. All labels are trimmed and lowercased.
    pub fn new<I, S>(baseline: &str, comparison: &str, positives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            baseline: clean(baseline),
            comparison: clean(comparison),
            positives: positives
                .into_iter()
                .map(|p| clean(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Recoder for the groups and vocabulary of a configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            &config.baseline_group,
            &config.comparison_group,
            &config.positive_outcomes,
        )
    }

    /// Normalized label of a group.
    pub fn label(&self, group: Group) -> &str {
        match group {
            Group::Baseline => &self.baseline,
            Group::Comparison => &self.comparison,
        }
    }

    /// Classifies a group label. Unrecognized or absent labels yield `None`.
    pub fn group(&self, label: Option<&str>) -> Option<Group> {
        let label = clean(label?);
        if label == self.baseline {
            Some(Group::Baseline)
        } else if label == self.comparison {
            Some(Group::Comparison)
        } else {
            None
        }
    }

    /// Whether an outcome label counts as positive. Absent is negative.
    pub fn is_positive(&self, outcome: Option<&str>) -> bool {
        outcome.is_some_and(|o| {
            let o = clean(o);
            self.positives.iter().any(|p| *p == o)
        })
    }

    /// Recodes one record, `None` if it is outside both groups.
    pub fn recode(&self, record: &Record) -> Option<(Group, bool)> {
        let group = self.group(record.group.as_deref())?;
        Some((group, self.is_positive(record.outcome.as_deref())))
    }

    /// Recodes all records into parallel arrays.
    pub fn recode_all(&self, records: &[Record]) -> RecodedSample {
        let mut sample = RecodedSample {
            covariate: Vec::with_capacity(records.len()),
            outcome: Vec::with_capacity(records.len()),
            excluded: 0,
        };

        for record in records {
            match self.recode(record) {
                Some((group, positive)) => {
                    sample.covariate.push(group.index() as u8);
                    sample.outcome.push(u8::from(positive));
                }
                None => sample.excluded += 1,
            }
        }

        if sample.excluded > 0 {
            tracing::info!(
                excluded = sample.excluded,
                valid = sample.len(),
                "records outside both groups were excluded"
            );
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_trimmed_and_lowercased() {
        let r = Recoder::default();
        assert_eq!(r.group(Some("  Hedonic ")), Some(Group::Comparison));
        assert_eq!(r.group(Some("UTILITARIAN")), Some(Group::Baseline));
        assert!(r.is_positive(Some(" Strong")));
    }

    #[test]
    fn other_groups_are_excluded() {
        let r = Recoder::default();
        assert_eq!(r.group(Some("both")), None);
        assert_eq!(r.group(Some("none")), None);
        assert_eq!(r.group(None), None);
    }

    #[test]
    fn absent_or_unknown_outcome_is_negative() {
        let r = Recoder::default();
        assert!(!r.is_positive(None));
        assert!(!r.is_positive(Some("none")));
        assert!(!r.is_positive(Some("")));
        assert!(r.is_positive(Some("weak")));
    }

    #[test]
    fn recode_all_builds_parallel_arrays() {
        let records = [
            Record::labeled("hedonic", "strong"),
            Record::labeled("utilitarian", "none"),
            Record::labeled("both", "weak"),
            Record::default(),
            Record::labeled("utilitarian", "weak"),
        ];
        let sample = Recoder::default().recode_all(&records);
        assert_eq!(sample.covariate, [1, 0, 0]);
        assert_eq!(sample.outcome, [1, 0, 1]);
        assert_eq!(sample.excluded, 2);
        assert_eq!(sample.len(), 3);
    }

    #[test]
    fn custom_vocabulary() {
        let r = Recoder::new("Control", "Treatment", ["yes"]);
        assert_eq!(r.label(Group::Comparison), "treatment");
        assert_eq!(r.recode(&Record::labeled("treatment", "YES")), Some((Group::Comparison, true)));
        assert_eq!(r.recode(&Record::labeled("hedonic", "yes")), None);
    }

    #[test]
    fn group_covariate_round_trip() {
        assert_eq!(Group::from_covariate(0), Group::Baseline);
        assert_eq!(Group::from_covariate(1), Group::Comparison);
        assert_eq!(Group::Comparison.index(), 1);
    }
}
