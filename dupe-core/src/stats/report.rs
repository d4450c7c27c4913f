//! Console rendering of the statistics results.

use core::fmt;

use dupe_types::{AnalysisConfig, Record};

use crate::stats::association::{AssociationResult, AssociationTester};
use crate::stats::logit::{CoefficientRow, LogitFitter, LogitOutcome};
use crate::stats::recode::Group;

/// Association test and regression over the same valid sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    /// Chi-square result.
    pub association: AssociationResult,
    /// Regression result.
    pub regression: LogitOutcome,
}

impl StatsReport {
    /// Recodes `records` once and runs both analyses on the result.
    pub fn compute(records: &[Record], config: &AnalysisConfig) -> Self {
        let tester = AssociationTester::from_config(config);
        let sample = tester.recoder().recode_all(records);

        let association = tester.test_sample(&sample);
        let regression = LogitFitter::new()
            .covariate_name(tester.recoder().label(Group::Comparison))
            .fit_sample(&sample);

        Self {
            association,
            regression,
        }
    }
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &CoefficientRow) -> fmt::Result {
    writeln!(
        f,
        "{:<12} {:>8.4} {:>9.4} {:>8.4} {:>7.4} {:>8.4} {:>8.4}",
        row.name, row.coef, row.std_err, row.z, row.p_value, row.ci_low, row.ci_high
    )
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.association;
        writeln!(f, "--- Hypothesis Testing ---")?;
        writeln!(f, "Valid Sample Size (N): {}", a.sample_size)?;

        let base = format!("{} Purchase Rate:", title_case(&a.baseline.label));
        let comp = format!("{} Purchase Rate:", title_case(&a.comparison.label));
        let width = base.chars().count().max(comp.chars().count());
        for (head, rate) in [(base, &a.baseline), (comp, &a.comparison)] {
            writeln!(
                f,
                "{head:<width$} {:.2}% ({}/{})",
                rate.rate * 100.0,
                rate.positive,
                rate.total
            )?;
        }

        writeln!(f)?;
        writeln!(f, "[Chi-Square Result]")?;
        if a.degenerate {
            writeln!(f, "Statistic: undefined (an expected count is zero)")?;
            writeln!(f, "P-value:   undefined")?;
        } else {
            writeln!(f, "Statistic: {:.4}", a.statistic)?;
            writeln!(f, "P-value:   {:.5}", a.p_value)?;
        }
        if a.significant {
            writeln!(f, ">> Significant difference detected! (p < {})", a.alpha)?;
        } else {
            writeln!(f, ">> No significant difference.")?;
        }

        writeln!(f)?;
        writeln!(f, "--- Logistic Regression Model ---")?;
        match &self.regression {
            LogitOutcome::Fitted(fit) => {
                writeln!(
                    f,
                    "{:<12} {:>8} {:>9} {:>8} {:>7} {:>8} {:>8}",
                    "", "Coef.", "Std.Err.", "z", "P>|z|", "[0.025", "0.975]"
                )?;
                write_row(f, &fit.intercept)?;
                write_row(f, &fit.covariate)?;
                writeln!(f)?;
                writeln!(
                    f,
                    "{} Coefficient: {:.4} (odds ratio {:.4})",
                    title_case(&fit.covariate.name),
                    fit.coefficient(),
                    fit.odds_ratio()
                )?;
                writeln!(f, "Coefficient P-value: {:.5}", fit.coefficient_p_value())?;
                writeln!(f, "Model LLR P-value:   {:.5}", fit.model_p_value)?;
                write!(
                    f,
                    "Log-Likelihood: {:.4}  LL-Null: {:.4}  Pseudo R-squared: {:.4}",
                    fit.log_likelihood, fit.null_log_likelihood, fit.pseudo_r2
                )
            }
            LogitOutcome::Skipped(reason) => write!(f, "Regression skipped: {reason}"),
        }
    }
}
