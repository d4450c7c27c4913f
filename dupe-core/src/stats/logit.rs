//! Binary logistic regression with an intercept and one `{0, 1}` covariate.
//!
//! Fitted by Newton–Raphson on the log-likelihood. Inputs that leave the
//! maximum-likelihood estimate undefined are detected up front and reported
//! as [`LogitOutcome::Skipped`]; a fit never panics and never returns an
//! error.
//!
//! ## Model
//!
//! ```text
//! P(y = 1 | x) = 1 / (1 + exp(-(b0 + b1·x)))
//! ```
//!
//! Standard errors come from the inverse observed information at the
//! optimum. Coefficient p-values are two-tailed Wald tests; the model p-value
//! is the likelihood-ratio test against the intercept-only model.

use core::fmt;

use dupe_types::Record;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::stats::association::chi_square_sf;
use crate::stats::contingency::ContingencyTable;
use crate::stats::recode::{Group, RecodedSample, Recoder};

/// Why a regression was not fitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No valid records.
    EmptySample,
    /// Covariate and outcome arrays differ in length.
    LengthMismatch {
        /// Covariate length.
        covariate: usize,
        /// Outcome length.
        outcome: usize,
    },
    /// A covariate or outcome value is neither 0 nor 1.
    NonBinaryInput {
        /// Index of the first offending observation.
        index: usize,
        /// Covariate value at `index`.
        covariate: u8,
        /// Outcome value at `index`.
        outcome: u8,
    },
    /// Every record is in the same group.
    NoCovariateVariation {
        /// The only covariate value present.
        level: u8,
    },
    /// Every record has the same outcome.
    NoOutcomeVariation {
        /// The only outcome value present.
        level: u8,
    },
    /// A group has only positive or only negative outcomes.
    PerfectSeparation,
    /// The information matrix could not be inverted.
    SingularHessian,
    /// The iteration limit was reached.
    NotConverged {
        /// Iterations performed.
        iterations: usize,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptySample => f.write_str("no valid records to fit"),
            SkipReason::LengthMismatch { covariate, outcome } => write!(
                f,
                "covariate has {covariate} values but outcome has {outcome}"
            ),
            SkipReason::NonBinaryInput {
                index,
                covariate,
                outcome,
            } => write!(
                f,
                "observation {index} is not coded 0/1 (covariate {covariate}, outcome {outcome})"
            ),
            SkipReason::NoCovariateVariation { level } => write!(
                f,
                "covariate is constant ({level}); only one group present"
            ),
            SkipReason::NoOutcomeVariation { level } => {
                write!(f, "outcome is constant ({level}); model is not identifiable")
            }
            SkipReason::PerfectSeparation => {
                f.write_str("perfect separation detected; coefficient is not identified")
            }
            SkipReason::SingularHessian => f.write_str("singular information matrix"),
            SkipReason::NotConverged { iterations } => {
                write!(f, "did not converge after {iterations} iterations")
            }
        }
    }
}

/// One row of the coefficient table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientRow {
    /// Parameter name.
    pub name: String,
    /// Estimate.
    pub coef: f64,
    /// Standard error.
    pub std_err: f64,
    /// Wald z statistic.
    pub z: f64,
    /// Two-tailed p-value of `z`.
    pub p_value: f64,
    /// Lower 95% confidence bound.
    pub ci_low: f64,
    /// Upper 95% confidence bound.
    pub ci_high: f64,
}

/// A converged fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LogitFit {
    /// Intercept row, named `const`.
    pub intercept: CoefficientRow,
    /// Covariate row.
    pub covariate: CoefficientRow,
    /// Log-likelihood at the optimum.
    pub log_likelihood: f64,
    /// Log-likelihood of the intercept-only model.
    pub null_log_likelihood: f64,
    /// `2 (ll - ll_null)`.
    pub lr_statistic: f64,
    /// Likelihood-ratio p-value, one degree of freedom.
    pub model_p_value: f64,
    /// McFadden pseudo R².
    pub pseudo_r2: f64,
    /// Newton iterations used.
    pub iterations: usize,
    /// Observations.
    pub n_obs: usize,
}

impl LogitFit {
    /// Covariate coefficient (log odds ratio).
    #[inline]
    pub fn coefficient(&self) -> f64 {
        self.covariate.coef
    }

    /// Wald p-value of the covariate coefficient.
    #[inline]
    pub fn coefficient_p_value(&self) -> f64 {
        self.covariate.p_value
    }

    /// Odds ratio of the comparison group against the baseline.
    #[inline]
    pub fn odds_ratio(&self) -> f64 {
        self.covariate.coef.exp()
    }
}

/// Result of a regression attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LogitOutcome {
    /// The model converged.
    Fitted(LogitFit),
    /// The model could not be fitted.
    Skipped(SkipReason),
}

impl LogitOutcome {
    /// The fit, if any.
    pub fn fitted(&self) -> Option<&LogitFit> {
        match self {
            LogitOutcome::Fitted(fit) => Some(fit),
            LogitOutcome::Skipped(_) => None,
        }
    }

    /// The skip reason, if any.
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            LogitOutcome::Fitted(_) => None,
            LogitOutcome::Skipped(reason) => Some(reason),
        }
    }
}

#[inline(always)]
fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

/// `y ln p + (1 - y) ln(1 - p)`, with `0 ln 0 = 0`.
#[inline]
fn bernoulli_ll(y: f64, p: f64) -> f64 {
    let mut ll = 0.0;
    if y > 0.0 {
        ll += y * p.ln();
    }
    if y < 1.0 {
        ll += (1.0 - y) * (1.0 - p).ln();
    }
    ll
}

/// Newton–Raphson logistic regression fitter.
#[derive(Debug, Clone)]
pub struct LogitFitter {
    max_iter: usize,
    tolerance: f64,
    covariate_name: String,
}

impl Default for LogitFitter {
    fn default() -> Self {
        Self {
            max_iter: 35,
            tolerance: 1e-8,
            covariate_name: "x1".to_string(),
        }
    }
}

impl LogitFitter {
    /// Creates a fitter with default iteration limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration limit.
    #[must_use]
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the step-size convergence tolerance.
    #[must_use]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Names the covariate row of the coefficient table.
    #[must_use]
    pub fn covariate_name(mut self, name: impl Into<String>) -> Self {
        self.covariate_name = name.into();
        self
    }

    /// Recodes `records` and fits the model.
    pub fn fit_records(&self, records: &[Record], recoder: &Recoder) -> LogitOutcome {
        self.fit_sample(&recoder.recode_all(records))
    }

    /// Fits an already recoded sample.
    pub fn fit_sample(&self, sample: &RecodedSample) -> LogitOutcome {
        self.fit(&sample.covariate, &sample.outcome)
    }

    fn precheck(x: &[u8], y: &[u8]) -> Option<SkipReason> {
        if x.len() != y.len() {
            return Some(SkipReason::LengthMismatch {
                covariate: x.len(),
                outcome: y.len(),
            });
        }
        if x.is_empty() {
            return Some(SkipReason::EmptySample);
        }
        if let Some(index) = x.iter().zip(y).position(|(&a, &b)| a > 1 || b > 1) {
            return Some(SkipReason::NonBinaryInput {
                index,
                covariate: x[index],
                outcome: y[index],
            });
        }
        if x.iter().all(|&v| v == x[0]) {
            return Some(SkipReason::NoCovariateVariation { level: x[0] });
        }
        if y.iter().all(|&v| v == y[0]) {
            return Some(SkipReason::NoOutcomeVariation { level: y[0] });
        }

        let sample = RecodedSample {
            covariate: x.to_vec(),
            outcome: y.to_vec(),
            excluded: 0,
        };
        if ContingencyTable::from_sample(&sample).has_empty_cell() {
            return Some(SkipReason::PerfectSeparation);
        }
        None
    }

    /// Fits `y ~ 1 + x` on parallel `{0, 1}` arrays.
    pub fn fit(&self, x: &[u8], y: &[u8]) -> LogitOutcome {
        if let Some(reason) = Self::precheck(x, y) {
            tracing::warn!(%reason, "regression skipped");
            return LogitOutcome::Skipped(reason);
        }

        let n = x.len();
        let mut beta = [0.0f64; 2];
        let mut iterations = 0usize;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            let (grad, info, _) = score(x, y, beta);
            let Some(inv) = invert(&info) else {
                tracing::warn!(iterations, "regression skipped: singular information matrix");
                return LogitOutcome::Skipped(SkipReason::SingularHessian);
            };

            let step = [
                inv[0][0] * grad[0] + inv[0][1] * grad[1],
                inv[1][0] * grad[0] + inv[1][1] * grad[1],
            ];
            beta[0] += step[0];
            beta[1] += step[1];

            if step[0].abs().max(step[1].abs()) < self.tolerance {
                converged = true;
                break;
            }
        }

        if !converged || !beta.iter().all(|b| b.is_finite()) {
            tracing::warn!(iterations, "regression skipped: no convergence");
            return LogitOutcome::Skipped(SkipReason::NotConverged { iterations });
        }

        let (_, info, ll) = score(x, y, beta);
        let Some(cov) = invert(&info) else {
            return LogitOutcome::Skipped(SkipReason::SingularHessian);
        };

        let positives = y.iter().filter(|&&v| v == 1).count() as f64;
        let p_bar = positives / n as f64;
        let null_ll: f64 = y
            .iter()
            .map(|&yi| bernoulli_ll(f64::from(yi), p_bar))
            .sum();
        let lr = (2.0 * (ll - null_ll)).max(0.0);

        let fit = LogitFit {
            intercept: coefficient_row("const", beta[0], cov[0][0]),
            covariate: coefficient_row(&self.covariate_name, beta[1], cov[1][1]),
            log_likelihood: ll,
            null_log_likelihood: null_ll,
            lr_statistic: lr,
            model_p_value: chi_square_sf(lr, 1),
            pseudo_r2: 1.0 - ll / null_ll,
            iterations,
            n_obs: n,
        };

        tracing::debug!(
            coef = fit.covariate.coef,
            p_value = fit.covariate.p_value,
            iterations,
            "regression fitted"
        );
        LogitOutcome::Fitted(fit)
    }
}

/// Fits the regression on labeled records with default fitter settings,
/// naming the covariate after the comparison group.
pub fn fit_logit(records: &[Record], recoder: &Recoder) -> LogitOutcome {
    LogitFitter::new()
        .covariate_name(recoder.label(Group::Comparison))
        .fit_records(records, recoder)
}

/// Gradient, observed information and log-likelihood at `beta`.
fn score(x: &[u8], y: &[u8], beta: [f64; 2]) -> ([f64; 2], [[f64; 2]; 2], f64) {
    let mut grad = [0.0f64; 2];
    let mut info = [[0.0f64; 2]; 2];
    let mut ll = 0.0;

    for (&xi, &yi) in x.iter().zip(y) {
        let xf = f64::from(xi);
        let yf = f64::from(yi);
        let p = sigmoid(beta[0] + beta[1] * xf);
        let resid = yf - p;
        let w = p * (1.0 - p);
        grad[0] += resid;
        grad[1] += resid * xf;
        info[0][0] += w;
        info[0][1] += w * xf;
        info[1][1] += w * xf * xf;
        ll += bernoulli_ll(yf, p);
    }
    info[1][0] = info[0][1];
    (grad, info, ll)
}

fn invert(m: &[[f64; 2]; 2]) -> Option<[[f64; 2]; 2]> {
    let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
    let scale = m[0][0].abs().max(m[1][1].abs());
    if !det.is_finite() || det.abs() <= f64::EPSILON * scale * scale {
        return None;
    }
    Some([
        [m[1][1] / det, -m[0][1] / det],
        [-m[1][0] / det, m[0][0] / det],
    ])
}

fn coefficient_row(name: &str, coef: f64, variance: f64) -> CoefficientRow {
    let std_err = variance.max(0.0).sqrt();
    let z = coef / std_err;
    let (p_value, q) = match Normal::new(0.0, 1.0) {
        Ok(normal) => (2.0 * normal.sf(z.abs()), normal.inverse_cdf(0.975)),
        Err(_) => (f64::NAN, f64::NAN),
    };
    CoefficientRow {
        name: name.to_string(),
        coef,
        std_err,
        z,
        p_value,
        ci_low: coef - q * std_err,
        ci_high: coef + q * std_err,
    }
}
