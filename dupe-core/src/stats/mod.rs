//! Categorical association between two labeled groups and a binary outcome.
//!
//! Records are recoded once into parallel `{0, 1}` arrays
//! ([`Recoder`]), tallied into a 2×2 [`ContingencyTable`], and then
//! analyzed two ways:
//!
//! - [`AssociationTester`]: Pearson chi-square test of independence
//! - [`LogitFitter`]: logistic regression of the outcome on group membership
//!
//! Degenerate inputs never produce errors. Empty groups get a rate of zero,
//! a chi-square with a zero expected count is flagged as degenerate, and a
//! regression that cannot be identified is returned as
//! [`LogitOutcome::Skipped`].

mod association;
mod contingency;
mod logit;
mod recode;
mod report;

pub use association::{AssociationResult, AssociationTester, GroupRate};
pub use contingency::ContingencyTable;
pub use logit::{fit_logit, CoefficientRow, LogitFit, LogitFitter, LogitOutcome, SkipReason};
pub use recode::{Group, RecodedSample, Recoder};
pub use report::StatsReport;
