//! Token frequency and purchase-intent association analysis for short
//! social posts written in Chinese mixed with Latin terms.
//!
//! The crate is organized as a batch pipeline:
//!
//! - [`analyzer`]: normalization, jieba word segmentation and stopword
//!   filtering, producing per-record token lists
//! - [`freq`]: counting tokens across records into a ranked table
//! - [`stats`]: 2×2 chi-square association and binary logistic regression
//!   between two labeled groups
//! - [`table`]: CSV input and output

pub mod analyzer;
pub mod freq;
pub mod stats;
pub mod table;

pub use analyzer::Tokenizer;
pub use freq::{aggregate, FrequencyStats, FrequencyTable};
pub use stats::{AssociationResult, AssociationTester, LogitFitter, LogitOutcome, StatsReport};
