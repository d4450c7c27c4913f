//! Token frequency aggregation.
//!
//! Flattens per-record token lists in record order, counts every token,
//! drops tokens seen fewer than `min_freq` times and ranks the rest by
//! count descending, then token ascending.
//!
//! Counting uses an `FxHashMap` keyed by token; ranking is a single sort
//! of the retained rows using [`FrequencyRow`](dupe_types::FrequencyRow)'s
//! ordering.

mod builder;
mod stats;
mod types;

pub use builder::{aggregate, FrequencyCounter};
pub use stats::FrequencyStats;
pub use types::FrequencyTable;

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|l| l.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn counts_across_records() {
        let table = aggregate(&lists(&[&["平替", "好用"], &["平替"], &["平替", "便宜"]]), 1);
        assert_eq!(table.count_of("平替"), Some(3));
        assert_eq!(table.count_of("好用"), Some(1));
        assert_eq!(table.rows()[0].token, "平替");
    }

    #[test]
    fn threshold_drops_rare_tokens() {
        let table = aggregate(&lists(&[&["a", "a", "a", "b", "b"], &["c"]]), 2);
        let tokens: Vec<&str> = table.rows().iter().map(|r| r.token.as_str()).collect();
        assert_eq!(tokens, ["a", "b"]);
        assert_eq!(table.count_of("c"), None);
    }

    #[test]
    fn ties_break_by_token() {
        let table = aggregate(&lists(&[&["好", "b", "a"], &["a", "好", "b"]]), 1);
        let tokens: Vec<&str> = table.rows().iter().map(|r| r.token.as_str()).collect();
        assert_eq!(tokens, ["a", "b", "好"]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = aggregate(&Vec::<Vec<String>>::new(), 3);
        assert!(table.is_empty());
        assert_eq!(table.stats().total_tokens, 0);
    }

    #[test]
    fn stats_describe_the_run() {
        let table = aggregate(&lists(&[&["a", "a", "a"], &["b", "c"]]), 2);
        let stats = table.stats();
        assert_eq!(stats.total_tokens, 5);
        assert_eq!(stats.distinct_tokens, 3);
        assert_eq!(stats.retained, 1);
        assert_eq!(stats.min_freq, 2);
        assert_eq!(stats.to_string(), "5 tokens, 3 distinct, 1 retained (min_freq 2)");
    }

    #[test]
    fn top_is_a_prefix() {
        let table = aggregate(&lists(&[&["a", "a", "b", "b", "b", "c"]]), 1);
        assert_eq!(table.top(2).len(), 2);
        assert_eq!(table.top(2)[0].token, "b");
        assert_eq!(table.top(10).len(), 3);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn token_lists() -> impl Strategy<Value = Vec<Vec<String>>> {
            prop::collection::vec(prop::collection::vec("[a-e平替好]", 0..8), 0..8)
        }

        proptest! {
            #[test]
            fn every_row_meets_threshold(input in token_lists(), min_freq in 1u64..5) {
                let table = aggregate(&input, min_freq);
                prop_assert!(table.rows().iter().all(|r| r.count >= min_freq));
            }

            #[test]
            fn rows_are_ranked(input in token_lists()) {
                let table = aggregate(&input, 1);
                for pair in table.rows().windows(2) {
                    prop_assert!(pair[0].count >= pair[1].count);
                    if pair[0].count == pair[1].count {
                        prop_assert!(pair[0].token < pair[1].token);
                    }
                }
            }

            #[test]
            fn counts_sum_to_total(input in token_lists()) {
                let table = aggregate(&input, 1);
                let sum: u64 = table.rows().iter().map(|r| r.count).sum();
                let total: usize = input.iter().map(Vec::len).sum();
                prop_assert_eq!(sum, total as u64);
                prop_assert_eq!(table.stats().total_tokens, total as u64);
            }
        }
    }
}
