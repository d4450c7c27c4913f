use core::fmt;

use crate::stats::recode::{Group, RecodedSample};

/// 2×2 table of counts. Rows are groups (baseline, comparison); columns are
/// outcomes (positive, negative).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContingencyTable {
    cells: [[u64; 2]; 2],
}

impl ContingencyTable {
    /// Builds a table from explicit cells `[[b_pos, b_neg], [c_pos, c_neg]]`.
    pub const fn from_cells(cells: [[u64; 2]; 2]) -> Self {
        Self { cells }
    }

    /// Tallies a recoded sample. Every record lands in exactly one cell.
    pub fn from_sample(sample: &RecodedSample) -> Self {
        let mut cells = [[0u64; 2]; 2];
        for (&x, &y) in sample.covariate.iter().zip(&sample.outcome) {
            let col = if y == 1 { 0 } else { 1 };
            cells[Group::from_covariate(x).index()][col] += 1;
        }
        Self { cells }
    }

    /// Raw cells.
    #[inline]
    pub const fn cells(&self) -> [[u64; 2]; 2] {
        self.cells
    }

    /// Positive count of a group.
    #[inline]
    pub fn positive(&self, group: Group) -> u64 {
        self.cells[group.index()][0]
    }

    /// Negative count of a group.
    #[inline]
    pub fn negative(&self, group: Group) -> u64 {
        self.cells[group.index()][1]
    }

    /// Record count of a group.
    #[inline]
    pub fn total(&self, group: Group) -> u64 {
        self.positive(group) + self.negative(group)
    }

    /// Positive share of a group, `0.0` for an empty group.
    pub fn rate(&self, group: Group) -> f64 {
        let total = self.total(group);
        if total == 0 {
            0.0
        } else {
            self.positive(group) as f64 / total as f64
        }
    }

    /// Sum of all cells.
    #[inline]
    pub fn grand_total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Counts expected under independence.
    pub fn expected(&self) -> [[f64; 2]; 2] {
        let n = self.grand_total() as f64;
        let mut out = [[0.0; 2]; 2];
        if n == 0.0 {
            return out;
        }
        let rows = [self.total(Group::Baseline), self.total(Group::Comparison)];
        let cols = [
            self.cells[0][0] + self.cells[1][0],
            self.cells[0][1] + self.cells[1][1],
        ];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = rows[r] as f64 * cols[c] as f64 / n;
            }
        }
        out
    }

    /// Whether some expected count is zero, leaving chi-square undefined.
    pub fn is_degenerate(&self) -> bool {
        self.expected().iter().flatten().any(|&e| e == 0.0)
    }

    /// Whether any observed cell is zero.
    pub fn has_empty_cell(&self) -> bool {
        self.cells.iter().flatten().any(|&c| c == 0)
    }

    /// Pearson chi-square statistic without continuity correction, `None`
    /// when degenerate.
    pub fn pearson_statistic(&self) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        let expected = self.expected();
        let mut stat = 0.0;
        for r in 0..2 {
            for c in 0..2 {
                let diff = self.cells[r][c] as f64 - expected[r][c];
                stat += diff * diff / expected[r][c];
            }
        }
        Some(stat)
    }
}

impl fmt::Display for ContingencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>8} {:>8}", "", "positive", "negative")?;
        writeln!(f, "{:>12} {:>8} {:>8}", "baseline", self.cells[0][0], self.cells[0][1])?;
        write!(f, "{:>12} {:>8} {:>8}", "comparison", self.cells[1][0], self.cells[1][1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_partitions_into_cells() {
        let sample = RecodedSample {
            covariate: vec![0, 0, 1, 1, 1],
            outcome: vec![1, 0, 1, 1, 0],
            excluded: 4,
        };
        let table = ContingencyTable::from_sample(&sample);
        assert_eq!(table.cells(), [[1, 1], [2, 1]]);
        assert_eq!(table.grand_total(), sample.len() as u64);
    }

    #[test]
    fn empty_group_rate_is_zero() {
        let table = ContingencyTable::from_cells([[0, 0], [2, 3]]);
        assert_eq!(table.rate(Group::Baseline), 0.0);
        assert!((table.rate(Group::Comparison) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn expected_counts() {
        let table = ContingencyTable::from_cells([[3, 7], [7, 3]]);
        assert_eq!(table.expected(), [[5.0, 5.0], [5.0, 5.0]]);
    }

    #[test]
    fn pearson_statistic_matches_hand_computation() {
        let table = ContingencyTable::from_cells([[3, 7], [7, 3]]);
        let stat = table.pearson_statistic().unwrap();
        assert!((stat - 3.2).abs() < 1e-12);
    }

    #[test]
    fn single_outcome_level_is_degenerate() {
        let table = ContingencyTable::from_cells([[4, 0], [6, 0]]);
        assert!(table.is_degenerate());
        assert_eq!(table.pearson_statistic(), None);
    }

    #[test]
    fn zero_cell_is_not_always_degenerate() {
        let table = ContingencyTable::from_cells([[0, 5], [3, 2]]);
        assert!(table.has_empty_cell());
        assert!(!table.is_degenerate());
        // Observed counts as given; no 0.5 shift for the empty cell.
        let stat = table.pearson_statistic().unwrap();
        assert!((stat - 30.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn empty_table() {
        let table = ContingencyTable::default();
        assert_eq!(table.grand_total(), 0);
        assert!(table.is_degenerate());
    }
}
