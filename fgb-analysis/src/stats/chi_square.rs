//! Pearson chi-square test of independence
//!
//! Expected counts under independence are `row_total * col_total / total`.
//! The p-value is the chi-square survival function at the statistic with
//! `(rows - 1) * (cols - 1)` degrees of freedom. For one degree of freedom
//! Yates' continuity correction is optional and moves each observed count
//! towards its expectation by at most 0.5.

use crate::error::{Error, Result};
use crate::pipeline::contingency::ContingencyTable;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    /// Same shape as the observed table
    pub expected: Vec<Vec<f64>>,
    pub yates_applied: bool,
}

impl ChiSquareResult {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Run the test on a contingency table
///
/// A table whose outcome column is entirely zero (every group answered the
/// same way) shows no association: statistic 0, p-value 1.
pub fn chi_square_independence(table: &ContingencyTable, yates_correction: bool) -> Result<ChiSquareResult> {
    let (rows, cols) = table.shape();
    if rows < 2 || cols < 2 {
        return Err(Error::DegenerateContingencyTable(format!(
            "need at least 2 groups and 2 outcomes, got {}x{}",
            rows, cols
        )));
    }

    let row_sums = table.row_sums();
    if let Some(i) = row_sums.iter().position(|&s| s == 0) {
        return Err(Error::DegenerateContingencyTable(format!(
            "row '{}' has no observations",
            table.row_labels[i]
        )));
    }

    let degrees_of_freedom = (rows - 1) * (cols - 1);
    let column_sums = table.column_sums();
    let total = table.grand_total() as f64;

    let expected: Vec<Vec<f64>> = row_sums
        .iter()
        .map(|&r| {
            column_sums
                .iter()
                .map(|&c| r as f64 * c as f64 / total)
                .collect()
        })
        .collect();

    if column_sums.iter().any(|&s| s == 0) {
        return Ok(ChiSquareResult {
            statistic: 0.0,
            p_value: 1.0,
            degrees_of_freedom,
            expected,
            yates_applied: false,
        });
    }

    let yates_applied = yates_correction && degrees_of_freedom == 1;

    let mut statistic = 0.0;
    for (observed_row, expected_row) in table.counts.iter().zip(expected.iter()) {
        for (&o, &e) in observed_row.iter().zip(expected_row.iter()) {
            let mut diff = (o as f64 - e).abs();
            if yates_applied {
                diff -= diff.min(0.5);
            }
            statistic += diff * diff / e;
        }
    }

    let distribution = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| Error::DegenerateContingencyTable(e.to_string()))?;
    let p_value = distribution.sf(statistic).clamp(0.0, 1.0);

    Ok(ChiSquareResult {
        statistic,
        p_value,
        degrees_of_freedom,
        expected,
        yates_applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(counts: Vec<Vec<u64>>) -> ContingencyTable {
        let rows = (0..counts.len()).map(|i| format!("G{}", i)).collect();
        let cols = (0..counts[0].len()).map(|j| format!("O{}", j)).collect();
        ContingencyTable::new(rows, cols, counts).unwrap()
    }

    #[test]
    fn test_identical_groups_single_outcome() {
        let result = chi_square_independence(&table(vec![vec![50, 0], vec![50, 0], vec![50, 0]]), true).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert_eq!(result.degrees_of_freedom, 2);
        assert_eq!(result.expected, vec![vec![50.0, 0.0]; 3]);
    }

    #[test]
    fn test_strong_association() {
        let result =
            chi_square_independence(&table(vec![vec![100, 0], vec![0, 100], vec![50, 50]]), true).unwrap();
        assert!((result.statistic - 200.0).abs() < 1e-9);
        assert_eq!(result.degrees_of_freedom, 2);
        assert!(result.p_value < 0.001);
        assert!(!result.yates_applied);
        assert!(result.is_significant(0.05));
    }

    #[test]
    fn test_known_3x2_value() {
        // Expected: row totals 20, 30, 50; column totals 40, 60
        let result = chi_square_independence(&table(vec![vec![10, 10], vec![10, 20], vec![20, 30]]), true).unwrap();
        // E = [[8,12],[12,18],[20,30]]
        let expected_stat = 4.0 / 8.0 + 4.0 / 12.0 + 4.0 / 12.0 + 4.0 / 18.0;
        assert!((result.statistic - expected_stat).abs() < 1e-12);
        // chi2(2) survival = exp(-x/2)
        assert!((result.p_value - (-expected_stat / 2.0).exp()).abs() < 1e-9);
        assert_eq!(result.expected[0], vec![8.0, 12.0]);
    }

    #[test]
    fn test_yates_correction_on_2x2() {
        // E = 15 everywhere, |O - E| = 5
        let t = table(vec![vec![20, 10], vec![10, 20]]);

        let corrected = chi_square_independence(&t, true).unwrap();
        assert!(corrected.yates_applied);
        assert!((corrected.statistic - 4.0 * 4.5 * 4.5 / 15.0).abs() < 1e-12);

        let plain = chi_square_independence(&t, false).unwrap();
        assert!(!plain.yates_applied);
        assert!((plain.statistic - 4.0 * 25.0 / 15.0).abs() < 1e-12);
        assert!(plain.p_value < corrected.p_value);
    }

    #[test]
    fn test_single_group_is_degenerate() {
        assert!(matches!(
            chi_square_independence(&table(vec![vec![5, 5]]), true),
            Err(Error::DegenerateContingencyTable(_))
        ));
    }

    #[test]
    fn test_empty_row_is_degenerate() {
        assert!(matches!(
            chi_square_independence(&table(vec![vec![5, 5], vec![0, 0]]), true),
            Err(Error::DegenerateContingencyTable(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let t = table(vec![vec![31, 19], vec![22, 28], vec![40, 10]]);
        let a = chi_square_independence(&t, true).unwrap();
        let b = chi_square_independence(&t, true).unwrap();
        assert_eq!(a, b);
        assert!(a.statistic >= 0.0);
        assert!((0.0..=1.0).contains(&a.p_value));
    }
}
