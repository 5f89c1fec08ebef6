//! Observed-frequency tables for the chi-square tests
//!
//! One row per group (canonical group order), two outcome columns:
//! `[positive, opportunities - positive]`.

use crate::error::{Error, Result};
use crate::pipeline::aggregator::{FigureGroundAggregate, SideChoiceAggregate};
use serde::{Deserialize, Serialize};

pub const FIGURE_GROUND_COLUMNS: [&str; 2] = [
    "Black Figure, White Background",
    "White Figure, Black Background",
];

pub const SIDE_CHOICE_COLUMNS: [&str; 2] = ["Right Choices", "Left Choices"];

/// Labeled matrix of non-negative counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// Row-major counts, `row_labels.len()` x `column_labels.len()`
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Build from raw counts, checking the matrix is rectangular and labeled
    pub fn new(row_labels: Vec<String>, column_labels: Vec<String>, counts: Vec<Vec<u64>>) -> Result<Self> {
        if counts.len() != row_labels.len() {
            return Err(Error::DegenerateContingencyTable(format!(
                "{} rows but {} row labels",
                counts.len(),
                row_labels.len()
            )));
        }
        if let Some(row) = counts.iter().find(|r| r.len() != column_labels.len()) {
            return Err(Error::DegenerateContingencyTable(format!(
                "row with {} cells in a table with {} columns",
                row.len(),
                column_labels.len()
            )));
        }
        Ok(Self {
            row_labels,
            column_labels,
            counts,
        })
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.column_labels.len())
    }

    pub fn row_sums(&self) -> Vec<u64> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    pub fn column_sums(&self) -> Vec<u64> {
        let mut sums = vec![0u64; self.column_labels.len()];
        for row in &self.counts {
            for (sum, &count) in sums.iter_mut().zip(row.iter()) {
                *sum += count;
            }
        }
        sums
    }

    pub fn grand_total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

/// Positive-outcome count and opportunity count for one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutcome {
    pub group: String,
    pub positive: u64,
    pub opportunities: u64,
}

/// Build a G x 2 table from per-group outcomes (already in canonical order)
pub fn build_contingency(outcomes: &[GroupOutcome], column_labels: [&str; 2]) -> Result<ContingencyTable> {
    let mut counts = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if outcome.positive > outcome.opportunities {
            return Err(Error::DegenerateContingencyTable(format!(
                "group '{}' has {} positive outcomes out of {} opportunities",
                outcome.group, outcome.positive, outcome.opportunities
            )));
        }
        counts.push(vec![outcome.positive, outcome.opportunities - outcome.positive]);
    }

    ContingencyTable::new(
        outcomes.iter().map(|o| o.group.clone()).collect(),
        column_labels.iter().map(|c| c.to_string()).collect(),
        counts,
    )
}

/// Black vs. white figure counts per group
///
/// Opportunities are `group size x number of analysed stimuli`.
pub fn figure_ground_table(aggregate: &FigureGroundAggregate) -> Result<ContingencyTable> {
    let n = aggregate.analysis_count() as u64;
    let outcomes: Vec<GroupOutcome> = aggregate
        .groups
        .iter()
        .map(|g| GroupOutcome {
            group: g.group.clone(),
            positive: g.sum_black,
            opportunities: g.participants as u64 * n,
        })
        .collect();
    build_contingency(&outcomes, FIGURE_GROUND_COLUMNS)
}

/// Right vs. left choice counts per group
///
/// Opportunities are `group size x number of side-choice stimuli`.
pub fn side_choice_table(aggregate: &SideChoiceAggregate) -> Result<ContingencyTable> {
    let n = aggregate.side_count() as u64;
    let outcomes: Vec<GroupOutcome> = aggregate
        .groups
        .iter()
        .map(|g| GroupOutcome {
            group: g.group.clone(),
            positive: g.total_right,
            opportunities: g.participants as u64 * n,
        })
        .collect();
    build_contingency(&outcomes, SIDE_CHOICE_COLUMNS)
}
