//! Per-participant totals and per-group summaries
//!
//! Two paths with the same shape:
//! - Figure/ground: `TotalBlack = sum(responses)`, `TotalWhite = N - TotalBlack`
//! - Side choice: `TotalRight = sum(choices)`, `TotalLeft = N - TotalRight`
//!
//! The complement is only meaningful when every cell holds one of the two
//! encodings, so every cell is validated before it is summed.

use crate::error::{Error, Result};
use crate::pipeline::labeler::LabeledTable;
use crate::pipeline::merge::MergedSideTable;
use fgb_common::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Parse a figure/ground cell: 1 = black figure, 0 = white figure
///
/// Spreadsheet exports may write the codes as floats, so `1.0`/`0.0` are
/// accepted too. Empty cells are invalid.
pub fn parse_binary_response(participant: &str, column: &str, value: &str) -> Result<u8> {
    let parsed = match value.trim() {
        "1" => Some(1),
        "0" => Some(0),
        other => other.parse::<f64>().ok().and_then(|v| {
            if v == 1.0 {
                Some(1)
            } else if v == 0.0 {
                Some(0)
            } else {
                None
            }
        }),
    };

    parsed.ok_or_else(|| Error::InvalidResponseValue {
        participant: participant.to_string(),
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Parse a side-choice cell: "Right" = 1, "Left" = 0 (ASCII case-insensitive)
pub fn parse_side_choice(participant: &str, column: &str, value: &str) -> Result<u8> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("right") {
        Ok(1)
    } else if trimmed.eq_ignore_ascii_case("left") {
        Ok(0)
    } else {
        Err(Error::InvalidResponseValue {
            participant: participant.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

/// Order the labels present in the data by the configured group order
pub fn ordered_groups<'a, I>(labels: I, config: &AnalysisConfig) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: Vec<String> = Vec::new();
    for label in labels {
        if !groups.iter().any(|g| g == label) {
            groups.push(label.to_string());
        }
    }
    // Labels always come from the config table; unknown ones sort last by name
    groups.sort_by(|a, b| {
        let rank_a = config.group_rank(a).unwrap_or(usize::MAX);
        let rank_b = config.group_rank(b).unwrap_or(usize::MAX);
        rank_a.cmp(&rank_b).then_with(|| a.cmp(b))
    });
    groups
}

fn mean(sum: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

// ============================================================================
// Figure / ground
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantFigureTotals {
    pub participant: String,
    pub group: Option<String>,
    /// Parsed responses, parallel to the analysis stimuli
    pub responses: Vec<u8>,
    pub total_black: u32,
    pub total_white: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFigureSummary {
    pub group: String,
    pub participants: usize,
    pub sum_black: u64,
    pub sum_white: u64,
    pub mean_black: f64,
    pub mean_white: f64,
}

/// Black/white counts for one stimulus within one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusGroupCount {
    pub stimulus: String,
    pub group: String,
    pub black: u32,
    pub white: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureGroundAggregate {
    pub stimuli: Vec<String>,
    pub participants: Vec<ParticipantFigureTotals>,
    /// Canonical group order
    pub groups: Vec<GroupFigureSummary>,
    /// Stimulus-major, then canonical group order
    pub per_stimulus: Vec<StimulusGroupCount>,
}

impl FigureGroundAggregate {
    pub fn analysis_count(&self) -> usize {
        self.stimuli.len()
    }
}

/// Compute figure/ground totals for every participant and group
pub fn aggregate_figure_ground(table: &LabeledTable, config: &AnalysisConfig) -> Result<FigureGroundAggregate> {
    let n = table.stimuli.len() as u32;

    let mut participants = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let responses = row
            .responses
            .iter()
            .zip(table.stimuli.iter())
            .map(|(value, column)| parse_binary_response(&row.participant, column, value))
            .collect::<Result<Vec<u8>>>()?;

        let total_black: u32 = responses.iter().map(|&r| r as u32).sum();
        participants.push(ParticipantFigureTotals {
            participant: row.participant.clone(),
            group: row.group.clone(),
            responses,
            total_black,
            total_white: n - total_black,
        });
    }

    let order = ordered_groups(
        participants.iter().filter_map(|p| p.group.as_deref()),
        config,
    );

    let groups = order
        .iter()
        .map(|group| {
            let members: Vec<&ParticipantFigureTotals> = participants
                .iter()
                .filter(|p| p.group.as_deref() == Some(group.as_str()))
                .collect();
            let sum_black: u64 = members.iter().map(|p| p.total_black as u64).sum();
            let sum_white: u64 = members.iter().map(|p| p.total_white as u64).sum();
            GroupFigureSummary {
                group: group.clone(),
                participants: members.len(),
                sum_black,
                sum_white,
                mean_black: mean(sum_black, members.len()),
                mean_white: mean(sum_white, members.len()),
            }
        })
        .collect();

    let mut per_stimulus = Vec::with_capacity(table.stimuli.len() * order.len());
    for (s, stimulus) in table.stimuli.iter().enumerate() {
        let mut counts: HashMap<&str, (u32, u32)> = HashMap::new();
        for p in &participants {
            if let Some(group) = p.group.as_deref() {
                let entry = counts.entry(group).or_insert((0, 0));
                if p.responses[s] == 1 {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }
        for group in &order {
            let (black, white) = counts.get(group.as_str()).copied().unwrap_or((0, 0));
            per_stimulus.push(StimulusGroupCount {
                stimulus: stimulus.clone(),
                group: group.clone(),
                black,
                white,
            });
        }
    }

    debug!(
        participants = participants.len(),
        groups = order.len(),
        "Aggregated figure/ground responses"
    );

    Ok(FigureGroundAggregate {
        stimuli: table.stimuli.clone(),
        participants,
        groups,
        per_stimulus,
    })
}

// ============================================================================
// Side choice
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSideTotals {
    pub participant: String,
    pub group: Option<String>,
    pub total_right: u32,
    pub total_left: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSideSummary {
    pub group: String,
    pub participants: usize,
    pub total_right: u64,
    pub total_left: u64,
    pub mean_right: f64,
    /// `100 * right / (right + left)`
    pub right_percent: f64,
    pub left_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideChoiceAggregate {
    /// Side-choice column names as found in the input
    pub columns: Vec<String>,
    pub participants: Vec<ParticipantSideTotals>,
    pub groups: Vec<GroupSideSummary>,
    /// Participants dropped by the participant join
    pub unmatched: Vec<String>,
}

impl SideChoiceAggregate {
    pub fn side_count(&self) -> usize {
        self.columns.len()
    }
}

/// Compute right/left totals for every matched participant and group
pub fn aggregate_side_choice(table: &MergedSideTable, config: &AnalysisConfig) -> Result<SideChoiceAggregate> {
    let n = table.columns.len() as u32;

    let mut participants = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut total_right = 0u32;
        for (value, column) in row.choices.iter().zip(table.columns.iter()) {
            total_right += parse_side_choice(&row.participant, column, value)? as u32;
        }
        participants.push(ParticipantSideTotals {
            participant: row.participant.clone(),
            group: row.group.clone(),
            total_right,
            total_left: n - total_right,
        });
    }

    let order = ordered_groups(
        participants.iter().filter_map(|p| p.group.as_deref()),
        config,
    );

    let groups = order
        .iter()
        .map(|group| {
            let members: Vec<&ParticipantSideTotals> = participants
                .iter()
                .filter(|p| p.group.as_deref() == Some(group.as_str()))
                .collect();
            let total_right: u64 = members.iter().map(|p| p.total_right as u64).sum();
            let total_left: u64 = members.iter().map(|p| p.total_left as u64).sum();
            let choices = total_right + total_left;
            let right_percent = if choices == 0 {
                0.0
            } else {
                100.0 * total_right as f64 / choices as f64
            };
            GroupSideSummary {
                group: group.clone(),
                participants: members.len(),
                total_right,
                total_left,
                mean_right: mean(total_right, members.len()),
                right_percent,
                left_percent: 100.0 - right_percent,
            }
        })
        .collect();

    debug!(
        participants = participants.len(),
        groups = order.len(),
        "Aggregated side-choice responses"
    );

    Ok(SideChoiceAggregate {
        columns: table.columns.clone(),
        participants,
        groups,
        unmatched: table.unmatched.clone(),
    })
}
