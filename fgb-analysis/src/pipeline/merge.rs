//! Participant join between the figure/ground and side-choice tables
//!
//! Inner join on the participant identifier. Output rows follow the primary
//! table's order. Participants present in only one table are dropped or
//! rejected according to `UnmatchedParticipantPolicy`.

use crate::data::ResponseTable;
use crate::error::{Error, Result};
use crate::pipeline::labeler::LabeledTable;
use fgb_common::{AnalysisConfig, UnmatchedParticipantPolicy};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Side-choice cells joined to a labeled participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideChoiceRow {
    pub participant: String,
    pub group: Option<String>,
    /// Raw "Left"/"Right" cells, parallel to `MergedSideTable::columns`
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSideTable {
    /// Resolved side-choice column names, one per analysis stimulus
    pub columns: Vec<String>,
    pub rows: Vec<SideChoiceRow>,
    /// Participants dropped by the inner join
    pub unmatched: Vec<String>,
}

/// Find the side-choice column for an analysis stimulus
///
/// `<stimulus><suffix>` is preferred; a table that still carries the bare
/// stimulus names is accepted as well.
fn resolve_side_column(side: &ResponseTable, stimulus: &str, config: &AnalysisConfig) -> Result<usize> {
    let suffixed = config.side_column(stimulus);
    side.column_index(&suffixed)
        .or_else(|| side.column_index(stimulus))
        .ok_or_else(|| {
            Error::SchemaMismatch(format!(
                "{} table has neither '{}' nor '{}'",
                side.name(),
                suffixed,
                stimulus
            ))
        })
}

/// Join side-choice responses onto the labeled primary rows
pub fn merge_side_choices(
    primary: &LabeledTable,
    side: &ResponseTable,
    config: &AnalysisConfig,
) -> Result<MergedSideTable> {
    let participant_idx = side.require_column(&config.participant_column)?;
    let choice_idx: Vec<usize> = primary
        .stimuli
        .iter()
        .map(|s| resolve_side_column(side, s, config))
        .collect::<Result<_>>()?;

    let mut by_participant: HashMap<&str, &Vec<String>> = HashMap::with_capacity(side.len());
    for raw in side.rows() {
        let participant = raw[participant_idx].as_str();
        if by_participant.insert(participant, raw).is_some() {
            return Err(Error::DuplicateParticipant {
                participant: participant.to_string(),
                table: side.name().to_string(),
            });
        }
    }

    let mut matched = HashSet::new();
    let mut unmatched = Vec::new();
    let mut rows = Vec::with_capacity(primary.rows.len());

    for row in &primary.rows {
        match by_participant.get(row.participant.as_str()) {
            Some(raw) => {
                matched.insert(row.participant.as_str());
                rows.push(SideChoiceRow {
                    participant: row.participant.clone(),
                    group: row.group.clone(),
                    choices: choice_idx.iter().map(|&i| raw[i].clone()).collect(),
                });
            }
            None => unmatched.push(row.participant.clone()),
        }
    }

    // Side-only participants, in side-table order
    for raw in side.rows() {
        let participant = raw[participant_idx].as_str();
        if !matched.contains(participant) {
            unmatched.push(participant.to_string());
        }
    }

    if !unmatched.is_empty() {
        match config.unmatched_participant_policy {
            UnmatchedParticipantPolicy::Fail => return Err(Error::UnmatchedParticipant(unmatched)),
            UnmatchedParticipantPolicy::Drop => warn!(
                "Dropping {} participant(s) not present in both tables: {}",
                unmatched.len(),
                unmatched.join(", ")
            ),
        }
    }

    let columns = choice_idx.iter().map(|&i| side.headers()[i].clone()).collect();
    debug!(matched = rows.len(), dropped = unmatched.len(), "Merged side-choice table");

    Ok(MergedSideTable {
        columns,
        rows,
        unmatched,
    })
}
