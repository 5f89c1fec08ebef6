//! Group code to descriptive label mapping

use crate::error::{Error, Result};
use crate::pipeline::classifier::ClassifiedTable;
use fgb_common::{AnalysisConfig, UnknownGroupPolicy};
use tracing::warn;

/// Participant row with its resolved group label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledRow {
    pub participant: String,
    pub group_code: String,
    /// `None` only under `UnknownGroupPolicy::Unlabeled`
    pub group: Option<String>,
    pub responses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTable {
    pub stimuli: Vec<String>,
    pub rows: Vec<LabeledRow>,
}

impl LabeledTable {
    /// Rows that take part in group aggregates
    pub fn labeled_rows(&self) -> impl Iterator<Item = (&str, &LabeledRow)> {
        self.rows
            .iter()
            .filter_map(|row| row.group.as_deref().map(|g| (g, row)))
    }
}

/// Replace group codes with labels by exact match
pub fn label_groups(table: ClassifiedTable, config: &AnalysisConfig) -> Result<LabeledTable> {
    let mut unlabeled = Vec::new();
    let mut rows = Vec::with_capacity(table.rows.len());

    for row in table.rows {
        let group = config.label_for(&row.group_code).map(str::to_string);

        if group.is_none() {
            match config.unknown_group_policy {
                UnknownGroupPolicy::Fail => {
                    return Err(Error::UnknownGroupCode {
                        code: row.group_code,
                        participant: row.participant,
                    });
                }
                UnknownGroupPolicy::Unlabeled => unlabeled.push(row.participant.clone()),
            }
        }

        rows.push(LabeledRow {
            participant: row.participant,
            group_code: row.group_code,
            group,
            responses: row.responses,
        });
    }

    if !unlabeled.is_empty() {
        warn!(
            "{} participant(s) have unmapped group codes and are excluded from group statistics: {}",
            unlabeled.len(),
            unlabeled.join(", ")
        );
    }

    Ok(LabeledTable {
        stimuli: table.stimuli,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classifier::ClassifiedRow;

    fn classified(codes: &[&str]) -> ClassifiedTable {
        ClassifiedTable {
            stimuli: vec!["Stimulus 1".to_string()],
            rows: codes
                .iter()
                .enumerate()
                .map(|(i, code)| ClassifiedRow {
                    participant: format!("P{}", i + 1),
                    group_code: code.to_string(),
                    responses: vec!["1".to_string()],
                })
                .collect(),
        }
    }

    #[test]
    fn test_maps_known_codes() {
        let labeled = label_groups(classified(&["A", "B", "C"]), &AnalysisConfig::default()).unwrap();
        let labels: Vec<_> = labeled.rows.iter().map(|r| r.group.as_deref()).collect();
        assert_eq!(
            labels,
            vec![Some("Left-to-Right"), Some("Right-to-Left"), Some("Bidirectional")]
        );
    }

    #[test]
    fn test_unknown_code_fails_by_default() {
        let err = label_groups(classified(&["A", "D"]), &AnalysisConfig::default()).unwrap_err();
        match err {
            Error::UnknownGroupCode { code, participant } => {
                assert_eq!(code, "D");
                assert_eq!(participant, "P2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_match_is_exact() {
        // Lowercase codes are not the configured codes
        assert!(label_groups(classified(&["a"]), &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn test_unlabeled_policy_keeps_row_without_label() {
        let config = AnalysisConfig {
            unknown_group_policy: UnknownGroupPolicy::Unlabeled,
            ..AnalysisConfig::default()
        };
        let labeled = label_groups(classified(&["A", "Z"]), &config).unwrap();

        assert_eq!(labeled.rows.len(), 2);
        assert_eq!(labeled.rows[1].group, None);
        assert_eq!(labeled.labeled_rows().count(), 1);
    }
}
