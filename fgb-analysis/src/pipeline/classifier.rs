//! Column classification
//!
//! Keeps the identifier columns plus the configured analysis stimuli and
//! drops the excluded trial stimuli. The configured partition must agree with
//! the stimulus columns actually present in the raw table.

use crate::data::ResponseTable;
use crate::error::{Error, Result};
use fgb_common::AnalysisConfig;
use std::collections::HashSet;
use tracing::debug;

/// One participant row restricted to the analysis stimuli
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow {
    pub participant: String,
    pub group_code: String,
    /// Raw cells, parallel to `ClassifiedTable::stimuli`
    pub responses: Vec<String>,
}

/// Primary table reduced to identifiers and analysis stimuli
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTable {
    /// Analysis stimulus names in configured order
    pub stimuli: Vec<String>,
    pub rows: Vec<ClassifiedRow>,
}

/// Partition the primary table's columns and keep the analysis set
pub fn classify(table: &ResponseTable, config: &AnalysisConfig) -> Result<ClassifiedTable> {
    let participant_idx = table.require_column(&config.participant_column)?;
    let group_idx = table.require_column(&config.group_column)?;

    // Raw stimulus columns must all be accounted for by the partition
    let unknown: Vec<&str> = table
        .headers()
        .iter()
        .map(String::as_str)
        .filter(|h| config.is_stimulus_column(h) && !config.stimuli.contains(h))
        .collect();
    if !unknown.is_empty() {
        return Err(Error::SchemaMismatch(format!(
            "{} table has stimulus columns in neither the analysis nor the excluded list: {}",
            table.name(),
            unknown.join(", ")
        )));
    }

    // ... and every configured column must be present
    let missing: Vec<&str> = config
        .stimuli
        .analysis
        .iter()
        .chain(config.stimuli.excluded.iter())
        .map(String::as_str)
        .filter(|c| !table.has_column(c))
        .collect();
    if !missing.is_empty() {
        return Err(Error::SchemaMismatch(format!(
            "{} table is missing configured stimulus columns: {}",
            table.name(),
            missing.join(", ")
        )));
    }

    let analysis_idx: Vec<usize> = config
        .stimuli
        .analysis
        .iter()
        .map(|c| table.require_column(c))
        .collect::<Result<_>>()?;

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(table.len());
    for (line, raw) in table.rows().iter().enumerate() {
        let participant = raw[participant_idx].clone();
        if participant.is_empty() {
            return Err(Error::SchemaMismatch(format!(
                "{} table row {} has a blank {}",
                table.name(),
                line + 1,
                config.participant_column
            )));
        }
        if !seen.insert(participant.clone()) {
            return Err(Error::DuplicateParticipant {
                participant,
                table: table.name().to_string(),
            });
        }

        rows.push(ClassifiedRow {
            participant,
            group_code: raw[group_idx].clone(),
            responses: analysis_idx.iter().map(|&i| raw[i].clone()).collect(),
        });
    }

    debug!(
        participants = rows.len(),
        analysis = config.stimuli.analysis.len(),
        excluded = config.stimuli.excluded.len(),
        "Classified stimulus columns"
    );

    Ok(ClassifiedTable {
        stimuli: config.stimuli.analysis.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fgb_common::StimulusSet;

    fn small_config() -> AnalysisConfig {
        AnalysisConfig {
            stimuli: StimulusSet {
                analysis: vec!["Stimulus 2".to_string(), "Stimulus 1".to_string()],
                excluded: vec!["Stimulus 3".to_string()],
            },
            ..AnalysisConfig::default()
        }
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> ResponseTable {
        ResponseTable::new(
            "primary",
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_keeps_analysis_columns_in_config_order() {
        let t = table(
            &["Participant", "Group", "Stimulus 1", "Stimulus 2", "Stimulus 3"],
            &[&["P1", "A", "1", "0", "1"]],
        );

        let classified = classify(&t, &small_config()).unwrap();
        assert_eq!(classified.stimuli, vec!["Stimulus 2", "Stimulus 1"]);
        assert_eq!(classified.rows[0].responses, vec!["0", "1"]);
        assert_eq!(classified.rows[0].group_code, "A");
    }

    #[test]
    fn test_missing_configured_column() {
        let t = table(
            &["Participant", "Group", "Stimulus 1", "Stimulus 2"],
            &[&["P1", "A", "1", "0"]],
        );
        let err = classify(&t, &small_config()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(ref m) if m.contains("Stimulus 3")));
    }

    #[test]
    fn test_unpartitioned_stimulus_column() {
        let t = table(
            &["Participant", "Group", "Stimulus 1", "Stimulus 2", "Stimulus 3", "Stimulus 4"],
            &[&["P1", "A", "1", "0", "1", "1"]],
        );
        let err = classify(&t, &small_config()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(ref m) if m.contains("Stimulus 4")));
    }

    #[test]
    fn test_missing_group_column() {
        let t = table(&["Participant", "Stimulus 1", "Stimulus 2", "Stimulus 3"], &[]);
        assert!(matches!(
            classify(&t, &small_config()),
            Err(Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_duplicate_participant() {
        let t = table(
            &["Participant", "Group", "Stimulus 1", "Stimulus 2", "Stimulus 3"],
            &[&["P1", "A", "1", "0", "1"], &["P1", "B", "0", "0", "0"]],
        );
        assert!(matches!(
            classify(&t, &small_config()),
            Err(Error::DuplicateParticipant { .. })
        ));
    }

    #[test]
    fn test_non_stimulus_extra_columns_ignored() {
        let t = table(
            &["Participant", "Group", "Age", "Stimulus 1", "Stimulus 2", "Stimulus 3"],
            &[&["P1", "A", "31", "1", "0", "1"]],
        );
        let classified = classify(&t, &small_config()).unwrap();
        assert_eq!(classified.rows.len(), 1);
    }
}
