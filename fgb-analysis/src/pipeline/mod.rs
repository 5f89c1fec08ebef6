//! # Analysis Pipeline
//!
//! Single-pass batch pipeline, data flows strictly forward:
//!
//! Loader → Classifier → Labeler → Aggregator → Contingency Builder → Tester
//!
//! [`run_pipeline`] assembles every stage into one [`AnalysisReport`]; console
//! output, JSON export and charts consume that bundle.

pub mod aggregator;
pub mod classifier;
pub mod contingency;
pub mod labeler;
pub mod merge;

pub use aggregator::{
    aggregate_figure_ground, aggregate_side_choice, FigureGroundAggregate, GroupFigureSummary,
    GroupSideSummary, ParticipantFigureTotals, ParticipantSideTotals, SideChoiceAggregate,
    StimulusGroupCount,
};
pub use classifier::{classify, ClassifiedTable};
pub use contingency::{build_contingency, ContingencyTable, GroupOutcome};
pub use labeler::{label_groups, LabeledTable};
pub use merge::{merge_side_choices, MergedSideTable};

use crate::data::{load_csv, ResponseTable};
use crate::error::Result;
use crate::report::{AnalysisReport, FigureGroundSection, SideChoiceSection};
use crate::stats::chi_square_independence;
use fgb_common::AnalysisConfig;
use std::path::Path;
use tracing::info;

/// Table role names used in error messages
pub const PRIMARY_TABLE: &str = "primary";
pub const SIDE_TABLE: &str = "side-choice";

/// Run every stage on already-loaded tables
pub fn run_pipeline(
    primary: &ResponseTable,
    side: Option<&ResponseTable>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    config.validate()?;

    let classified = classify(primary, config)?;
    let labeled = label_groups(classified, config)?;

    let aggregate = aggregate_figure_ground(&labeled, config)?;
    let contingency = contingency::figure_ground_table(&aggregate)?;
    let test = chi_square_independence(&contingency, config.yates_correction)?;
    info!(
        "Figure/ground: {} participants in {} groups, chi2 = {:.4}, p = {:.4e}, dof = {}",
        aggregate.participants.len(),
        aggregate.groups.len(),
        test.statistic,
        test.p_value,
        test.degrees_of_freedom
    );
    let figure_ground = FigureGroundSection {
        aggregate,
        contingency,
        test,
    };

    let side_choice = match side {
        Some(side_table) => {
            let merged = merge_side_choices(&labeled, side_table, config)?;
            let aggregate = aggregate_side_choice(&merged, config)?;
            let contingency = contingency::side_choice_table(&aggregate)?;
            let test = chi_square_independence(&contingency, config.yates_correction)?;
            info!(
                "Side choice: {} participants matched, chi2 = {:.4}, p = {:.4e}, dof = {}",
                aggregate.participants.len(),
                test.statistic,
                test.p_value,
                test.degrees_of_freedom
            );
            Some(SideChoiceSection {
                aggregate,
                contingency,
                test,
            })
        }
        None => None,
    };

    Ok(AnalysisReport::new(figure_ground, side_choice))
}

/// Load the input files and run the pipeline
pub fn run_from_files(
    primary_path: &Path,
    side_path: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let primary = load_csv(primary_path, PRIMARY_TABLE, config)?;
    let side = side_path
        .map(|path| load_csv(path, SIDE_TABLE, config))
        .transpose()?;

    info!(
        "Loaded {} primary rows{}",
        primary.len(),
        side.as_ref()
            .map(|s| format!(", {} side-choice rows", s.len()))
            .unwrap_or_default()
    );

    run_pipeline(&primary, side.as_ref(), config)
}
