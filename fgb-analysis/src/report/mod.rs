//! Analysis result bundle and its consumers
//!
//! [`AnalysisReport`] holds everything one run produced. Consumers:
//! - [`CliFormatter`]: console tables
//! - [`AnalysisReport::export_json`]: machine-readable export
//! - [`charts`]: SVG charts

pub mod charts;
pub mod formatter;

pub use formatter::CliFormatter;

use crate::error::Result;
use crate::pipeline::{ContingencyTable, FigureGroundAggregate, SideChoiceAggregate};
use crate::stats::ChiSquareResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

pub const FIGURE_GROUND_TEST: &str = "Black vs. White Figure";
pub const SIDE_CHOICE_TEST: &str = "Right vs. Left Preference";

/// Run metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Report creation timestamp (RFC 3339)
    pub timestamp: String,
    /// Version of the tool that produced the report
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureGroundSection {
    pub aggregate: FigureGroundAggregate,
    pub contingency: ContingencyTable,
    pub test: ChiSquareResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideChoiceSection {
    pub aggregate: SideChoiceAggregate,
    pub contingency: ContingencyTable,
    pub test: ChiSquareResult,
}

/// Complete result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub session: SessionInfo,
    pub figure_ground: FigureGroundSection,
    /// Present only when a side-choice table was supplied
    pub side_choice: Option<SideChoiceSection>,
}

impl AnalysisReport {
    pub fn new(figure_ground: FigureGroundSection, side_choice: Option<SideChoiceSection>) -> Self {
        Self {
            session: SessionInfo {
                timestamp: chrono::Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            figure_ground,
            side_choice,
        }
    }

    /// All tests run, in report order
    pub fn tests(&self) -> Vec<(&'static str, &ChiSquareResult)> {
        let mut tests = vec![(FIGURE_GROUND_TEST, &self.figure_ground.test)];
        if let Some(side) = &self.side_choice {
            tests.push((SIDE_CHOICE_TEST, &side.test));
        }
        tests
    }

    /// Export report to a pretty-printed JSON file
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Import a report previously written by `export_json`
    pub fn import_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(BufReader::new(file))?;
        Ok(report)
    }
}
