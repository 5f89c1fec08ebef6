//! fgb-analysis library - figure-ground and side-choice bias analysis
//!
//! Loads survey CSVs, aggregates responses per reading-direction group,
//! builds contingency tables and runs chi-square tests of independence.

pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use error::{Error, Result};
pub use pipeline::{run_from_files, run_pipeline};
pub use report::AnalysisReport;
