//! # FGB Common Library
//!
//! Shared code for the figure-ground bias analysis tools:
//! - Error types
//! - Analysis configuration (stimulus partition, group labels, policies)
//! - Configuration file loading and path resolution

pub mod config;
pub mod error;

pub use config::{AnalysisConfig, GroupLabel, StimulusSet, UnknownGroupPolicy, UnmatchedParticipantPolicy};
pub use error::{Error, Result};
