//! Analysis configuration and config file resolution
//!
//! The stimulus partition, group label table and data-handling policies are
//! an explicit structure handed to the pipeline. Built-in defaults describe
//! the 22-stimulus figure-ground survey with three reading-direction groups.
//!
//! # Config file sources (priority order)
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`FGB_CONFIG`)
//! 3. User config file (`<config_dir>/fgb/config.toml`)
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FGB_CONFIG";

/// Stimuli kept for analysis (vertically split images)
pub const DEFAULT_ANALYSIS_STIMULI: [&str; 10] = [
    "Stimulus 1",
    "Stimulus 8",
    "Stimulus 10",
    "Stimulus 14",
    "Stimulus 17",
    "Stimulus 18",
    "Stimulus 19",
    "Stimulus 20",
    "Stimulus 21",
    "Stimulus 22",
];

/// Trial stimuli dropped before analysis (horizontally split images)
pub const DEFAULT_EXCLUDED_STIMULI: [&str; 12] = [
    "Stimulus 2",
    "Stimulus 3",
    "Stimulus 4",
    "Stimulus 5",
    "Stimulus 6",
    "Stimulus 7",
    "Stimulus 9",
    "Stimulus 11",
    "Stimulus 12",
    "Stimulus 13",
    "Stimulus 15",
    "Stimulus 16",
];

/// Reading-direction cohorts, in canonical report order
pub const DEFAULT_GROUPS: [(&str, &str); 3] = [
    ("A", "Left-to-Right"),
    ("B", "Right-to-Left"),
    ("C", "Bidirectional"),
];

/// What to do with a row whose group code has no label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownGroupPolicy {
    /// Abort the run with `UnknownGroupCode`
    #[default]
    Fail,
    /// Keep the row unlabeled and leave it out of every group aggregate
    Unlabeled,
}

/// What to do with participants present in only one of the two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedParticipantPolicy {
    /// Inner-join semantics: drop them and log a warning
    #[default]
    Drop,
    /// Abort the run with `UnmatchedParticipant`
    Fail,
}

/// Static partition of stimulus columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StimulusSet {
    /// Columns used for analysis, in report order
    pub analysis: Vec<String>,
    /// Columns dropped before analysis
    pub excluded: Vec<String>,
}

impl Default for StimulusSet {
    fn default() -> Self {
        Self {
            analysis: DEFAULT_ANALYSIS_STIMULI.iter().map(|s| s.to_string()).collect(),
            excluded: DEFAULT_EXCLUDED_STIMULI.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StimulusSet {
    /// Whether `column` is named in either list
    pub fn contains(&self, column: &str) -> bool {
        self.analysis.iter().any(|c| c == column) || self.excluded.iter().any(|c| c == column)
    }

    /// Check the partition is usable: non-empty, duplicate-free, disjoint
    pub fn validate(&self) -> Result<()> {
        if self.analysis.is_empty() {
            return Err(Error::Config("stimuli.analysis must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for column in self.analysis.iter().chain(self.excluded.iter()) {
            if column.trim().is_empty() {
                return Err(Error::Config("stimulus column names must not be blank".to_string()));
            }
            if !seen.insert(column.as_str()) {
                return Err(Error::Config(format!(
                    "stimulus column '{}' listed more than once (analysis and excluded must be disjoint)",
                    column
                )));
            }
        }
        Ok(())
    }
}

/// Mapping of one group code to its descriptive label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupLabel {
    pub code: String,
    pub label: String,
}

impl GroupLabel {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete analysis configuration
///
/// Every field defaults to the built-in survey layout, so an empty TOML
/// document yields the same configuration as `AnalysisConfig::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Participant identifier column (join key for the side-choice table)
    pub participant_column: String,

    /// Group code column in the primary table
    pub group_column: String,

    /// Prefix identifying stimulus columns in the raw primary table
    pub stimulus_prefix: String,

    /// Suffix of side-choice columns in the secondary table
    pub side_suffix: String,

    /// Columns discarded on load (stray index columns)
    pub ignored_columns: Vec<String>,

    pub unknown_group_policy: UnknownGroupPolicy,

    pub unmatched_participant_policy: UnmatchedParticipantPolicy,

    /// Apply Yates' continuity correction to 2x2 tables
    pub yates_correction: bool,

    pub stimuli: StimulusSet,

    /// Group code table; list order is the canonical group order
    pub groups: Vec<GroupLabel>,

    pub logging: LoggingConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            participant_column: "Participant".to_string(),
            group_column: "Group".to_string(),
            stimulus_prefix: "Stimulus ".to_string(),
            side_suffix: "_side".to_string(),
            ignored_columns: vec![String::new(), "Unnamed: 0".to_string()],
            unknown_group_policy: UnknownGroupPolicy::default(),
            unmatched_participant_policy: UnmatchedParticipantPolicy::default(),
            yates_correction: true,
            stimuli: StimulusSet::default(),
            groups: DEFAULT_GROUPS
                .iter()
                .map(|(code, label)| GroupLabel::new(*code, *label))
                .collect(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check structural invariants before the pipeline uses the config
    pub fn validate(&self) -> Result<()> {
        if self.participant_column.trim().is_empty() || self.group_column.trim().is_empty() {
            return Err(Error::Config(
                "participant_column and group_column must not be blank".to_string(),
            ));
        }
        if self.participant_column == self.group_column {
            return Err(Error::Config(
                "participant_column and group_column must differ".to_string(),
            ));
        }

        self.stimuli.validate()?;

        if self.groups.is_empty() {
            return Err(Error::Config("at least one group label is required".to_string()));
        }
        let mut codes = HashSet::new();
        let mut labels = HashSet::new();
        for group in &self.groups {
            if group.code.trim().is_empty() || group.label.trim().is_empty() {
                return Err(Error::Config("group code and label must not be blank".to_string()));
            }
            if !codes.insert(group.code.as_str()) {
                return Err(Error::Config(format!("duplicate group code '{}'", group.code)));
            }
            if !labels.insert(group.label.as_str()) {
                return Err(Error::Config(format!("duplicate group label '{}'", group.label)));
            }
        }
        Ok(())
    }

    /// Exact-match lookup of a group code
    pub fn label_for(&self, code: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.code == code)
            .map(|g| g.label.as_str())
    }

    /// Canonical position of a group label, used to order group rows
    pub fn group_rank(&self, label: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.label == label)
    }

    /// Number of stimuli that enter the analysis
    pub fn analysis_count(&self) -> usize {
        self.stimuli.analysis.len()
    }

    /// Whether a raw column should be discarded on load
    pub fn is_ignored_column(&self, column: &str) -> bool {
        self.ignored_columns.iter().any(|c| c == column)
    }

    /// Whether a raw column is a stimulus column by naming convention
    pub fn is_stimulus_column(&self, column: &str) -> bool {
        !self.stimulus_prefix.is_empty() && column.starts_with(&self.stimulus_prefix)
    }

    /// Side-choice column name for an analysis stimulus
    pub fn side_column(&self, stimulus: &str) -> String {
        format!("{}{}", stimulus, self.side_suffix)
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit `--config` argument
    CommandLine(PathBuf),
    /// `FGB_CONFIG` environment variable
    Environment(PathBuf),
    /// Per-user config file found on disk
    UserFile(PathBuf),
    /// No file; compiled defaults
    CompiledDefaults,
    /// User config file present but unreadable; compiled defaults in effect
    UnreadableUserFile { path: PathBuf, reason: String },
}

impl ConfigSource {
    /// True when a config file was found but compiled defaults were used instead
    pub fn is_fallback(&self) -> bool {
        matches!(self, ConfigSource::UnreadableUserFile { .. })
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CommandLine(p) => write!(f, "command line ({})", p.display()),
            ConfigSource::Environment(p) => write!(f, "{} ({})", CONFIG_ENV_VAR, p.display()),
            ConfigSource::UserFile(p) => write!(f, "user config ({})", p.display()),
            ConfigSource::CompiledDefaults => write!(f, "compiled defaults"),
            ConfigSource::UnreadableUserFile { path, reason } => write!(
                f,
                "compiled defaults (could not read {}: {})",
                path.display(),
                reason
            ),
        }
    }
}

/// Decide which config file (if any) to load
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: User config file
    if let Some(path) = user_config_path() {
        if path.exists() {
            return ConfigSource::UserFile(path);
        }
    }

    // Priority 4: Compiled defaults
    ConfigSource::CompiledDefaults
}

/// Per-user config location (`~/.config/fgb/config.toml` on Linux)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fgb").join("config.toml"))
}

/// Resolve and load the effective configuration
///
/// Explicitly requested files (CLI or environment) must exist and parse.
/// A user config file that cannot be read degrades to compiled defaults and
/// is reported as [`ConfigSource::UnreadableUserFile`]. Loading happens before
/// logging is initialized, so callers log the returned source.
pub fn load_config(cli_arg: Option<&Path>) -> Result<(AnalysisConfig, ConfigSource)> {
    match resolve_config_source(cli_arg) {
        ConfigSource::CommandLine(path) => {
            Ok((load_required(&path)?, ConfigSource::CommandLine(path)))
        }
        ConfigSource::Environment(path) => {
            Ok((load_required(&path)?, ConfigSource::Environment(path)))
        }
        ConfigSource::UserFile(path) => match std::fs::read_to_string(&path) {
            Ok(content) => Ok((AnalysisConfig::from_toml_str(&content)?, ConfigSource::UserFile(path))),
            Err(e) => Ok((
                AnalysisConfig::default(),
                ConfigSource::UnreadableUserFile {
                    path,
                    reason: e.to_string(),
                },
            )),
        },
        source => Ok((AnalysisConfig::default(), source)),
    }
}

fn load_required(path: &Path) -> Result<AnalysisConfig> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    AnalysisConfig::load_from_file(path)
}
