//! Configuration types for odis-compare operations.
//!
//! Provides structured configuration for the comparison engine, report
//! output and process behavior.

use crate::model::FieldKind;
use crate::reports::ReportFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// This is the top-level configuration struct that aggregates all configuration
/// options. It can be constructed from CLI arguments, config files, or both
/// (with CLI overriding file settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Comparison policy (presence directions, bypass set, ECU filter)
    pub comparison: ComparisonConfig,
    /// Output configuration (formats, path, colors)
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the enabled comparison options (empty enables all).
    pub fn comparison_options(mut self, options: Vec<ComparisonOption>) -> Self {
        self.config.comparison.options = options;
        self
    }

    /// Set the bypassed field kinds.
    pub fn bypass(mut self, bypass: Vec<FieldKind>) -> Self {
        self.config.comparison.bypass = bypass;
        self
    }

    /// Restrict the comparison to ECU ids containing one of these tokens.
    pub fn ecus(mut self, ecus: Vec<String>) -> Self {
        self.config.comparison.ecus = ecus;
        self
    }

    /// Compare ECU pairs on the rayon thread pool.
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.comparison.parallel = parallel;
        self
    }

    /// Set the output formats.
    pub fn formats(mut self, formats: Vec<ReportFormat>) -> Self {
        self.config.output.formats = formats;
        self
    }

    /// Set the output folder or file stem.
    pub fn output_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.output.path = path;
        self
    }

    /// Write one report per ECU.
    pub const fn split_by_ecu(mut self, split: bool) -> Self {
        self.config.output.split_by_ecu = split;
        self
    }

    /// Disable colored output.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Enable fail-on-difference mode.
    pub const fn fail_on_difference(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_difference = fail;
        self
    }

    /// Enable quiet mode.
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Comparison Configuration
// ============================================================================

/// Which kinds of differences a comparison reports.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
pub enum ComparisonOption {
    /// Field-level value differences between paired nodes
    Differences,
    /// Items present only in the second snapshot
    #[value(alias = "missing-in-first")]
    DataMissingInFirstFile,
    /// Items present only in the first snapshot
    #[value(alias = "missing-in-second")]
    DataMissingInSecondFile,
}

impl ComparisonOption {
    pub const ALL: [Self; 3] = [
        Self::Differences,
        Self::DataMissingInFirstFile,
        Self::DataMissingInSecondFile,
    ];
}

impl std::fmt::Display for ComparisonOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Differences => write!(f, "differences"),
            Self::DataMissingInFirstFile => write!(f, "data-missing-in-first-file"),
            Self::DataMissingInSecondFile => write!(f, "data-missing-in-second-file"),
        }
    }
}

/// Comparison policy threaded read-only through every comparer.
///
/// The same value is echoed into the result tree so renderers and reloads
/// can honour it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Enabled comparison options; empty enables all of them
    pub options: Vec<ComparisonOption>,
    /// Field kinds that never produce a difference
    pub bypass: Vec<FieldKind>,
    /// ECU id filter tokens (case-insensitive substring match); empty accepts all
    pub ecus: Vec<String>,
    /// Compare ECU pairs in parallel
    pub parallel: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            bypass: FieldKind::DEFAULT_BYPASS.to_vec(),
            ecus: Vec::new(),
            parallel: true,
        }
    }
}

impl ComparisonConfig {
    /// Whether `option` is active.
    #[must_use]
    pub fn enabled(&self, option: ComparisonOption) -> bool {
        self.options.is_empty() || self.options.contains(&option)
    }

    #[must_use]
    pub fn reports_differences(&self) -> bool {
        self.enabled(ComparisonOption::Differences)
    }

    #[must_use]
    pub fn reports_missing_in_first(&self) -> bool {
        self.enabled(ComparisonOption::DataMissingInFirstFile)
    }

    #[must_use]
    pub fn reports_missing_in_second(&self) -> bool {
        self.enabled(ComparisonOption::DataMissingInSecondFile)
    }

    /// Whether `kind` is in the bypass set.
    #[must_use]
    pub fn is_bypassed(&self, kind: FieldKind) -> bool {
        self.bypass.contains(&kind)
    }

    /// Whether an ECU id passes the configured filter.
    #[must_use]
    pub fn ecu_filter_matches(&self, ecu_id: &str) -> bool {
        if self.ecus.is_empty() {
            return true;
        }
        let id = ecu_id.to_lowercase();
        self.ecus
            .iter()
            .any(|token| id.contains(&token.to_lowercase()))
    }
}

// ============================================================================
// Output Configuration
// ============================================================================

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Report formats to produce
    pub formats: Vec<ReportFormat>,
    /// Output folder or file stem (None for the current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Write one report per ECU (not applied to JSON)
    pub split_by_ecu: bool,
    /// Disable colored output
    pub no_color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: vec![ReportFormat::Json, ReportFormat::Markdown],
            path: None,
            split_by_ecu: false,
            no_color: false,
        }
    }
}

// ============================================================================
// Behavior Configuration
// ============================================================================

/// Behavior configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Exit with code 1 if any difference is found
    pub fail_on_difference: bool,
    /// Suppress non-essential output
    pub quiet: bool,
}

// ============================================================================
// Command Configuration
// ============================================================================

/// Inputs of one `compare` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareInput {
    /// Two ODIS snapshots to compare
    Snapshots { first: PathBuf, second: PathBuf },
    /// A comparison result previously written as JSON
    Results(PathBuf),
}

impl CompareInput {
    /// Whether the run reloads a stored result instead of comparing.
    #[must_use]
    pub const fn is_reload(&self) -> bool {
        matches!(self, Self::Results(_))
    }
}

/// Configuration for the `compare` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareConfig {
    /// Input files
    pub input: CompareInput,
    /// Comparison policy
    pub comparison: ComparisonConfig,
    /// Output settings
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl CompareConfig {
    /// Combine inputs with an effective application config.
    #[must_use]
    pub fn new(input: CompareInput, app: AppConfig) -> Self {
        Self {
            input,
            comparison: app.comparison,
            output: app.output,
            behavior: app.behavior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_comparison_config() {
        let config = ComparisonConfig::default();
        assert!(ComparisonOption::ALL.iter().all(|o| config.enabled(*o)));
        assert!(config.is_bypassed(FieldKind::DisplayName));
        assert!(config.is_bypassed(FieldKind::TiValue));
        assert!(!config.is_bypassed(FieldKind::DisplayValue));
        assert!(config.parallel);
    }

    #[test]
    fn test_explicit_options_restrict() {
        let config = ComparisonConfig {
            options: vec![ComparisonOption::Differences],
            ..Default::default()
        };
        assert!(config.reports_differences());
        assert!(!config.reports_missing_in_first());
        assert!(!config.reports_missing_in_second());
    }

    #[test]
    fn test_ecu_filter_is_case_insensitive_substring() {
        let config = ComparisonConfig {
            ecus: vec!["0a".into(), "17".into()],
            ..Default::default()
        };
        assert!(config.ecu_filter_matches("000A"));
        assert!(config.ecu_filter_matches("0017"));
        assert!(!config.ecu_filter_matches("0019"));
        assert!(ComparisonConfig::default().ecu_filter_matches("anything"));
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::builder()
            .bypass(vec![])
            .formats(vec![ReportFormat::Summary])
            .split_by_ecu(true)
            .fail_on_difference(true)
            .build();
        assert!(config.comparison.bypass.is_empty());
        assert_eq!(config.output.formats, [ReportFormat::Summary]);
        assert!(config.output.split_by_ecu);
        assert!(config.behavior.fail_on_difference);
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = "comparison:\n  bypass: [HEX_VALUE]\n  options: [Differences]\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.comparison.bypass, [FieldKind::HexValue]);
        assert_eq!(config.comparison.options, [ComparisonOption::Differences]);
        assert_eq!(config.output, OutputConfig::default());
    }
}
