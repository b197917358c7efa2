//! Default configurations and presets for odis-compare.
//!
//! Provides named presets for common use cases and default values.

use super::types::{
    AppConfig, BehaviorConfig, ComparisonConfig, ComparisonOption, OutputConfig,
};

/// Below this many ECU pairs the comparison stays on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Prefix of generated report file names.
pub const DEFAULT_REPORT_PREFIX: &str = "OdisCompare";

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigPreset {
    /// All options enabled, display names and typed values bypassed
    Default,
    /// Only field-level differences, no presence reporting
    DifferencesOnly,
    /// Only missing ECUs, records and fields
    PresenceOnly,
    /// Nothing bypassed, fail on any difference
    Strict,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::DifferencesOnly => "differences-only",
            Self::PresenceOnly => "presence-only",
            Self::Strict => "strict",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "differences-only" | "differences" | "values" => Some(Self::DifferencesOnly),
            "presence-only" | "presence" | "missing" => Some(Self::PresenceOnly),
            "strict" | "exact" => Some(Self::Strict),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Report everything, ignoring display names and typed values",
            Self::DifferencesOnly => "Report changed values of records present in both snapshots",
            Self::PresenceOnly => "Report ECUs, records and fields present in only one snapshot",
            Self::Strict => "Compare every field and fail when anything differs",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Default,
            Self::DifferencesOnly,
            Self::PresenceOnly,
            Self::Strict,
        ]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::DifferencesOnly => Self::differences_only_preset(),
            ConfigPreset::PresenceOnly => Self::presence_only_preset(),
            ConfigPreset::Strict => Self::strict_preset(),
        }
    }

    /// Differences-only preset.
    #[must_use]
    pub fn differences_only_preset() -> Self {
        Self {
            comparison: ComparisonConfig {
                options: vec![ComparisonOption::Differences],
                ..ComparisonConfig::default()
            },
            ..Self::default()
        }
    }

    /// Presence-only preset.
    ///
    /// Field values are never compared; the bypass set is irrelevant.
    #[must_use]
    pub fn presence_only_preset() -> Self {
        Self {
            comparison: ComparisonConfig {
                options: vec![
                    ComparisonOption::DataMissingInFirstFile,
                    ComparisonOption::DataMissingInSecondFile,
                ],
                ..ComparisonConfig::default()
            },
            ..Self::default()
        }
    }

    /// Strict preset.
    ///
    /// - Empty bypass set, so display names and typed values are compared too
    /// - Exit with a failure code when differences are found
    #[must_use]
    pub fn strict_preset() -> Self {
        Self {
            comparison: ComparisonConfig {
                bypass: Vec::new(),
                ..ComparisonConfig::default()
            },
            output: OutputConfig::default(),
            behavior: BehaviorConfig {
                fail_on_difference: true,
                ..BehaviorConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;

    #[test]
    fn test_preset_names() {
        for preset in ConfigPreset::all() {
            assert_eq!(ConfigPreset::from_name(preset.name()), Some(*preset));
        }
        assert_eq!(ConfigPreset::from_name("PRESENCE"), Some(ConfigPreset::PresenceOnly));
        assert_eq!(ConfigPreset::from_name("unknown"), None);
    }

    #[test]
    fn test_default_preset_matches_default() {
        assert_eq!(AppConfig::from_preset(ConfigPreset::Default), AppConfig::default());
    }

    #[test]
    fn test_option_presets() {
        let differences = AppConfig::from_preset(ConfigPreset::DifferencesOnly);
        assert!(differences.comparison.reports_differences());
        assert!(!differences.comparison.reports_missing_in_first());

        let presence = AppConfig::from_preset(ConfigPreset::PresenceOnly);
        assert!(!presence.comparison.reports_differences());
        assert!(presence.comparison.reports_missing_in_second());
    }

    #[test]
    fn test_strict_preset() {
        let config = AppConfig::from_preset(ConfigPreset::Strict);
        assert!(config.comparison.bypass.is_empty());
        assert!(!config.comparison.is_bypassed(FieldKind::DisplayName));
        assert!(config.behavior.fail_on_difference);
    }
}
