//! Configuration validation for odis-compare.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{
    AppConfig, BehaviorConfig, CompareConfig, CompareInput, ComparisonConfig, OutputConfig,
};
use crate::reports::ReportFormat;
use std::collections::HashSet;
use std::hash::Hash;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// First value that occurs twice in `items`.
fn first_duplicate<T: Eq + Hash + Copy>(items: &[T]) -> Option<T> {
    let mut seen = HashSet::new();
    items.iter().copied().find(|item| !seen.insert(*item))
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.comparison.validate());
        errors.extend(self.output.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for ComparisonConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(option) = first_duplicate(&self.options) {
            errors.push(ConfigError::new(
                "comparison.options",
                format!("Option '{option}' is listed more than once"),
            ));
        }

        if let Some(kind) = first_duplicate(&self.bypass) {
            errors.push(ConfigError::new(
                "comparison.bypass",
                format!("Field '{kind}' is listed more than once"),
            ));
        }

        for (i, token) in self.ecus.iter().enumerate() {
            if token.trim().is_empty() {
                errors.push(ConfigError::new(
                    format!("comparison.ecus[{i}]"),
                    "ECU filter token must not be empty",
                ));
            }
        }

        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.formats.is_empty() {
            errors.push(ConfigError::new(
                "output.formats",
                "At least one report format is required",
            ));
        }

        if let Some(format) = first_duplicate(&self.formats) {
            errors.push(ConfigError::new(
                "output.formats",
                format!("Format '{format}' is listed more than once"),
            ));
        }

        if self.split_by_ecu
            && !self.formats.is_empty()
            && self.formats.iter().all(|f| *f == ReportFormat::Json)
        {
            errors.push(ConfigError::new(
                "output.split_by_ecu",
                "Splitting by ECU has no effect on JSON output",
            ));
        }

        if let Some(path) = &self.path {
            if path.is_file() && path.extension().is_some() {
                errors.push(ConfigError::new(
                    "output.path",
                    format!(
                        "Output path must be a folder or a file stem without extension: {}",
                        path.display()
                    ),
                ));
            }
        }

        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        // BehaviorConfig contains only boolean flags that don't need validation
        Vec::new()
    }
}

impl Validatable for CompareConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        match &self.input {
            CompareInput::Snapshots { first, second } => {
                for (field, path) in [("first", first), ("second", second)] {
                    if !path.exists() {
                        errors.push(ConfigError::new(
                            field,
                            format!("File not found: {}", path.display()),
                        ));
                    }
                }
            }
            CompareInput::Results(path) => {
                if !path.exists() {
                    errors.push(ConfigError::new(
                        "input_json",
                        format!("Result file not found: {}", path.display()),
                    ));
                }
            }
        }

        errors.extend(self.comparison.validate());
        errors.extend(self.output.validate());
        errors
    }
}

// ============================================================================
// Tests
// ============================================================================
