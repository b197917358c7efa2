//! Configuration module for odis-compare.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust
//! use odis_compare::config::{AppConfig, ConfigPreset, ComparisonOption};
//! use odis_compare::model::FieldKind;
//!
//! // Use defaults
//! let config = AppConfig::default();
//! assert!(config.comparison.is_bypassed(FieldKind::DisplayName));
//!
//! // Use a preset
//! let config = AppConfig::from_preset(ConfigPreset::Strict);
//! assert!(config.behavior.fail_on_difference);
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .comparison_options(vec![ComparisonOption::Differences])
//!     .bypass(vec![FieldKind::HexValue])
//!     .ecus(vec!["0019".to_string()])
//!     .build();
//! assert!(!config.comparison.reports_missing_in_first());
//! ```
//!
//! # Configuration File
//!
//! Place a `.odis-compare.yaml` file in your project root or
//! `~/.config/odis-compare/`:
//!
//! ```yaml
//! comparison:
//!   bypass: [DISPLAY_NAME, TI_VALUE, HEX_VALUE]
//!   ecus: ['0019', '0017']
//! output:
//!   formats: [summary, markdown]
//! behavior:
//!   fail_on_difference: true
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

// Re-export main types
pub use defaults::{ConfigPreset, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_REPORT_PREFIX};
pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, CompareConfig, CompareInput, ComparisonConfig,
    ComparisonOption, OutputConfig,
};
pub use validation::{ConfigError, Validatable};

// Re-export file utilities
pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError, CONFIG_DIR_NAME, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.odis-compare.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}
