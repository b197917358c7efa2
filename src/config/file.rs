//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::{AppConfig, ComparisonConfig, OutputConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".odis-compare.yaml",
    ".odis-compare.yml",
    "odis-compare.yaml",
];

/// Sub-directory of the user config directory searched for a config file.
pub const CONFIG_DIR_NAME: &str = "odis-compare";

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/odis-compare/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // 1. Use explicit path if provided
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2. Search current directory
    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    // 3. Search git root (if in a repo)
    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    // 4. Search user config directory
    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join(CONFIG_DIR_NAME)))
    {
        return Some(path);
    }

    // 5. Search home directory
    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// File not found
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// IO error reading file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                (config, Some(path))
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Values of `other` that equal the defaults are treated as unset, so
    /// layering CLI args over file config only overrides what was given.
    pub fn merge(&mut self, other: &Self) {
        let default_comparison = ComparisonConfig::default();
        let default_output = OutputConfig::default();

        // Comparison config
        if !other.comparison.options.is_empty() {
            self.comparison.options.clone_from(&other.comparison.options);
        }
        if other.comparison.bypass != default_comparison.bypass {
            self.comparison.bypass.clone_from(&other.comparison.bypass);
        }
        if !other.comparison.ecus.is_empty() {
            self.comparison.ecus.clone_from(&other.comparison.ecus);
        }
        if !other.comparison.parallel {
            self.comparison.parallel = false;
        }

        // Output config - only override if explicitly set
        if other.output.formats != default_output.formats {
            self.output.formats.clone_from(&other.output.formats);
        }
        if other.output.path.is_some() {
            self.output.path.clone_from(&other.output.path);
        }
        if other.output.split_by_ecu {
            self.output.split_by_ecu = true;
        }
        if other.output.no_color {
            self.output.no_color = true;
        }

        // Behavior config (booleans - if set to true, override)
        if other.behavior.fail_on_difference {
            self.behavior.fail_on_difference = true;
        }
        if other.behavior.quiet {
            self.behavior.quiet = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content from the defaults.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# ODIS Compare Configuration
# Place this file at .odis-compare.yaml in your project root or ~/.config/odis-compare/

{}
",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# ODIS Compare Configuration File
# ===============================
#
# This file configures odis-compare behavior. Place it at:
#   - .odis-compare.yaml in your project root
#   - ~/.config/odis-compare/odis-compare.yaml for global config
#
# CLI arguments always override file settings.

# Comparison policy
comparison:
  # Reported kinds: Differences, DataMissingInFirstFile, DataMissingInSecondFile
  # An empty list enables all of them.
  options: []
  # Fields that never produce a difference:
  # TI_NAME, TI_UNIT, DISPLAY_NAME, DISPLAY_VALUE, DISPLAY_UNIT,
  # BIN_VALUE, HEX_VALUE, TI_VALUE
  bypass:
    - DISPLAY_NAME
    - TI_VALUE
  # Only compare ECUs whose id contains one of these tokens (case-insensitive)
  ecus: []
  # Compare ECU pairs in parallel
  parallel: true

# Output configuration
output:
  # Formats: json, summary, markdown
  formats:
    - json
    - markdown
  # Output folder or file stem (omit for the current directory)
  # path: ./reports
  # Write one report per ECU (not applied to JSON)
  split_by_ecu: false
  # Disable colored output
  no_color: false

# Behavior flags
behavior:
  # Exit with code 1 if any difference is found
  fail_on_difference: false
  # Suppress non-essential output
  quiet: false
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
