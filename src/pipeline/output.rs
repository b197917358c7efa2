//! Output handling for comparison reports.
//!
//! Provides report file naming and utilities for writing reports.

use crate::config::DEFAULT_REPORT_PREFIX;
use crate::reports::ReportFormat;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }

    /// Check if output is to a terminal
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stdout) && std::io::stdout().is_terminal()
    }
}

/// Determine if color should be used based on flags and environment
#[must_use]
pub fn should_use_color(no_color_flag: bool) -> bool {
    !no_color_flag && std::env::var("NO_COLOR").is_err()
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            print!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Report written to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Default report file name: `OdisCompare_<YYYY-MM-DDTHH_MM_SS_ffff>`.
#[must_use]
pub fn report_file_name(timestamp: DateTime<Utc>) -> String {
    format!(
        "{DEFAULT_REPORT_PREFIX}_{}_{:04}",
        timestamp.format("%Y-%m-%dT%H_%M_%S"),
        timestamp.timestamp_subsec_micros() / 100
    )
}

/// Path of the reports without suffix or extension.
///
/// An existing directory receives the default file name; any other path is
/// used as the stem itself.
#[must_use]
pub fn report_stem(output: Option<&Path>, timestamp: DateTime<Utc>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(report_file_name(timestamp)),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(report_file_name(timestamp)),
    }
}

/// Suffix of one part of a split report.
///
/// The first part holds the missing ECUs; every other part is named after
/// its ECU id without leading zeros, padded to two digits.
#[must_use]
pub fn split_suffix(index: usize, ecu_id: Option<&str>) -> String {
    match (index, ecu_id) {
        (0, _) | (_, None) => "_missing".to_string(),
        (_, Some(id)) => format!("_{:0>2}", id.trim_start_matches('0')),
    }
}

/// Final file path for one report.
#[must_use]
pub fn report_path(stem: &Path, suffix: &str, format: ReportFormat) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}
