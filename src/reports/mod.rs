//! Report generation for comparison results.
//!
//! This module provides the output formats for ODIS comparison results:
//! - JSON: the full result tree, reloadable with `--input-json`
//! - Summary: compact statistics table for the terminal
//! - Markdown: human-readable report with per-ECU sections
//!
//! # Security
//!
//! The `escape` module provides utilities for safe output generation.
//! All values taken from the snapshots should be escaped before embedding
//! them in Markdown reports.

pub mod escape;
mod json;
mod markdown;
mod summary;
mod types;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use summary::SummaryReporter;
pub use types::ReportFormat;

use crate::diff::ComparisonResults;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

impl From<ReportError> for crate::error::OdisCompareError {
    fn from(err: ReportError) -> Self {
        use crate::error::ReportErrorKind;
        match err {
            ReportError::IoError(source) => Self::from(source),
            ReportError::SerializationError(message) => Self::report(
                "serializing results",
                ReportErrorKind::JsonSerializationError(message),
            ),
            ReportError::FormatError(err) => Self::report(
                "formatting report",
                ReportErrorKind::UnsupportedFormat(err.to_string()),
            ),
        }
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report from comparison results
    fn generate_report(&self, results: &ComparisonResults) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_report(
        &self,
        results: &ComparisonResults,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate_report(results)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Summary => {
            if use_color {
                Box::new(SummaryReporter::new())
            } else {
                Box::new(SummaryReporter::new().no_color())
            }
        }
        ReportFormat::Markdown => Box::new(MarkdownReporter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComparisonConfig;

    #[test]
    fn test_create_reporter_formats() {
        for format in [ReportFormat::Json, ReportFormat::Summary, ReportFormat::Markdown] {
            assert_eq!(create_reporter(format).format(), format);
        }
    }

    #[test]
    fn test_write_report_to_buffer() {
        let results = ComparisonResults::new(ComparisonConfig::default());
        let mut buffer = Vec::new();
        create_reporter_with_options(ReportFormat::Summary, false)
            .write_report(&results, &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("No differences found"));
    }
}
