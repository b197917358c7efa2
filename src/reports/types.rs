//! Report type definitions.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Full result tree as JSON (reloadable with `--input-json`)
    Json,
    /// Statistics table for the terminal
    Summary,
    /// Human-readable Markdown report
    #[value(alias = "md")]
    Markdown,
}

impl ReportFormat {
    /// File extension (without dot) used when writing this format to disk.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Summary => "txt",
            Self::Markdown => "md",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Summary => write!(f, "summary"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_names() {
        assert_eq!(ReportFormat::Markdown.to_string(), "markdown");
        assert_eq!(ReportFormat::from_str("md", true), Ok(ReportFormat::Markdown));
        let parsed: Vec<ReportFormat> = serde_yaml::from_str("[json, summary]").unwrap();
        assert_eq!(parsed, [ReportFormat::Json, ReportFormat::Summary]);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ReportFormat::Json.extension(), "json");
        assert_eq!(ReportFormat::Summary.extension(), "txt");
        assert_eq!(ReportFormat::Markdown.extension(), "md");
    }
}
