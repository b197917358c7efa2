//! Pipeline orchestration for ODIS comparisons.
//!
//! This module provides the shared parse → compare → report workflow used by
//! the CLI command handlers, plus the reload path for stored JSON results.

mod compare_stage;
mod output;
mod parse;
mod report_stage;

pub use compare_stage::{compute_comparison, load_results_json, merge_reload_options};
pub use output::{
    report_file_name, report_path, report_stem, should_use_color, split_suffix, write_output,
    OutputTarget,
};
pub use parse::{parse_input, ParsedSnapshot};
pub use report_stage::output_reports;

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to read or parse an ODIS snapshot
    #[error("Parse failed for {path}: {source}")]
    ParseFailed {
        path: String,
        source: anyhow::Error,
    },

    /// Failed to load a stored comparison result
    #[error("Reload failed for {path}: {source}")]
    ReloadFailed {
        path: String,
        source: anyhow::Error,
    },

    /// Comparison failed
    #[error("Comparison failed: {source}")]
    CompareFailed {
        #[source]
        source: anyhow::Error,
    },

    /// Report generation or output failed
    #[error("Report failed: {source}")]
    ReportFailed {
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no differences found (or --fail-on-difference not set)
    pub const SUCCESS: i32 = 0;
    /// Differences were found
    pub const DIFFERENCES_FOUND: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::DIFFERENCES_FOUND, 1);
        assert_eq!(exit_codes::ERROR, 3);
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::ParseFailed {
            path: "first.xml".into(),
            source: anyhow::anyhow!("unexpected end of file"),
        };
        assert_eq!(
            err.to_string(),
            "Parse failed for first.xml: unexpected end of file"
        );
    }
}
