//! Report output stage.
//!
//! Generates every configured report format and writes it to stdout or to
//! files derived from the output path.

use crate::config::OutputConfig;
use crate::diff::ComparisonResults;
use crate::reports::{create_reporter_with_options, ReportFormat};
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{
    report_path, report_stem, should_use_color, split_suffix, write_output, OutputTarget,
    PipelineError,
};

/// Write all configured reports for `results`.
///
/// JSON is skipped when `from_json` is set, since the input already is the
/// JSON report. Returns the files written.
pub fn output_reports(
    output: &OutputConfig,
    results: &ComparisonResults,
    from_json: bool,
    quiet: bool,
) -> Result<Vec<PathBuf>> {
    let stem = report_stem(output.path.as_deref(), results.timestamp);
    let mut written = Vec::new();

    for &format in &output.formats {
        if format == ReportFormat::Json && from_json {
            tracing::debug!("Skipping JSON output for a reloaded result");
            continue;
        }

        // Summary goes to the terminal unless an output path was given
        if format == ReportFormat::Summary && output.path.is_none() {
            let target = OutputTarget::Stdout;
            let use_color = should_use_color(output.no_color) && target.is_terminal();
            let report = create_reporter_with_options(format, use_color)
                .generate_report(results)
                .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;
            write_output(&report, &target, quiet)?;
            continue;
        }

        let parts: Vec<(String, ComparisonResults)> =
            if output.split_by_ecu && format != ReportFormat::Json {
                results
                    .split_by_ecu()
                    .into_iter()
                    .enumerate()
                    .map(|(i, part)| {
                        let id = part.ecu_results.keys().next().map(str::to_string);
                        (split_suffix(i, id.as_deref()), part)
                    })
                    .collect()
            } else {
                vec![(String::new(), results.clone())]
            };

        let reporter = create_reporter_with_options(format, false);
        for (suffix, part) in parts {
            let path = report_path(&stem, &suffix, format);
            let report = reporter
                .generate_report(&part)
                .map_err(|e| PipelineError::ReportFailed { source: e.into() })
                .with_context(|| format!("Failed to generate {format} report"))?;
            write_output(&report, &OutputTarget::File(path.clone()), quiet)?;
            written.push(path);
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComparisonConfig;
    use crate::diff::EcuComparisonResult;
    use crate::model::Ecu;
    use tempfile::TempDir;

    fn results() -> ComparisonResults {
        let mut results = ComparisonResults::new(ComparisonConfig::default());
        results
            .ecus_missing_in_first
            .insert("0017".into(), Ecu::new("0017"));
        let ecu = Ecu::new("0019");
        let mut compared = EcuComparisonResult::new(&ecu, &ecu);
        compared
            .master_missing_in_second
            .insert("Coding".into(), Default::default());
        results.ecu_results.push(compared);
        results
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_writes_each_format() {
        let tmp = TempDir::new().unwrap();
        let output = OutputConfig {
            formats: vec![ReportFormat::Json, ReportFormat::Markdown, ReportFormat::Summary],
            path: Some(tmp.path().join("garage")),
            ..Default::default()
        };
        let written = output_reports(&output, &results(), false, true).unwrap();
        assert_eq!(file_names(&written), ["garage.json", "garage.md", "garage.txt"]);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_split_by_ecu_skips_json() {
        let tmp = TempDir::new().unwrap();
        let output = OutputConfig {
            formats: vec![ReportFormat::Json, ReportFormat::Markdown],
            path: Some(tmp.path().join("run")),
            split_by_ecu: true,
            ..Default::default()
        };
        let written = output_reports(&output, &results(), false, true).unwrap();
        assert_eq!(
            file_names(&written),
            ["run.json", "run_missing.md", "run_19.md"]
        );
    }

    #[test]
    fn test_reload_does_not_rewrite_json() {
        let tmp = TempDir::new().unwrap();
        let output = OutputConfig {
            formats: vec![ReportFormat::Json, ReportFormat::Markdown],
            path: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        let written = output_reports(&output, &results(), true, true).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(
            written[0].extension().and_then(|e| e.to_str()),
            Some("md")
        );
        assert!(written[0].starts_with(tmp.path()));
    }
}
