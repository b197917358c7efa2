//! Comparison stage.
//!
//! Runs the engine over two parsed snapshots, or reloads a stored result
//! and re-applies the requested policy to it.

use super::{ParsedSnapshot, PipelineError};
use crate::config::ComparisonConfig;
use crate::diff::{CompareEngine, ComparisonResults};
use crate::parsers::parse_results_file;
use anyhow::{Context, Result};
use std::path::Path;

/// Compare two parsed snapshots under `config`.
pub fn compute_comparison(
    config: &ComparisonConfig,
    first: &ParsedSnapshot,
    second: &ParsedSnapshot,
    quiet: bool,
) -> Result<ComparisonResults> {
    if !quiet {
        tracing::info!(
            "Comparing {} against {}",
            first.path.display(),
            second.path.display()
        );
    }

    let engine = CompareEngine::from_config(config.clone());
    let results = engine
        .compare(&first.ecus, &second.ecus)
        .map_err(|e| PipelineError::CompareFailed { source: e.into() })?
        .with_snapshots(first.info(), second.info());

    if !quiet {
        tracing::info!(
            "Comparison finished: {} ECU(s) differ, {} item(s) reported",
            results.ecu_results.len(),
            results.difference_count()
        );
    }

    Ok(results)
}

/// Load a stored JSON result and re-apply the requested policy to it.
///
/// The stored options are merged with `requested` (see
/// [`merge_reload_options`]) before filtering.
pub fn load_results_json(
    path: &Path,
    requested: &ComparisonConfig,
    quiet: bool,
) -> Result<ComparisonResults> {
    if !quiet {
        tracing::info!("Loading comparison result: {}", path.display());
    }

    let stored = parse_results_file(path)
        .map_err(|e| PipelineError::ReloadFailed {
            path: path.display().to_string(),
            source: e.into(),
        })
        .with_context(|| format!("{} is not a comparison result", path.display()))?;

    let options = merge_reload_options(&stored.options, requested);
    tracing::debug!("Effective options after reload: {:?}", options);

    Ok(stored.filtered(&options))
}

/// Combine the options stored in a result with newly requested ones.
///
/// - Requested comparison options replace the stored ones when given.
/// - ECU filters intersect when both sides have one, otherwise whichever
///   side has a filter wins.
/// - Bypass sets are united.
#[must_use]
pub fn merge_reload_options(
    stored: &ComparisonConfig,
    requested: &ComparisonConfig,
) -> ComparisonConfig {
    let options = if requested.options.is_empty() {
        stored.options.clone()
    } else {
        requested.options.clone()
    };

    let ecus = match (stored.ecus.is_empty(), requested.ecus.is_empty()) {
        (false, false) => stored
            .ecus
            .iter()
            .filter(|token| {
                requested
                    .ecus
                    .iter()
                    .any(|other| other.eq_ignore_ascii_case(token))
            })
            .cloned()
            .collect(),
        (false, true) => stored.ecus.clone(),
        _ => requested.ecus.clone(),
    };

    let mut bypass = stored.bypass.clone();
    for kind in &requested.bypass {
        if !bypass.contains(kind) {
            bypass.push(*kind);
        }
    }

    ComparisonConfig {
        options,
        bypass,
        ecus,
        parallel: requested.parallel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComparisonOption;
    use crate::model::{Ecu, FieldKind};
    use crate::reports::{JsonReporter, ReportGenerator};
    use tempfile::TempDir;

    #[test]
    fn test_merge_replaces_options() {
        let stored = ComparisonConfig {
            options: vec![ComparisonOption::Differences],
            ..Default::default()
        };
        let requested = ComparisonConfig {
            options: vec![ComparisonOption::DataMissingInFirstFile],
            ..Default::default()
        };
        let merged = merge_reload_options(&stored, &requested);
        assert_eq!(merged.options, [ComparisonOption::DataMissingInFirstFile]);

        let kept = merge_reload_options(&stored, &ComparisonConfig::default());
        assert_eq!(kept.options, [ComparisonOption::Differences]);
    }

    #[test]
    fn test_merge_intersects_ecu_filters() {
        let stored = ComparisonConfig {
            ecus: vec!["0019".into(), "0017".into()],
            ..Default::default()
        };
        let requested = ComparisonConfig {
            ecus: vec!["0017".into(), "0009".into()],
            ..Default::default()
        };
        assert_eq!(merge_reload_options(&stored, &requested).ecus, ["0017"]);
        assert_eq!(
            merge_reload_options(&stored, &ComparisonConfig::default()).ecus,
            ["0019", "0017"]
        );
        assert_eq!(
            merge_reload_options(&ComparisonConfig::default(), &requested).ecus,
            ["0017", "0009"]
        );
    }

    #[test]
    fn test_merge_unites_bypass() {
        let stored = ComparisonConfig {
            bypass: vec![FieldKind::HexValue],
            ..Default::default()
        };
        let requested = ComparisonConfig {
            bypass: vec![FieldKind::DisplayName, FieldKind::HexValue],
            ..Default::default()
        };
        assert_eq!(
            merge_reload_options(&stored, &requested).bypass,
            [FieldKind::HexValue, FieldKind::DisplayName]
        );
    }

    #[test]
    fn test_load_results_json_applies_filter() {
        let mut results = ComparisonResults::new(ComparisonConfig::default());
        results
            .ecus_missing_in_first
            .insert("0017".into(), Ecu::new("0017"));
        results
            .ecus_missing_in_second
            .insert("0019".into(), Ecu::new("0019"));

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("result.json");
        std::fs::write(&path, JsonReporter::new().generate_report(&results).unwrap()).unwrap();

        let requested = ComparisonConfig {
            options: vec![ComparisonOption::DataMissingInSecondFile],
            ..Default::default()
        };
        let reloaded = load_results_json(&path, &requested, true).unwrap();
        assert!(reloaded.ecus_missing_in_first.is_empty());
        assert_eq!(reloaded.ecus_missing_in_second.len(), 1);
        assert_eq!(reloaded.timestamp, results.timestamp);
    }

    #[test]
    fn test_load_results_json_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("result.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_results_json(&path, &ComparisonConfig::default(), true).is_err());
    }
}
