//! Integration tests for odis-compare
//!
//! These tests verify end-to-end functionality of the snapshot parser,
//! comparison engine, and report generation.

use odis_compare::{
    config::{AppConfig, CompareConfig, CompareInput, ComparisonConfig, ComparisonOption},
    diff::{ComparisonResults, EcuComparisonResult},
    model::{key_codec, EcuSelector, FieldKind},
    parsers::{parse_odis_file, parse_results_str},
    pipeline::{compute_comparison, exit_codes, parse_input},
    reports::{create_reporter, ReportFormat},
    CompareEngine,
};
use std::path::{Path, PathBuf};

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn compare_with(engine: &CompareEngine, first: &str, second: &str) -> ComparisonResults {
    let selector = EcuSelector::default();
    let first = parse_odis_file(&fixture_path(first)).expect("Failed to parse first snapshot");
    let second = parse_odis_file(&fixture_path(second)).expect("Failed to parse second snapshot");
    engine
        .compare(&first.ecus(&selector), &second.ecus(&selector))
        .expect("Comparison failed")
}

fn compare_fixtures() -> ComparisonResults {
    compare_with(&CompareEngine::new(), "before.xml", "after.xml")
}

fn gateway(results: &ComparisonResults) -> &EcuComparisonResult {
    results
        .ecu_results
        .iter()
        .find(|r| r.ecu_id == "0019")
        .expect("gateway should differ")
}

// ============================================================================
// Parser Tests
// ============================================================================

mod parser_tests {
    use super::*;

    #[test]
    fn test_parse_before_snapshot() {
        let protocol = parse_odis_file(&fixture_path("before.xml")).unwrap();
        assert_eq!(protocol.vin(), Some("WVWZZZ1KZAW000001"));
        assert_eq!(protocol.mileage(), Some("120345 km"));

        let ecus = protocol.ecus(&EcuSelector::default());
        let ids: Vec<&str> = ecus.keys().map(String::as_str).collect();
        assert_eq!(ids, ["0019", "0017"]);

        let subsystem_keys: Vec<&str> = ecus["0019"].subsystems.keys().collect();
        assert_eq!(subsystem_keys, ["1_ident"]);
    }

    #[test]
    fn test_parse_after_snapshot() {
        let protocol = parse_odis_file(&fixture_path("after.xml")).unwrap();
        let ecus = protocol.ecus(&EcuSelector::default());
        assert_eq!(ecus.len(), 3);
        assert!(ecus["0015"].masters.is_empty());
    }

    #[test]
    fn test_ecu_selector_by_name() {
        let protocol = parse_odis_file(&fixture_path("after.xml")).unwrap();
        let selector = EcuSelector {
            name: Some("Airbag".into()),
            ..Default::default()
        };
        let ecus = protocol.ecus(&selector);
        assert_eq!(ecus.len(), 1);
        assert!(ecus.contains_key("0015"));
    }

    #[test]
    fn test_parse_missing_file() {
        assert!(parse_odis_file(&fixture_path("does-not-exist.xml")).is_err());
    }
}

// ============================================================================
// Comparison Tests
// ============================================================================

mod compare_tests {
    use super::*;

    #[test]
    fn test_identical_snapshots_have_no_results() {
        let results = compare_with(&CompareEngine::new(), "before.xml", "before.xml");
        assert!(results.is_empty());
        assert!(results.ecu_results.is_empty());
        assert_eq!(results.difference_count(), 0);
    }

    #[test]
    fn test_ecu_only_in_second() {
        let results = compare_fixtures();
        let missing: Vec<&str> = results.ecus_missing_in_first.keys().map(String::as_str).collect();
        assert_eq!(missing, ["0015"]);
        assert!(results.ecus_missing_in_second.is_empty());
        assert!(results.ecu_results.iter().all(|r| r.ecu_id != "0015"));
        // The cluster is unchanged and must not show up at all
        assert!(results.ecu_results.iter().all(|r| r.ecu_id != "0017"));
    }

    #[test]
    fn test_bypassed_display_name_is_not_reported() {
        let results = compare_fixtures();
        let ident = &gateway(&results).master_results[0];
        let slot: Vec<_> = ident
            .differences
            .iter()
            .filter(|d| d.path.last().map(String::as_str) == Some("SFT0004B"))
            .collect();
        assert_eq!(slot.len(), 1);
        assert_eq!(slot[0].field_kind, FieldKind::DisplayValue);
        assert_eq!(slot[0].first_value.as_deref(), Some("A"));
        assert_eq!(slot[0].second_value.as_deref(), Some("B"));
        assert_eq!(slot[0].path, ["0019", "Identification", "SFT0004B"]);
    }

    #[test]
    fn test_empty_bypass_reports_every_field() {
        let engine = CompareEngine::new().with_bypass(Vec::new());
        let results = compare_with(&engine, "before.xml", "after.xml");
        let kinds: Vec<FieldKind> = gateway(&results).master_results[0]
            .differences
            .iter()
            .filter(|d| d.path.last().map(String::as_str) == Some("SFT0004B"))
            .map(|d| d.field_kind)
            .collect();
        assert_eq!(
            kinds,
            [FieldKind::DisplayName, FieldKind::DisplayValue, FieldKind::TiValue]
        );
    }

    #[test]
    fn test_sub_values_on_one_side_only() {
        let results = compare_fixtures();
        let ident = &gateway(&results).master_results[0];
        let keys: Vec<&str> = ident.fields_missing_in_first.keys().map(String::as_str).collect();
        assert_eq!(keys, ["SUB01", "SUB02"]);
        assert!(ident.fields_missing_in_second.is_empty());
        assert!(ident
            .differences
            .iter()
            .all(|d| d.path.last().map(String::as_str) != Some("VAL001")));
    }

    #[test]
    fn test_reversed_direction_mirrors_presence() {
        let results = compare_with(&CompareEngine::new(), "after.xml", "before.xml");
        assert!(results.ecus_missing_in_first.is_empty());
        assert!(results.ecus_missing_in_second.contains_key("0015"));

        let gw = gateway(&results);
        assert!(gw.master_missing_in_first.is_empty());
        assert!(gw.master_missing_in_second.contains_key("Adaptation"));
        let ident = &gw.master_results[0];
        assert!(ident.fields_missing_in_first.is_empty());
        assert_eq!(ident.fields_missing_in_second.len(), 2);
    }

    #[test]
    fn test_master_record_only_in_second() {
        let results = compare_fixtures();
        let gw = gateway(&results);
        let missing: Vec<&str> = gw.master_missing_in_first.keys().map(String::as_str).collect();
        assert_eq!(missing, ["Adaptation"]);
        assert!(gw.master_missing_in_second.is_empty());
        assert!(gw.subsystem_missing_in_first.is_empty());
        assert!(gw.subsystem_results.is_empty());
    }

    #[test]
    fn test_coding_uses_first_populated_representation() {
        let results = compare_fixtures();
        let coding = &gateway(&results).master_results[1];
        assert_eq!(coding.record_type(), "Coding");
        assert_eq!(coding.differences.len(), 1);
        let diff = &coding.differences[0];
        assert_eq!(diff.field_kind, FieldKind::BinValue);
        assert_eq!(diff.message, "0101 is different from 0111");
        assert_eq!(diff.display_path(" / "), "Coding value");
    }

    #[test]
    fn test_ecu_filter_limits_pairwise_comparison_only() {
        let engine = CompareEngine::new().with_ecu_filter(vec!["0017".into()]);
        let results = compare_with(&engine, "before.xml", "after.xml");
        assert!(results.ecu_results.is_empty());
        assert!(results.ecus_missing_in_first.contains_key("0015"));
    }

    #[test]
    fn test_differences_only_option() {
        let engine = CompareEngine::new().with_options(vec![ComparisonOption::Differences]);
        let results = compare_with(&engine, "before.xml", "after.xml");
        assert!(results.ecus_missing_in_first.is_empty());

        let gw = gateway(&results);
        assert!(gw.master_missing_in_first.is_empty());
        assert!(gw.master_results.iter().all(|r| r.fields_missing_in_first.is_empty()));
        assert_eq!(
            gw.master_results.iter().map(|r| r.differences.len()).sum::<usize>(),
            2
        );
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let parallel = compare_with(&CompareEngine::new(), "before.xml", "after.xml");
        let sequential = compare_with(
            &CompareEngine::new().with_parallel(false),
            "before.xml",
            "after.xml",
        );
        assert_eq!(parallel.ecu_results, sequential.ecu_results);
        assert_eq!(parallel.ecus_missing_in_first, sequential.ecus_missing_in_first);
    }

    #[test]
    fn test_composite_key_decoding() {
        let decoded = key_codec::decode("SUB123_Coding").unwrap();
        assert_eq!(decoded.qualifier, "SUB123");
        assert_eq!(decoded.record_type, "Coding");
        assert_eq!(key_codec::decode("Coding"), None);
        assert_eq!(key_codec::record_type_of("Coding"), "Coding");
    }
}

// ============================================================================
// Report Tests
// ============================================================================

mod report_tests {
    use super::*;

    #[test]
    fn test_json_report_reloads() {
        let results = compare_fixtures();
        let json = create_reporter(ReportFormat::Json)
            .generate_report(&results)
            .unwrap();
        let reloaded = parse_results_str(&json).unwrap();

        assert_eq!(reloaded.timestamp, results.timestamp);
        assert_eq!(reloaded.difference_count(), results.difference_count());
        assert_eq!(
            odis_compare::diff::statistics(&reloaded),
            odis_compare::diff::statistics(&results)
        );
    }

    #[test]
    fn test_reloaded_result_can_be_narrowed() {
        let results = compare_fixtures();
        let json = create_reporter(ReportFormat::Json)
            .generate_report(&results)
            .unwrap();
        let narrowed = parse_results_str(&json).unwrap().filtered(&ComparisonConfig {
            options: vec![ComparisonOption::DataMissingInFirstFile],
            ..ComparisonConfig::default()
        });

        assert!(narrowed.ecus_missing_in_first.contains_key("0015"));
        let gw = gateway(&narrowed);
        assert!(gw.record_results().all(|r| r.differences.is_empty()));
        // The coding record only had a value difference
        assert_eq!(gw.master_results.len(), 1);
    }

    #[test]
    fn test_markdown_report_sections() {
        let md = create_reporter(ReportFormat::Markdown)
            .generate_report(&compare_fixtures())
            .unwrap();
        assert!(md.starts_with("# ODIS Comparison Report"));
        assert!(md.contains("## Statistics"));
        assert!(md.contains("## ECUs missing in first snapshot"));
        assert!(md.contains("## ECU 0019 Gateway"));
        assert!(md.contains("### Master records missing in first"));
        assert!(md.contains("### Identification: Identification"));
        assert!(md.contains("**Fields missing in first**"));
        assert!(md.contains("Lower bound (SUB01)"));
        assert!(!md.contains("## ECU 0017"));
    }

    #[test]
    fn test_summary_report_for_identical_snapshots() {
        let results = compare_with(&CompareEngine::new(), "before.xml", "before.xml");
        let summary = create_reporter(ReportFormat::Summary)
            .generate_report(&results)
            .unwrap();
        assert!(summary.contains("ODIS Comparison Summary"));
        assert!(summary.contains("No differences found."));
    }
}

// ============================================================================
// Pipeline Tests
// ============================================================================

mod pipeline_tests {
    use super::*;
    use odis_compare::cli::run_compare;
    use tempfile::TempDir;

    #[test]
    fn test_pipeline_stages_record_snapshot_headers() {
        let first = parse_input(&fixture_path("before.xml"), true).unwrap();
        let second = parse_input(&fixture_path("after.xml"), true).unwrap();
        let results =
            compute_comparison(&ComparisonConfig::default(), &first, &second, true).unwrap();

        let first_info = results.first_snapshot.as_ref().unwrap();
        let second_info = results.second_snapshot.as_ref().unwrap();
        assert_eq!(first_info.mileage.as_deref(), Some("120345 km"));
        assert_eq!(second_info.mileage.as_deref(), Some("131002 km"));
        assert_eq!(first_info.vin, second_info.vin);
    }

    #[test]
    fn test_compare_then_reload() {
        let tmp = TempDir::new().unwrap();
        let app = AppConfig::builder()
            .formats(vec![ReportFormat::Json, ReportFormat::Markdown])
            .output_path(Some(tmp.path().join("garage")))
            .fail_on_difference(true)
            .quiet(true)
            .build();
        let input = CompareInput::Snapshots {
            first: fixture_path("before.xml"),
            second: fixture_path("after.xml"),
        };
        let code = run_compare(CompareConfig::new(input, app)).unwrap();
        assert_eq!(code, exit_codes::DIFFERENCES_FOUND);

        let json = tmp.path().join("garage.json");
        assert!(json.exists());
        assert!(tmp.path().join("garage.md").exists());

        let app = AppConfig::builder()
            .comparison_options(vec![ComparisonOption::Differences])
            .formats(vec![ReportFormat::Json, ReportFormat::Markdown])
            .output_path(Some(tmp.path().join("reload")))
            .quiet(true)
            .build();
        let code = run_compare(CompareConfig::new(CompareInput::Results(json), app)).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);

        assert!(!tmp.path().join("reload.json").exists());
        let md = std::fs::read_to_string(tmp.path().join("reload.md")).unwrap();
        assert!(!md.contains("## ECUs missing in first snapshot"));
        assert!(md.contains("| Path | First | Second |"));
    }
}
