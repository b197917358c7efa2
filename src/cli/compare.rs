//! Compare command handler.
//!
//! Implements the `compare` subcommand for comparing two ODIS snapshots, or
//! re-rendering a stored JSON result.

use crate::config::{CompareConfig, CompareInput, Validatable};
use crate::diff::ComparisonResults;
use crate::error::OdisCompareError;
use crate::pipeline::{
    compute_comparison, exit_codes, load_results_json, output_reports, parse_input,
};
use anyhow::Result;

/// Run the compare command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
#[allow(clippy::needless_pass_by_value)]
pub fn run_compare(config: CompareConfig) -> Result<i32> {
    let errors = config.validate();
    if !errors.is_empty() {
        let list: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(OdisCompareError::Config(list.join("; ")).into());
    }

    let quiet = config.behavior.quiet;

    let results = match &config.input {
        CompareInput::Snapshots { first, second } => {
            let first = parse_input(first, quiet)?;
            let second = parse_input(second, quiet)?;

            if !quiet {
                tracing::info!(
                    "Parsed {} ECUs from first snapshot, {} from second snapshot",
                    first.ecu_count(),
                    second.ecu_count()
                );
            }

            compute_comparison(&config.comparison, &first, &second, quiet)?
        }
        CompareInput::Results(path) => load_results_json(path, &config.comparison, quiet)?,
    };

    let exit_code = determine_exit_code(&config, &results);

    output_reports(&config.output, &results, config.input.is_reload(), quiet)?;

    Ok(exit_code)
}

/// Determine the appropriate exit code based on results and config flags.
fn determine_exit_code(config: &CompareConfig, results: &ComparisonResults) -> i32 {
    if config.behavior.fail_on_difference && !results.is_empty() {
        return exit_codes::DIFFERENCES_FOUND;
    }
    exit_codes::SUCCESS
}
