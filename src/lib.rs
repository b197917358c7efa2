//! **Structured comparison of ODIS diagnostic snapshots.**
//!
//! `odis-compare` loads two ODIS protocol XML exports (full vehicle scans taken
//! by the ODIS diagnostic software) and compares them ECU by ECU. It reports
//! ECUs, records and fields present on one side only, and field-level value
//! differences inside the nested measurement trees of every record.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: The snapshot data model ([`OdisProtocol`], [`Ecu`]) and the
//!   [`KeyedSequence`] abstraction that pairs sibling nodes across snapshots.
//!   Also home of the [`model::key_codec`] that turns keyed paths into stable
//!   string keys.
//! - **[`parsers`]**: Loads ODIS XML exports and stored JSON results.
//! - **[`diff`]**: The [`CompareEngine`] and the per-level comparers (ECU,
//!   record, value tree and field) that produce [`ComparisonResults`].
//! - **[`reports`]**: JSON, terminal summary and Markdown renderers.
//! - **[`config`]**: Layered YAML configuration with presets and validation.
//! - **[`pipeline`]**: Parse, compare and report stages used by the CLI.
//!
//! ## Comparing Two Snapshots
//!
//! ```no_run
//! use odis_compare::model::EcuSelector;
//! use odis_compare::{parse_odis_file, CompareEngine};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let first = parse_odis_file(Path::new("before.xml"))?;
//!     let second = parse_odis_file(Path::new("after.xml"))?;
//!
//!     let selector = EcuSelector::default();
//!     let engine = CompareEngine::new().with_ecu_filter(vec!["0019".into()]);
//!     let results = engine.compare(&first.ecus(&selector), &second.ecus(&selector))?;
//!
//!     println!("{} differences", results.difference_count());
//!     for ecu in results.ecus_missing_in_second.keys() {
//!         println!("  - {ecu}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Rendering a Report
//!
//! ```no_run
//! use odis_compare::reports::{create_reporter, ReportFormat};
//! use odis_compare::parse_results_file;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let results = parse_results_file(Path::new("OdisCompare.json"))?;
//!     let markdown = create_reporter(ReportFormat::Markdown).generate_report(&results)?;
//!     println!("{markdown}");
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    // Variable names like `first`/`second` are clear in context
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod reports;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigPreset};
pub use config::{BehaviorConfig, ComparisonConfig, ComparisonOption, OutputConfig};
pub use config::{ConfigError, Validatable};
pub use diff::{
    CompareEngine, ComparisonResults, Difference, EcuComparisonResult, EcuDataComparisonResult,
};
pub use error::{ErrorContext, OdisCompareError, Result};
pub use model::{Ecu, FieldKind, KeyedSequence, OdisProtocol, ValueItem};
pub use parsers::{parse_odis_file, parse_odis_str, parse_results_file, parse_results_str};
pub use reports::{ReportFormat, ReportGenerator};
