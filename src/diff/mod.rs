//! Comparison engine for ODIS snapshots.
//!
//! # Architecture
//!
//! The engine walks two parallel trees top-down, one comparer per level:
//!
//! - [`CompareEngine`]: ECU maps, entity presence and the ECU filter
//! - [`EcuComparer`]: master and subsystem record sets of one ECU pair
//! - [`RecordComparer`]: one record pair (identity check, display name)
//! - [`ValueTreeComparer`]: nested value nodes, depth-first
//! - [`FieldComparator`]: one scalar field under the bypass policy
//!
//! Results flow back up as a [`ComparisonResults`] tree with the same shape
//! as the input. The walk is pure: inputs are never mutated and the only
//! state is the result being assembled.
//!
//! # Example
//!
//! ```no_run
//! use odis_compare::diff::CompareEngine;
//! use odis_compare::model::EcuSelector;
//! use odis_compare::parsers::parse_odis_file;
//! use std::path::Path;
//!
//! let first = parse_odis_file(Path::new("before.xml")).unwrap();
//! let second = parse_odis_file(Path::new("after.xml")).unwrap();
//! let selector = EcuSelector::default();
//!
//! let results = CompareEngine::new()
//!     .compare(&first.ecus(&selector), &second.ecus(&selector))
//!     .unwrap();
//! println!("{} reported items", results.difference_count());
//! ```

mod ecu;
mod engine;
mod field;
mod record;
mod result;
mod statistics;
mod values;

pub use ecu::EcuComparer;
pub use engine::CompareEngine;
pub use field::{field_differs, FieldComparator};
pub use record::RecordComparer;
pub use result::{
    ComparisonResults, Difference, EcuComparisonResult, EcuDataComparisonResult, SnapshotInfo,
    SUBSYSTEM_SEGMENT,
};
pub use statistics::{statistics, DifferenceType, StatisticsRow};
pub use values::ValueTreeComparer;
