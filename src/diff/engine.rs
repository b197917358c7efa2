//! Top-level comparison engine over two ECU maps.

use super::ecu::EcuComparer;
use super::result::{ComparisonResults, EcuComparisonResult};
use crate::config::{ComparisonConfig, ComparisonOption, DEFAULT_PARALLEL_THRESHOLD};
use crate::error::Result;
use crate::model::{Ecu, FieldKind};
use indexmap::IndexMap;
use rayon::prelude::*;

/// Compares two snapshots given as `ecu id -> ECU` maps.
///
/// ```
/// use indexmap::IndexMap;
/// use odis_compare::diff::CompareEngine;
/// use odis_compare::model::Ecu;
///
/// let mut first = IndexMap::new();
/// first.insert("0019".to_string(), Ecu::new("0019"));
/// let second = IndexMap::new();
///
/// let results = CompareEngine::new().compare(&first, &second).unwrap();
/// assert!(results.ecus_missing_in_second.contains_key("0019"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompareEngine {
    config: ComparisonConfig,
}

impl CompareEngine {
    /// Create an engine with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine from an existing comparison configuration.
    #[must_use]
    pub const fn from_config(config: ComparisonConfig) -> Self {
        Self { config }
    }

    /// Set the bypassed field kinds.
    #[must_use]
    pub fn with_bypass(mut self, bypass: Vec<FieldKind>) -> Self {
        self.config.bypass = bypass;
        self
    }

    /// Set the enabled comparison options (empty enables all).
    #[must_use]
    pub fn with_options(mut self, options: Vec<ComparisonOption>) -> Self {
        self.config.options = options;
        self
    }

    /// Restrict pairwise comparison to ECU ids matching one of `tokens`.
    #[must_use]
    pub fn with_ecu_filter(mut self, tokens: Vec<String>) -> Self {
        self.config.ecus = tokens;
        self
    }

    /// Enable or disable parallel comparison of ECU pairs.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// The policy this engine applies.
    #[must_use]
    pub const fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Compare two ECU maps.
    ///
    /// # Errors
    ///
    /// Propagates the first identity mismatch found while pairing records.
    pub fn compare(
        &self,
        first: &IndexMap<String, Ecu>,
        second: &IndexMap<String, Ecu>,
    ) -> Result<ComparisonResults> {
        let mut results = ComparisonResults::new(self.config.clone());

        if self.config.reports_missing_in_first() {
            results.ecus_missing_in_first = missing_ecus(second, first);
        }
        if self.config.reports_missing_in_second() {
            results.ecus_missing_in_second = missing_ecus(first, second);
        }

        let pairs: Vec<(&Ecu, &Ecu)> = first
            .iter()
            .filter(|(id, _)| self.config.ecu_filter_matches(id))
            .filter_map(|(id, f)| second.get(id).map(|s| (f, s)))
            .collect();

        tracing::info!(
            "Comparing {} ECU pairs ({} only in first, {} only in second)",
            pairs.len(),
            results.ecus_missing_in_second.len(),
            results.ecus_missing_in_first.len()
        );

        let comparer = EcuComparer::new(&self.config);
        let compared: Vec<EcuComparisonResult> =
            if self.config.parallel && pairs.len() >= DEFAULT_PARALLEL_THRESHOLD {
                pairs
                    .par_iter()
                    .map(|(f, s)| comparer.compare(f, s))
                    .collect::<Result<Vec<_>>>()?
            } else {
                pairs
                    .iter()
                    .map(|(f, s)| comparer.compare(f, s))
                    .collect::<Result<Vec<_>>>()?
            };

        for result in compared.into_iter().filter(|r| !r.is_empty()) {
            results.ecu_results.push(result);
        }

        tracing::info!(
            "Comparison finished: {} ECUs differ, {} reported items",
            results.ecu_results.len(),
            results.difference_count()
        );

        Ok(results)
    }
}

/// ECUs of `present` whose key is absent from `other`, in `present` order.
fn missing_ecus(present: &IndexMap<String, Ecu>, other: &IndexMap<String, Ecu>) -> IndexMap<String, Ecu> {
    present
        .iter()
        .filter(|(id, _)| !other.contains_key(*id))
        .map(|(id, ecu)| (id.clone(), ecu.clone()))
        .collect()
}
