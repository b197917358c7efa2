//! Comparison of one pair of ECUs.

use super::record::RecordComparer;
use super::result::{EcuComparisonResult, EcuDataComparisonResult, SUBSYSTEM_SEGMENT};
use crate::config::ComparisonConfig;
use crate::error::{ErrorContext, OdisCompareError, Result};
use crate::model::{is_blank, key_codec, Ecu, EcuData, KeyedSequence};
use indexmap::IndexMap;

/// Presence maps are keyed by the presentation form of the record key.
const PRESENTATION_KEY: fn(&str) -> String = key_codec::display_key;

/// Compares the master and subsystem records of two ECUs.
#[derive(Debug, Clone, Copy)]
pub struct EcuComparer<'a> {
    config: &'a ComparisonConfig,
    records: RecordComparer<'a>,
}

impl<'a> EcuComparer<'a> {
    #[must_use]
    pub const fn new(config: &'a ComparisonConfig) -> Self {
        Self {
            config,
            records: RecordComparer::new(config),
        }
    }

    /// Compare two ECUs that were paired by id.
    ///
    /// # Errors
    ///
    /// Fails with an `ECU_ID` identity mismatch when the ids differ, or with
    /// a `TI_NAME` mismatch from any paired record.
    pub fn compare(&self, first: &Ecu, second: &Ecu) -> Result<EcuComparisonResult> {
        if first.ecu_id != second.ecu_id {
            return Err(OdisCompareError::ecu_id_mismatch(
                &first.ecu_id,
                &second.ecu_id,
            ));
        }

        let mut result = EcuComparisonResult::new(first, second);
        let ecu_id = first.ecu_id.as_str();

        let (missing_in_first, missing_in_second) =
            self.missing_records(&first.masters, &second.masters);
        result.master_missing_in_first = missing_in_first;
        result.master_missing_in_second = missing_in_second;
        result.master_results = self
            .compare_records(&first.masters, &second.masters, |key, _, _| {
                (vec![ecu_id.to_string(), PRESENTATION_KEY(key)], None)
            })
            .with_context(|| format!("ECU {ecu_id} master data"))?;

        let (missing_in_first, missing_in_second) =
            self.missing_records(&first.subsystems, &second.subsystems);
        result.subsystem_missing_in_first = missing_in_first;
        result.subsystem_missing_in_second = missing_in_second;
        result.subsystem_results = self
            .compare_records(&first.subsystems, &second.subsystems, |key, f, s| {
                let main_path = vec![
                    ecu_id.to_string(),
                    SUBSYSTEM_SEGMENT.to_string(),
                    PRESENTATION_KEY(key),
                ];
                (main_path, Some(subsystem_descriptions(f, s)))
            })
            .with_context(|| format!("ECU {ecu_id} subsystem data"))?;

        tracing::debug!(
            "Compared ECU {}: {} master, {} subsystem record results",
            ecu_id,
            result.master_results.len(),
            result.subsystem_results.len()
        );

        Ok(result)
    }

    fn missing_records(
        &self,
        first: &KeyedSequence<EcuData>,
        second: &KeyedSequence<EcuData>,
    ) -> (IndexMap<String, EcuData>, IndexMap<String, EcuData>) {
        let missing_in_first = if self.config.reports_missing_in_first() {
            second.missing_from(first, Some(PRESENTATION_KEY))
        } else {
            IndexMap::new()
        };
        let missing_in_second = if self.config.reports_missing_in_second() {
            first.missing_from(second, Some(PRESENTATION_KEY))
        } else {
            IndexMap::new()
        };
        (missing_in_first, missing_in_second)
    }

    /// Compare every record present on both sides, keeping non-empty results.
    fn compare_records<F>(
        &self,
        first: &KeyedSequence<EcuData>,
        second: &KeyedSequence<EcuData>,
        layout: F,
    ) -> Result<Vec<EcuDataComparisonResult>>
    where
        F: Fn(&str, &EcuData, &EcuData) -> (Vec<String>, Option<Vec<String>>),
    {
        let mut results = Vec::new();
        for key in first.common_keys(second) {
            let (Some(f), Some(s)) = (first.get(key), second.get(key)) else {
                continue;
            };
            let (main_path, descriptions) = layout(key, f, s);
            let record = self.records.compare(&main_path, descriptions, f, s)?;
            if !record.is_empty() {
                results.push(record);
            }
        }
        Ok(results)
    }
}

/// Description pair of two subsystem records.
///
/// Unnamed subsystems are described by part number and system name.
fn subsystem_descriptions(first: &EcuData, second: &EcuData) -> Vec<String> {
    if is_blank(first.ti_name.as_deref()) && is_blank(second.ti_name.as_deref()) {
        vec![first.subsystem_description(), second.subsystem_description()]
    } else {
        vec![
            first.ti_name.clone().unwrap_or_default(),
            second.ti_name.clone().unwrap_or_default(),
        ]
    }
}
