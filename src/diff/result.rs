//! Comparison result structures.
//!
//! The result tree mirrors the input shape: one [`EcuComparisonResult`] per
//! compared ECU, holding one [`EcuDataComparisonResult`] per compared record.
//! Everything a renderer needs (paths, descriptions, field kinds and
//! rendering flags) is embedded at construction time.

use crate::config::ComparisonConfig;
use crate::model::{
    key_codec, disambiguate, Ecu, EcuData, FieldKind, FieldParameters, Keyed, KeyedSequence,
    OdisProtocol, ValueItem,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Path segment marking a subsystem record.
pub const SUBSYSTEM_SEGMENT: &str = "subsystem";

/// A single field-level difference between two paired value nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    /// Containment chain: entity, (subsystem), record type, value keys
    pub path: Vec<String>,
    /// Display names of the two compared nodes, first then second
    pub field_descriptions: Vec<String>,
    pub field_kind: FieldKind,
    #[serde(default)]
    pub parameters: FieldParameters,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_value: Option<String>,
}

impl Difference {
    /// Create a difference; the message is derived from the two values.
    #[must_use]
    pub fn new(
        path: Vec<String>,
        field_descriptions: Vec<String>,
        field_kind: FieldKind,
        parameters: FieldParameters,
        first_value: Option<&str>,
        second_value: Option<&str>,
    ) -> Self {
        Self {
            message: format!(
                "{} is different from {}",
                first_value.unwrap_or_default(),
                second_value.unwrap_or_default()
            ),
            path,
            field_descriptions,
            field_kind,
            parameters,
            first_value: first_value.map(str::to_string),
            second_value: second_value.map(str::to_string),
        }
    }

    /// Path relative to the record, joined with `separator`.
    ///
    /// The entity and record-type segments are dropped (plus the subsystem
    /// marker) and the last segment is replaced by the first description.
    #[must_use]
    pub fn display_path(&self, separator: &str) -> String {
        let skip = if self.path.get(1).map(String::as_str) == Some(SUBSYSTEM_SEGMENT) {
            3
        } else {
            2
        };
        let mut segments: Vec<&str> = self.path.iter().skip(skip).map(String::as_str).collect();
        if let (Some(last), Some(description)) =
            (segments.last_mut(), self.field_descriptions.first())
        {
            if !description.is_empty() {
                *last = description.as_str();
            }
        }
        segments.join(separator)
    }
}

/// Result of comparing one pair of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcuDataComparisonResult {
    /// Entity, (subsystem), record type, record `ti_name`
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptions: Option<Vec<String>>,
    /// Value nodes that only exist in the second record, at any depth
    pub fields_missing_in_first: IndexMap<String, ValueItem>,
    /// Value nodes that only exist in the first record, at any depth
    pub fields_missing_in_second: IndexMap<String, ValueItem>,
    pub differences: Vec<Difference>,
}

impl EcuDataComparisonResult {
    #[must_use]
    pub fn new(path: Vec<String>, descriptions: Option<Vec<String>>) -> Self {
        Self {
            path,
            descriptions,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields_missing_in_first.is_empty()
            && self.fields_missing_in_second.is_empty()
            && self.differences.is_empty()
    }

    /// Whether the record is a subsystem record.
    #[must_use]
    pub fn is_subsystem(&self) -> bool {
        self.path.get(1).map(String::as_str) == Some(SUBSYSTEM_SEGMENT)
    }

    /// Display label of the record type this result belongs to.
    #[must_use]
    pub fn record_type(&self) -> String {
        let segment = if self.is_subsystem() {
            self.path.get(2)
        } else {
            self.path.get(1)
        };
        segment.map(|s| key_codec::record_type_of(s)).unwrap_or_default()
    }

    /// Title line: the description pair when present, otherwise the path.
    #[must_use]
    pub fn title(&self) -> String {
        match self.descriptions.as_deref() {
            Some([first, second]) if first == second => first.clone(),
            Some([first, second]) => format!("{first} / {second}"),
            _ => self
                .path
                .iter()
                .skip(1)
                .filter(|segment| !segment.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" / "),
        }
    }
}

/// Result of comparing one pair of ECUs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcuComparisonResult {
    pub ecu_id: String,
    pub first_ecu: Ecu,
    pub second_ecu: Ecu,
    pub master_missing_in_first: IndexMap<String, EcuData>,
    pub master_missing_in_second: IndexMap<String, EcuData>,
    pub master_results: Vec<EcuDataComparisonResult>,
    pub subsystem_missing_in_first: IndexMap<String, EcuData>,
    pub subsystem_missing_in_second: IndexMap<String, EcuData>,
    pub subsystem_results: Vec<EcuDataComparisonResult>,
}

impl Keyed for EcuComparisonResult {
    fn project_key(&self, index: usize) -> String {
        disambiguate(&self.ecu_id, index)
    }
}

impl EcuComparisonResult {
    /// Create an empty result for a pair of ECUs.
    #[must_use]
    pub fn new(first: &Ecu, second: &Ecu) -> Self {
        Self {
            ecu_id: first.ecu_id.clone(),
            first_ecu: first.clone(),
            second_ecu: second.clone(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.master_missing_in_first.is_empty()
            && self.master_missing_in_second.is_empty()
            && self.master_results.is_empty()
            && self.subsystem_missing_in_first.is_empty()
            && self.subsystem_missing_in_second.is_empty()
            && self.subsystem_results.is_empty()
    }

    /// Master and subsystem record results, in that order.
    pub fn record_results(&self) -> impl Iterator<Item = &EcuDataComparisonResult> {
        self.master_results.iter().chain(self.subsystem_results.iter())
    }

    /// Re-apply a comparison policy; returns `None` if nothing survives.
    fn filtered(&self, config: &ComparisonConfig) -> Option<Self> {
        let keep_first = config.reports_missing_in_first();
        let keep_second = config.reports_missing_in_second();
        let filter_records = |records: &[EcuDataComparisonResult]| {
            records
                .iter()
                .filter_map(|record| filter_record(record, config))
                .collect::<Vec<_>>()
        };

        let result = Self {
            ecu_id: self.ecu_id.clone(),
            first_ecu: self.first_ecu.clone(),
            second_ecu: self.second_ecu.clone(),
            master_missing_in_first: keep_or_empty(&self.master_missing_in_first, keep_first),
            master_missing_in_second: keep_or_empty(&self.master_missing_in_second, keep_second),
            master_results: filter_records(&self.master_results),
            subsystem_missing_in_first: keep_or_empty(&self.subsystem_missing_in_first, keep_first),
            subsystem_missing_in_second: keep_or_empty(
                &self.subsystem_missing_in_second,
                keep_second,
            ),
            subsystem_results: filter_records(&self.subsystem_results),
        };
        (!result.is_empty()).then_some(result)
    }
}

fn keep_or_empty<V: Clone>(map: &IndexMap<String, V>, keep: bool) -> IndexMap<String, V> {
    if keep {
        map.clone()
    } else {
        IndexMap::new()
    }
}

fn filter_record(
    record: &EcuDataComparisonResult,
    config: &ComparisonConfig,
) -> Option<EcuDataComparisonResult> {
    let differences = if config.reports_differences() {
        record
            .differences
            .iter()
            .filter(|d| !config.is_bypassed(d.field_kind))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };
    let result = EcuDataComparisonResult {
        path: record.path.clone(),
        descriptions: record.descriptions.clone(),
        fields_missing_in_first: keep_or_empty(
            &record.fields_missing_in_first,
            config.reports_missing_in_first(),
        ),
        fields_missing_in_second: keep_or_empty(
            &record.fields_missing_in_second,
            config.reports_missing_in_second(),
        ),
        differences,
    };
    (!result.is_empty()).then_some(result)
}

/// Header data of one compared snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_issue: Option<String>,
}

impl SnapshotInfo {
    #[must_use]
    pub fn from_protocol(path: &Path, protocol: &OdisProtocol) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            vin: protocol.vin().map(str::to_string),
            mileage: protocol.mileage().map(str::to_string),
            time_of_issue: protocol.time_of_issue.clone(),
        }
    }
}

/// Complete result of a snapshot comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct ComparisonResults {
    pub timestamp: DateTime<Utc>,
    /// Policy the tree was computed (or last filtered) with
    pub options: ComparisonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_snapshot: Option<SnapshotInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_snapshot: Option<SnapshotInfo>,
    #[serde(default)]
    pub ecus_missing_in_first: IndexMap<String, Ecu>,
    #[serde(default)]
    pub ecus_missing_in_second: IndexMap<String, Ecu>,
    /// Non-empty ECU results, keyed by ECU id
    #[serde(default)]
    pub ecu_results: KeyedSequence<EcuComparisonResult>,
}

impl ComparisonResults {
    /// Create an empty result stamped with the current time.
    pub fn new(options: ComparisonConfig) -> Self {
        Self {
            timestamp: Utc::now(),
            options,
            first_snapshot: None,
            second_snapshot: None,
            ecus_missing_in_first: IndexMap::new(),
            ecus_missing_in_second: IndexMap::new(),
            ecu_results: KeyedSequence::default(),
        }
    }

    /// Attach snapshot header data.
    pub fn with_snapshots(mut self, first: SnapshotInfo, second: SnapshotInfo) -> Self {
        self.first_snapshot = Some(first);
        self.second_snapshot = Some(second);
        self
    }

    /// True when no ECU is missing and no compared ECU differs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ecus_missing_in_first.is_empty()
            && self.ecus_missing_in_second.is_empty()
            && self.ecu_results.is_empty()
    }

    /// Total number of reported items (missing entities, records, fields and differences).
    #[must_use]
    pub fn difference_count(&self) -> usize {
        let per_ecu: usize = self
            .ecu_results
            .iter()
            .map(|ecu| {
                ecu.master_missing_in_first.len()
                    + ecu.master_missing_in_second.len()
                    + ecu.subsystem_missing_in_first.len()
                    + ecu.subsystem_missing_in_second.len()
                    + ecu
                        .record_results()
                        .map(|r| {
                            r.fields_missing_in_first.len()
                                + r.fields_missing_in_second.len()
                                + r.differences.len()
                        })
                        .sum::<usize>()
            })
            .sum();
        self.ecus_missing_in_first.len() + self.ecus_missing_in_second.len() + per_ecu
    }

    /// Split into one result holding only the missing ECUs, followed by one
    /// result per compared ECU. All parts share timestamp and options.
    pub fn split_by_ecu(&self) -> Vec<Self> {
        let empty = || Self {
            timestamp: self.timestamp,
            options: self.options.clone(),
            first_snapshot: self.first_snapshot.clone(),
            second_snapshot: self.second_snapshot.clone(),
            ecus_missing_in_first: IndexMap::new(),
            ecus_missing_in_second: IndexMap::new(),
            ecu_results: KeyedSequence::default(),
        };

        let mut parts = Vec::with_capacity(self.ecu_results.len() + 1);
        let mut missing = empty();
        missing.ecus_missing_in_first = self.ecus_missing_in_first.clone();
        missing.ecus_missing_in_second = self.ecus_missing_in_second.clone();
        parts.push(missing);

        for ecu in &self.ecu_results {
            let mut part = empty();
            part.ecu_results.push(ecu.clone());
            parts.push(part);
        }
        parts
    }

    /// Re-apply a comparison policy to an existing tree.
    ///
    /// Presence maps of disabled directions are cleared, differences of
    /// bypassed kinds are dropped and ECUs outside the filter are removed.
    /// Records and ECUs left empty are dropped.
    pub fn filtered(&self, config: &ComparisonConfig) -> Self {
        let ecu_results = self
            .ecu_results
            .iter()
            .filter(|ecu| config.ecu_filter_matches(&ecu.ecu_id))
            .filter_map(|ecu| ecu.filtered(config))
            .collect();

        Self {
            timestamp: self.timestamp,
            options: config.clone(),
            first_snapshot: self.first_snapshot.clone(),
            second_snapshot: self.second_snapshot.clone(),
            ecus_missing_in_first: keep_or_empty(
                &self.ecus_missing_in_first,
                config.reports_missing_in_first(),
            ),
            ecus_missing_in_second: keep_or_empty(
                &self.ecus_missing_in_second,
                config.reports_missing_in_second(),
            ),
            ecu_results,
        }
    }
}
