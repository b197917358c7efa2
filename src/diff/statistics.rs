//! Difference counts grouped by ECU and record type.

use super::result::{ComparisonResults, EcuComparisonResult};
use crate::model::key_codec;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a reported item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifferenceType {
    EcusMissingInFirst,
    EcusMissingInSecond,
    RecordsMissingInFirst,
    RecordsMissingInSecond,
    FieldsMissingInFirst,
    FieldsMissingInSecond,
    Differences,
}

impl DifferenceType {
    pub const ALL: [Self; 7] = [
        Self::EcusMissingInFirst,
        Self::EcusMissingInSecond,
        Self::RecordsMissingInFirst,
        Self::RecordsMissingInSecond,
        Self::FieldsMissingInFirst,
        Self::FieldsMissingInSecond,
        Self::Differences,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::EcusMissingInFirst => "ECUs missing in first",
            Self::EcusMissingInSecond => "ECUs missing in second",
            Self::RecordsMissingInFirst => "Records missing in first",
            Self::RecordsMissingInSecond => "Records missing in second",
            Self::FieldsMissingInFirst => "Fields missing in first",
            Self::FieldsMissingInSecond => "Fields missing in second",
            Self::Differences => "Differences",
        }
    }
}

impl fmt::Display for DifferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of the statistics table.
///
/// Global rows carry only a difference type; per-ECU rows carry the ECU id
/// and, below the ECU total, a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecu_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_type: Option<DifferenceType>,
    pub count: usize,
}

/// Count of one difference type within a single ECU result.
fn ecu_count(ecu: &EcuComparisonResult, kind: DifferenceType) -> usize {
    match kind {
        DifferenceType::EcusMissingInFirst | DifferenceType::EcusMissingInSecond => 0,
        DifferenceType::RecordsMissingInFirst => {
            ecu.master_missing_in_first.len() + ecu.subsystem_missing_in_first.len()
        }
        DifferenceType::RecordsMissingInSecond => {
            ecu.master_missing_in_second.len() + ecu.subsystem_missing_in_second.len()
        }
        DifferenceType::FieldsMissingInFirst => ecu
            .record_results()
            .map(|r| r.fields_missing_in_first.len())
            .sum(),
        DifferenceType::FieldsMissingInSecond => ecu
            .record_results()
            .map(|r| r.fields_missing_in_second.len())
            .sum(),
        DifferenceType::Differences => ecu.record_results().map(|r| r.differences.len()).sum(),
    }
}

/// Per record type counts for one ECU, in first-seen order.
fn record_type_counts(ecu: &EcuComparisonResult) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();

    let missing_keys = ecu
        .master_missing_in_first
        .keys()
        .chain(ecu.master_missing_in_second.keys())
        .chain(ecu.subsystem_missing_in_first.keys())
        .chain(ecu.subsystem_missing_in_second.keys());
    for key in missing_keys {
        *counts.entry(key_codec::record_type_of(key)).or_default() += 1;
    }

    for record in ecu.record_results() {
        let count = record.fields_missing_in_first.len()
            + record.fields_missing_in_second.len()
            + record.differences.len();
        *counts.entry(record.record_type()).or_default() += count;
    }

    counts
}

/// Build the statistics table for a result tree.
#[must_use]
pub fn statistics(results: &ComparisonResults) -> Vec<StatisticsRow> {
    let mut rows = Vec::new();

    for kind in DifferenceType::ALL {
        let count = match kind {
            DifferenceType::EcusMissingInFirst => results.ecus_missing_in_first.len(),
            DifferenceType::EcusMissingInSecond => results.ecus_missing_in_second.len(),
            other => results.ecu_results.iter().map(|ecu| ecu_count(ecu, other)).sum(),
        };
        if count > 0 {
            rows.push(StatisticsRow {
                ecu_id: None,
                record_type: None,
                difference_type: Some(kind),
                count,
            });
        }
    }

    for (ecu_id, ecu) in results.ecu_results.entries() {
        let total: usize = DifferenceType::ALL
            .iter()
            .map(|kind| ecu_count(ecu, *kind))
            .sum();
        rows.push(StatisticsRow {
            ecu_id: Some(ecu_id.to_string()),
            record_type: None,
            difference_type: None,
            count: total,
        });
        for (record_type, count) in record_type_counts(ecu) {
            rows.push(StatisticsRow {
                ecu_id: Some(ecu_id.to_string()),
                record_type: Some(record_type),
                difference_type: None,
                count,
            });
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComparisonConfig;
    use crate::diff::{Difference, EcuDataComparisonResult};
    use crate::model::{Ecu, EcuData, FieldKind, FieldParameters, ValueItem};

    fn diff(path: &[&str]) -> Difference {
        Difference::new(
            path.iter().map(|s| (*s).to_string()).collect(),
            vec![],
            FieldKind::DisplayValue,
            FieldParameters::default(),
            Some("a"),
            Some("b"),
        )
    }

    fn results() -> ComparisonResults {
        let mut coding = EcuDataComparisonResult::new(
            vec!["0019".into(), "Coding".into(), "CODING".into()],
            None,
        );
        coding.differences.push(diff(&["0019", "Coding", "A"]));
        coding.differences.push(diff(&["0019", "Coding", "B"]));
        coding
            .fields_missing_in_second
            .insert("C".into(), ValueItem::default());

        let mut sub = EcuDataComparisonResult::new(
            vec!["0019".into(), "subsystem".into(), "J519_Identification".into(), "J519".into()],
            None,
        );
        sub.differences.push(diff(&["0019", "subsystem", "J519_Identification", "X"]));

        let mut ecu = EcuComparisonResult::new(&Ecu::new("0019"), &Ecu::new("0019"));
        ecu.master_results.push(coding);
        ecu.subsystem_results.push(sub);
        ecu.master_missing_in_first
            .insert("Adaptation".into(), EcuData::default());

        let mut results = ComparisonResults::new(ComparisonConfig::default());
        results.ecus_missing_in_second.insert("0017".into(), Ecu::new("0017"));
        results.ecu_results.push(ecu);
        results
    }

    #[test]
    fn test_global_rows_skip_zero_counts() {
        let rows = statistics(&results());
        let global: Vec<(DifferenceType, usize)> = rows
            .iter()
            .filter(|r| r.ecu_id.is_none())
            .filter_map(|r| r.difference_type.map(|t| (t, r.count)))
            .collect();
        assert_eq!(
            global,
            [
                (DifferenceType::EcusMissingInSecond, 1),
                (DifferenceType::RecordsMissingInFirst, 1),
                (DifferenceType::FieldsMissingInSecond, 1),
                (DifferenceType::Differences, 3),
            ]
        );
    }

    #[test]
    fn test_per_ecu_rows() {
        let rows = statistics(&results());
        let ecu_rows: Vec<(Option<&str>, usize)> = rows
            .iter()
            .filter(|r| r.ecu_id.as_deref() == Some("0019"))
            .map(|r| (r.record_type.as_deref(), r.count))
            .collect();
        assert_eq!(
            ecu_rows,
            [
                (None, 5),
                (Some("Adaptation"), 1),
                (Some("Coding"), 3),
                (Some("Identification"), 1),
            ]
        );
    }

    #[test]
    fn test_repeated_records_group_under_their_type() {
        let mut ecu = EcuComparisonResult::new(&Ecu::new("0019"), &Ecu::new("0019"));
        ecu.master_missing_in_second
            .insert("Coding_2".into(), EcuData::default());
        ecu.subsystem_missing_in_first
            .insert("1_Coding_2".into(), EcuData::default());
        let mut results = ComparisonResults::new(ComparisonConfig::default());
        results.ecu_results.push(ecu);

        let rows = statistics(&results);
        let types: Vec<(Option<&str>, usize)> = rows
            .iter()
            .filter(|r| r.ecu_id.as_deref() == Some("0019") && r.record_type.is_some())
            .map(|r| (r.record_type.as_deref(), r.count))
            .collect();
        assert_eq!(types, [(Some("Coding"), 2)]);
    }

    #[test]
    fn test_empty_results_have_no_rows() {
        let empty = ComparisonResults::new(ComparisonConfig::default());
        assert!(statistics(&empty).is_empty());
    }
}
