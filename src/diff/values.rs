//! Recursive comparison of value-node trees.
//!
//! The walk is depth-first and pre-order: at every level the presence diff
//! is computed first, then each common key is compared and its sub-values
//! are walked before the next sibling. An explicit stack replaces recursion
//! so arbitrarily deep trees cannot overflow the call stack.

use super::field::FieldComparator;
use super::result::EcuDataComparisonResult;
use crate::config::ComparisonConfig;
use crate::model::{FieldKind, KeyedSequence, ValueItem};
use indexmap::IndexMap;

/// Field kinds compared unconditionally for every paired node, in order.
const COMPARED_FIELDS: [FieldKind; 5] = [
    FieldKind::TiName,
    FieldKind::TiUnit,
    FieldKind::DisplayName,
    FieldKind::DisplayValue,
    FieldKind::DisplayUnit,
];

/// Effective-value representations; only the first recorded mismatch counts.
const VALUE_FALLBACK: [FieldKind; 3] = [FieldKind::BinValue, FieldKind::HexValue, FieldKind::TiValue];

/// One level of the walk.
struct Frame<'t> {
    path: Vec<String>,
    first: &'t KeyedSequence<ValueItem>,
    second: &'t KeyedSequence<ValueItem>,
    common: Vec<&'t str>,
    next: usize,
}

/// Compares two value sequences and everything nested below them.
#[derive(Debug, Clone, Copy)]
pub struct ValueTreeComparer<'a> {
    config: &'a ComparisonConfig,
    fields: FieldComparator<'a>,
}

impl<'a> ValueTreeComparer<'a> {
    #[must_use]
    pub fn new(config: &'a ComparisonConfig) -> Self {
        Self {
            config,
            fields: FieldComparator::new(&config.bypass),
        }
    }

    /// Compare `first` and `second` below `path`, accumulating into `result`.
    pub fn compare<'t>(
        &self,
        result: &mut EcuDataComparisonResult,
        path: &[String],
        first: &'t KeyedSequence<ValueItem>,
        second: &'t KeyedSequence<ValueItem>,
    ) {
        let mut stack = vec![self.enter(result, path.to_vec(), first, second)];

        while let Some(frame) = stack.last_mut() {
            let Some(&key) = frame.common.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;

            let (first_seq, second_seq) = (frame.first, frame.second);
            let (Some(first_item), Some(second_item)) = (first_seq.get(key), second_seq.get(key))
            else {
                continue;
            };

            let mut item_path = frame.path.clone();
            item_path.push(key.to_string());

            if self.config.reports_differences() {
                self.compare_pair(result, &item_path, first_item, second_item);
            }

            if !first_item.sub_values.is_empty() || !second_item.sub_values.is_empty() {
                let child = self.enter(
                    result,
                    item_path,
                    &first_item.sub_values,
                    &second_item.sub_values,
                );
                stack.push(child);
            }
        }
    }

    /// Record presence differences for one level and prepare its frame.
    fn enter<'t>(
        &self,
        result: &mut EcuDataComparisonResult,
        path: Vec<String>,
        first: &'t KeyedSequence<ValueItem>,
        second: &'t KeyedSequence<ValueItem>,
    ) -> Frame<'t> {
        if self.config.reports_missing_in_first() {
            merge_missing(&mut result.fields_missing_in_first, second.missing_from(first, None));
        }
        if self.config.reports_missing_in_second() {
            merge_missing(&mut result.fields_missing_in_second, first.missing_from(second, None));
        }

        Frame {
            path,
            first,
            second,
            common: first.common_keys(second),
            next: 0,
        }
    }

    fn compare_pair(
        &self,
        result: &mut EcuDataComparisonResult,
        path: &[String],
        first: &ValueItem,
        second: &ValueItem,
    ) {
        let descriptions = [
            first.display_name.clone().unwrap_or_default(),
            second.display_name.clone().unwrap_or_default(),
        ];

        for kind in COMPARED_FIELDS {
            self.fields.compare(
                &mut result.differences,
                path,
                &descriptions,
                kind,
                first.field_parameters(kind),
                first.field(kind),
                second.field(kind),
            );
        }

        for kind in VALUE_FALLBACK {
            let recorded = self.fields.compare(
                &mut result.differences,
                path,
                &descriptions,
                kind,
                first.field_parameters(kind),
                first.field(kind),
                second.field(kind),
            );
            if recorded {
                break;
            }
        }
    }
}

/// Nested levels share the record's flat maps; the first entry per key wins.
fn merge_missing(target: &mut IndexMap<String, ValueItem>, found: IndexMap<String, ValueItem>) {
    for (key, item) in found {
        target.entry(key).or_insert(item);
    }
}
