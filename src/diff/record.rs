//! Comparison of one pair of master or subsystem records.

use super::field::FieldComparator;
use super::result::EcuDataComparisonResult;
use super::values::ValueTreeComparer;
use crate::config::ComparisonConfig;
use crate::error::{OdisCompareError, Result};
use crate::model::{EcuData, FieldKind, FieldParameters};

/// Compares two records that were paired by key.
///
/// Master and subsystem records share this comparer; they only differ in
/// the path prefix and description pair handed in by the caller.
#[derive(Debug, Clone, Copy)]
pub struct RecordComparer<'a> {
    config: &'a ComparisonConfig,
}

impl<'a> RecordComparer<'a> {
    #[must_use]
    pub const fn new(config: &'a ComparisonConfig) -> Self {
        Self { config }
    }

    /// Compare `first` and `second` below `main_path`.
    ///
    /// # Errors
    ///
    /// Fails with a `TI_NAME` identity mismatch when the two records carry
    /// different `ti_name`s.
    pub fn compare(
        &self,
        main_path: &[String],
        descriptions: Option<Vec<String>>,
        first: &EcuData,
        second: &EcuData,
    ) -> Result<EcuDataComparisonResult> {
        if first.ti_name != second.ti_name {
            return Err(OdisCompareError::ti_name_mismatch(
                first.ti_name.as_deref(),
                second.ti_name.as_deref(),
            ));
        }

        let mut path = main_path.to_vec();
        path.push(first.ti_name.clone().unwrap_or_default());
        let mut result = EcuDataComparisonResult::new(path, descriptions);

        if self.config.reports_differences() {
            let names = [
                first.display_name.clone().unwrap_or_default(),
                second.display_name.clone().unwrap_or_default(),
            ];
            let path = result.path.clone();
            FieldComparator::new(&self.config.bypass).compare(
                &mut result.differences,
                &path,
                &names,
                FieldKind::DisplayName,
                FieldParameters::default(),
                first.display_name.as_deref(),
                second.display_name.as_deref(),
            );
        }

        // Value paths hang off the record type, not the record name.
        ValueTreeComparer::new(self.config).compare(
            &mut result,
            main_path,
            &first.values,
            &second.values,
        );

        Ok(result)
    }
}
