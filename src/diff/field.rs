//! Scalar field comparison under a bypass policy.

use super::result::Difference;
use crate::model::{is_blank, FieldKind, FieldParameters};

/// Decide whether one field differs between two paired nodes.
///
/// Blank-blank pairs never differ and bypassed kinds never differ. Otherwise
/// the field differs when exactly one side is blank or the two strings are
/// not byte-for-byte equal.
#[must_use]
pub fn field_differs(
    kind: FieldKind,
    first: Option<&str>,
    second: Option<&str>,
    bypass: &[FieldKind],
) -> bool {
    let first_blank = is_blank(first);
    let second_blank = is_blank(second);
    if first_blank && second_blank {
        return false;
    }
    if bypass.contains(&kind) {
        return false;
    }
    first_blank || second_blank || first != second
}

/// Compares single fields and records a [`Difference`] when they differ.
#[derive(Debug, Clone, Copy)]
pub struct FieldComparator<'a> {
    bypass: &'a [FieldKind],
}

impl<'a> FieldComparator<'a> {
    #[must_use]
    pub const fn new(bypass: &'a [FieldKind]) -> Self {
        Self { bypass }
    }

    /// Compare one field, appending to `differences` on mismatch.
    ///
    /// Returns whether a difference was recorded.
    #[allow(clippy::too_many_arguments)]
    pub fn compare(
        &self,
        differences: &mut Vec<Difference>,
        path: &[String],
        descriptions: &[String],
        kind: FieldKind,
        parameters: FieldParameters,
        first: Option<&str>,
        second: Option<&str>,
    ) -> bool {
        if !field_differs(kind, first, second, self.bypass) {
            return false;
        }
        differences.push(Difference::new(
            path.to_vec(),
            descriptions.to_vec(),
            kind,
            parameters,
            first,
            second,
        ));
        true
    }
}
