//! Record-type labels and composite subsystem keys.
//!
//! ODIS tags master and subsystem records with terse type names
//! (`ident`, `coding_read`, `adaption_read`). Subsystem records are keyed by
//! `"<qualifier>_<type>"`, which this module can split back into its parts
//! for grouping and display. Nothing here influences equality decisions in
//! the comparison engine.

/// Raw record type tag for identification data.
pub const IDENT: &str = "ident";
/// Raw record type tag for coding data.
pub const CODING: &str = "coding_read";
/// Raw record type tag for adaptation data.
pub const ADAPTATION: &str = "adaption_read";

/// Raw type tags and their display labels, in matching priority order.
const TYPE_LABELS: [(&str, &str); 3] = [
    (IDENT, "Identification"),
    (CODING, "Coding"),
    (ADAPTATION, "Adaptation"),
];

/// A composite key split into its qualifier and type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeKey<'a> {
    /// Subsystem identity (the part before the type suffix)
    pub qualifier: &'a str,
    /// Type label as it appears in the key (raw tag or display label)
    pub record_type: &'a str,
}

/// Replace every raw type tag inside `text` with its display label.
///
/// Scans left to right; at each position the tags are tried in a fixed
/// order and the first match is consumed.
#[must_use]
pub fn display_label(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;

    'scan: while !rest.is_empty() {
        for (raw, label) in TYPE_LABELS {
            if let Some(tail) = rest.strip_prefix(raw) {
                out.push_str(label);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

/// Presentation form of a record key.
///
/// Composite keys keep their qualifier verbatim and only have the type part
/// relabelled; anything else is treated as a plain type tag.
#[must_use]
pub fn display_key(key: &str) -> String {
    match decode(key) {
        Some(composite) => format!(
            "{}_{}",
            composite.qualifier,
            display_label(composite.record_type)
        ),
        None => display_label(key),
    }
}

/// Split `"<qualifier>_<type>"` into its parts.
///
/// The type must be one of the known raw tags or display labels and the
/// qualifier must be non-empty. Returns `None` for plain type keys such as
/// `"Coding"`, which callers treat as master-record keys.
#[must_use]
pub fn decode(key: &str) -> Option<CompositeKey<'_>> {
    TYPE_LABELS
        .iter()
        .flat_map(|(raw, label)| [*raw, *label])
        .filter_map(|record_type| {
            let qualifier = key.strip_suffix(record_type)?.strip_suffix('_')?;
            (!qualifier.is_empty()).then_some(CompositeKey {
                qualifier,
                record_type,
            })
        })
        // Greedy qualifier: the shortest recognised suffix wins.
        .max_by_key(|composite| composite.qualifier.len())
}

/// Record type used to group statistics for a key.
///
/// A trailing `_<n>` disambiguation suffix is ignored, so `coding_read_2`
/// groups with `coding_read`.
#[must_use]
pub fn record_type_of(key: &str) -> String {
    let key = strip_disambiguation(key);
    decode(key).map_or_else(
        || display_label(key),
        |composite| display_label(composite.record_type),
    )
}

/// Drop a `_<n>` suffix when what precedes it ends in a known type.
fn strip_disambiguation(key: &str) -> &str {
    let Some((base, suffix)) = key.rsplit_once('_') else {
        return key;
    };
    let numbered = !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit());
    let typed = TYPE_LABELS
        .iter()
        .any(|(raw, label)| base.ends_with(raw) || base.ends_with(label));
    if numbered && typed {
        base
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label_remaps_raw_tags() {
        assert_eq!(display_label("ident"), "Identification");
        assert_eq!(display_label("coding_read"), "Coding");
        assert_eq!(display_label("adaption_read"), "Adaptation");
        assert_eq!(display_label("swap_fod"), "swap_fod");
    }

    #[test]
    fn test_display_label_replaces_inside_text() {
        assert_eq!(display_label("0001_coding_read"), "0001_Coding");
    }

    #[test]
    fn test_decode_composite_key() {
        let decoded = decode("SUB123_Coding").unwrap();
        assert_eq!(decoded.qualifier, "SUB123");
        assert_eq!(decoded.record_type, "Coding");

        let decoded = decode("J533_coding_read").unwrap();
        assert_eq!(decoded.qualifier, "J533");
        assert_eq!(decoded.record_type, "coding_read");
    }

    #[test]
    fn test_decode_rejects_plain_type() {
        assert_eq!(decode("Coding"), None);
        assert_eq!(decode("coding_read"), None);
        assert_eq!(decode("_Coding"), None);
        assert_eq!(decode("Seat_Heating"), None);
    }

    #[test]
    fn test_decode_keeps_underscores_in_qualifier() {
        let decoded = decode("FRONT_LEFT_DOOR_ident").unwrap();
        assert_eq!(decoded.qualifier, "FRONT_LEFT_DOOR");
        assert_eq!(decoded.record_type, "ident");
    }

    #[test]
    fn test_display_key_leaves_qualifier_untouched() {
        assert_eq!(display_key("identity_module_ident"), "identity_module_Identification");
        assert_eq!(display_key("ident"), "Identification");
    }

    #[test]
    fn test_record_type_of() {
        assert_eq!(record_type_of("ABS_adaption_read"), "Adaptation");
        assert_eq!(record_type_of("Coding"), "Coding");
        assert_eq!(record_type_of("ident"), "Identification");
    }

    #[test]
    fn test_record_type_of_ignores_disambiguation_suffix() {
        assert_eq!(record_type_of("coding_read_2"), "Coding");
        assert_eq!(record_type_of("1_coding_read_2"), "Coding");
        assert_eq!(record_type_of("J519_Identification_3"), "Identification");
        assert_eq!(record_type_of("Seat_2"), "Seat_2");
    }
}
