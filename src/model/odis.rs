//! In-memory tree of an ODIS diagnostic protocol.
//!
//! The tree mirrors the on-disk document: a protocol holds vehicle data and
//! communications, communications hold ECU groups, ECUs hold master and
//! subsystem records, and records hold an unbounded tree of value nodes.

use super::field::{FieldKind, FieldParameters};
use super::keyed::{disambiguate, Keyed, KeyedSequence};
use super::key_codec::{self, ADAPTATION, CODING, IDENT};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `ti_name` of the value carrying a subsystem's number.
pub const SUBSYSTEM_NUMBER_TI_NAME: &str = "MAS01171";
/// `ti_name` of the value carrying a subsystem's part number.
pub const SUBSYSTEM_PART_NUMBER_TI_NAME: &str = "IDE00013";
/// `ti_name` of the value carrying a subsystem's system name.
pub const SUBSYSTEM_SYSTEM_NAME_TI_NAME: &str = "IDE00007";

/// True for `None`, empty and whitespace-only strings.
#[must_use]
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Protocol level
// ============================================================================

/// A parsed ODIS protocol document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdisProtocol {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<Information>,
    pub vehicle: Vehicle,
}

/// Tester and session information from the protocol header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Information {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pc_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diag_hardware: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Vehicle section: free-form vehicle data plus the ECU communications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    pub vehicle_data: Vec<NameValue>,
    pub odx_info: Vec<NameValue>,
    pub communications: Vec<Communication>,
}

/// A `display_name` / `display_value` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
}

/// One communication channel and the ECU groups reached through it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Communication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comm_type: Option<String>,
    pub ecu_groups: Vec<EcuGroup>,
}

/// A typed group of ECUs inside a communication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcuGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    pub ecus: Vec<Ecu>,
}

/// Substring filter used when collecting ECUs from a protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EcuSelector {
    /// Keep ECUs whose id contains this text
    pub id: Option<String>,
    /// Keep ECUs whose name contains this text
    pub name: Option<String>,
}

impl EcuSelector {
    #[must_use]
    pub fn matches(&self, ecu: &Ecu) -> bool {
        let id_ok = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map_or(true, |id| ecu.ecu_id.contains(id));
        let name_ok = self
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map_or(true, |name| {
                ecu.ecu_name.as_deref().is_some_and(|n| n.contains(name))
            });
        id_ok && name_ok
    }
}

impl OdisProtocol {
    fn vehicle_value(&self, name: &str) -> Option<&str> {
        self.vehicle
            .vehicle_data
            .iter()
            .find(|v| v.display_name.as_deref() == Some(name))
            .and_then(|v| v.display_value.as_deref())
    }

    /// Vehicle identification number, if recorded.
    #[must_use]
    pub fn vin(&self) -> Option<&str> {
        self.vehicle_value("vin")
    }

    /// Odometer reading as recorded by the tester.
    #[must_use]
    pub fn mileage(&self) -> Option<&str> {
        self.vehicle_value("mileage")
    }

    /// All ECUs across every communication, in document order.
    pub fn all_ecus(&self) -> impl Iterator<Item = &Ecu> {
        self.vehicle
            .communications
            .iter()
            .flat_map(|c| c.ecu_groups.iter())
            .flat_map(|g| g.ecus.iter())
    }

    /// Collect ECUs keyed by id.
    ///
    /// Repeated ids are kept and disambiguated (`0019`, `0019_2`, ...), so the
    /// same repetition in two snapshots still pairs up.
    #[must_use]
    pub fn ecus(&self, selector: &EcuSelector) -> IndexMap<String, Ecu> {
        let selected: KeyedSequence<Ecu> = self
            .all_ecus()
            .filter(|ecu| selector.matches(ecu))
            .cloned()
            .collect();

        selected
            .entries()
            .map(|(key, ecu)| {
                if key != ecu.ecu_id {
                    tracing::warn!("Duplicate ECU id {} stored as {}", ecu.ecu_id, key);
                }
                (key.to_string(), ecu.clone())
            })
            .collect()
    }
}

// ============================================================================
// ECU level
// ============================================================================

/// An ECU and its diagnostic records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ecu {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<String>,
    pub ecu_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecu_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tester_odx_variant: Option<String>,
    /// Master records keyed by type tag
    #[serde(skip_serializing_if = "KeyedSequence::is_empty")]
    pub masters: KeyedSequence<EcuData>,
    /// Subsystem records keyed by `"<qualifier>_<type>"`
    #[serde(
        skip_serializing_if = "KeyedSequence::is_empty",
        default = "subsystem_sequence",
        deserialize_with = "deserialize_subsystems"
    )]
    pub subsystems: KeyedSequence<EcuData>,
}

impl Default for Ecu {
    fn default() -> Self {
        Self {
            time_stamp: None,
            ecu_id: String::new(),
            ecu_name: None,
            logical_link: None,
            tester_odx_variant: None,
            masters: KeyedSequence::default(),
            subsystems: subsystem_sequence(),
        }
    }
}

impl Keyed for Ecu {
    fn project_key(&self, index: usize) -> String {
        disambiguate(&self.ecu_id, index)
    }
}

impl Ecu {
    /// Create an ECU with the given id and no records.
    pub fn new(ecu_id: impl Into<String>) -> Self {
        Self {
            ecu_id: ecu_id.into(),
            ..Default::default()
        }
    }

    /// Master records of one raw type tag.
    pub fn masters_of_type<'a>(&'a self, record_type: &'a str) -> impl Iterator<Item = &'a EcuData> {
        self.masters
            .iter()
            .filter(move |m| m.record_type == record_type)
    }

    pub fn identification(&self) -> impl Iterator<Item = &EcuData> {
        self.masters_of_type(IDENT)
    }

    pub fn coding(&self) -> impl Iterator<Item = &EcuData> {
        self.masters_of_type(CODING)
    }

    pub fn adaptation(&self) -> impl Iterator<Item = &EcuData> {
        self.masters_of_type(ADAPTATION)
    }
}

impl fmt::Display for Ecu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} {})",
            self.ecu_id,
            self.ecu_name.as_deref().unwrap_or_default(),
            self.logical_link.as_deref().unwrap_or_default(),
            self.tester_odx_variant.as_deref().unwrap_or_default()
        )
    }
}

/// Empty sequence using the subsystem key projection.
#[must_use]
pub fn subsystem_sequence() -> KeyedSequence<EcuData> {
    KeyedSequence::with_projection(Vec::new(), subsystem_key)
}

fn deserialize_subsystems<'de, D>(deserializer: D) -> Result<KeyedSequence<EcuData>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Vec::<EcuData>::deserialize(deserializer)
        .map(|records| KeyedSequence::with_projection(records, subsystem_key))
}

/// Subsystem projection: `"<qualifier>_<type>"`, disambiguated.
pub fn subsystem_key(record: &EcuData, index: usize) -> String {
    disambiguate(
        &format!("{}_{}", record.subsystem_qualifier(), record.record_type),
        index,
    )
}

// ============================================================================
// Record level
// ============================================================================

/// A typed block of data owned by an ECU (master or subsystem record).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcuData {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ti_name: Option<String>,
    pub values: KeyedSequence<ValueItem>,
}

/// Master records are keyed by their type tag.
impl Keyed for EcuData {
    fn project_key(&self, index: usize) -> String {
        disambiguate(&self.record_type, index)
    }
}

impl EcuData {
    /// Display value of the first top-level value with the given `ti_name`.
    #[must_use]
    pub fn value_by_ti_name(&self, ti_name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.ti_name.as_deref() == Some(ti_name))
            .and_then(|v| v.display_value.as_deref())
    }

    /// Identity part of a subsystem key.
    ///
    /// Falls back from `ti_name` to the subsystem number value, then to the
    /// display name; empty when none of these exist.
    #[must_use]
    pub fn subsystem_qualifier(&self) -> &str {
        self.ti_name
            .as_deref()
            .or_else(|| self.value_by_ti_name(SUBSYSTEM_NUMBER_TI_NAME))
            .or(self.display_name.as_deref())
            .unwrap_or_default()
    }

    /// `"<part number> - <system name>"` description of a subsystem.
    #[must_use]
    pub fn subsystem_description(&self) -> String {
        format!(
            "{} - {}",
            self.value_by_ti_name(SUBSYSTEM_PART_NUMBER_TI_NAME)
                .unwrap_or_default(),
            self.value_by_ti_name(SUBSYSTEM_SYSTEM_NAME_TI_NAME)
                .unwrap_or_default()
        )
    }
}

impl fmt::Display for EcuData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            key_codec::display_label(&self.record_type),
            self.ti_name.as_deref().unwrap_or_default()
        )
    }
}

// ============================================================================
// Value level
// ============================================================================

/// A value node: alternative representations of one value plus sub-values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ti_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ti_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ti_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_unit: Option<String>,
    #[serde(skip_serializing_if = "KeyedSequence::is_empty")]
    pub sub_values: KeyedSequence<ValueItem>,
}

/// Value nodes are keyed by `ti_name`, else `display_name`.
impl Keyed for ValueItem {
    fn project_key(&self, index: usize) -> String {
        let base = self
            .ti_name
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or_default();
        disambiguate(base, index)
    }
}

impl ValueItem {
    /// Raw string of one field.
    #[must_use]
    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        match kind {
            FieldKind::TiName => self.ti_name.as_deref(),
            FieldKind::TiUnit => self.ti_unit.as_deref(),
            FieldKind::DisplayName => self.display_name.as_deref(),
            FieldKind::DisplayValue => self.display_value.as_deref(),
            FieldKind::DisplayUnit => self.display_unit.as_deref(),
            FieldKind::BinValue => self.bin_value.as_deref(),
            FieldKind::HexValue => self.hex_value.as_deref(),
            FieldKind::TiValue => self.ti_value.as_deref(),
        }
    }

    /// Rendering classification of `kind` on this node.
    #[must_use]
    pub fn field_parameters(&self, kind: FieldKind) -> FieldParameters {
        FieldParameters {
            free_text: is_blank(self.ti_value.as_deref()),
            numeric: !is_blank(self.ti_unit.as_deref()) && kind == FieldKind::DisplayValue,
        }
    }

    /// `"Display (TI)"`, or whichever of the two names exists.
    #[must_use]
    pub fn name(&self) -> String {
        match (
            non_blank(self.display_name.as_deref()),
            non_blank(self.ti_name.as_deref()),
        ) {
            (Some(display), Some(ti)) if ti != display => format!("{display} ({ti})"),
            (Some(display), _) => display.to_string(),
            (None, ti) => ti.unwrap_or_default().to_string(),
        }
    }

    /// First populated representation (bin, hex, display, typed) plus unit.
    #[must_use]
    pub fn value(&self) -> String {
        let value = non_blank(self.bin_value.as_deref())
            .or_else(|| non_blank(self.hex_value.as_deref()))
            .or_else(|| non_blank(self.display_value.as_deref()))
            .or(self.ti_value.as_deref())
            .unwrap_or_default();

        match non_blank(self.display_unit.as_deref()).or_else(|| non_blank(self.ti_unit.as_deref())) {
            Some(unit) => format!("{value} ({unit})"),
            None => value.to_string(),
        }
    }
}
