//! Field kinds of a value node and their rendering classification.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The attribute of a value node being compared.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    /// Identity name (`ti_name`)
    #[value(alias = "TI_NAME")]
    TiName,
    /// Unit of the typed value (`ti_unit`)
    #[value(alias = "TI_UNIT")]
    TiUnit,
    /// Human readable name (`display_name`)
    #[value(alias = "DISPLAY_NAME")]
    DisplayName,
    /// Human readable value (`display_value`)
    #[value(alias = "DISPLAY_VALUE")]
    DisplayValue,
    /// Unit of the display value (`display_unit`)
    #[value(alias = "DISPLAY_UNIT")]
    DisplayUnit,
    /// Binary representation (`bin_value`)
    #[value(alias = "BIN_VALUE")]
    BinValue,
    /// Hexadecimal representation (`hex_value`)
    #[value(alias = "HEX_VALUE")]
    HexValue,
    /// Raw typed representation (`ti_value`)
    #[value(alias = "TI_VALUE")]
    TiValue,
}

impl FieldKind {
    /// Field kinds bypassed unless configured otherwise.
    pub const DEFAULT_BYPASS: [Self; 2] = [Self::DisplayName, Self::TiValue];

    /// Wire name as used in JSON output and config files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TiName => "TI_NAME",
            Self::TiUnit => "TI_UNIT",
            Self::DisplayName => "DISPLAY_NAME",
            Self::DisplayValue => "DISPLAY_VALUE",
            Self::DisplayUnit => "DISPLAY_UNIT",
            Self::BinValue => "BIN_VALUE",
            Self::HexValue => "HEX_VALUE",
            Self::TiValue => "TI_VALUE",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification attached to a difference for downstream rendering.
///
/// These flags never influence whether two values are considered equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParameters {
    /// The owning node has no typed value, so the field is free text
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub free_text: bool,
    /// The owning node declares a unit and the field is the display value
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub numeric: bool,
}

impl FieldParameters {
    /// Whether a renderer should highlight individual characters.
    #[must_use]
    pub const fn char_level_highlight(&self) -> bool {
        self.free_text && !self.numeric
    }
}
