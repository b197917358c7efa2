//! In-memory model of ODIS diagnostic snapshots.
//!
//! This module defines the tree the loader produces and the comparison
//! engine consumes:
//!
//! - [`OdisProtocol`] → [`Ecu`] → [`EcuData`] (master / subsystem records)
//!   → [`ValueItem`] (recursive value nodes)
//! - [`KeyedSequence`], the ordered collection with a lazily built,
//!   disambiguated key index used at every level of the tree
//! - [`FieldKind`] / [`FieldParameters`], naming and classifying the
//!   compared attributes of a value node
//! - [`key_codec`], translating record type tags and composite subsystem
//!   keys for display and grouping

pub mod key_codec;
mod field;
mod keyed;
mod odis;

pub use field::{FieldKind, FieldParameters};
pub use keyed::{build_keyed_index, disambiguate, KeyProjection, Keyed, KeyedSequence};
pub use odis::{
    is_blank, subsystem_key, subsystem_sequence, Communication, Ecu, EcuData, EcuGroup,
    EcuSelector, Information, NameValue, OdisProtocol, ValueItem, Vehicle,
    SUBSYSTEM_NUMBER_TI_NAME, SUBSYSTEM_PART_NUMBER_TI_NAME, SUBSYSTEM_SYSTEM_NAME_TI_NAME,
};
