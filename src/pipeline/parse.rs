//! Snapshot parsing stage.

use super::PipelineError;
use crate::diff::SnapshotInfo;
use crate::model::{Ecu, EcuSelector, OdisProtocol};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// A parsed ODIS snapshot together with its ECU map.
#[derive(Debug, Clone)]
pub struct ParsedSnapshot {
    /// File the snapshot was read from
    pub path: PathBuf,
    /// The document tree
    pub protocol: OdisProtocol,
    /// All ECUs keyed by (disambiguated) id
    pub ecus: IndexMap<String, Ecu>,
}

impl ParsedSnapshot {
    /// Header data for reports.
    #[must_use]
    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo::from_protocol(&self.path, &self.protocol)
    }

    #[must_use]
    pub fn ecu_count(&self) -> usize {
        self.ecus.len()
    }
}

/// Parse an ODIS snapshot with context for error messages
pub fn parse_input(path: &Path, quiet: bool) -> anyhow::Result<ParsedSnapshot> {
    if !quiet {
        tracing::info!("Parsing ODIS snapshot: {}", path.display());
    }

    let protocol =
        crate::parsers::parse_odis_file(path).map_err(|e| PipelineError::ParseFailed {
            path: path.display().to_string(),
            source: e.into(),
        })?;
    let ecus = protocol.ecus(&EcuSelector::default());

    if !quiet {
        tracing::info!("Parsed {} ECUs from {}", ecus.len(), path.display());
    }

    Ok(ParsedSnapshot {
        path: path.to_path_buf(),
        protocol,
        ecus,
    })
}
