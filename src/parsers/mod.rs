//! Loaders for ODIS snapshots and stored comparison results.
//!
//! ## Usage
//!
//! ```no_run
//! use odis_compare::model::EcuSelector;
//! use odis_compare::parsers::parse_odis_file;
//! use std::path::Path;
//!
//! let protocol = parse_odis_file(Path::new("backup.xml")).unwrap();
//! println!("VIN: {:?}", protocol.vin());
//! let ecus = protocol.ecus(&EcuSelector::default());
//! println!("{} ECUs", ecus.len());
//! ```

mod odis_xml;

pub use odis_xml::OdisXmlParser;

use crate::diff::ComparisonResults;
use crate::error::{OdisCompareError, ParseErrorKind};
use crate::model::OdisProtocol;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading input files
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("XML parse error: {0}")]
    XmlError(String),

    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("Invalid ODIS structure: {0}")]
    InvalidStructure(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<ParseError> for OdisCompareError {
    fn from(err: ParseError) -> Self {
        let kind = match err {
            ParseError::IoError(message) => {
                return Self::Io {
                    path: None,
                    message: message.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, message),
                }
            }
            ParseError::XmlError(message) => ParseErrorKind::InvalidXml(message),
            ParseError::JsonError(message) => ParseErrorKind::InvalidJson(message),
            ParseError::InvalidStructure(_) => ParseErrorKind::NotOdisDocument,
            ParseError::MissingField(field) => ParseErrorKind::MissingField {
                field,
                context: "ODIS document".to_string(),
            },
        };
        Self::parse("loading input", kind)
    }
}

/// Maximum input file size (512 MB).
const MAX_INPUT_FILE_SIZE: u64 = 512 * 1024 * 1024;

fn read_input(path: &Path) -> Result<String, ParseError> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(ParseError::IoError(format!(
            "{} is {} MB, exceeding the {} MB limit",
            path.display(),
            metadata.len() / (1024 * 1024),
            MAX_INPUT_FILE_SIZE / (1024 * 1024),
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse an ODIS protocol XML file.
pub fn parse_odis_file(path: &Path) -> Result<OdisProtocol, ParseError> {
    let content = read_input(path)?;
    parse_odis_str(&content)
}

/// Parse an ODIS protocol from XML text.
pub fn parse_odis_str(content: &str) -> Result<OdisProtocol, ParseError> {
    OdisXmlParser::new().parse_str(content)
}

/// Load a comparison result previously written by the JSON reporter.
pub fn parse_results_file(path: &Path) -> Result<ComparisonResults, ParseError> {
    let content = read_input(path)?;
    parse_results_str(&content)
}

/// Parse a comparison result from JSON text.
pub fn parse_results_str(content: &str) -> Result<ComparisonResults, ParseError> {
    Ok(serde_json::from_str(content)?)
}
