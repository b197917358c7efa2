//! Unified error types for odis-compare.
//!
//! This module provides the error hierarchy for the library, with rich
//! context for debugging and user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for odis-compare operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OdisCompareError {
    /// Errors while loading an ODIS snapshot or a stored result
    #[error("Failed to parse input: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors during snapshot comparison
    #[error("Comparison failed: {context}")]
    Compare {
        context: String,
        #[source]
        source: CompareErrorKind,
    },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Not an ODIS protocol document - expected a <protocol> root")]
    NotOdisDocument,

    #[error("Invalid XML structure: {0}")]
    InvalidXml(String),

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },
}

/// Identity violations detected while pairing nodes.
///
/// These are fatal: two nodes were paired upstream although their
/// identities differ, so the whole comparison is aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompareErrorKind {
    #[error("ECU_ID: {first} is different from {second}!")]
    EcuIdMismatch { first: String, second: String },

    #[error("TI_NAME: {first} is different from {second}!")]
    TiNameMismatch { first: String, second: String },
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("JSON serialization failed: {0}")]
    JsonSerializationError(String),

    #[error("Output format not supported for this operation: {0}")]
    UnsupportedFormat(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for odis-compare operations
pub type Result<T> = std::result::Result<T, OdisCompareError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl OdisCompareError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a comparison error with context
    pub fn compare(context: impl Into<String>, source: CompareErrorKind) -> Self {
        Self::Compare {
            context: context.into(),
            source,
        }
    }

    /// Two ECUs with different ids were paired for comparison
    pub fn ecu_id_mismatch(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::compare(
            "pairing ECUs",
            CompareErrorKind::EcuIdMismatch {
                first: first.into(),
                second: second.into(),
            },
        )
    }

    /// Two records with different `ti_name` were paired for comparison
    pub fn ti_name_mismatch(first: Option<&str>, second: Option<&str>) -> Self {
        Self::compare(
            "pairing records",
            CompareErrorKind::TiNameMismatch {
                first: first.unwrap_or_default().to_string(),
                second: second.unwrap_or_default().to_string(),
            },
        )
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Whether this error is an identity mismatch raised by the engine.
    #[must_use]
    pub const fn is_identity_mismatch(&self) -> bool {
        matches!(self, Self::Compare { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for OdisCompareError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for OdisCompareError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// This trait provides methods to add context information to errors,
/// creating a chain of context that helps trace the source of problems.
///
/// # Example
///
/// ```ignore
/// use odis_compare::error::ErrorContext;
///
/// fn load_snapshot(path: &Path) -> Result<OdisProtocol> {
///     let content = std::fs::read_to_string(path)
///         .context("reading ODIS file")?;
///
///     parse_snapshot(&content)
///         .with_context(|| format!("parsing ODIS data from {}", path.display()))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    ///
    /// The context string is prepended to the error's existing context,
    /// creating a chain that shows the path through the code.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<OdisCompareError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: OdisCompareError, new_ctx: &str) -> OdisCompareError {
    match err {
        OdisCompareError::Parse {
            context: existing,
            source,
        } => OdisCompareError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OdisCompareError::Compare {
            context: existing,
            source,
        } => OdisCompareError::Compare {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OdisCompareError::Report {
            context: existing,
            source,
        } => OdisCompareError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OdisCompareError::Io {
            path,
            message,
            source,
        } => OdisCompareError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        OdisCompareError::Config(msg) => OdisCompareError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mismatch_messages() {
        let err = OdisCompareError::ecu_id_mismatch("0019", "0017");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("ECU_ID: 0019 is different from 0017!")
        );
        assert!(err.is_identity_mismatch());

        let err = OdisCompareError::ti_name_mismatch(Some("ENG001"), None);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("TI_NAME: ENG001 is different from !")
        );
    }

    #[test]
    fn test_error_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = OdisCompareError::from(io_err);

        assert!(err.to_string().contains("file not found"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_identity_mismatch());
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(OdisCompareError::parse(
                "base",
                ParseErrorKind::NotOdisDocument,
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(OdisCompareError::Parse { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_compare_context_is_preserved() {
        let result: Result<()> = Err(OdisCompareError::ecu_id_mismatch("01", "02"));
        match result.context("ECU 01") {
            Err(OdisCompareError::Compare { context, source }) => {
                assert_eq!(context, "ECU 01: pairing ECUs");
                assert!(matches!(source, CompareErrorKind::EcuIdMismatch { .. }));
            }
            other => panic!("Expected Compare error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(OdisCompareError::Config("error".into()));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_config_context_is_chained() {
        let result: Result<()> = Err(OdisCompareError::Config("output.split: requires a file".into()));
        match result.context("loading odis-compare.yaml") {
            Err(err @ OdisCompareError::Config(_)) => assert_eq!(
                err.to_string(),
                "Invalid configuration: loading odis-compare.yaml: output.split: requires a file"
            ),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
