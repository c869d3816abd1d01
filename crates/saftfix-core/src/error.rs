//! Error types and error code constants for saftfix.
//!
//! This module provides a unified error type (`SaftError`) covering every
//! failure a repair run can surface, plus a stable integer code table
//! (`OutputErrorCode`) that maps errors to CLI exit codes and JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Configuration errors (bad config, missing destination directory)
//! - `3`: Source file not found
//! - `4`: Source bytes are not well-formed XML
//! - `5`: Write failure (permissions, disk)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! Lookup misses inside a document (absent collection, absent identifier
//! element, unconfigured document-type code) are *not* errors; they are
//! ordinary control flow in the engine. Everything in this module is fatal:
//! no variant is retried or recovered internally.

use std::fmt;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for CLI exit status and JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid configuration (empty config, bad field, missing output directory).
    ConfigurationError = 2,
    /// Source file does not exist.
    SourceNotFound = 3,
    /// Source is not well-formed XML.
    ParseError = 4,
    /// Failed to write the corrected file.
    WriteError = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for a repair run.
///
/// Each variant carries enough context (path, underlying cause) to render a
/// useful message to an operator. The `#[source]` chains preserve the
/// underlying parser/IO diagnostics verbatim.
#[derive(Debug, Error)]
pub enum SaftError {
    /// Source path does not exist.
    #[error("source file not found: {path}")]
    SourceNotFound { path: String },

    /// Invalid configuration: neither scope configured, an empty field, or a
    /// missing destination directory.
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    /// Source bytes are not well-formed XML.
    #[error("malformed XML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: xmltree::ParseError,
    },

    /// Filesystem failure reading the source or writing the destination.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&SaftError> for OutputErrorCode {
    fn from(err: &SaftError) -> Self {
        match err {
            SaftError::SourceNotFound { .. } => OutputErrorCode::SourceNotFound,
            SaftError::Configuration { .. } => OutputErrorCode::ConfigurationError,
            SaftError::Parse { .. } => OutputErrorCode::ParseError,
            SaftError::Io { .. } => OutputErrorCode::WriteError,
            SaftError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<SaftError> for OutputErrorCode {
    fn from(err: SaftError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl SaftError {
    /// Create a source-not-found error from a path.
    pub fn source_not_found(path: &Path) -> Self {
        SaftError::SourceNotFound {
            path: path.display().to_string(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        SaftError::Configuration {
            message: message.into(),
        }
    }

    /// Create a parse error, preserving the parser diagnostic.
    pub fn parse(path: &Path, source: xmltree::ParseError) -> Self {
        SaftError::Parse {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create an I/O error bound to a path.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        SaftError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SaftError::Internal {
            message: message.into(),
        }
    }

    /// Get the stable error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn source_not_found_maps_to_3() {
            let err = SaftError::source_not_found(Path::new("missing.xml"));
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::SourceNotFound);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn configuration_maps_to_2() {
            let err = SaftError::configuration("no scope configured");
            assert_eq!(
                OutputErrorCode::from(&err),
                OutputErrorCode::ConfigurationError
            );
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn io_maps_to_5() {
            let err = SaftError::io(
                Path::new("out.xml"),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            );
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::WriteError);
            assert_eq!(err.error_code().code(), 5);
        }

        #[test]
        fn internal_maps_to_10() {
            let err = SaftError::internal("unexpected state");
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InternalError);
            assert_eq!(err.error_code().code(), 10);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn source_not_found_display() {
            let err = SaftError::source_not_found(Path::new("saft.xml"));
            assert_eq!(err.to_string(), "source file not found: saft.xml");
        }

        #[test]
        fn configuration_display() {
            let err = SaftError::configuration("sales series for 'FT' is empty");
            assert_eq!(
                err.to_string(),
                "invalid configuration: sales series for 'FT' is empty"
            );
        }
    }

    mod output_error_code {
        use super::*;

        #[test]
        fn code_values_are_stable() {
            assert_eq!(OutputErrorCode::ConfigurationError.code(), 2);
            assert_eq!(OutputErrorCode::SourceNotFound.code(), 3);
            assert_eq!(OutputErrorCode::ParseError.code(), 4);
            assert_eq!(OutputErrorCode::WriteError.code(), 5);
            assert_eq!(OutputErrorCode::InternalError.code(), 10);
        }

        #[test]
        fn display_shows_code() {
            assert_eq!(format!("{}", OutputErrorCode::ConfigurationError), "2");
            assert_eq!(format!("{}", OutputErrorCode::InternalError), "10");
        }
    }
}
