//! Rendering of run results for operators and for JSON consumers.
//!
//! JSON output follows a stable envelope: `status` first, then a schema
//! version, so downstream tooling can parse responses without sniffing.

use std::io::{self, Write};

use saftfix_core::{ChangeRecord, SaftError};
use serde::Serialize;

/// Current schema version for all JSON responses.
pub const SCHEMA_VERSION: &str = "1";

/// Successful run: the ordered change log.
#[derive(Debug, Serialize)]
pub struct FixResponse {
    pub status: String,
    pub schema_version: String,
    pub changes: Vec<ChangeRecord>,
}

impl FixResponse {
    pub fn new(changes: Vec<ChangeRecord>) -> Self {
        FixResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            changes,
        }
    }
}

/// Failed run: stable code plus the rendered error chain.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub code: u8,
    pub error: String,
}

impl ErrorResponse {
    pub fn from_error(err: &SaftError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            code: err.error_code().code(),
            error: err.to_string(),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Render the change log as a human-readable summary.
pub fn render_text(changes: &[ChangeRecord]) -> String {
    if changes.is_empty() {
        return "No duplicate document numbers found.\n".to_string();
    }
    let mut out = String::new();
    for change in changes {
        out.push_str(&format!(
            "{:<8} {:<4} {} -> {}\n",
            change.collection.to_string(),
            change.doc_type,
            change.original,
            change.renumbered
        ));
    }
    out.push_str(&format!("{} document(s) renumbered.\n", changes.len()));
    out
}

// ============================================================================
// Tests
// ============================================================================
