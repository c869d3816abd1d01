//! Core engine for saftfix.
//!
//! This crate repairs duplicate document-identifier fields inside a SAFT
//! tax-audit XML export:
//! - Document loading, namespace discovery, and write-back
//! - Namespace-tolerant element lookup
//! - Collection scanning (sales invoices, working documents)
//! - Duplicate detection and renumbering with an ordered change log
//! - Error types and stable error codes
//!
//! The pipeline is sequential and synchronous: load, scan, mutate, serialize.
//! A run either completes or fails atomically; the destination file is only
//! written after the whole tree has been mutated.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod locate;
pub mod scan;

use std::path::Path;

use tracing::info;

pub use crate::config::{FixConfig, SeriesConfig};
pub use crate::engine::{ChangeRecord, Collection};
pub use crate::error::{OutputErrorCode, SaftError};

/// Repair duplicate document numbers in one SAFT file.
///
/// Validates the configuration and the destination directory before any file
/// is read, loads the source, renumbers duplicates in every configured
/// collection, and writes the corrected document to `output`. Returns the
/// ordered change log of every rewrite performed.
///
/// # Errors
///
/// - [`SaftError::Configuration`] — no scope configured, a blank config
///   field, or a missing destination directory
/// - [`SaftError::SourceNotFound`] — `input` does not exist
/// - [`SaftError::Parse`] — `input` is not well-formed XML
/// - [`SaftError::Io`] — read or write failure
pub fn fix_file(
    input: &Path,
    output: &Path,
    config: &FixConfig,
) -> Result<Vec<ChangeRecord>, SaftError> {
    config.validate()?;
    document::ensure_destination(output)?;

    let mut doc = document::SaftDocument::load(input)?;
    let changes = engine::renumber(&mut doc, config);
    doc.save(output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        rewrites = changes.len(),
        "repair run complete"
    );
    Ok(changes)
}
