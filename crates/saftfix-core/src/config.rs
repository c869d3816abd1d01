//! Caller-supplied renumbering configuration.
//!
//! A run needs, per scope, a series label and an ATCUD prefix used to
//! synthesize replacement identifiers and auxiliary codes. The sales scope is
//! keyed by document-type code (`"FT"`, `"FS"`, ...); the working-documents
//! scope has a single configuration. At least one scope must be supplied.
//!
//! Configuration is read-only once validated; the engine never mutates it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SaftError;

/// Series label and ATCUD prefix for one renumbering scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Series label used in the synthesized identifier (`"<code> <series>/<n>"`).
    pub series: String,
    /// Prefix used in the synthesized auxiliary code (`"<prefix>-<n>"`).
    pub atcud_prefix: String,
}

impl SeriesConfig {
    /// Create a series configuration.
    pub fn new(series: impl Into<String>, atcud_prefix: impl Into<String>) -> Self {
        SeriesConfig {
            series: series.into(),
            atcud_prefix: atcud_prefix.into(),
        }
    }
}

/// Full configuration for one repair run.
///
/// `BTreeMap` keeps per-code iteration deterministic, which keeps log output
/// and serialized config stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixConfig {
    /// Per document-type-code configuration for the sales collection.
    #[serde(default)]
    pub sales: BTreeMap<String, SeriesConfig>,
    /// Single configuration for the working-documents collection.
    #[serde(default)]
    pub working: Option<SeriesConfig>,
    /// Initial counter value for every scope (default 1).
    #[serde(default = "default_start")]
    pub start: u64,
}

fn default_start() -> u64 {
    1
}

impl Default for FixConfig {
    fn default() -> Self {
        FixConfig {
            sales: BTreeMap::new(),
            working: None,
            start: default_start(),
        }
    }
}

impl FixConfig {
    /// Validate the configuration before any I/O happens.
    ///
    /// Rejects a run with no scope configured, blank document-type codes, and
    /// blank `series`/`atcud_prefix` fields in either scope.
    pub fn validate(&self) -> Result<(), SaftError> {
        if self.sales.is_empty() && self.working.is_none() {
            return Err(SaftError::configuration(
                "neither sales nor working-documents configuration supplied",
            ));
        }
        for (code, cfg) in &self.sales {
            if code.trim().is_empty() {
                return Err(SaftError::configuration(
                    "sales configuration has an empty document-type code",
                ));
            }
            validate_series(cfg, &format!("sales '{code}'"))?;
        }
        if let Some(cfg) = &self.working {
            validate_series(cfg, "working-documents")?;
        }
        Ok(())
    }
}

fn validate_series(cfg: &SeriesConfig, scope: &str) -> Result<(), SaftError> {
    if cfg.series.trim().is_empty() {
        return Err(SaftError::configuration(format!(
            "{scope} configuration has an empty series"
        )));
    }
    if cfg.atcud_prefix.trim().is_empty() {
        return Err(SaftError::configuration(format!(
            "{scope} configuration has an empty ATCUD prefix"
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
