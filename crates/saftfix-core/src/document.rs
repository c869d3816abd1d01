//! Document loading, namespace discovery, and write-back.
//!
//! The whole run works on one exclusively-owned mutable `xmltree::Element`
//! tree. Loading validates the source path before parsing; writing happens
//! once, after the full tree has been mutated, so a failed run never leaves a
//! partial destination file behind.

use std::fs;
use std::path::Path;

use tracing::debug;
use xmltree::{Element, EmitterConfig};

use crate::error::SaftError;

// ============================================================================
// Namespace Context
// ============================================================================

/// The default namespace binding discovered on the document root.
///
/// Real-world SAFT exports inconsistently declare a default namespace
/// depending on the producing software. The context captures the declared
/// default URI (if any) once, and every element lookup tries that namespace
/// first before falling back to an unqualified match. Read-only after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceContext {
    default_uri: Option<String>,
}

impl NamespaceContext {
    /// Derive the context from the root element's declared bindings.
    ///
    /// The explicit unprefixed (`xmlns="..."`) binding wins; if the root
    /// carries no usable declaration, the namespace the root itself resolved
    /// to is used. Both absent means unqualified matching everywhere.
    pub fn from_root(root: &Element) -> Self {
        let default_uri = root
            .namespaces
            .as_ref()
            .and_then(|ns| ns.get(""))
            .filter(|uri| !uri.is_empty())
            .map(str::to_owned)
            .or_else(|| root.namespace.clone());
        NamespaceContext { default_uri }
    }

    /// Context with no namespace bindings (unqualified matching only).
    pub fn empty() -> Self {
        NamespaceContext { default_uri: None }
    }

    /// The default namespace URI, if the document declares one.
    pub fn default_uri(&self) -> Option<&str> {
        self.default_uri.as_deref()
    }
}

// ============================================================================
// Document
// ============================================================================

/// A loaded SAFT document: the mutable element tree plus its namespace
/// context.
#[derive(Debug)]
pub struct SaftDocument {
    /// Root element of the document tree. Mutated in place by the engine.
    pub root: Element,
    /// Namespace context derived once at load time.
    pub ns: NamespaceContext,
}

impl SaftDocument {
    /// Load a document from `path`.
    ///
    /// Surfaces `SourceNotFound` before any parse is attempted, `Io` if the
    /// file cannot be read, and `Parse` (with the parser diagnostic) if the
    /// bytes are not well-formed XML.
    pub fn load(path: &Path) -> Result<Self, SaftError> {
        if !path.exists() {
            return Err(SaftError::source_not_found(path));
        }
        let bytes = fs::read(path).map_err(|e| SaftError::io(path, e))?;
        let root = Element::parse(bytes.as_slice()).map_err(|e| SaftError::parse(path, e))?;
        let ns = NamespaceContext::from_root(&root);
        debug!(
            path = %path.display(),
            default_ns = ns.default_uri().unwrap_or("<none>"),
            "loaded SAFT document"
        );
        Ok(SaftDocument { root, ns })
    }

    /// Parse a document from in-memory bytes.
    ///
    /// `origin` labels the byte source in any parse diagnostic.
    pub fn from_bytes(bytes: &[u8], origin: &Path) -> Result<Self, SaftError> {
        let root = Element::parse(bytes).map_err(|e| SaftError::parse(origin, e))?;
        let ns = NamespaceContext::from_root(&root);
        Ok(SaftDocument { root, ns })
    }

    /// Serialize the tree with an XML declaration and indented formatting.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaftError> {
        let config = EmitterConfig::new().perform_indent(true);
        let mut out = Vec::new();
        self.root
            .write_with_config(&mut out, config)
            .map_err(|e| SaftError::internal(format!("XML serialization failed: {e}")))?;
        Ok(out)
    }

    /// Write the serialized tree to `path` in one shot.
    pub fn save(&self, path: &Path) -> Result<(), SaftError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|e| SaftError::io(path, e))?;
        debug!(path = %path.display(), "wrote corrected SAFT document");
        Ok(())
    }
}

/// Check that the destination's parent directory exists.
///
/// Validated up front so a bad destination fails the run before any parse or
/// mutation work is spent.
pub fn ensure_destination(path: &Path) -> Result<(), SaftError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        // Bare file name resolves against the current directory.
        _ => return Ok(()),
    };
    if !parent.is_dir() {
        return Err(SaftError::configuration(format!(
            "output directory does not exist: {}",
            parent.display()
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
