//! Locating the renumberable collections inside the document.
//!
//! SAFT element names are fixed by the format: invoices live under
//! `SalesInvoices/Invoice` keyed by `InvoiceNo`, drafts under
//! `WorkingDocuments/WorkDocument` keyed by `DocumentNumber`, both with an
//! optional `ATCUD` child. Either collection may be absent; that is a valid
//! document, not an error.

use tracing::debug;
use xmltree::{Element, XMLNode};

use crate::document::NamespaceContext;
use crate::locate;

/// Container element for the sales collection.
pub const SALES_COLLECTION: &str = "SalesInvoices";
/// Record element within the sales collection.
pub const SALES_RECORD: &str = "Invoice";
/// Identifier child of a sales record.
pub const SALES_IDENTIFIER: &str = "InvoiceNo";

/// Container element for the working-documents collection.
pub const WORKING_COLLECTION: &str = "WorkingDocuments";
/// Record element within the working-documents collection.
pub const WORKING_RECORD: &str = "WorkDocument";
/// Identifier child of a working-document record.
pub const WORKING_IDENTIFIER: &str = "DocumentNumber";

/// Auxiliary-code child shared by both record shapes.
pub const ATCUD: &str = "ATCUD";

/// Collect the records of one collection, in document order.
///
/// Finds the collection element anywhere beneath `root` (namespace-qualified
/// first, unqualified fallback), then its record children with the same
/// two-phase rule. An absent or empty collection yields an empty vector.
pub fn records_mut<'a>(
    root: &'a mut Element,
    collection: &str,
    record: &str,
    ns: &NamespaceContext,
) -> Vec<&'a mut Element> {
    let Some(container) = locate::descendant_mut(root, collection, ns) else {
        debug!(collection, "collection absent, nothing to renumber");
        return Vec::new();
    };
    let uri = ns.default_uri().filter(|uri| {
        container
            .children
            .iter()
            .filter_map(XMLNode::as_element)
            .any(|el| el.name == record && el.namespace.as_deref() == Some(*uri))
    });
    let records: Vec<&'a mut Element> = container
        .children
        .iter_mut()
        .filter_map(XMLNode::as_mut_element)
        .filter(|el| el.name == record && el.namespace.as_deref() == uri)
        .collect();
    debug!(collection, count = records.len(), "scanned collection");
    records
}

// ============================================================================
// Tests
// ============================================================================
