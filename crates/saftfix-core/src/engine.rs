//! Duplicate detection and renumbering.
//!
//! Walks each configured collection in document order, classifies every
//! record's identifier as first-seen or duplicate, and rewrites duplicates
//! with a fresh `"<code> <series>/<counter>"` identifier (and a matching
//! `"<prefix>-<counter>"` ATCUD when the element exists). The first
//! occurrence of an identifier is canonical and is never touched.
//!
//! Seen-sets and counters are constructed fresh per invocation; nothing
//! leaks across runs or across collections.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;
use xmltree::Element;

use crate::config::{FixConfig, SeriesConfig};
use crate::document::{NamespaceContext, SaftDocument};
use crate::locate;
use crate::scan;

/// Document-type token used in a synthesized working-document identifier when
/// the original identifier has no whitespace-delimited token.
pub const WORK_DOC_FALLBACK_TYPE: &str = "WD";

// ============================================================================
// Change Log
// ============================================================================

/// Which collection a rewrite happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collection {
    Sales,
    Working,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Sales => write!(f, "Sales"),
            Collection::Working => write!(f, "Working"),
        }
    }
}

/// One rewrite performed by the engine, in the order it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Collection the record belongs to.
    pub collection: Collection,
    /// Document-type code (first token of the original identifier).
    pub doc_type: String,
    /// Identifier before the rewrite.
    pub original: String,
    /// Identifier after the rewrite.
    pub renumbered: String,
}

// ============================================================================
// Engine
// ============================================================================

/// Run the dedup/renumber pass over every configured collection.
///
/// Mutates `doc` in place and returns the ordered change log. The caller is
/// expected to have validated `config` already; an unconfigured scope is
/// simply skipped.
pub fn renumber(doc: &mut SaftDocument, config: &FixConfig) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();
    if !config.sales.is_empty() {
        let records = scan::records_mut(
            &mut doc.root,
            scan::SALES_COLLECTION,
            scan::SALES_RECORD,
            &doc.ns,
        );
        renumber_sales(records, &doc.ns, &config.sales, config.start, &mut changes);
    }
    if let Some(working) = &config.working {
        let records = scan::records_mut(
            &mut doc.root,
            scan::WORKING_COLLECTION,
            scan::WORKING_RECORD,
            &doc.ns,
        );
        renumber_working(records, &doc.ns, working, config.start, &mut changes);
    }
    changes
}

/// Sales pass: seen-sets and counters are scoped per document-type code, and
/// only codes present in the configuration participate.
fn renumber_sales(
    records: Vec<&mut Element>,
    ns: &NamespaceContext,
    sales: &std::collections::BTreeMap<String, SeriesConfig>,
    start: u64,
    changes: &mut Vec<ChangeRecord>,
) {
    let mut seen: HashMap<String, HashSet<String>> = HashMap::new();
    let mut counters: HashMap<String, u64> = HashMap::new();

    for record in records {
        let Some(original) = identifier_text(record, scan::SALES_IDENTIFIER, ns) else {
            continue;
        };
        // Non-empty after trimming, so the first token exists.
        let Some(code) = original.split_whitespace().next() else {
            continue;
        };
        let Some(cfg) = sales.get(code) else {
            // Out of scope for this run, not an error.
            continue;
        };
        let code = code.to_string();
        let seen_set = seen.entry(code.clone()).or_default();
        if !seen_set.contains(&original) {
            seen_set.insert(original);
            continue;
        }
        let counter = counters.entry(code.clone()).or_insert(start);
        let renumbered = format!("{} {}/{}", code, cfg.series, counter);
        rewrite(record, scan::SALES_IDENTIFIER, &renumbered, cfg, *counter, ns);
        info!(collection = %Collection::Sales, %original, %renumbered, "renumbered duplicate");
        *counter += 1;
        changes.push(ChangeRecord {
            collection: Collection::Sales,
            doc_type: code,
            original,
            renumbered,
        });
    }
}

/// Working-documents pass: one global seen-set and counter, no per-code gate.
fn renumber_working(
    records: Vec<&mut Element>,
    ns: &NamespaceContext,
    cfg: &SeriesConfig,
    start: u64,
    changes: &mut Vec<ChangeRecord>,
) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut counter = start;

    for record in records {
        let Some(original) = identifier_text(record, scan::WORKING_IDENTIFIER, ns) else {
            continue;
        };
        if !seen.contains(&original) {
            seen.insert(original);
            continue;
        }
        let doc_type = original
            .split_whitespace()
            .next()
            .unwrap_or(WORK_DOC_FALLBACK_TYPE)
            .to_string();
        let renumbered = format!("{} {}/{}", doc_type, cfg.series, counter);
        rewrite(record, scan::WORKING_IDENTIFIER, &renumbered, cfg, counter, ns);
        info!(collection = %Collection::Working, %original, %renumbered, "renumbered duplicate");
        counter += 1;
        changes.push(ChangeRecord {
            collection: Collection::Working,
            doc_type,
            original,
            renumbered,
        });
    }
}

/// Trimmed identifier text of a record, `None` when the element is absent or
/// blank (such records are skipped entirely).
fn identifier_text(record: &Element, identifier: &str, ns: &NamespaceContext) -> Option<String> {
    locate::child(record, identifier, ns).and_then(locate::text_of)
}

/// Overwrite the identifier, and the ATCUD when present (never created).
fn rewrite(
    record: &mut Element,
    identifier: &str,
    renumbered: &str,
    cfg: &SeriesConfig,
    counter: u64,
    ns: &NamespaceContext,
) {
    if let Some(el) = locate::child_mut(record, identifier, ns) {
        locate::set_text(el, renumbered);
    }
    if let Some(el) = locate::child_mut(record, scan::ATCUD, ns) {
        locate::set_text(el, format!("{}-{}", cfg.atcud_prefix, counter));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixConfig;
    use crate::document::SaftDocument;
    use std::path::Path;

    fn parse(xml: &str) -> SaftDocument {
        SaftDocument::from_bytes(xml.as_bytes(), Path::new("test")).unwrap()
    }

    fn sales_config(code: &str, series: &str, prefix: &str) -> FixConfig {
        let mut config = FixConfig::default();
        config
            .sales
            .insert(code.into(), SeriesConfig::new(series, prefix));
        config
    }

    fn invoice(no: &str, atcud: Option<&str>) -> String {
        match atcud {
            Some(a) => format!(
                "<Invoice><InvoiceNo>{no}</InvoiceNo><ATCUD>{a}</ATCUD></Invoice>"
            ),
            None => format!("<Invoice><InvoiceNo>{no}</InvoiceNo></Invoice>"),
        }
    }

    fn sales_doc(invoices: &[String]) -> SaftDocument {
        parse(&format!(
            "<AuditFile><SourceDocuments><SalesInvoices>{}</SalesInvoices></SourceDocuments></AuditFile>",
            invoices.join("")
        ))
    }

    fn invoice_numbers(doc: &SaftDocument) -> Vec<String> {
        let mut out = Vec::new();
        collect_texts(&doc.root, "InvoiceNo", &mut out);
        out
    }

    fn atcud_values(doc: &SaftDocument) -> Vec<String> {
        let mut out = Vec::new();
        collect_texts(&doc.root, "ATCUD", &mut out);
        out
    }

    fn collect_texts(el: &Element, name: &str, out: &mut Vec<String>) {
        if el.name == name {
            out.push(locate::text_of(el).unwrap_or_default());
        }
        for child in el.children.iter().filter_map(xmltree::XMLNode::as_element) {
            collect_texts(child, name, out);
        }
    }

    mod sales {
        use super::*;

        #[test]
        fn duplicate_invoice_gets_series_counter_and_atcud() {
            let mut doc = sales_doc(&[
                invoice("FT 1", Some("orig-1")),
                invoice("FT 1", Some("orig-2")),
                invoice("FT 2", Some("orig-3")),
            ]);
            let config = sales_config("FT", "A", "X");

            let changes = renumber(&mut doc, &config);

            assert_eq!(
                changes,
                vec![ChangeRecord {
                    collection: Collection::Sales,
                    doc_type: "FT".into(),
                    original: "FT 1".into(),
                    renumbered: "FT A/1".into(),
                }]
            );
            assert_eq!(invoice_numbers(&doc), vec!["FT 1", "FT A/1", "FT 2"]);
            assert_eq!(atcud_values(&doc), vec!["orig-1", "X-1", "orig-3"]);
        }

        #[test]
        fn duplicates_get_distinct_increasing_counters() {
            let mut doc = sales_doc(&[
                invoice("FT 1", None),
                invoice("FT 1", None),
                invoice("FT 1", None),
                invoice("FT 2", None),
                invoice("FT 2", None),
            ]);
            let config = sales_config("FT", "A", "X");

            let changes = renumber(&mut doc, &config);

            let new: Vec<_> = changes.iter().map(|c| c.renumbered.as_str()).collect();
            assert_eq!(new, vec!["FT A/1", "FT A/2", "FT A/3"]);
        }

        #[test]
        fn counter_starts_at_caller_value() {
            let mut doc = sales_doc(&[invoice("FT 1", None), invoice("FT 1", None)]);
            let mut config = sales_config("FT", "A", "X");
            config.start = 90;

            let changes = renumber(&mut doc, &config);
            assert_eq!(changes[0].renumbered, "FT A/90");
        }

        #[test]
        fn counters_are_independent_per_code() {
            let mut doc = sales_doc(&[
                invoice("FT 1", None),
                invoice("FT 1", None),
                invoice("FS 1", None),
                invoice("FS 1", None),
            ]);
            let mut config = sales_config("FT", "A", "X");
            config
                .sales
                .insert("FS".into(), SeriesConfig::new("B", "Y"));

            let changes = renumber(&mut doc, &config);

            let new: Vec<_> = changes.iter().map(|c| c.renumbered.as_str()).collect();
            assert_eq!(new, vec!["FT A/1", "FS B/1"]);
        }

        #[test]
        fn unconfigured_code_is_never_classified() {
            let mut doc = sales_doc(&[
                invoice("ND 1", None),
                invoice("ND 1", None),
                invoice("FT 1", None),
            ]);
            let config = sales_config("FT", "A", "X");

            let changes = renumber(&mut doc, &config);
            assert!(changes.is_empty());
            assert_eq!(invoice_numbers(&doc), vec!["ND 1", "ND 1", "FT 1"]);
        }

        #[test]
        fn missing_or_blank_identifier_is_skipped() {
            let mut doc = sales_doc(&[
                "<Invoice><Hash>abc</Hash></Invoice>".to_string(),
                invoice("  ", None),
                invoice("FT 1", None),
                invoice("FT 1", None),
            ]);
            let config = sales_config("FT", "A", "X");

            let changes = renumber(&mut doc, &config);
            assert_eq!(changes.len(), 1);
        }

        #[test]
        fn missing_atcud_is_not_created() {
            let mut doc = sales_doc(&[invoice("FT 1", None), invoice("FT 1", None)]);
            let config = sales_config("FT", "A", "X");

            renumber(&mut doc, &config);
            assert!(atcud_values(&doc).is_empty());
        }

        #[test]
        fn clean_document_yields_empty_change_log() {
            let mut doc = sales_doc(&[invoice("FT 1", None), invoice("FT 2", None)]);
            let config = sales_config("FT", "A", "X");

            assert!(renumber(&mut doc, &config).is_empty());
            assert_eq!(invoice_numbers(&doc), vec!["FT 1", "FT 2"]);
        }

        #[test]
        fn second_run_over_corrected_output_is_empty() {
            let mut doc = sales_doc(&[
                invoice("FT 1", None),
                invoice("FT 1", None),
                invoice("FT 1", None),
            ]);
            let config = sales_config("FT", "A", "X");

            assert_eq!(renumber(&mut doc, &config).len(), 2);
            assert!(renumber(&mut doc, &config).is_empty());
        }
    }

    mod working {
        use super::*;

        fn working_doc(numbers: &[&str]) -> SaftDocument {
            let docs: String = numbers
                .iter()
                .map(|n| {
                    format!("<WorkDocument><DocumentNumber>{n}</DocumentNumber></WorkDocument>")
                })
                .collect();
            parse(&format!(
                "<AuditFile><SourceDocuments><WorkingDocuments>{docs}</WorkingDocuments></SourceDocuments></AuditFile>"
            ))
        }

        fn working_config() -> FixConfig {
            FixConfig {
                working: Some(SeriesConfig::new("W", "WX")),
                ..FixConfig::default()
            }
        }

        #[test]
        fn global_seen_set_spans_all_codes() {
            let mut doc = working_doc(&["OR 1", "OR 1", "PF 2", "PF 2"]);

            let changes = renumber(&mut doc, &working_config());

            let new: Vec<_> = changes.iter().map(|c| c.renumbered.as_str()).collect();
            assert_eq!(new, vec!["OR W/1", "PF W/2"]);
            assert_eq!(changes[0].collection, Collection::Working);
        }

        #[test]
        fn doc_type_comes_from_original_identifier() {
            let mut doc = working_doc(&["OR 9", "OR 9"]);
            let changes = renumber(&mut doc, &working_config());
            assert_eq!(changes[0].doc_type, "OR");
        }

        #[test]
        fn tokenless_identifier_uses_fallback_type() {
            // A single-token identifier still has a first token; exercise it
            // as the nearest reachable case to the fallback constant.
            let mut doc = working_doc(&["OR9", "OR9"]);
            let changes = renumber(&mut doc, &working_config());
            assert_eq!(changes[0].renumbered, "OR9 W/1");
            assert_eq!(WORK_DOC_FALLBACK_TYPE, "WD");
        }

        #[test]
        fn absent_collection_is_a_no_op() {
            let mut doc = parse("<AuditFile><SourceDocuments/></AuditFile>");
            assert!(renumber(&mut doc, &working_config()).is_empty());
        }
    }

    mod change_record {
        use super::*;

        #[test]
        fn serializes_with_collection_name() {
            let record = ChangeRecord {
                collection: Collection::Sales,
                doc_type: "FT".into(),
                original: "FT 1".into(),
                renumbered: "FT A/1".into(),
            };
            let json = serde_json::to_string(&record).unwrap();
            assert!(json.contains("\"collection\":\"Sales\""));
            assert!(json.contains("\"renumbered\":\"FT A/1\""));
        }

        #[test]
        fn collection_display_matches_change_log_names() {
            assert_eq!(Collection::Sales.to_string(), "Sales");
            assert_eq!(Collection::Working.to_string(), "Working");
        }
    }
}
