//! Namespace-tolerant element lookup.
//!
//! Every lookup in the engine goes through these functions: try the declared
//! default namespace first, fall back to a no-namespace match. Absence is a
//! normal outcome, never an error. All functions are pure over the explicit
//! `NamespaceContext` value so both namespaced and non-namespaced fixtures
//! exercise the same code.

use xmltree::{Element, XMLNode};

use crate::document::NamespaceContext;

/// Find a direct child by local name, default namespace first.
pub fn child<'a>(
    parent: &'a Element,
    local_name: &str,
    ns: &NamespaceContext,
) -> Option<&'a Element> {
    if let Some(uri) = ns.default_uri() {
        if let Some(found) = match_child(parent, local_name, Some(uri)) {
            return Some(found);
        }
    }
    match_child(parent, local_name, None)
}

/// Mutable variant of [`child`].
pub fn child_mut<'a>(
    parent: &'a mut Element,
    local_name: &str,
    ns: &NamespaceContext,
) -> Option<&'a mut Element> {
    // Resolve which namespace matched before taking the mutable borrow.
    let uri = ns
        .default_uri()
        .filter(|uri| match_child(parent, local_name, Some(*uri)).is_some());
    match_child_mut(parent, local_name, uri)
}

/// Find the first descendant (document order, root included) by local name,
/// default namespace first.
pub fn descendant_mut<'a>(
    root: &'a mut Element,
    local_name: &str,
    ns: &NamespaceContext,
) -> Option<&'a mut Element> {
    let uri = ns
        .default_uri()
        .filter(|uri| has_descendant(root, local_name, Some(*uri)));
    find_descendant_mut(root, local_name, uri)
}

/// Trimmed text content of an element; `None` when absent or blank.
pub fn text_of(el: &Element) -> Option<String> {
    let text = el.get_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Replace the text content of an element, leaving non-text children alone.
pub fn set_text(el: &mut Element, text: impl Into<String>) {
    el.children.retain(|node| !matches!(node, XMLNode::Text(_)));
    el.children.push(XMLNode::Text(text.into()));
}

fn matches(el: &Element, local_name: &str, uri: Option<&str>) -> bool {
    el.name == local_name && el.namespace.as_deref() == uri
}

fn match_child<'a>(parent: &'a Element, local_name: &str, uri: Option<&str>) -> Option<&'a Element> {
    parent
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .find(|el| matches(el, local_name, uri))
}

fn match_child_mut<'a>(
    parent: &'a mut Element,
    local_name: &str,
    uri: Option<&str>,
) -> Option<&'a mut Element> {
    parent
        .children
        .iter_mut()
        .filter_map(XMLNode::as_mut_element)
        .find(|el| matches(el, local_name, uri))
}

fn has_descendant(el: &Element, local_name: &str, uri: Option<&str>) -> bool {
    if matches(el, local_name, uri) {
        return true;
    }
    el.children
        .iter()
        .filter_map(XMLNode::as_element)
        .any(|child| has_descendant(child, local_name, uri))
}

fn find_descendant_mut<'a>(
    el: &'a mut Element,
    local_name: &str,
    uri: Option<&str>,
) -> Option<&'a mut Element> {
    if matches(el, local_name, uri) {
        return Some(el);
    }
    for node in el.children.iter_mut() {
        if let XMLNode::Element(child) = node {
            if let Some(found) = find_descendant_mut(child, local_name, uri) {
                return Some(found);
            }
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
