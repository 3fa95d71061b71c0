//! Term heuristics: namespaced identifier strings (`ex:person-1`,
//! `schema:name`) are classified and shortened for display.

use crate::types::NodeKind;
use std::collections::HashSet;

/// Namespaces that mark vocabulary terms rather than domain entities.
const VOCAB_NAMESPACES: [&str; 5] = ["schema", "skos", "dcterms", "rdf", "cito"];

/// Split a term on its first `:` into (namespace, local part).
///
/// A trailing colon does not count as a separator, matching the label rules.
fn split_term(term: &str) -> Option<(&str, &str)> {
    let idx = term.find(':')?;
    if idx + 1 >= term.len() {
        return None;
    }
    Some((&term[..idx], &term[idx + 1..]))
}

/// Classify a term into a node kind.
///
/// `ex:`-namespaced terms are inspected by the local part's prefix before the
/// first dash; known vocabulary namespaces become `vocab`; everything else is
/// a generic `entity`.
pub fn classify_term(term: &str) -> NodeKind {
    let s = term.trim();
    let Some((ns, local)) = split_term(s) else {
        return NodeKind::Entity;
    };
    let ns = ns.trim().to_ascii_lowercase();
    if ns == "ex" {
        let prefix = local.split('-').next().unwrap_or(local);
        return match prefix.trim().to_ascii_lowercase().as_str() {
            "person" => NodeKind::Person,
            "org" => NodeKind::Org,
            "concept" => NodeKind::Concept,
            "claim" => NodeKind::Claim,
            "event" => NodeKind::Event,
            "doc" => NodeKind::Doc,
            "thing" => NodeKind::Thing,
            _ => NodeKind::Entity,
        };
    }
    if VOCAB_NAMESPACES.contains(&ns.as_str()) {
        return NodeKind::Vocab;
    }
    NodeKind::Entity
}

/// Short label for edge predicates: the text after the first `:`, or the whole
/// term when there is no usable separator.
pub fn short_label(term: &str) -> String {
    let s = term.trim();
    match split_term(s) {
        Some((_, local)) => local.to_string(),
        None => s.to_string(),
    }
}

/// Human-readable node label.
///
/// `ex:`-namespaced terms with a dash drop everything up to and including the
/// first dash (`ex:person-ada-lovelace` -> `ada-lovelace`); other namespaced
/// terms keep the local part; bare terms are returned as-is.
pub fn display_label(term: &str) -> String {
    let s = term.trim();
    match split_term(s) {
        Some((ns, local)) => {
            if ns.trim().eq_ignore_ascii_case("ex") {
                if let Some(idx) = local.find('-') {
                    if idx + 1 < local.len() {
                        return local[idx + 1..].to_string();
                    }
                }
            }
            local.to_string()
        }
        None => s.to_string(),
    }
}

/// Default set of structural predicates (naming/typing plumbing a host may
/// want to hide from the visual graph).
pub fn default_structural_predicates() -> HashSet<String> {
    [
        "rdf:type",
        "schema:name",
        "skos:preflabel",
        "skos:altlabel",
        "dcterms:title",
        "dcterms:identifier",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// True when the trimmed, lowercased predicate is in the structural set.
pub fn is_structural_predicate(predicate: &str, structural: &HashSet<String>) -> bool {
    let p = predicate.trim().to_ascii_lowercase();
    !p.is_empty() && structural.contains(&p)
}
