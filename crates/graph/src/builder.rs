use crate::term::{classify_term, display_label, is_structural_predicate, short_label};
use crate::types::{Assertion, KgEdge, KgGraph, KgNode, XY};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Options for [`build_graph`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Collapse all assertions sharing (subject, object) into one edge.
    pub group_edges: bool,
    /// Maximum predicates shown in an edge label before the `+K` suffix.
    pub max_edge_label_predicates: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            group_edges: true,
            max_edge_label_predicates: 3,
        }
    }
}

/// Permissively convert raw JSON values into assertions.
///
/// Entries whose subject/predicate/object are not strings are discarded
/// silently; optional fields are kept only when they have the expected shape.
pub fn assertions_from_values(values: &[Value]) -> Vec<Assertion> {
    values.iter().filter_map(assertion_from_value).collect()
}

fn assertion_from_value(value: &Value) -> Option<Assertion> {
    let obj = value.as_object()?;
    let subject = obj.get("subject")?.as_str()?;
    let predicate = obj.get("predicate")?.as_str()?;
    let object = obj.get("object")?.as_str()?;

    let opt_str = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite());
    let opt_map = |key: &str| obj.get(key).filter(|v| v.is_object()).cloned();

    Some(Assertion {
        subject: subject.to_string(),
        predicate: predicate.to_string(),
        object: object.to_string(),
        scope: opt_str("scope"),
        owner_id: opt_str("owner_id"),
        observed_at: opt_str("observed_at"),
        confidence,
        provenance: opt_map("provenance"),
        attributes: opt_map("attributes"),
    })
}

/// Build a knowledge graph from a flat assertion list.
///
/// The node set is exactly the distinct non-empty trimmed subject/object
/// terms, inserted in lexicographic order. Edges follow first-encounter group
/// order (or raw assertion order when ungrouped); edges with an empty source
/// or target are dropped. The output is deterministic for a given input and
/// options.
pub fn build_graph(assertions: &[Assertion], options: &BuildOptions) -> KgGraph {
    let max_preds = options.max_edge_label_predicates.max(1);

    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for a in assertions {
        let s = a.subject.trim();
        let o = a.object.trim();
        if !s.is_empty() {
            ids.insert(s);
        }
        if !o.is_empty() {
            ids.insert(o);
        }
    }

    let mut graph = KgGraph::new();
    for id in ids {
        graph.add_node(KgNode {
            id: id.to_string(),
            label: display_label(id),
            kind: classify_term(id),
            position: XY::default(),
        });
    }

    // First-encounter group order matters: the path finder's tie-break is
    // edge insertion order.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Assertion>> = HashMap::new();
    for (i, a) in assertions.iter().enumerate() {
        let s = a.subject.trim();
        let p = a.predicate.trim();
        let o = a.object.trim();
        let key = if options.group_edges {
            format!("edge:{s}:{o}")
        } else {
            format!("edge:{i}:{s}:{p}:{o}")
        };
        match groups.get_mut(&key) {
            Some(group) => group.push(a.clone()),
            None => {
                groups.insert(key.clone(), vec![a.clone()]);
                order.push(key);
            }
        }
    }

    for key in order {
        let group = &groups[&key];
        let source = group[0].subject.trim().to_string();
        let target = group[0].object.trim().to_string();
        if source.is_empty() || target.is_empty() {
            continue;
        }
        let summary = predicate_summary(group, max_preds);
        graph.add_edge(KgEdge {
            id: key,
            source,
            target,
            assertions: group.clone(),
            predicate_summary: summary,
        });
    }

    log::info!(
        "built knowledge graph: {} nodes, {} edges from {} assertions",
        graph.node_count(),
        graph.edge_count(),
        assertions.len()
    );

    graph
}

/// Summarize the predicates of an assertion group as a short label.
///
/// Top `max_predicates` by descending count (ties alphabetical), rendered as
/// `label×count` when repeated, joined with ` | `, with a ` +K` suffix when
/// more predicates were truncated.
pub fn predicate_summary(assertions: &[Assertion], max_predicates: usize) -> String {
    let max = max_predicates.max(1);
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for a in assertions {
        let p = a.predicate.trim();
        if p.is_empty() {
            continue;
        }
        *counts.entry(p).or_insert(0) += 1;
    }

    let mut preds: Vec<(&str, usize)> = counts.into_iter().collect();
    preds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let label = preds
        .iter()
        .take(max)
        .map(|(p, c)| {
            let term = short_label(p);
            if *c > 1 {
                format!("{term}×{c}")
            } else {
                term
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");

    let mut out = label;
    if preds.len() > max {
        out.push_str(&format!(" +{}", preds.len() - max));
    }
    out.trim().to_string()
}

/// Drop assertions whose predicate is in the structural set.
pub fn filter_structural(assertions: &[Assertion], structural: &HashSet<String>) -> Vec<Assertion> {
    assertions
        .iter()
        .filter(|a| !is_structural_predicate(&a.predicate, structural))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::default_structural_predicates;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn a(s: &str, p: &str, o: &str) -> Assertion {
        Assertion::new(s, p, o)
    }

    #[test]
    fn node_set_matches_subjects_and_objects() {
        let assertions = vec![
            a("ex:person-1", "ex:knows", "ex:person-2"),
            a("ex:person-2", "ex:works-at", "ex:org-acme"),
        ];
        let graph = build_graph(&assertions, &BuildOptions::default());
        let ids: Vec<&str> = graph.node_ids().collect();
        assert_eq!(ids, vec!["ex:org-acme", "ex:person-1", "ex:person-2"]);
    }

    #[test]
    fn grouped_edges_collapse_by_subject_object() {
        let assertions = vec![
            a("A", "p1", "B"),
            a("A", "p2", "B"),
            a("A", "p3", "B"),
        ];
        let graph = build_graph(
            &assertions,
            &BuildOptions {
                group_edges: true,
                max_edge_label_predicates: 2,
            },
        );
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.id, "edge:A:B");
        assert_eq!(edge.assertions.len(), 3);
        assert_eq!(edge.predicate_summary, "p1 | p2 +1");
    }

    #[test]
    fn repeated_predicates_sort_first_and_show_counts() {
        let assertions = vec![
            a("A", "ex:cites", "B"),
            a("A", "ex:cites", "B"),
            a("A", "ex:about", "B"),
        ];
        let graph = build_graph(&assertions, &BuildOptions::default());
        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.predicate_summary, "cites×2 | about");
    }

    #[test]
    fn ungrouped_edges_keep_every_assertion() {
        let assertions = vec![a("A", "p1", "B"), a("A", "p2", "B")];
        let graph = build_graph(
            &assertions,
            &BuildOptions {
                group_edges: false,
                max_edge_label_predicates: 3,
            },
        );
        let ids: Vec<&str> = graph.edges().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edge:0:A:p1:B", "edge:1:A:p2:B"]);
    }

    #[test]
    fn empty_source_or_target_edges_are_dropped() {
        let assertions = vec![a("  ", "p", "B"), a("A", "p", "")];
        let graph = build_graph(&assertions, &BuildOptions::default());
        assert_eq!(graph.edge_count(), 0);
        // The non-empty endpoints still become nodes.
        let ids: Vec<&str> = graph.node_ids().collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn build_is_deterministic() {
        let assertions = vec![
            a("ex:person-2", "ex:knows", "ex:person-1"),
            a("ex:person-1", "ex:knows", "ex:person-2"),
            a("ex:person-1", "rdf:type", "schema:Person"),
        ];
        let opts = BuildOptions::default();
        let g1 = build_graph(&assertions, &opts);
        let g2 = build_graph(&assertions, &opts);
        assert_eq!(
            g1.node_ids().collect::<Vec<_>>(),
            g2.node_ids().collect::<Vec<_>>()
        );
        assert_eq!(
            g1.edges().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            g2.edges().map(|e| e.id.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(
            g1.edges().map(|e| e.predicate_summary.as_str()).collect::<Vec<_>>(),
            g2.edges().map(|e| e.predicate_summary.as_str()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn raw_values_with_non_string_triples_are_discarded() {
        let values = vec![
            json!({"subject": "A", "predicate": "p", "object": "B"}),
            json!({"subject": 7, "predicate": "p", "object": "B"}),
            json!({"subject": "A", "predicate": null, "object": "B"}),
            json!("not an object"),
            json!({"subject": "C", "predicate": "p", "object": "D", "confidence": 0.9}),
        ];
        let assertions = assertions_from_values(&values);
        assert_eq!(assertions.len(), 2);
        assert_eq!(assertions[1].confidence, Some(0.9));
    }

    #[test]
    fn structural_filter_removes_naming_plumbing() {
        let structural = default_structural_predicates();
        let assertions = vec![
            a("A", "rdf:type", "schema:Person"),
            a("A", "ex:knows", "B"),
            a("A", "schema:name", "Ada"),
        ];
        let kept = filter_structural(&assertions, &structural);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].predicate, "ex:knows");
    }
}
