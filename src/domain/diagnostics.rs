//! Advisory checks run whenever a document is loaded or rendered.
//!
//! Nothing here fails: every finding becomes a [`Diagnostic`] for the caller
//! to show, and is logged as a warning.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use tracing::warn;

use crate::domain::entities::{Document, Edge, Node, NodeId};
use crate::domain::model::groups_of;
use crate::domain::probability;

/// A non-blocking finding about a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    SingletonAndGroup {
        group: String,
        node: NodeId,
    },
    UnbalancedProbability {
        parent: NodeId,
        parent_name: String,
        total: f64,
    },
    UnparsableProbability {
        parent: NodeId,
        child: NodeId,
        raw: String,
    },
    UnknownNodeReference {
        parent: NodeId,
        child: NodeId,
        missing: NodeId,
    },
    SelfLoop {
        node: NodeId,
    },
    DuplicateEdge {
        parent: NodeId,
        child: NodeId,
    },
    DuplicateName {
        name: String,
    },
    InvalidRootCount {
        roots: usize,
    },
    Unreachable {
        nodes: Vec<NodeId>,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SingletonAndGroup { group, .. } => {
                write!(f, "AND group '{group}' has only one node")
            }
            Diagnostic::UnbalancedProbability {
                parent_name, total, ..
            } => write!(
                f,
                "node '{parent_name}' has children with a total probability of {total}"
            ),
            Diagnostic::UnparsableProbability { parent, child, raw } => write!(
                f,
                "edge {parent} -> {child} has an unreadable probability '{raw}'"
            ),
            Diagnostic::UnknownNodeReference {
                parent,
                child,
                missing,
            } => write!(f, "edge {parent} -> {child} references unknown node {missing}"),
            Diagnostic::SelfLoop { node } => write!(f, "node {node} has an edge to itself"),
            Diagnostic::DuplicateEdge { parent, child } => {
                write!(f, "edge {parent} -> {child} is stored more than once")
            }
            Diagnostic::DuplicateName { name } => {
                write!(f, "node name '{name}' is used more than once")
            }
            Diagnostic::InvalidRootCount { roots } => {
                write!(f, "tree should have exactly one root, found {roots}")
            }
            Diagnostic::Unreachable { nodes } => {
                write!(f, "{} node(s) cannot be reached from the root", nodes.len())
            }
        }
    }
}

/// Warn about AND-groups with exactly one member.
pub fn warn_singleton_and_groups(nodes: &[Node]) -> Vec<Diagnostic> {
    groups_of(nodes)
        .into_iter()
        .filter(|(_, members)| members.len() == 1)
        .map(|(group, mut members)| Diagnostic::SingletonAndGroup {
            group,
            node: members.remove(0),
        })
        .collect()
}

/// Warn about parents whose children's probabilities do not add up to 1.
///
/// Totals are rounded to two decimals before the comparison.
pub fn warn_unbalanced_probabilities(nodes: &[Node], edges: &[Edge]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut totals: Vec<(&NodeId, f64)> = Vec::new();

    for edge in edges {
        let value = match probability::parse(&edge.probability) {
            Ok(v) => v,
            Err(_) => {
                diagnostics.push(Diagnostic::UnparsableProbability {
                    parent: edge.parent.clone(),
                    child: edge.child.clone(),
                    raw: edge.probability.clone(),
                });
                0.0
            }
        };
        match totals.iter_mut().find(|(p, _)| *p == &edge.parent) {
            Some((_, total)) => *total += value,
            None => totals.push((&edge.parent, value)),
        }
    }

    let names: HashMap<&NodeId, &str> = nodes.iter().map(|n| (&n.id, n.name.as_str())).collect();
    for (parent, total) in totals {
        let total = probability::round2(total);
        if (total - 1.0).abs() > probability::EPSILON {
            diagnostics.push(Diagnostic::UnbalancedProbability {
                parent: parent.clone(),
                parent_name: names.get(parent).copied().unwrap_or("unknown").to_string(),
                total,
            });
        }
    }
    diagnostics
}

/// Structural problems a hand-edited or imported document may carry.
pub fn structural_violations(document: &Document) -> Vec<Diagnostic> {
    let ids: HashSet<&NodeId> = document.nodes.iter().map(|n| &n.id).collect();
    let mut violations = Vec::new();

    let mut seen_names = HashSet::new();
    for node in &document.nodes {
        if !seen_names.insert(node.name.as_str()) {
            violations.push(Diagnostic::DuplicateName {
                name: node.name.clone(),
            });
        }
    }

    let mut indegree: HashMap<&NodeId, usize> = ids.iter().map(|id| (*id, 0)).collect();
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    let mut seen_edges = HashSet::new();
    for edge in &document.edges {
        let missing = [&edge.parent, &edge.child]
            .into_iter()
            .find(|id| !ids.contains(id));
        if let Some(missing) = missing {
            violations.push(Diagnostic::UnknownNodeReference {
                parent: edge.parent.clone(),
                child: edge.child.clone(),
                missing: missing.clone(),
            });
            continue;
        }
        if edge.parent == edge.child {
            violations.push(Diagnostic::SelfLoop {
                node: edge.parent.clone(),
            });
        }
        if !seen_edges.insert((&edge.parent, &edge.child)) {
            violations.push(Diagnostic::DuplicateEdge {
                parent: edge.parent.clone(),
                child: edge.child.clone(),
            });
        }
        *indegree.entry(&edge.child).or_default() += 1;
        adjacency.entry(&edge.parent).or_default().push(&edge.child);
    }

    let roots: Vec<&NodeId> = document
        .nodes
        .iter()
        .map(|n| &n.id)
        .filter(|id| indegree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    if roots.len() != 1 {
        violations.push(Diagnostic::InvalidRootCount { roots: roots.len() });
    }

    if let Some(root) = roots.first() {
        let mut reachable = HashSet::from([*root]);
        let mut queue = VecDeque::from([*root]);
        while let Some(current) = queue.pop_front() {
            for child in adjacency.get(current).into_iter().flatten() {
                if reachable.insert(*child) {
                    queue.push_back(*child);
                }
            }
        }
        let unreachable: Vec<NodeId> = document
            .nodes
            .iter()
            .filter(|n| !reachable.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        if !unreachable.is_empty() && roots.len() == 1 {
            violations.push(Diagnostic::Unreachable { nodes: unreachable });
        }
    }

    violations
}

/// All advisory checks for a loaded document, logged as warnings.
pub fn check_document(document: &Document) -> Vec<Diagnostic> {
    let mut diagnostics = structural_violations(document);
    diagnostics.extend(warn_singleton_and_groups(&document.nodes));
    diagnostics.extend(warn_unbalanced_probabilities(
        &document.nodes,
        &document.edges,
    ));
    for diagnostic in &diagnostics {
        warn!("{}", diagnostic);
    }
    diagnostics
}
