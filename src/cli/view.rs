//! Text rendering of a document for `show` and `node show`.

use std::collections::HashSet;

use termtree::Tree;

use crate::domain::{group_of, groups_of, Document, Edge, Node, NodeId};

/// The document as a tree hanging off its root.
///
/// A node with several parents is printed below each of them. A node that is
/// already on the current path is printed once more, marked, and not expanded.
pub fn tree_view(document: &Document) -> Option<Tree<String>> {
    let root = document.root()?;
    let groups = groups_of(&document.nodes);
    let mut path = HashSet::new();
    Some(subtree(document, &groups, root, None, &mut path))
}

fn subtree<'a>(
    document: &'a Document,
    groups: &[(String, Vec<NodeId>)],
    node: &'a Node,
    edge: Option<&Edge>,
    path: &mut HashSet<&'a NodeId>,
) -> Tree<String> {
    let mut tree = Tree::new(node_label(node, edge, groups));
    if !path.insert(&node.id) {
        tree.root.push_str(" (cycle)");
        return tree;
    }
    for edge in document.outgoing_edges(&node.id) {
        match document.node(&edge.child) {
            Some(child) => tree.push(subtree(document, groups, child, Some(edge), path)),
            None => tree.push(Tree::new(format!("<missing {}>", edge.child))),
        };
    }
    path.remove(&node.id);
    tree
}

/// One line: name, incoming probability, AND-group and visible attributes.
pub fn node_label(node: &Node, edge: Option<&Edge>, groups: &[(String, Vec<NodeId>)]) -> String {
    let mut label = node.name.clone();
    if let Some(edge) = edge {
        let probability = if edge.probability.is_empty() {
            "N/A"
        } else {
            edge.probability.as_str()
        };
        label.push_str(&format!(" [p={probability}]"));
    }
    if let Some(group) = group_of(groups, &node.id) {
        label.push_str(&format!(" (AND: {group})"));
    }
    for (key, attr) in node.visible_attributes() {
        label.push_str(&format!(" {key}={}", attr.value));
    }
    label
}
