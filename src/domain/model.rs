//! Graph model queries and invariant checks over a [`Document`].
//!
//! Nodes and edges are kept as flat lists; a tree is small (tens of nodes),
//! so every query is a linear scan.

use std::collections::HashSet;

use crate::domain::entities::{Document, Edge, Node, NodeId};
use crate::domain::error::{DomainError, DomainResult, ValidationError};
use crate::domain::probability;

/// Map AND-group labels to their member node ids.
///
/// Groups appear in order of their first member; nodes without a group, or
/// with a blank label, are excluded.
pub fn groups_of(nodes: &[Node]) -> Vec<(String, Vec<NodeId>)> {
    let mut groups: Vec<(String, Vec<NodeId>)> = Vec::new();
    for node in nodes {
        let Some(group) = node.group.as_ref().filter(|g| !g.trim().is_empty()) else {
            continue;
        };
        match groups.iter_mut().find(|(label, _)| label == group) {
            Some((_, members)) => members.push(node.id.clone()),
            None => groups.push((group.clone(), vec![node.id.clone()])),
        }
    }
    groups
}

/// Group label of `id`, if it is a member of an AND-group.
pub fn group_of<'a>(groups: &'a [(String, Vec<NodeId>)], id: &NodeId) -> Option<&'a str> {
    groups
        .iter()
        .find(|(_, members)| members.contains(id))
        .map(|(label, _)| label.as_str())
}

impl Document {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Look up a node by id, falling back to its name.
    pub fn resolve(&self, reference: &str) -> Option<&Node> {
        self.node(&NodeId::from(reference))
            .or_else(|| self.node_by_name(reference))
    }

    /// Resolve an id or name to the node's id.
    pub fn resolve_id(&self, reference: &str) -> DomainResult<NodeId> {
        self.resolve(reference)
            .map(|n| n.id.clone())
            .ok_or_else(|| DomainError::NodeNotFound(NodeId::from(reference)))
    }

    pub(crate) fn require_node(&self, id: &NodeId) -> DomainResult<&Node> {
        self.node(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.node_by_name(name).is_some()
    }

    /// First node without an incoming edge.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| self.parent_edge(&n.id).is_none())
    }

    pub fn is_root(&self, id: &NodeId) -> bool {
        self.parent_edge(id).is_none()
    }

    /// The first edge whose child is `child`.
    pub fn parent_edge(&self, child: &NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.child == child)
    }

    pub fn incoming_edges<'a>(&'a self, child: &'a NodeId) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| &e.child == child)
    }

    pub fn outgoing_edges<'a>(&'a self, parent: &'a NodeId) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| &e.parent == parent)
    }

    pub fn children<'a>(&'a self, parent: &'a NodeId) -> impl Iterator<Item = &'a NodeId> {
        self.outgoing_edges(parent).map(|e| &e.child)
    }

    pub fn edge(&self, parent: &NodeId, child: &NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.connects(parent, child))
    }

    pub(crate) fn edge_mut(&mut self, parent: &NodeId, child: &NodeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.connects(parent, child))
    }

    /// Parent of the first edge into `node_id`, if any.
    ///
    /// Used to pick the replacement parent for the children of a deleted
    /// node and to re-attach a child that lost its last edge.
    pub fn find_new_parent_id(&self, node_id: &NodeId) -> Option<NodeId> {
        self.parent_edge(node_id).map(|e| e.parent.clone())
    }

    /// Number of edges on the path from `node_id` to the root.
    ///
    /// Follows the first incoming edge at every step. Fails with
    /// `CycleDetected` once the walk is longer than the node count.
    pub fn node_level(&self, node_id: &NodeId) -> DomainResult<usize> {
        let bound = self.nodes.len().max(1);
        let mut level = 0;
        let mut current = node_id;
        while let Some(edge) = self.parent_edge(current) {
            level += 1;
            if level > bound {
                return Err(DomainError::CycleDetected(node_id.clone()));
            }
            current = &edge.parent;
        }
        Ok(level)
    }

    /// True if `ancestor` can be reached from `node` by walking any parent edges.
    pub fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for edge in self.incoming_edges(current) {
                if &edge.parent == ancestor {
                    return true;
                }
                if visited.insert(&edge.parent) {
                    stack.push(&edge.parent);
                }
            }
        }
        false
    }

    /// Check that an edge `parent -> child` may be added.
    pub fn validate_edge_addition(&self, parent: &NodeId, child: &NodeId) -> DomainResult<()> {
        if parent == child {
            return Err(ValidationError::SameNode(parent.clone()).into());
        }

        let parent_level = self.node_level(parent)?;
        let child_level = self.node_level(child)?;
        if parent_level == child_level {
            return Err(ValidationError::SameLevel {
                parent: parent.clone(),
                child: child.clone(),
                level: parent_level,
            }
            .into());
        }

        if self.edge(parent, child).is_some() {
            return Err(ValidationError::DuplicateEdge {
                parent: parent.clone(),
                child: child.clone(),
            }
            .into());
        }

        if self.is_ancestor(child, parent) {
            return Err(DomainError::CycleDetected(child.clone()));
        }

        Ok(())
    }

    /// Sum of the probabilities on `parent`'s outgoing edges.
    ///
    /// The edge to `excluding_child` is left out when given.
    pub fn outgoing_probability(
        &self,
        parent: &NodeId,
        excluding_child: Option<&NodeId>,
    ) -> DomainResult<f64> {
        self.outgoing_edges(parent)
            .filter(|e| Some(&e.child) != excluding_child)
            .map(|e| probability::parse(&e.probability))
            .sum()
    }

    /// Check that `candidate` fits into `parent`'s remaining probability budget.
    pub fn validate_probability_budget(
        &self,
        parent: &NodeId,
        candidate: f64,
        excluding_child: Option<&NodeId>,
    ) -> DomainResult<()> {
        let total = self.outgoing_probability(parent, excluding_child)? + candidate;
        if !probability::within_budget(total) {
            return Err(ValidationError::ProbabilityOverflow {
                parent: parent.clone(),
                total,
            }
            .into());
        }
        Ok(())
    }
}
