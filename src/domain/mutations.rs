//! Mutation operations on a [`Document`].
//!
//! Every operation validates first and only then touches the document, so a
//! returned error always means the document is unchanged.

use tracing::debug;

use crate::domain::entities::{Attributes, Document, Edge, EdgeMode, Node, NodeId};
use crate::domain::error::{DomainError, DomainResult, ValidationError};
use crate::domain::probability;

/// Input for [`Document::add_node`].
#[derive(Debug, Clone)]
pub struct NewNode {
    pub name: String,
    pub parent: NodeId,
    pub probability: String,
    pub mode: EdgeMode,
    pub group: Option<String>,
    pub attributes: Attributes,
}

impl NewNode {
    pub fn new(name: impl Into<String>, parent: NodeId, probability: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent,
            probability: probability.into(),
            mode: EdgeMode::And,
            group: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_mode(mut self, mode: EdgeMode) -> Self {
        self.mode = mode;
        self
    }
}

/// What [`Document::delete_node`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedNode {
    pub node: Node,
    /// Parent the orphaned children were moved to
    pub new_parent: Option<NodeId>,
    /// Children now hanging off `new_parent`
    pub reparented: Vec<NodeId>,
}

/// Changes applied together by [`Document::apply_node_edit`].
#[derive(Debug, Clone, Default)]
pub struct NodeEdit {
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub mode: Option<EdgeMode>,
    pub group: Option<String>,
    pub attributes: Option<Attributes>,
}

fn normalized(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Document {
    // ============================================================
    // Nodes
    // ============================================================

    /// Create a node below `new.parent`, returning its fresh id.
    pub fn add_node(&mut self, new: NewNode) -> DomainResult<NodeId> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.name_taken(name) {
            return Err(ValidationError::DuplicateName(name.to_string()).into());
        }
        self.require_node(&new.parent)?;
        let value = probability::parse(&new.probability)?;
        self.validate_probability_budget(&new.parent, value, None)?;

        let color = new.mode.color();
        let mut node = Node::new(name);
        node.color = Some(color.to_string());
        node.group = normalized(new.group.as_deref()).map(str::to_string);
        node.attributes = new.attributes;
        let id = node.id.clone();

        debug!("add_node: {} ({}) below {}", name, id, new.parent);
        self.nodes.push(node);
        self.edges.push(Edge::new(
            new.parent,
            id.clone(),
            new.probability.trim(),
            color,
        ));
        Ok(id)
    }

    /// Rename a node. Blank names and the node's own name are no-ops.
    ///
    /// Returns whether the name changed.
    pub fn rename_node(&mut self, id: &NodeId, new_name: &str) -> DomainResult<bool> {
        let current = self.require_node(id)?;
        let Some(new_name) = normalized(Some(new_name)) else {
            return Ok(false);
        };
        if current.name == new_name {
            return Ok(false);
        }
        if self.name_taken(new_name) {
            return Err(ValidationError::DuplicateName(new_name.to_string()).into());
        }
        if let Some(node) = self.node_mut(id) {
            node.name = new_name.to_string();
        }
        Ok(true)
    }

    /// Delete a non-root node; its children move up to its former parent.
    pub fn delete_node(&mut self, id: &NodeId) -> DomainResult<DeletedNode> {
        self.require_node(id)?;
        if self.is_root(id) {
            return Err(ValidationError::CannotDeleteRoot(id.clone()).into());
        }
        let new_parent = self.find_new_parent_id(id);

        let mut reparented = Vec::new();
        if let Some(new_parent) = new_parent.as_ref() {
            let children: Vec<NodeId> = self.children(id).cloned().collect();
            for child in children {
                if self.edge(new_parent, &child).is_some() {
                    // already linked to the grandparent, the edge via `id` goes away
                    continue;
                }
                if let Some(edge) = self.edge_mut(id, &child) {
                    edge.parent = new_parent.clone();
                    reparented.push(child);
                }
            }
        }

        self.edges.retain(|e| !e.touches(id));
        let position = self
            .nodes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;
        let node = self.nodes.remove(position);
        debug!(
            "delete_node: {} removed, {} children moved to {:?}",
            id,
            reparented.len(),
            new_parent
        );

        Ok(DeletedNode {
            node,
            new_parent,
            reparented,
        })
    }

    /// Move `id` below `new_parent` by rewriting its parent edge.
    ///
    /// A root has no parent edge; moving it is a no-op returning `false`.
    pub fn reparent_node(&mut self, id: &NodeId, new_parent: &NodeId) -> DomainResult<bool> {
        self.require_node(id)?;
        self.require_node(new_parent)?;
        if id == new_parent {
            return Err(ValidationError::SameNode(id.clone()).into());
        }
        let Some(edge) = self.parent_edge(id) else {
            return Ok(false);
        };
        if &edge.parent == new_parent {
            return Ok(false);
        }
        let old_parent = edge.parent.clone();
        let value = probability::parse(&edge.probability)?;

        if self.is_ancestor(id, new_parent) {
            return Err(DomainError::CycleDetected(new_parent.clone()));
        }
        if self.edge(new_parent, id).is_some() {
            return Err(ValidationError::DuplicateEdge {
                parent: new_parent.clone(),
                child: id.clone(),
            }
            .into());
        }
        self.validate_probability_budget(new_parent, value, None)?;

        if let Some(edge) = self.edge_mut(&old_parent, id) {
            edge.parent = new_parent.clone();
        }
        debug!("reparent_node: {} moved from {} to {}", id, old_parent, new_parent);
        Ok(true)
    }

    /// Put a node into an AND-group. A blank group is a no-op.
    pub fn set_node_group(&mut self, id: &NodeId, group: Option<&str>) -> DomainResult<()> {
        self.require_node(id)?;
        let Some(group) = normalized(group) else {
            return Ok(());
        };
        if let Some(node) = self.node_mut(id) {
            node.group = Some(group.to_string());
        }
        Ok(())
    }

    /// Replace a node's attributes entirely.
    pub fn set_node_attributes(&mut self, id: &NodeId, attributes: Attributes) -> DomainResult<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;
        node.attributes = attributes;
        Ok(())
    }

    /// Apply several node changes at once; on error nothing is applied.
    ///
    /// Mode `or` drops the node's group and ignores `edit.group`.
    pub fn apply_node_edit(&mut self, id: &NodeId, edit: NodeEdit) -> DomainResult<()> {
        let mut working = self.clone();
        if let Some(name) = edit.name.as_deref() {
            working.rename_node(id, name)?;
        }
        if let Some(mode) = edit.mode {
            working.toggle_edge_mode(id, mode)?;
        }
        if let Some(parent) = edit.parent.as_ref() {
            working.reparent_node(id, parent)?;
        }
        if edit.mode != Some(EdgeMode::Or) {
            working.set_node_group(id, edit.group.as_deref())?;
        }
        if let Some(attributes) = edit.attributes {
            working.set_node_attributes(id, attributes)?;
        }
        *self = working;
        Ok(())
    }

    // ============================================================
    // Edges
    // ============================================================

    /// Link two existing nodes.
    pub fn add_edge(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        probability: &str,
        color: &str,
    ) -> DomainResult<()> {
        self.require_node(parent)?;
        self.require_node(child)?;
        self.validate_edge_addition(parent, child)?;
        let value = probability::parse(probability)?;
        self.validate_probability_budget(parent, value, None)?;

        debug!("add_edge: {} -> {} ({})", parent, child, probability);
        self.edges.push(Edge::new(
            parent.clone(),
            child.clone(),
            probability.trim(),
            color,
        ));
        Ok(())
    }

    /// Remove a redundant edge. The last edge into a child is kept.
    pub fn delete_edge(&mut self, parent: &NodeId, child: &NodeId) -> DomainResult<()> {
        if self.edge(parent, child).is_none() {
            return Err(DomainError::EdgeNotFound {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        if self.incoming_edges(child).count() <= 1 {
            return Err(ValidationError::LastEdgeToChild {
                parent: parent.clone(),
                child: child.clone(),
            }
            .into());
        }

        self.edges.retain(|e| !e.connects(parent, child));

        debug_assert!(!self.is_root(child), "child lost its last parent edge");
        debug!("delete_edge: {} -> {}", parent, child);
        Ok(())
    }

    /// Change an edge's probability, keeping the parent within budget.
    pub fn edit_edge_probability(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        new_probability: &str,
    ) -> DomainResult<()> {
        let value = probability::parse(new_probability)?;
        if self.edge(parent, child).is_none() {
            return Err(DomainError::EdgeNotFound {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        self.validate_probability_budget(parent, value, Some(child))?;

        if let Some(edge) = self.edge_mut(parent, child) {
            edge.probability = new_probability.trim().to_string();
        }
        Ok(())
    }

    /// Switch the link of `id` to its parent between AND and OR.
    ///
    /// Both modes share one color today. `or` also removes the node's group.
    pub fn toggle_edge_mode(&mut self, id: &NodeId, mode: EdgeMode) -> DomainResult<()> {
        self.require_node(id)?;
        if let Some(edge) = self.edges.iter_mut().find(|e| &e.child == id) {
            edge.color = mode.color().to_string();
        }
        if mode == EdgeMode::Or {
            if let Some(node) = self.node_mut(id) {
                node.group = None;
            }
        }
        Ok(())
    }
}
