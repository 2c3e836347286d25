//! Attack tree service
//!
//! Every mutation is one transaction: load the whole document, apply a single
//! domain operation, save the whole document. Failed operations save nothing.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::store::{parse_document, DocumentStore};
use crate::application::ApplicationResult;
use crate::domain::diagnostics::check_document;
use crate::domain::{
    Attributes, DeletedNode, Diagnostic, Document, DomainResult, EdgeMode, NewNode, NodeEdit,
    NodeId,
};

/// Result of an operation plus the advisory findings on the resulting document.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    pub fn has_warnings(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Service for editing the attack tree.
pub struct AttackTreeService {
    store: Arc<dyn DocumentStore>,
    root_name: String,
    edge_color: String,
}

impl AttackTreeService {
    /// Create a new attack tree service.
    pub fn new(store: Arc<dyn DocumentStore>, root_name: impl Into<String>) -> Self {
        Self {
            store,
            root_name: root_name.into(),
            edge_color: crate::domain::AND_EDGE_COLOR.to_string(),
        }
    }

    /// Use `color` for edges added without an explicit color.
    pub fn with_edge_color(mut self, color: impl Into<String>) -> Self {
        self.edge_color = color.into();
        self
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Load the document, creating the default one if none exists yet.
    #[instrument(skip(self))]
    pub fn load(&self) -> ApplicationResult<Outcome<Document>> {
        let document = self.load_or_bootstrap()?;
        let diagnostics = check_document(&document);
        Ok(Outcome::new(document, diagnostics))
    }

    /// Start over with a fresh single-node document.
    #[instrument(skip(self))]
    pub fn reset(&self) -> ApplicationResult<Document> {
        let document = Document::bootstrap(&self.root_name);
        self.store.save(&document)?;
        info!("reset: new document at {}", self.store.location());
        Ok(document)
    }

    /// True if a document has already been stored.
    pub fn exists(&self) -> ApplicationResult<bool> {
        Ok(self.store.load()?.is_some())
    }

    /// Replace the stored document with uploaded JSON.
    ///
    /// Content that does not parse is rejected and the current document kept.
    #[instrument(skip(self, content))]
    pub fn import(&self, content: &str, source: &Path) -> ApplicationResult<Outcome<Document>> {
        let document = parse_document(content, source)?;
        debug!(
            "import: {} nodes, {} edges from {}",
            document.nodes.len(),
            document.edges.len(),
            source.display()
        );
        self.store.save(&document)?;
        let diagnostics = check_document(&document);
        Ok(Outcome::new(document, diagnostics))
    }

    fn load_or_bootstrap(&self) -> ApplicationResult<Document> {
        match self.store.load()? {
            Some(document) => Ok(document),
            None => {
                info!("no document found, creating {}", self.store.location());
                self.reset()
            }
        }
    }

    fn transact<T>(
        &self,
        op: impl FnOnce(&mut Document) -> DomainResult<T>,
    ) -> ApplicationResult<Outcome<T>> {
        let mut document = self.load_or_bootstrap()?;
        let value = op(&mut document)?;
        self.store.save(&document)?;
        let diagnostics = check_document(&document);
        Ok(Outcome::new(value, diagnostics))
    }

    // ============================================================
    // Node operations
    // ============================================================

    /// Add a node; `new.parent` may be an id or a node name.
    #[instrument(skip(self))]
    pub fn add_node(&self, mut new: NewNode) -> ApplicationResult<Outcome<NodeId>> {
        self.transact(|doc| {
            new.parent = doc.resolve_id(new.parent.as_str())?;
            doc.add_node(new)
        })
    }

    #[instrument(skip(self))]
    pub fn rename_node(&self, node: &str, new_name: &str) -> ApplicationResult<Outcome<bool>> {
        self.transact(|doc| {
            let id = doc.resolve_id(node)?;
            doc.rename_node(&id, new_name)
        })
    }

    #[instrument(skip(self))]
    pub fn delete_node(&self, node: &str) -> ApplicationResult<Outcome<DeletedNode>> {
        self.transact(|doc| {
            let id = doc.resolve_id(node)?;
            doc.delete_node(&id)
        })
    }

    #[instrument(skip(self))]
    pub fn reparent_node(&self, node: &str, new_parent: &str) -> ApplicationResult<Outcome<bool>> {
        self.transact(|doc| {
            let id = doc.resolve_id(node)?;
            let parent = doc.resolve_id(new_parent)?;
            doc.reparent_node(&id, &parent)
        })
    }

    #[instrument(skip(self))]
    pub fn set_node_group(&self, node: &str, group: Option<&str>) -> ApplicationResult<Outcome<()>> {
        self.transact(|doc| {
            let id = doc.resolve_id(node)?;
            doc.set_node_group(&id, group)
        })
    }

    #[instrument(skip(self))]
    pub fn set_node_attributes(
        &self,
        node: &str,
        attributes: Attributes,
    ) -> ApplicationResult<Outcome<()>> {
        self.transact(|doc| {
            let id = doc.resolve_id(node)?;
            doc.set_node_attributes(&id, attributes)
        })
    }

    /// Apply a combined edit; `edit.parent` may be an id or a node name.
    #[instrument(skip(self))]
    pub fn edit_node(&self, node: &str, mut edit: NodeEdit) -> ApplicationResult<Outcome<()>> {
        self.transact(|doc| {
            let id = doc.resolve_id(node)?;
            if let Some(parent) = edit.parent.take() {
                edit.parent = Some(doc.resolve_id(parent.as_str())?);
            }
            doc.apply_node_edit(&id, edit)
        })
    }

    // ============================================================
    // Edge operations
    // ============================================================

    #[instrument(skip(self))]
    pub fn add_edge(
        &self,
        parent: &str,
        child: &str,
        probability: &str,
        color: Option<&str>,
    ) -> ApplicationResult<Outcome<()>> {
        let color = color.unwrap_or(self.edge_color.as_str());
        self.transact(|doc| {
            let parent = doc.resolve_id(parent)?;
            let child = doc.resolve_id(child)?;
            doc.add_edge(&parent, &child, probability, color)
        })
    }

    #[instrument(skip(self))]
    pub fn delete_edge(&self, parent: &str, child: &str) -> ApplicationResult<Outcome<()>> {
        self.transact(|doc| {
            let parent = doc.resolve_id(parent)?;
            let child = doc.resolve_id(child)?;
            doc.delete_edge(&parent, &child)
        })
    }

    #[instrument(skip(self))]
    pub fn edit_edge_probability(
        &self,
        parent: &str,
        child: &str,
        probability: &str,
    ) -> ApplicationResult<Outcome<()>> {
        self.transact(|doc| {
            let parent = doc.resolve_id(parent)?;
            let child = doc.resolve_id(child)?;
            doc.edit_edge_probability(&parent, &child, probability)
        })
    }

    #[instrument(skip(self))]
    pub fn toggle_edge_mode(&self, node: &str, mode: EdgeMode) -> ApplicationResult<Outcome<()>> {
        self.transact(|doc| {
            let id = doc.resolve_id(node)?;
            doc.toggle_edge_mode(&id, mode)
        })
    }
}
