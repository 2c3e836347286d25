//! Document storage
//!
//! The whole attack tree lives in one pretty-printed JSON file that is
//! rewritten on every save.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Document;
use crate::infrastructure::traits::FileSystem;

/// Load/save boundary for the attack tree document.
pub trait DocumentStore: Send + Sync {
    /// Read the document; `None` if none has been stored yet.
    fn load(&self) -> ApplicationResult<Option<Document>>;

    /// Replace the stored document.
    fn save(&self, document: &Document) -> ApplicationResult<()>;

    /// Human-readable location, for messages.
    fn location(&self) -> String;
}

/// Parse document JSON; `path` only feeds the error message.
pub fn parse_document(content: &str, path: &Path) -> ApplicationResult<Document> {
    serde_json::from_str(content).map_err(|source| ApplicationError::CorruptDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a document with 4-space indentation.
pub fn render_document(document: &Document) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    buf.push(b'\n');
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// JSON file on disk, accessed through [`FileSystem`].
pub struct JsonFileStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "document.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> ApplicationResult<Option<Document>> {
        if !self.fs.exists(&self.path) {
            debug!("load: no document at {}", self.path.display());
            return Ok(None);
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read document", &self.path)?;
        let document = parse_document(&content, &self.path)?;
        debug!(
            "load: {} nodes, {} edges from {}",
            document.nodes.len(),
            document.edges.len(),
            self.path.display()
        );
        Ok(Some(document))
    }

    fn save(&self, document: &Document) -> ApplicationResult<()> {
        let json = render_document(document).map_err(|source| {
            ApplicationError::CorruptDocument {
                path: self.path.clone(),
                source,
            }
        })?;
        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create document directory", &self.path)?;

        // write aside, then swap in
        let tmp = self.temp_path();
        self.fs
            .write(&tmp, &json)
            .with_path_context("write document", &tmp)?;
        if let Err(e) = self.fs.rename(&tmp, &self.path) {
            self.fs.remove_file(&tmp).ok();
            return Err::<(), _>(e).with_path_context("replace document", &self.path);
        }
        debug!("save: wrote {}", self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
