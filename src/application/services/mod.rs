//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, DocumentStore)
//! but are themselves concrete structs, not traits.

mod store;
mod tree;

pub use store::{parse_document, render_document, DocumentStore, JsonFileStore};
pub use tree::{AttackTreeService, Outcome};
