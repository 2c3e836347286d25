//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod diagnostics;
pub mod entities;
pub mod error;
pub mod model;
pub mod mutations;
pub mod probability;

pub use diagnostics::{check_document, Diagnostic};
pub use entities::*;
pub use error::{DomainError, DomainResult, ValidationError};
pub use model::{group_of, groups_of};
pub use mutations::{DeletedNode, NewNode, NodeEdit};
