//! atree: edit probability-weighted attack trees stored as one JSON document.
//!
//! Layers, inside out: `domain` (document model, mutations, diagnostics),
//! `application` (storage, transactions, exports), `infrastructure`
//! (filesystem, wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
